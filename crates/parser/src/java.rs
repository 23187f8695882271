use crate::error::{ParserError, Result};
use crate::parser::SourceParser;
use once_cell::sync::Lazy;
use regex::Regex;
use retriever_model::{CodeFragment, FragmentKind};
use std::fs;
use std::path::Path;

static PACKAGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*package\s+([\w.]+)\s*;").unwrap());

static TYPE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        (?:(?:public|private|protected|abstract|final|static|sealed|strictfp)\s+)*
        (class|interface|enum)\s+(\w+)
        (?:\s*<[^>]*>)?
        (?:\s+extends\s+([\w<>,.\s]+?))?
        (?:\s+implements\s+([\w<>,.\s]+?))?
        \s*\{?\s*$",
    )
    .unwrap()
});

static METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        (?:(?:public|private|protected|static|final|abstract|synchronized|native|default)\s+)*
        (?:<[^>]*>\s*)?
        ([\w.]+(?:<[^>]*>)?(?:\[\])*)\s+(\w+)\s*
        \(([^)]*)\)
        \s*(?:throws\s+[\w,.\s]+?)?\s*(\{|;)\s*$",
    )
    .unwrap()
});

static FIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?x)
        ^\s*
        (?:(?:public|private|protected|static|final|transient|volatile)\s+)*
        ([\w.]+(?:<[^>]*>)?(?:\[\])*)\s+(\w+)\s*
        (?:=[^;]*)?;\s*$",
    )
    .unwrap()
});

/// Words that can never be the type or name of a real declaration. Filters
/// out control flow, constructors, and import/package lines the member
/// patterns would otherwise swallow.
const RESERVED: &[&str] = &[
    "if", "else", "for", "while", "switch", "catch", "do", "try", "return", "new", "throw",
    "throws", "break", "continue", "assert", "package", "import", "public", "private",
    "protected", "static", "final", "abstract", "synchronized",
];

/// An enclosing type declaration during the scan.
struct TypeScope {
    name: String,
    /// Brace depth just outside the type body.
    outer_depth: usize,
    /// Set once the opening brace has been consumed.
    entered: bool,
}

/// Extracts classes, interfaces, enums, methods, and fields from Java
/// sources.
///
/// This is a line-oriented scanner, not a full grammar: declarations are
/// recognized on a single line and bodies are delimited by brace counting.
/// That covers conventionally formatted code; exotic layouts degrade to
/// missed fragments rather than errors.
pub struct JavaSourceParser;

impl JavaSourceParser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn parse_source(source: &str, file_path: &str) -> Vec<CodeFragment> {
        let lines: Vec<&str> = source.lines().collect();
        let package = lines
            .iter()
            .find_map(|line| PACKAGE_RE.captures(line))
            .map(|caps| caps[1].to_string());

        let mut fragments = Vec::new();
        let mut scopes: Vec<TypeScope> = Vec::new();
        let mut depth: usize = 0;
        let mut pending_doc: Option<String> = None;

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            let trimmed = line.trim();

            if trimmed.starts_with("/**") {
                let (doc, end) = collect_javadoc(&lines, i);
                pending_doc = doc;
                i = end + 1;
                continue;
            }

            if let Some(caps) = TYPE_RE.captures(line) {
                let name = caps[2].to_string();
                let kind = match &caps[1] {
                    "interface" => FragmentKind::Interface,
                    "enum" => FragmentKind::Enum,
                    _ => FragmentKind::Class,
                };
                let end = block_end(&lines, i);

                let mut fragment = CodeFragment::new(qualify(&package, &name), kind, &name);
                fragment.file_path = file_path.to_string();
                fragment.package_name = package.clone();
                fragment.signature = Some(strip_decl_suffix(trimmed));
                fragment.content = Some(lines[i..=end].join("\n"));
                fragment.start_line = i + 1;
                fragment.end_line = end + 1;
                fragment.documentation = pending_doc.take();
                if let Some(extends) = caps.get(3) {
                    fragment.dependencies.extend(type_names(extends.as_str()));
                }
                if let Some(implements) = caps.get(4) {
                    fragment
                        .dependencies
                        .extend(type_names(implements.as_str()));
                }
                fragments.push(fragment);

                scopes.push(TypeScope {
                    name,
                    outer_depth: depth,
                    entered: false,
                });
            } else if let Some(scope) = scopes.last() {
                // Members sit exactly one level inside their type body.
                // Anything deeper is a statement inside a method.
                let at_member_depth = depth == scope.outer_depth + 1;

                if at_member_depth {
                    if let Some(mut fragment) =
                        Self::match_member(&lines, i, trimmed, &package, scope, &mut pending_doc)
                    {
                        fragment.file_path = file_path.to_string();
                        fragments.push(fragment);
                    }
                }
            }

            for ch in line.chars() {
                match ch {
                    '{' => depth += 1,
                    '}' => depth = depth.saturating_sub(1),
                    _ => {}
                }
            }
            if let Some(scope) = scopes.last_mut() {
                if depth > scope.outer_depth {
                    scope.entered = true;
                }
            }
            while scopes
                .last()
                .is_some_and(|scope| scope.entered && depth <= scope.outer_depth)
            {
                scopes.pop();
            }

            i += 1;
        }

        fragments
    }

    fn match_member(
        lines: &[&str],
        i: usize,
        trimmed: &str,
        package: &Option<String>,
        scope: &TypeScope,
        pending_doc: &mut Option<String>,
    ) -> Option<CodeFragment> {
        if let Some(caps) = METHOD_RE.captures(trimmed) {
            let return_type = base_name(&caps[1]);
            let name = caps[2].to_string();
            if RESERVED.contains(&return_type.as_str()) || RESERVED.contains(&name.as_str()) {
                return None;
            }

            let has_body = &caps[4] == "{";
            let end = if has_body { block_end(lines, i) } else { i };

            let id = qualify(package, &format!("{}.{name}", scope.name));
            let mut fragment = CodeFragment::new(id, FragmentKind::Method, &name);
            fragment.package_name = package.clone();
            fragment.signature = Some(strip_decl_suffix(trimmed));
            fragment.content = Some(lines[i..=end].join("\n"));
            fragment.start_line = i + 1;
            fragment.end_line = end + 1;
            fragment.documentation = pending_doc.take();
            return Some(fragment);
        }

        if let Some(caps) = FIELD_RE.captures(trimmed) {
            let field_type = base_name(&caps[1]);
            let name = caps[2].to_string();
            if RESERVED.contains(&field_type.as_str()) || RESERVED.contains(&name.as_str()) {
                return None;
            }

            let id = qualify(package, &format!("{}.{name}", scope.name));
            let mut fragment = CodeFragment::new(id, FragmentKind::Field, &name);
            fragment.package_name = package.clone();
            fragment.signature = Some(field_signature(trimmed));
            fragment.content = Some(trimmed.to_string());
            fragment.start_line = i + 1;
            fragment.end_line = i + 1;
            fragment.documentation = pending_doc.take();
            return Some(fragment);
        }

        None
    }
}

impl Default for JavaSourceParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceParser for JavaSourceParser {
    fn supports_file(&self, path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == "java")
    }

    fn parse_file(&self, path: &Path) -> Result<Vec<CodeFragment>> {
        let file_path = path.display().to_string();
        let source = fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::InvalidData {
                ParserError::InvalidEncoding(file_path.clone())
            } else {
                ParserError::Io(err)
            }
        })?;

        let mut fragments = Self::parse_source(&source, &file_path);
        for fragment in &mut fragments {
            fragment.file_path = file_path.clone();
        }
        Ok(fragments)
    }
}

/// `pkg.Rest` when a package declaration exists, bare `Rest` otherwise.
fn qualify(package: &Option<String>, rest: &str) -> String {
    match package {
        Some(package) => format!("{package}.{rest}"),
        None => rest.to_string(),
    }
}

/// Simple type names from an extends/implements list, generics stripped.
fn type_names(list: &str) -> Vec<String> {
    list.split(',')
        .map(|part| base_name(part))
        .filter(|name| !name.is_empty())
        .collect()
}

/// `java.util.List<String>` -> `List`.
fn base_name(raw: &str) -> String {
    let no_generics = raw.split('<').next().unwrap_or("").trim();
    no_generics
        .rsplit('.')
        .next()
        .unwrap_or("")
        .trim_end_matches("[]")
        .to_string()
}

fn strip_decl_suffix(trimmed: &str) -> String {
    trimmed
        .trim_end_matches(|c| c == '{' || c == ';')
        .trim_end()
        .to_string()
}

/// Declaration part of a field line, initializer dropped.
fn field_signature(trimmed: &str) -> String {
    match trimmed.find('=') {
        Some(eq) => format!("{};", trimmed[..eq].trim_end()),
        None => trimmed.to_string(),
    }
}

/// Line index of the brace that closes the block opening at `start`.
/// Falls back to the last line when the block never closes.
fn block_end(lines: &[&str], start: usize) -> usize {
    let mut depth = 0usize;
    let mut opened = false;

    for (offset, line) in lines[start..].iter().enumerate() {
        for ch in line.chars() {
            match ch {
                '{' => {
                    depth += 1;
                    opened = true;
                }
                '}' => {
                    depth = depth.saturating_sub(1);
                    if opened && depth == 0 {
                        return start + offset;
                    }
                }
                _ => {}
            }
        }
    }
    lines.len() - 1
}

/// Collect a `/** ... */` block starting at `start`. Returns the cleaned
/// text and the index of the closing line.
fn collect_javadoc(lines: &[&str], start: usize) -> (Option<String>, usize) {
    let mut text = Vec::new();
    let mut end = start;

    for (offset, raw) in lines[start..].iter().enumerate() {
        end = start + offset;
        let mut line = raw.trim();
        if offset == 0 {
            line = line.trim_start_matches("/**").trim();
        }
        let closed = line.contains("*/");
        let body = line.split("*/").next().unwrap_or("");
        let body = body.trim().trim_start_matches('*').trim();
        if !body.is_empty() {
            text.push(body.to_string());
        }
        if closed {
            break;
        }
    }

    let doc = if text.is_empty() {
        None
    } else {
        Some(text.join("\n"))
    };
    (doc, end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"package com.example.store;

import java.util.List;

/**
 * Stores and loads users.
 */
public class UserRepository extends BaseRepository implements Closeable {
    private final Database database;
    private static final int MAX_RETRIES = 3;

    /**
     * Load a user by id.
     */
    public User findById(long id) {
        if (id < 0) {
            throw new IllegalArgumentException("bad id");
        }
        return database.find(id);
    }

    public void close() {
        database.close();
    }
}
"#;

    fn parse(source: &str) -> Vec<CodeFragment> {
        JavaSourceParser::parse_source(source, "Test.java")
    }

    fn find<'a>(fragments: &'a [CodeFragment], id: &str) -> &'a CodeFragment {
        fragments
            .iter()
            .find(|f| f.id == id)
            .unwrap_or_else(|| panic!("missing fragment {id}"))
    }

    #[test]
    fn extracts_class_with_documentation_and_dependencies() {
        let fragments = parse(SAMPLE);
        let class = find(&fragments, "com.example.store.UserRepository");

        assert_eq!(class.kind, FragmentKind::Class);
        assert_eq!(class.name, "UserRepository");
        assert_eq!(class.package_name.as_deref(), Some("com.example.store"));
        assert_eq!(class.documentation.as_deref(), Some("Stores and loads users."));
        assert_eq!(class.dependencies, vec!["BaseRepository", "Closeable"]);
        assert_eq!(
            class.signature.as_deref(),
            Some("public class UserRepository extends BaseRepository implements Closeable")
        );
    }

    #[test]
    fn extracts_methods_with_bodies_and_line_ranges() {
        let fragments = parse(SAMPLE);
        let method = find(&fragments, "com.example.store.UserRepository.findById");

        assert_eq!(method.kind, FragmentKind::Method);
        assert_eq!(method.signature.as_deref(), Some("public User findById(long id)"));
        assert_eq!(method.documentation.as_deref(), Some("Load a user by id."));
        assert!(method.content.as_deref().unwrap().contains("database.find(id)"));
        assert!(method.start_line < method.end_line);

        // Statements inside the body must not surface as members.
        assert!(fragments.iter().all(|f| f.name != "if"));
    }

    #[test]
    fn extracts_fields_without_initializers_in_signature() {
        let fragments = parse(SAMPLE);

        let field = find(&fragments, "com.example.store.UserRepository.database");
        assert_eq!(field.kind, FragmentKind::Field);
        assert_eq!(field.signature.as_deref(), Some("private final Database database;"));

        let constant = find(&fragments, "com.example.store.UserRepository.MAX_RETRIES");
        assert_eq!(
            constant.signature.as_deref(),
            Some("private static final int MAX_RETRIES;")
        );
    }

    #[test]
    fn constructors_are_not_reported_as_methods() {
        let source = r#"
public class Widget {
    public Widget(int size) {
        this.size = size;
    }
}
"#;
        let fragments = parse(source);
        assert!(fragments.iter().all(|f| f.kind != FragmentKind::Method));
    }

    #[test]
    fn interfaces_and_enums_get_their_own_kinds() {
        let source = r#"
package com.example;

public interface Closeable {
    void close();
}

enum Color {
    RED, GREEN;
}
"#;
        let fragments = parse(source);
        assert_eq!(find(&fragments, "com.example.Closeable").kind, FragmentKind::Interface);
        assert_eq!(find(&fragments, "com.example.Color").kind, FragmentKind::Enum);

        // Bodyless interface methods are still captured.
        let close = find(&fragments, "com.example.Closeable.close");
        assert_eq!(close.signature.as_deref(), Some("void close()"));
        assert_eq!(close.start_line, close.end_line);
    }

    #[test]
    fn missing_package_leaves_ids_unqualified() {
        let source = "class Bare {\n}\n";
        let fragments = parse(source);
        assert_eq!(fragments[0].id, "Bare");
        assert_eq!(fragments[0].package_name, None);
    }

    #[test]
    fn parse_directory_skips_unsupported_and_broken_files() {
        let dir = TempDir::new().unwrap();
        let java = dir.path().join("A.java");
        let mut file = std::fs::File::create(&java).unwrap();
        write!(file, "public class A {{\n}}\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not java").unwrap();

        let parser = JavaSourceParser::new();
        let fragments = parser.parse_directory(dir.path());

        assert_eq!(fragments.len(), 1);
        assert_eq!(fragments[0].name, "A");
        assert_eq!(fragments[0].file_path, java.display().to_string());
    }

    #[test]
    fn non_utf8_files_report_an_encoding_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("Broken.java");
        std::fs::write(&path, [0xffu8, 0xfe, 0x00, 0x9f]).unwrap();

        let err = JavaSourceParser::new().parse_file(&path).unwrap_err();
        assert!(matches!(err, ParserError::InvalidEncoding(_)));
    }

    #[test]
    fn supports_only_java_files() {
        let parser = JavaSourceParser::new();
        assert!(parser.supports_file(Path::new("src/Main.java")));
        assert!(!parser.supports_file(Path::new("src/main.rs")));
        assert!(!parser.supports_file(Path::new("java")));
    }
}
