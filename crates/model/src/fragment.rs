use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of code unit a fragment represents. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FragmentKind {
    Class,
    Interface,
    Method,
    Field,
    Enum,
}

impl FragmentKind {
    /// Get human-readable name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Method => "method",
            Self::Field => "field",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed code unit with associated text and metadata.
///
/// The `id` is an opaque string assigned by the parser, typically a dotted
/// path built from the package and enclosing names. It must be unique across
/// the set handed to a single index; behavior is undefined if two fragments
/// share an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeFragment {
    pub id: String,
    pub kind: FragmentKind,
    pub name: String,
    pub signature: Option<String>,
    /// Full source text of the unit
    pub content: Option<String>,
    pub file_path: String,
    pub start_line: usize,
    pub end_line: usize,
    pub package_name: Option<String>,
    /// Doc comment text, if any
    pub documentation: Option<String>,
    /// Referenced type names, in source order. These are bare names
    /// (e.g. `ArrayList`), not fragment ids.
    pub dependencies: Vec<String>,
    /// Embedding vector, attached after parsing when semantic search is
    /// enabled. Absent until computed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
}

impl CodeFragment {
    /// Create a fragment with the mandatory identity fields; everything else
    /// starts empty.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: FragmentKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            signature: None,
            content: None,
            file_path: String::new(),
            start_line: 0,
            end_line: 0,
            package_name: None,
            documentation: None,
            dependencies: Vec::new(),
            embedding: None,
        }
    }

    /// True when the fragment carries a non-empty doc comment.
    #[must_use]
    pub fn has_documentation(&self) -> bool {
        self.documentation.as_deref().is_some_and(|d| !d.is_empty())
    }

    /// Render the fragment for inclusion in an LLM prompt: file header,
    /// doc comment, and the signature (falling back to the full content).
    #[must_use]
    pub fn to_context_string(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("// File: {}\n", self.file_path));
        out.push_str(&format!("// Lines: {}-{}\n", self.start_line, self.end_line));

        if let Some(doc) = self.documentation.as_deref().filter(|d| !d.is_empty()) {
            out.push_str(doc);
            out.push('\n');
        }

        match self.signature.as_deref().filter(|s| !s.is_empty()) {
            Some(signature) => {
                out.push_str(signature);
                out.push('\n');
            }
            None => {
                out.push_str(self.content.as_deref().unwrap_or_default());
                out.push('\n');
            }
        }

        out
    }
}

impl fmt::Display for CodeFragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.kind, self.name, self.file_path)
    }
}
