use crate::error::Result;
use retriever_model::CodeFragment;
use std::path::Path;
use walkdir::WalkDir;

/// A language-specific fragment extractor.
pub trait SourceParser {
    /// Whether this parser handles the given file, usually by extension.
    fn supports_file(&self, path: &Path) -> bool;

    /// Extract all fragments from a single source file.
    fn parse_file(&self, path: &Path) -> Result<Vec<CodeFragment>>;

    /// Walk a directory tree and parse every supported file.
    ///
    /// Unreadable entries and files that fail to parse are logged and
    /// skipped; a partial result beats losing the whole corpus to one bad
    /// file.
    fn parse_directory(&self, root: &Path) -> Vec<CodeFragment> {
        let mut fragments = Vec::new();

        for entry in WalkDir::new(root) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::error!("Error walking directory {}: {err}", root.display());
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.supports_file(entry.path()) {
                continue;
            }

            match self.parse_file(entry.path()) {
                Ok(parsed) => fragments.extend(parsed),
                Err(err) => {
                    log::error!("Error parsing file {}: {err}", entry.path().display());
                }
            }
        }

        log::info!(
            "Parsed {} code fragments from {}",
            fragments.len(),
            root.display()
        );
        fragments
    }
}
