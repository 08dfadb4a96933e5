//! Resolution of `@import` targets.
//!
//! The parser hands every importable path to an [`ImportResolver`]. A
//! resolver answers with the file that was found and its text, or `None` to
//! leave the statement in the output untouched.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{CompileError, Result};

pub trait ImportResolver {
    /// Looks up `raw`, the import path as written in the stylesheet.
    fn resolve(&self, raw: &str) -> Result<Option<(PathBuf, String)>>;
}

/// Searches a list of directories, trying `raw` and then `raw.less` in each.
/// With no directories the path is taken relative to the working directory.
#[derive(Clone, Debug, Default)]
pub struct FsImporter {
    dirs: Vec<PathBuf>,
}

impl FsImporter {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    fn candidates(&self, raw: &str) -> Vec<PathBuf> {
        let with_suffix = format!("{raw}.less");
        let roots: Vec<&Path> = if self.dirs.is_empty() {
            vec![Path::new("")]
        } else {
            self.dirs.iter().map(PathBuf::as_path).collect()
        };
        roots
            .into_iter()
            .flat_map(|dir| [dir.join(raw), dir.join(&with_suffix)])
            .collect()
    }
}

impl ImportResolver for FsImporter {
    fn resolve(&self, raw: &str) -> Result<Option<(PathBuf, String)>> {
        for path in self.candidates(raw) {
            if !path.is_file() {
                continue;
            }
            return match fs::read_to_string(&path) {
                Ok(text) => Ok(Some((path, text))),
                Err(source) => Err(CompileError::ImportIo { path, source }),
            };
        }
        Ok(None)
    }
}

/// In-memory sources keyed by path; `raw.less` is tried after `raw`.
impl ImportResolver for HashMap<String, String> {
    fn resolve(&self, raw: &str) -> Result<Option<(PathBuf, String)>> {
        let with_suffix = format!("{raw}.less");
        Ok([raw, with_suffix.as_str()]
            .into_iter()
            .find_map(|key| self.get(key).map(|text| (PathBuf::from(key), text.clone()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_order() {
        let importer = FsImporter::new(vec![PathBuf::from("a"), PathBuf::from("b")]);
        assert_eq!(
            importer.candidates("x"),
            vec![
                PathBuf::from("a/x"),
                PathBuf::from("a/x.less"),
                PathBuf::from("b/x"),
                PathBuf::from("b/x.less"),
            ]
        );
        assert_eq!(
            FsImporter::default().candidates("x"),
            vec![PathBuf::from("x"), PathBuf::from("x.less")]
        );
    }

    #[test]
    fn test_missing_file_is_none() {
        let importer = FsImporter::new(vec![std::env::temp_dir().join("lessc-no-such-dir")]);
        assert!(importer.resolve("nothing").unwrap().is_none());
    }

    #[test]
    fn test_memory_resolver_suffix() {
        let mut files = HashMap::new();
        files.insert("vars.less".to_string(), "@a: 1;".to_string());
        let (path, text) = files.resolve("vars").unwrap().unwrap();
        assert_eq!(path, PathBuf::from("vars.less"));
        assert_eq!(text, "@a: 1;");
    }
}
