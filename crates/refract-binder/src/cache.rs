//! Process-lifetime cache of parsed source files.
//!
//! Entries are keyed by canonical path, so different spellings of the same
//! path share one parse. Outcomes (including failures) are cached for the
//! lifetime of the cache; nothing is evicted or invalidated, so a file
//! changed on disk after its first parse is not seen again.

use crate::error::{BinderError, NamespaceNotFoundError, ParseError};
use crate::source_file::{FileIdentity, NamespaceBlock, SourceFile};
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::debug;

type CachedParse = Result<Rc<SourceFile>, ParseError>;

#[derive(Default)]
pub struct SourceCache {
    files: RefCell<FxHashMap<PathBuf, CachedParse>>,
}

impl SourceCache {
    pub fn new() -> SourceCache {
        SourceCache::default()
    }

    /// Parse a file from disk, or return the cached outcome.
    pub fn parse_file(&self, path: &Path) -> Result<Rc<SourceFile>, ParseError> {
        let key = canonical_key(path);
        if let Some(cached) = self.files.borrow().get(&key) {
            debug!(path = %key.display(), "source cache hit");
            return cached.clone();
        }

        debug!(path = %key.display(), "source cache miss");
        let outcome = match std::fs::read(&key) {
            Ok(bytes) => {
                let text = String::from_utf8(bytes)
                    .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());
                let identity = FileIdentity::of(&key);
                check_syntax(SourceFile::parse(key.clone(), identity, text))
            }
            Err(err) => Err(ParseError::Io {
                path: key.clone(),
                message: err.to_string(),
            }),
        };

        self.files.borrow_mut().insert(key, outcome.clone());
        outcome
    }

    /// Parse in-memory text under `path`. The path is canonicalized when it
    /// exists on disk; an already cached entry for the same key wins.
    pub fn parse_source(
        &self,
        path: impl AsRef<Path>,
        text: impl Into<String>,
    ) -> Result<Rc<SourceFile>, ParseError> {
        let key = canonical_key(path.as_ref());
        if let Some(cached) = self.files.borrow().get(&key) {
            debug!(path = %key.display(), "source cache hit");
            return cached.clone();
        }

        let outcome = check_syntax(SourceFile::parse(
            key.clone(),
            FileIdentity::default(),
            text.into(),
        ));
        self.files.borrow_mut().insert(key, outcome.clone());
        outcome
    }

    /// The first namespace block named `name` (case-insensitive; empty for
    /// the global namespace).
    pub fn parse_namespace_block(
        &self,
        path: &Path,
        name: &str,
    ) -> Result<NamespaceBlock, BinderError> {
        let file = self.parse_file(path)?;
        let name = refract_common::names::strip_leading_separator(name);
        file.namespace(name).ok_or_else(|| {
            BinderError::NamespaceNotFound(NamespaceNotFoundError {
                path: file.path().to_path_buf(),
                namespace: name.to_string(),
            })
        })
    }

    /// Successfully parsed files, in no particular order.
    pub fn files(&self) -> Vec<Rc<SourceFile>> {
        self.files
            .borrow()
            .values()
            .filter_map(|entry| entry.as_ref().ok().cloned())
            .collect()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(&canonical_key(path))
    }

    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }
}

fn canonical_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn check_syntax(file: SourceFile) -> CachedParse {
    if file.has_errors() {
        debug!(
            path = %file.path().display(),
            errors = file.diagnostics().len(),
            "source has syntax errors"
        );
        return Err(ParseError::Syntax {
            path: file.path().to_path_buf(),
            diagnostics: file.diagnostics().to_vec(),
        });
    }
    Ok(Rc::new(file))
}
