//! Class-name to file-path lookup.
//!
//! The reflector only ever asks "which file declares this class?" and feeds
//! the answer back into its source cache. How the answer is produced
//! (a fixed map, a directory scan, an autoload index) is up to the caller.

use refract_binder::SourceCache;
use refract_common::names::{NameKey, strip_leading_separator};
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use tracing::{debug, warn};
use walkdir::WalkDir;

pub trait Locator {
    /// File declaring `fq_class_name` (no leading separator), if known.
    fn locate(&self, fq_class_name: &str) -> Option<PathBuf>;
}

impl<L: Locator + ?Sized> Locator for &L {
    fn locate(&self, fq_class_name: &str) -> Option<PathBuf> {
        (**self).locate(fq_class_name)
    }
}

impl<L: Locator + ?Sized> Locator for Box<L> {
    fn locate(&self, fq_class_name: &str) -> Option<PathBuf> {
        (**self).locate(fq_class_name)
    }
}

impl<L: Locator + ?Sized> Locator for Rc<L> {
    fn locate(&self, fq_class_name: &str) -> Option<PathBuf> {
        (**self).locate(fq_class_name)
    }
}

/// Locates nothing. Only classes in files already handed to the reflector
/// are found.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullLocator;

impl Locator for NullLocator {
    fn locate(&self, _fq_class_name: &str) -> Option<PathBuf> {
        None
    }
}

/// Adapts a closure.
pub struct FnLocator<F>(pub F);

impl<F> Locator for FnLocator<F>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    fn locate(&self, fq_class_name: &str) -> Option<PathBuf> {
        (self.0)(fq_class_name)
    }
}

/// Fixed class map with case-insensitive class names.
#[derive(Clone, Debug, Default)]
pub struct ClassMapLocator {
    classes: FxHashMap<NameKey, PathBuf>,
}

impl ClassMapLocator {
    pub fn new() -> ClassMapLocator {
        ClassMapLocator::default()
    }

    /// Map `class` to `path`, replacing an earlier entry.
    pub fn insert(&mut self, class: &str, path: impl Into<PathBuf>) {
        self.classes
            .insert(NameKey::folded(strip_leading_separator(class)), path.into());
    }

    pub fn with(mut self, class: &str, path: impl Into<PathBuf>) -> ClassMapLocator {
        self.insert(class, path);
        self
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Map every class-like declared in `*.php` files under `dir`. Files that
    /// cannot be read or parsed are skipped; the first declaration of a name
    /// wins.
    pub fn scan(dir: &Path) -> ClassMapLocator {
        let sources = SourceCache::new();
        let mut locator = ClassMapLocator::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(error = %err, "skipping unreadable directory entry");
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().is_none_or(|ext| !ext.eq_ignore_ascii_case("php"))
            {
                continue;
            }

            let file = match sources.parse_file(path) {
                Ok(file) => file,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unparsable file");
                    continue;
                }
            };
            for block in file.namespaces() {
                for class in block.entities().classes.values() {
                    let key = NameKey::folded(&class.name);
                    locator
                        .classes
                        .entry(key)
                        .or_insert_with(|| file.path().to_path_buf());
                }
            }
        }

        debug!(dir = %dir.display(), classes = locator.len(), "scanned class map");
        locator
    }
}

impl Locator for ClassMapLocator {
    fn locate(&self, fq_class_name: &str) -> Option<PathBuf> {
        self.classes
            .get(&NameKey::folded(strip_leading_separator(fq_class_name)))
            .cloned()
    }
}
