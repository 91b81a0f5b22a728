//! Where page objects and generated tests are stored.
//!
//! The [`Workspace`] trait keeps the library and the synthesizer independent
//! of the file system. [`FsWorkspace`] lays files out as
//!
//! ```text
//! <root>/<pages_dir>/<Page>.pom.json   persisted definition + manifest
//! <root>/<pages_dir>/<Page>.ts         rendered page-object class
//! <root>/<tests_dir>/<slug>.spec.ts    generated tests
//! ```
//!
//! and [`MemoryWorkspace`] keeps the same data in maps for tests.

use crate::config::GeneratorConfig;
use crate::result::{PersistenceError, PlanwrightResult};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const RECORD_SUFFIX: &str = ".pom.json";
const SOURCE_SUFFIX: &str = ".ts";
const TEST_SUFFIX: &str = ".spec.ts";

/// The two stored artifacts of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPage {
    /// Serialized page record
    pub record_json: String,
    /// Rendered TypeScript source
    pub source: String,
}

/// Storage for page objects and generated test files
pub trait Workspace: Send + Sync + fmt::Debug {
    /// Load a page, `None` if it was never stored
    fn read_page(&self, page: &str) -> PlanwrightResult<Option<StoredPage>>;

    /// Store both artifacts of a page
    fn write_page(&self, page: &str, record_json: &str, source: &str) -> PlanwrightResult<()>;

    /// Delete both artifacts of a page; a page that was never stored is fine
    fn remove_page(&self, page: &str) -> PlanwrightResult<()>;

    /// Names of every stored page, sorted
    fn list_pages(&self) -> PlanwrightResult<Vec<String>>;

    /// File names of every generated test, sorted
    fn list_tests(&self) -> PlanwrightResult<Vec<String>>;

    /// Check for an existing test file
    fn test_exists(&self, file_name: &str) -> PlanwrightResult<bool> {
        Ok(self.list_tests()?.iter().any(|t| t == file_name))
    }

    /// Load a generated test
    fn read_test(&self, file_name: &str) -> PlanwrightResult<Option<String>>;

    /// Store a generated test
    fn write_test(&self, file_name: &str, contents: &str) -> PlanwrightResult<()>;
}

/// Directory-backed workspace
#[derive(Debug, Clone)]
pub struct FsWorkspace {
    root: PathBuf,
    pages_dir: PathBuf,
    tests_dir: PathBuf,
}

impl FsWorkspace {
    /// Workspace rooted at `root` with the default `pages/` and `tests/` layout
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            pages_dir: root.join("pages"),
            tests_dir: root.join("tests"),
            root,
        }
    }

    /// Workspace rooted at `root` with the configured directory names
    pub fn from_config(root: impl Into<PathBuf>, config: &GeneratorConfig) -> Self {
        let root = root.into();
        Self {
            pages_dir: root.join(&config.pages_dir),
            tests_dir: root.join(&config.tests_dir),
            root,
        }
    }

    /// Workspace root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Page directory
    #[must_use]
    pub fn pages_dir(&self) -> &Path {
        &self.pages_dir
    }

    /// Test directory
    #[must_use]
    pub fn tests_dir(&self) -> &Path {
        &self.tests_dir
    }

    /// Path of a page's definition record
    #[must_use]
    pub fn record_path(&self, page: &str) -> PathBuf {
        self.pages_dir.join(format!("{page}{RECORD_SUFFIX}"))
    }

    /// Path of a page's rendered source
    #[must_use]
    pub fn source_path(&self, page: &str) -> PathBuf {
        self.pages_dir.join(format!("{page}{SOURCE_SUFFIX}"))
    }

    fn list(dir: &Path, suffix: &str, keep_suffix: bool) -> io::Result<Vec<String>> {
        if !dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(stem) = name.strip_suffix(suffix) {
                names.push(if keep_suffix { name.clone() } else { stem.to_string() });
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Write through a sibling temp file so readers never see a torn file
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)
}

fn remove_optional(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn read_optional(path: &Path) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
    }
}

impl Workspace for FsWorkspace {
    fn read_page(&self, page: &str) -> PlanwrightResult<Option<StoredPage>> {
        let Some(record_json) = read_optional(&self.record_path(page))? else {
            return Ok(None);
        };
        let source = read_optional(&self.source_path(page))?.ok_or_else(|| {
            PersistenceError::Modified {
                page: page.to_string(),
                message: "rendered source is missing".to_string(),
            }
        })?;
        Ok(Some(StoredPage { record_json, source }))
    }

    fn write_page(&self, page: &str, record_json: &str, source: &str) -> PlanwrightResult<()> {
        let io_err = |source| PersistenceError::Io {
            page: page.to_string(),
            source,
        };
        write_atomic(&self.source_path(page), source).map_err(io_err)?;
        write_atomic(&self.record_path(page), record_json).map_err(io_err)?;
        Ok(())
    }

    fn remove_page(&self, page: &str) -> PlanwrightResult<()> {
        let io_err = |source| PersistenceError::Io {
            page: page.to_string(),
            source,
        };
        remove_optional(&self.record_path(page)).map_err(io_err)?;
        remove_optional(&self.source_path(page)).map_err(io_err)?;
        Ok(())
    }

    fn list_pages(&self) -> PlanwrightResult<Vec<String>> {
        Ok(Self::list(&self.pages_dir, RECORD_SUFFIX, false)?)
    }

    fn list_tests(&self) -> PlanwrightResult<Vec<String>> {
        Ok(Self::list(&self.tests_dir, TEST_SUFFIX, true)?)
    }

    fn test_exists(&self, file_name: &str) -> PlanwrightResult<bool> {
        Ok(self.tests_dir.join(file_name).is_file())
    }

    fn read_test(&self, file_name: &str) -> PlanwrightResult<Option<String>> {
        Ok(read_optional(&self.tests_dir.join(file_name))?)
    }

    fn write_test(&self, file_name: &str, contents: &str) -> PlanwrightResult<()> {
        write_atomic(&self.tests_dir.join(file_name), contents)?;
        Ok(())
    }
}

/// In-memory workspace
#[derive(Debug, Default)]
pub struct MemoryWorkspace {
    pages: Mutex<BTreeMap<String, StoredPage>>,
    tests: Mutex<BTreeMap<String, String>>,
}

impl MemoryWorkspace {
    /// Create an empty workspace
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored pages
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.lock().len()
    }

    /// Number of stored tests
    #[must_use]
    pub fn test_count(&self) -> usize {
        self.tests.lock().len()
    }
}

impl Workspace for MemoryWorkspace {
    fn read_page(&self, page: &str) -> PlanwrightResult<Option<StoredPage>> {
        Ok(self.pages.lock().get(page).cloned())
    }

    fn write_page(&self, page: &str, record_json: &str, source: &str) -> PlanwrightResult<()> {
        self.pages.lock().insert(
            page.to_string(),
            StoredPage {
                record_json: record_json.to_string(),
                source: source.to_string(),
            },
        );
        Ok(())
    }

    fn remove_page(&self, page: &str) -> PlanwrightResult<()> {
        self.pages.lock().remove(page);
        Ok(())
    }

    fn list_pages(&self) -> PlanwrightResult<Vec<String>> {
        Ok(self.pages.lock().keys().cloned().collect())
    }

    fn list_tests(&self) -> PlanwrightResult<Vec<String>> {
        Ok(self.tests.lock().keys().cloned().collect())
    }

    fn read_test(&self, file_name: &str) -> PlanwrightResult<Option<String>> {
        Ok(self.tests.lock().get(file_name).cloned())
    }

    fn write_test(&self, file_name: &str, contents: &str) -> PlanwrightResult<()> {
        self.tests
            .lock()
            .insert(file_name.to_string(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod fs_tests {
        use super::*;

        #[test]
        fn test_page_roundtrip() {
            let dir = tempfile::tempdir().unwrap();
            let ws = FsWorkspace::new(dir.path());
            assert!(ws.read_page("LoginPage").unwrap().is_none());

            ws.write_page("LoginPage", "{}", "export class LoginPage {}\n").unwrap();
            let stored = ws.read_page("LoginPage").unwrap().unwrap();
            assert_eq!(stored.record_json, "{}");
            assert!(ws.source_path("LoginPage").is_file());
            assert_eq!(ws.list_pages().unwrap(), vec!["LoginPage"]);

            ws.remove_page("LoginPage").unwrap();
            assert!(ws.read_page("LoginPage").unwrap().is_none());
            assert!(!ws.source_path("LoginPage").exists());
            ws.remove_page("LoginPage").unwrap();
        }

        #[test]
        fn test_missing_source_is_modified() {
            let dir = tempfile::tempdir().unwrap();
            let ws = FsWorkspace::new(dir.path());
            ws.write_page("HomePage", "{}", "x").unwrap();
            fs::remove_file(ws.source_path("HomePage")).unwrap();
            assert!(ws.read_page("HomePage").is_err());
        }

        #[test]
        fn test_tests_listing() {
            let dir = tempfile::tempdir().unwrap();
            let config = GeneratorConfig::new();
            let ws = FsWorkspace::from_config(dir.path(), &config);
            assert!(ws.list_tests().unwrap().is_empty());
            ws.write_test("b.spec.ts", "b").unwrap();
            ws.write_test("a.spec.ts", "a").unwrap();
            fs::write(ws.tests_dir().join("notes.md"), "ignored").unwrap();
            assert_eq!(ws.list_tests().unwrap(), vec!["a.spec.ts", "b.spec.ts"]);
            assert!(ws.test_exists("a.spec.ts").unwrap());
            assert_eq!(ws.read_test("b.spec.ts").unwrap().as_deref(), Some("b"));
            assert!(!ws.tests_dir().join("a.spec.ts.tmp").exists());
        }
    }

    mod memory_tests {
        use super::*;

        #[test]
        fn test_memory_workspace() {
            let ws = MemoryWorkspace::new();
            ws.write_page("HomePage", "{}", "src").unwrap();
            ws.write_test("x.spec.ts", "test").unwrap();
            assert_eq!(ws.page_count(), 1);
            assert!(ws.test_exists("x.spec.ts").unwrap());
            assert!(!ws.test_exists("y.spec.ts").unwrap());
            assert_eq!(ws.list_pages().unwrap(), vec!["HomePage"]);
            ws.remove_page("HomePage").unwrap();
            assert_eq!(ws.page_count(), 0);
        }
    }
}
