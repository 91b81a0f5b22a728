//! Shared, persisted page-object library.
//!
//! The library is the only mutable state shared between concurrently running
//! scenarios. Every page has its own lock, so scenarios touching disjoint
//! pages never wait on each other. Writes are optimistic: the hash of the
//! stored artifacts is captured when a page is loaded and checked again right
//! before it is overwritten, so a concurrent external edit surfaces as
//! [`PersistenceError::StaleWrite`] instead of being clobbered.
//!
//! # Example
//!
//! ```
//! use planwright::prelude::*;
//! use std::sync::Arc;
//!
//! let workspace = Arc::new(MemoryWorkspace::new());
//! let library = ObjectLibrary::new(workspace, &GeneratorConfig::default());
//!
//! let mut tx = library.begin(&["LoginPage".to_string()])?;
//! tx.extend(
//!     "LoginPage",
//!     &[Locator::new("loginButton", Strategy::role("button", "Login"))],
//!     &[],
//! )?;
//! tx.commit()?;
//!
//! let pages = library.resolve(&["LoginPage".to_string()])?;
//! assert!(pages["LoginPage"].locator("loginButton").is_some());
//! # Ok::<(), planwright::PlanwrightError>(())
//! ```

use crate::config::GeneratorConfig;
use crate::locator::Locator;
use crate::page_object::{ActionMethod, MergeOutcome, PageObjectDefinition};
use crate::render;
use crate::result::{PersistenceError, PlanwrightError, PlanwrightResult};
use crate::workspace::{StoredPage, Workspace};
use indexmap::IndexMap;
use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex};
use planwright_ts_gen::FileManifest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Hash recorded for a page that has never been stored
pub const ABSENT: &str = "absent";

/// What `<Page>.pom.json` holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Manifest of the rendered `.ts` source
    pub manifest: FileManifest,
    /// The definition itself
    pub definition: PageObjectDefinition,
}

/// Content hash of a stored page (record and source together)
#[must_use]
pub fn stored_hash(stored: Option<&StoredPage>) -> String {
    stored.map_or_else(
        || ABSENT.to_string(),
        |s| {
            let mut hasher = blake3::Hasher::new();
            hasher.update(s.record_json.as_bytes());
            hasher.update(b"\0");
            hasher.update(s.source.as_bytes());
            hasher.finalize().to_hex().to_string()
        },
    )
}

#[derive(Debug, Default)]
struct PageState {
    definition: Option<PageObjectDefinition>,
    known_hash: String,
    dirty: bool,
}

type Slot = Arc<Mutex<PageState>>;

/// Page-object repository backed by a [`Workspace`]
#[derive(Debug)]
pub struct ObjectLibrary {
    workspace: Arc<dyn Workspace>,
    config: GeneratorConfig,
    slots: Mutex<HashMap<String, Slot>>,
}

impl ObjectLibrary {
    /// Create a library over a workspace
    pub fn new(workspace: Arc<dyn Workspace>, config: &GeneratorConfig) -> Self {
        Self {
            workspace,
            config: config.clone(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// The backing workspace
    #[must_use]
    pub fn workspace(&self) -> &Arc<dyn Workspace> {
        &self.workspace
    }

    fn slot(&self, page: &str) -> Slot {
        Arc::clone(self.slots.lock().entry(page.to_string()).or_default())
    }

    /// Read a page from the workspace, verifying its manifest
    fn load(&self, page: &str) -> PlanwrightResult<(PageObjectDefinition, String)> {
        PageObjectDefinition::validate_name(page)?;
        let Some(stored) = self.workspace.read_page(page)? else {
            let definition =
                PageObjectDefinition::new(page)?.with_route(self.config.route_for(page));
            return Ok((definition, ABSENT.to_string()));
        };
        let corrupt = |message: String| PersistenceError::Corrupt {
            page: page.to_string(),
            message,
        };
        let record: PageRecord =
            serde_json::from_str(&stored.record_json).map_err(|e| corrupt(e.to_string()))?;
        if record.definition.name() != page {
            return Err(corrupt(format!("record describes '{}'", record.definition.name())).into());
        }
        record
            .manifest
            .verify(&stored.source)
            .map_err(|e| PersistenceError::Modified {
                page: page.to_string(),
                message: e.to_string(),
            })?;
        Ok((record.definition, stored_hash(Some(&stored))))
    }

    /// Load `state` unless it already holds unpersisted changes
    fn refresh(&self, page: &str, state: &mut PageState) -> PlanwrightResult<()> {
        if state.dirty && state.definition.is_some() {
            return Ok(());
        }
        let (definition, hash) = self.load(page)?;
        state.definition = Some(definition);
        state.known_hash = hash;
        state.dirty = false;
        Ok(())
    }

    /// Current definitions of `pages`, creating empty ones for unknown pages.
    ///
    /// Stored pages are re-read and their content hash recorded for the
    /// stale-write check.
    pub fn resolve(&self, pages: &[String]) -> PlanwrightResult<IndexMap<String, PageObjectDefinition>> {
        let mut resolved = IndexMap::with_capacity(pages.len());
        for page in pages {
            if resolved.contains_key(page) {
                continue;
            }
            let slot = self.slot(page);
            let mut state = slot.lock();
            self.refresh(page, &mut state)?;
            if let Some(def) = &state.definition {
                debug!(page = %page, hash = %state.known_hash, "resolved page");
                resolved.insert(page.clone(), def.clone());
            }
        }
        Ok(resolved)
    }

    /// In-memory definition of a page, if it was resolved
    #[must_use]
    pub fn get(&self, page: &str) -> Option<PageObjectDefinition> {
        let slot = self.slots.lock().get(page).cloned()?;
        let state = slot.lock();
        state.definition.clone()
    }

    /// Additively merge into a page. Changes stay in memory until
    /// [`persist`](Self::persist).
    pub fn extend(
        &self,
        page: &str,
        locators: &[Locator],
        methods: &[ActionMethod],
    ) -> PlanwrightResult<PageObjectDefinition> {
        let slot = self.slot(page);
        let mut state = slot.lock();
        if state.definition.is_none() {
            self.refresh(page, &mut state)?;
        }
        let PageState {
            definition, dirty, ..
        } = &mut *state;
        let definition = definition
            .as_mut()
            .ok_or_else(|| PlanwrightError::invalid_state(format!("{page} is not loaded")))?;
        let outcome = definition.extend(locators, methods)?;
        if !outcome.is_empty() {
            *dirty = true;
            debug!(page = %page, locators = ?outcome.added_locators, methods = ?outcome.added_methods, "extended page");
        }
        Ok(definition.clone())
    }

    /// Write every page changed by [`extend`](Self::extend), stale-checked.
    /// Returns the names of the pages written.
    pub fn persist(&self) -> PlanwrightResult<Vec<String>> {
        let mut slots: Vec<(String, Slot)> = self
            .slots
            .lock()
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        slots.sort_by(|a, b| a.0.cmp(&b.0));

        let mut written = Vec::new();
        for (page, slot) in slots {
            let mut state = slot.lock();
            if !state.dirty {
                continue;
            }
            let Some(definition) = state.definition.clone() else {
                continue;
            };
            self.check_fresh(&page, &state.known_hash)?;
            state.known_hash = self.write(&definition)?;
            state.dirty = false;
            written.push(page);
        }
        Ok(written)
    }

    /// Lock `pages` (in sorted order) and stage copies for a merge-then-commit
    /// sequence.
    ///
    /// Pages already resolved are staged from memory, so the stale check at
    /// commit compares against the hash captured by [`resolve`](Self::resolve).
    pub fn begin(&self, pages: &[String]) -> PlanwrightResult<LibraryTransaction<'_>> {
        let mut names: Vec<&String> = pages.iter().collect();
        names.sort();
        names.dedup();

        let mut entries = Vec::with_capacity(names.len());
        for page in names {
            let mut guard = self.slot(page).lock_arc();
            if guard.definition.is_none() {
                self.refresh(page, &mut guard)?;
            }
            let staged = guard
                .definition
                .clone()
                .ok_or_else(|| PlanwrightError::invalid_state(format!("{page} is not loaded")))?;
            entries.push(Staged {
                page: page.clone(),
                guard,
                staged,
            });
        }
        Ok(LibraryTransaction {
            library: self,
            entries,
        })
    }

    /// Load every stored page
    pub fn discover(&self) -> PlanwrightResult<Vec<PageObjectDefinition>> {
        let pages = self.workspace.list_pages()?;
        Ok(self.resolve(&pages)?.into_values().collect())
    }

    fn check_fresh(&self, page: &str, expected: &str) -> PlanwrightResult<()> {
        let found = stored_hash(self.workspace.read_page(page)?.as_ref());
        if found != expected {
            return Err(PersistenceError::StaleWrite {
                page: page.to_string(),
                expected: expected.to_string(),
                found,
            }
            .into());
        }
        Ok(())
    }

    /// Put pages back as they were stored; `None` means never stored
    fn restore(&self, backups: &[(String, Option<StoredPage>)]) {
        for (page, backup) in backups {
            let result = match backup {
                Some(stored) => self.workspace.write_page(page, &stored.record_json, &stored.source),
                None => self.workspace.remove_page(page),
            };
            match result {
                Ok(()) => debug!(page = %page, "rolled back page"),
                Err(e) => warn!(page = %page, error = %e, "rollback failed"),
            }
        }
    }

    /// Render and store a definition, returning the new stored hash
    fn write(&self, definition: &PageObjectDefinition) -> PlanwrightResult<String> {
        let page = definition.name();
        let source = render::render_page(definition)?;
        let record = PageRecord {
            manifest: FileManifest::for_contents(format!("{page}.ts"), &source, render::metadata(Vec::new())),
            definition: definition.clone(),
        };
        let record_json = serde_json::to_string_pretty(&record)?;
        self.workspace.write_page(page, &record_json, &source)?;
        info!(page = %page, locators = definition.locator_count(), methods = definition.method_count(), "persisted page");
        Ok(stored_hash(Some(&StoredPage {
            record_json,
            source,
        })))
    }
}

struct Staged {
    page: String,
    guard: ArcMutexGuard<RawMutex, PageState>,
    staged: PageObjectDefinition,
}

/// Locked, staged view of some pages.
///
/// Dropping the transaction without [`commit`](Self::commit) discards every
/// staged change and releases the locks.
pub struct LibraryTransaction<'a> {
    library: &'a ObjectLibrary,
    entries: Vec<Staged>,
}

impl std::fmt::Debug for LibraryTransaction<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LibraryTransaction")
            .field("pages", &self.pages().collect::<Vec<_>>())
            .finish()
    }
}

impl LibraryTransaction<'_> {
    /// Locked pages, sorted
    pub fn pages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.page.as_str())
    }

    /// Staged definition of a locked page
    #[must_use]
    pub fn definition(&self, page: &str) -> Option<&PageObjectDefinition> {
        self.entries.iter().find(|e| e.page == page).map(|e| &e.staged)
    }

    /// Staged definitions of every locked page
    #[must_use]
    pub fn definitions(&self) -> IndexMap<String, PageObjectDefinition> {
        self.entries
            .iter()
            .map(|e| (e.page.clone(), e.staged.clone()))
            .collect()
    }

    /// Merge into a staged definition
    pub fn extend(
        &mut self,
        page: &str,
        locators: &[Locator],
        methods: &[ActionMethod],
    ) -> PlanwrightResult<MergeOutcome> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.page == page)
            .ok_or_else(|| PlanwrightError::invalid_state(format!("{page} is not part of this transaction")))?;
        let outcome = entry.staged.extend(locators, methods)?;
        debug!(page = %page, locators = ?outcome.added_locators, methods = ?outcome.added_methods, "staged extension");
        Ok(outcome)
    }

    /// Persist every changed page and publish it to the library.
    ///
    /// All stale checks run before the first write. Returns the names of the
    /// pages written.
    pub fn commit(self) -> PlanwrightResult<Vec<String>> {
        self.commit_with(|| Ok(()))
    }

    /// [`commit`](Self::commit), then run `publish` while the pages are still
    /// locked. If a page write or `publish` fails, every page already written
    /// is put back as it was stored before, and the library keeps its old
    /// definitions.
    pub fn commit_with(
        mut self,
        publish: impl FnOnce() -> PlanwrightResult<()>,
    ) -> PlanwrightResult<Vec<String>> {
        let changed: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.guard.dirty || e.guard.definition.as_ref() != Some(&e.staged))
            .map(|(i, _)| i)
            .collect();

        for &i in &changed {
            let entry = &self.entries[i];
            self.library.check_fresh(&entry.page, &entry.guard.known_hash)?;
        }

        let mut backups = Vec::with_capacity(changed.len());
        for &i in &changed {
            let page = &self.entries[i].page;
            backups.push((page.clone(), self.library.workspace.read_page(page)?));
        }

        let mut hashes = Vec::with_capacity(changed.len());
        for &i in &changed {
            match self.library.write(&self.entries[i].staged) {
                Ok(hash) => hashes.push(hash),
                Err(e) => {
                    self.library.restore(&backups[..=hashes.len()]);
                    return Err(e);
                }
            }
        }
        if let Err(e) = publish() {
            self.library.restore(&backups);
            return Err(e);
        }

        let mut written = Vec::with_capacity(changed.len());
        for (i, hash) in changed.into_iter().zip(hashes) {
            let entry = &mut self.entries[i];
            entry.guard.definition = Some(entry.staged.clone());
            entry.guard.known_hash = hash;
            entry.guard.dirty = false;
            written.push(entry.page.clone());
        }
        Ok(written)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::locator::Strategy;
    use crate::page_object::EntryKind;
    use crate::workspace::{FsWorkspace, MemoryWorkspace};

    fn library() -> (Arc<MemoryWorkspace>, ObjectLibrary) {
        let ws = Arc::new(MemoryWorkspace::new());
        let lib = ObjectLibrary::new(ws.clone(), &GeneratorConfig::default());
        (ws, lib)
    }

    fn pages(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_string()).collect()
    }

    fn button(name: &str) -> Locator {
        Locator::new(name, Strategy::role("button", "Login"))
    }

    mod resolve_tests {
        use super::*;

        #[test]
        fn test_unknown_page_is_empty_with_route() {
            let (_, lib) = library();
            let resolved = lib.resolve(&pages(&["UserSettingsPage"])).unwrap();
            let def = &resolved["UserSettingsPage"];
            assert!(def.is_empty());
            assert_eq!(def.route(), Some("/user-settings"));
        }

        #[test]
        fn test_invalid_page_name() {
            let (_, lib) = library();
            assert!(lib.resolve(&pages(&["login"])).is_err());
        }

        #[test]
        fn test_hand_edit_is_detected() {
            let (ws, lib) = library();
            lib.extend("LoginPage", &[button("loginButton")], &[]).unwrap();
            lib.persist().unwrap();

            let stored = ws.read_page("LoginPage").unwrap().unwrap();
            ws.write_page("LoginPage", &stored.record_json, "// edited\n").unwrap();
            let err = lib.resolve(&pages(&["LoginPage"])).unwrap_err();
            assert!(matches!(
                err,
                PlanwrightError::Persistence(PersistenceError::Modified { .. })
            ));
        }

        #[test]
        fn test_corrupt_record() {
            let (ws, lib) = library();
            ws.write_page("LoginPage", "not json", "").unwrap();
            assert!(matches!(
                lib.resolve(&pages(&["LoginPage"])),
                Err(PlanwrightError::Persistence(PersistenceError::Corrupt { .. }))
            ));
        }
    }

    mod persist_tests {
        use super::*;

        #[test]
        fn test_persist_writes_dirty_pages_only() {
            let (ws, lib) = library();
            lib.resolve(&pages(&["HomePage", "LoginPage"])).unwrap();
            lib.extend("LoginPage", &[button("loginButton")], &[]).unwrap();
            assert_eq!(lib.persist().unwrap(), vec!["LoginPage"]);
            assert_eq!(ws.page_count(), 1);
            assert!(lib.persist().unwrap().is_empty());
        }

        #[test]
        fn test_stale_write_is_rejected() {
            let (ws, lib) = library();
            lib.resolve(&pages(&["LoginPage"])).unwrap();
            ws.write_page("LoginPage", "{}", "external").unwrap();

            lib.extend("LoginPage", &[button("loginButton")], &[]).unwrap();
            match lib.persist().unwrap_err() {
                PlanwrightError::Persistence(PersistenceError::StaleWrite { page, expected, .. }) => {
                    assert_eq!(page, "LoginPage");
                    assert_eq!(expected, ABSENT);
                }
                other => panic!("unexpected {other:?}"),
            }
            assert_eq!(ws.read_page("LoginPage").unwrap().unwrap().source, "external");
        }

        #[test]
        fn test_roundtrip_through_files() {
            let dir = tempfile::tempdir().unwrap();
            let ws: Arc<dyn Workspace> = Arc::new(FsWorkspace::new(dir.path()));
            let lib = ObjectLibrary::new(Arc::clone(&ws), &GeneratorConfig::default());
            lib.extend("LoginPage", &[button("loginButton")], &[]).unwrap();
            lib.persist().unwrap();

            let fresh = ObjectLibrary::new(ws, &GeneratorConfig::default());
            let found = fresh.discover().unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].locator("loginButton"), Some(&button("loginButton")));
            assert!(dir.path().join("pages/LoginPage.ts").is_file());
        }
    }

    mod transaction_tests {
        use super::*;

        #[test]
        fn test_dropped_transaction_discards() {
            let (ws, lib) = library();
            {
                let mut tx = lib.begin(&pages(&["LoginPage"])).unwrap();
                tx.extend("LoginPage", &[button("loginButton")], &[]).unwrap();
                assert_eq!(tx.definition("LoginPage").unwrap().locator_count(), 1);
            }
            assert_eq!(ws.page_count(), 0);
            assert_eq!(lib.get("LoginPage").unwrap().locator_count(), 0);
        }

        #[test]
        fn test_commit_publishes_and_conflicts_later() {
            let (_, lib) = library();
            let mut tx = lib.begin(&pages(&["LoginPage", "HomePage"])).unwrap();
            assert_eq!(tx.pages().collect::<Vec<_>>(), vec!["HomePage", "LoginPage"]);
            tx.extend("LoginPage", &[button("loginButton")], &[]).unwrap();
            assert_eq!(tx.commit().unwrap(), vec!["LoginPage"]);

            let mut tx = lib.begin(&pages(&["LoginPage"])).unwrap();
            let changed = Locator::new("loginButton", Strategy::text("Sign in"));
            let err = tx.extend("LoginPage", &[changed], &[]).unwrap_err();
            assert!(matches!(
                err,
                PlanwrightError::Conflict {
                    entry: EntryKind::Locator,
                    ..
                }
            ));
        }

        #[test]
        fn test_failed_publish_rolls_pages_back() {
            let (ws, lib) = library();
            let mut tx = lib.begin(&pages(&["LoginPage"])).unwrap();
            tx.extend("LoginPage", &[button("loginButton")], &[]).unwrap();
            tx.commit().unwrap();
            let stored = ws.read_page("LoginPage").unwrap();

            let help = Locator::new("helpLink", Strategy::role("link", "Help"));
            let mut tx = lib.begin(&pages(&["HomePage", "LoginPage"])).unwrap();
            tx.extend("LoginPage", &[help.clone()], &[]).unwrap();
            tx.extend("HomePage", &[button("startButton")], &[]).unwrap();
            let err = tx
                .commit_with(|| Err(PlanwrightError::invalid_state("test file rejected")))
                .unwrap_err();
            assert!(matches!(err, PlanwrightError::InvalidState { .. }));
            assert_eq!(ws.read_page("LoginPage").unwrap(), stored);
            assert!(ws.read_page("HomePage").unwrap().is_none());
            assert_eq!(lib.get("LoginPage").unwrap().locator_count(), 1);

            let mut tx = lib.begin(&pages(&["LoginPage"])).unwrap();
            tx.extend("LoginPage", &[help], &[]).unwrap();
            assert_eq!(tx.commit().unwrap(), vec!["LoginPage"]);
        }

        #[test]
        fn test_unlocked_page_is_rejected() {
            let (_, lib) = library();
            let mut tx = lib.begin(&pages(&["LoginPage"])).unwrap();
            assert!(matches!(
                tx.extend("HomePage", &[], &[]),
                Err(PlanwrightError::InvalidState { .. })
            ));
        }

        #[test]
        fn test_concurrent_transactions_serialize_per_page() {
            let (ws, lib) = library();
            let lib = Arc::new(lib);
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let lib = Arc::clone(&lib);
                    std::thread::spawn(move || {
                        let mut tx = lib.begin(&pages(&["SharedPage"])).unwrap();
                        let loc = Locator::new(format!("item{i}"), Strategy::test_id(format!("item-{i}")));
                        tx.extend("SharedPage", &[loc], &[]).unwrap();
                        tx.commit().unwrap();
                    })
                })
                .collect();
            for h in handles {
                h.join().unwrap();
            }
            let stored: PageRecord =
                serde_json::from_str(&ws.read_page("SharedPage").unwrap().unwrap().record_json).unwrap();
            assert_eq!(stored.definition.locator_count(), 8);
        }
    }
}
