use crate::ast::{ConfigDocument, Node};
use crate::error::ConfigError;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Name used in error reports when the store was not given one.
pub const DEFAULT_SOURCE_NAME: &str = "placeholder.json";

/// Coarse state of the store. Only `Loaded` makes lookups possible.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ConfigStatus {
    Loaded,
    /// Never loaded, or the file was deleted.
    Absent,
    /// The last reload failed to parse. Behaves exactly like `Absent`.
    Malformed,
}

#[derive(Debug)]
enum Snapshot {
    Loaded(Arc<ConfigDocument>),
    Absent,
    Malformed,
}

/// Handle for a reload whose result is committed later.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct ReloadTicket {
    generation: u64,
}

#[derive(Debug, Clone)]
pub enum CommitOutcome {
    Applied(Arc<ConfigDocument>),
    /// A newer reload or delete was requested after this ticket was issued;
    /// the store was left untouched.
    Superseded,
}

/// Owns the current configuration snapshot.
///
/// Every mutation swaps the whole snapshot. Readers clone the `Arc` once and
/// keep a consistent view even if a reload lands while they work.
#[derive(Debug)]
pub struct ConfigStore {
    name: String,
    snapshot: RwLock<Snapshot>,
    generation: AtomicU64,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(DEFAULT_SOURCE_NAME)
    }
}

/// Parses configuration bytes into a document.
pub fn parse_document(name: &str, source: &[u8]) -> Result<ConfigDocument, ConfigError> {
    let value: serde_json::Value =
        serde_json::from_slice(source).map_err(|err| ConfigError::malformed(name, source, &err))?;
    Ok(ConfigDocument::new(Node::from(value)))
}

impl ConfigStore {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            snapshot: RwLock::new(Snapshot::Absent),
            generation: AtomicU64::new(0),
        }
    }

    /// Parses `source` and replaces the current snapshot with the result.
    ///
    /// On a syntax error the store becomes `Malformed`: the previous snapshot
    /// is dropped, never served as a fallback.
    ///
    /// # Errors
    /// Returns `ConfigError::Malformed` if `source` is not a JSON document.
    pub fn reload(&self, source: &[u8]) -> Result<Arc<ConfigDocument>, ConfigError> {
        let parsed = parse_document(&self.name, source);
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        // A synchronous reload is the newest request; outstanding tickets lose.
        self.generation.fetch_add(1, Ordering::SeqCst);
        Self::apply(&mut snapshot, parsed)
    }

    /// Starts a reload whose result will be committed with [`ConfigStore::commit`].
    pub fn begin_reload(&self) -> ReloadTicket {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("reload {generation} started");
        ReloadTicket { generation }
    }

    /// Commits the result of a reload started with [`ConfigStore::begin_reload`].
    /// Only the most recently issued ticket may change the store.
    ///
    /// # Errors
    /// Returns `ConfigError::Malformed` if the ticket is current and `source`
    /// does not parse; the store is then `Malformed`.
    pub fn commit(&self, ticket: ReloadTicket, source: &[u8]) -> Result<CommitOutcome, ConfigError> {
        if !self.is_current(ticket) {
            debug!("reload {} superseded before parsing", ticket.generation);
            return Ok(CommitOutcome::Superseded);
        }
        let parsed = parse_document(&self.name, source);
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        if !self.is_current(ticket) {
            debug!("reload {} superseded before commit", ticket.generation);
            return Ok(CommitOutcome::Superseded);
        }
        Self::apply(&mut snapshot, parsed).map(CommitOutcome::Applied)
    }

    /// Clears the snapshot on behalf of a ticketed reload that found no usable
    /// file. Returns `false` and leaves the store untouched if the ticket was
    /// superseded.
    pub fn commit_absent(&self, ticket: ReloadTicket) -> bool {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        if !self.is_current(ticket) {
            debug!("reload {} superseded before clearing", ticket.generation);
            return false;
        }
        *snapshot = Snapshot::Absent;
        true
    }

    fn is_current(&self, ticket: ReloadTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.generation
    }

    fn apply(
        snapshot: &mut Snapshot,
        parsed: Result<ConfigDocument, ConfigError>,
    ) -> Result<Arc<ConfigDocument>, ConfigError> {
        match parsed {
            Ok(document) => {
                let document = Arc::new(document);
                *snapshot = Snapshot::Loaded(Arc::clone(&document));
                info!("placeholder configuration loaded");
                Ok(document)
            }
            Err(err) => {
                *snapshot = Snapshot::Malformed;
                warn!("placeholder configuration rejected: {err}");
                Err(err)
            }
        }
    }

    /// The current snapshot, or `None` when no lookups are possible.
    pub fn current(&self) -> Option<Arc<ConfigDocument>> {
        match &*self.snapshot.read().unwrap_or_else(PoisonError::into_inner) {
            Snapshot::Loaded(document) => Some(Arc::clone(document)),
            Snapshot::Absent | Snapshot::Malformed => None,
        }
    }

    pub fn status(&self) -> ConfigStatus {
        match &*self.snapshot.read().unwrap_or_else(PoisonError::into_inner) {
            Snapshot::Loaded(_) => ConfigStatus::Loaded,
            Snapshot::Absent => ConfigStatus::Absent,
            Snapshot::Malformed => ConfigStatus::Malformed,
        }
    }

    /// Drops the snapshot. Idempotent; also cancels in-flight reloads.
    pub fn on_delete(&self) {
        let mut snapshot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        self.generation.fetch_add(1, Ordering::SeqCst);
        if !matches!(*snapshot, Snapshot::Absent) {
            info!("placeholder configuration cleared");
        }
        *snapshot = Snapshot::Absent;
    }

    /// Configured file-name suffixes; empty when nothing is loaded.
    pub fn suffixes(&self) -> Vec<String> {
        self.current().map(|doc| doc.suffixes()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &[u8] = br#"{"placeholder":{"data":{"x":{"y":1}},"suffixes":[".txt"]}}"#;

    #[test]
    fn test_starts_absent() {
        let store = ConfigStore::default();
        assert!(store.current().is_none());
        assert_eq!(store.status(), ConfigStatus::Absent);
        assert!(store.suffixes().is_empty());
    }

    #[test]
    fn test_reload_replaces_snapshot() {
        let store = ConfigStore::default();
        let first = store.reload(CONFIG).unwrap();
        let second = store
            .reload(br#"{"placeholder":{"data":{},"suffixes":[".md"]}}"#)
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(store.suffixes(), vec![".md"]);
        // A reader holding the old snapshot still sees it in full.
        assert_eq!(first.suffixes(), vec![".txt"]);
    }

    #[test]
    fn test_malformed_drops_previous_snapshot() {
        let store = ConfigStore::default();
        store.reload(CONFIG).unwrap();
        let err = store.reload(b"{ not json").unwrap_err();
        assert!(err.is_malformed());
        assert!(store.current().is_none());
        assert_eq!(store.status(), ConfigStatus::Malformed);
    }

    #[test]
    fn test_on_delete_is_idempotent() {
        let store = ConfigStore::default();
        store.reload(CONFIG).unwrap();
        store.on_delete();
        store.on_delete();
        assert_eq!(store.status(), ConfigStatus::Absent);
        assert!(store.current().is_none());
    }

    #[test]
    fn test_stale_ticket_is_not_committed() {
        let store = ConfigStore::default();
        let old = store.begin_reload();
        let new = store.begin_reload();
        assert!(matches!(
            store.commit(old, CONFIG).unwrap(),
            CommitOutcome::Superseded
        ));
        assert!(store.current().is_none());
        assert!(matches!(
            store.commit(new, CONFIG).unwrap(),
            CommitOutcome::Applied(_)
        ));
        assert_eq!(store.status(), ConfigStatus::Loaded);
    }

    #[test]
    fn test_stale_malformed_commit_is_ignored() {
        let store = ConfigStore::default();
        store.reload(CONFIG).unwrap();
        let ticket = store.begin_reload();
        store.reload(CONFIG).unwrap();
        assert!(matches!(
            store.commit(ticket, b"garbage").unwrap(),
            CommitOutcome::Superseded
        ));
        assert_eq!(store.status(), ConfigStatus::Loaded);
    }

    #[test]
    fn test_commit_absent_respects_newer_reload() {
        let store = ConfigStore::default();
        let old = store.begin_reload();
        let new = store.begin_reload();
        store.commit(new, CONFIG).unwrap();
        assert!(!store.commit_absent(old));
        assert_eq!(store.status(), ConfigStatus::Loaded);

        let current = store.begin_reload();
        assert!(store.commit_absent(current));
        assert_eq!(store.status(), ConfigStatus::Absent);
    }

    #[test]
    fn test_delete_cancels_pending_reload() {
        let store = ConfigStore::default();
        let ticket = store.begin_reload();
        store.on_delete();
        assert!(matches!(
            store.commit(ticket, CONFIG).unwrap(),
            CommitOutcome::Superseded
        ));
        assert!(store.current().is_none());
    }

    #[test]
    fn test_malformed_error_points_at_failure() {
        let err = parse_document("cfg.json", b"{\n  \"a\": ,\n}").unwrap_err();
        match err {
            // Line 2 spans offsets 2..11.
            ConfigError::Malformed { span, .. } => {
                assert!((2..=11).contains(&span.offset()), "offset {}", span.offset());
            }
            other => panic!("expected malformed error, got {other:?}"),
        }
    }
}
