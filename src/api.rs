use crate::ast::{ConfigDocument, Node};
use crate::error::ConfigError;
use crate::host::{FileEvent, FileEventKind, FileSystem, LogNotifier, Notification, Notifier, StdFileSystem};
use crate::lsp::{CompletionItem, PlaceholderDiagnostic};
use crate::parser::{occurrence_at, prefix_at, Scanner};
use crate::resolver::{resolve, Resolution};
use crate::serialization::render;
use crate::store::{CommitOutcome, ConfigStore};
use crate::utils::normalize_path;
use log::debug;
use miette::Severity;
use std::path::PathBuf;
use std::sync::Arc;

/// Where the engine finds its configuration.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    pub config_path: PathBuf,
}

impl EngineOptions {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }
}

/// Answers completion, diagnostic and hover queries for placeholders.
///
/// Each query takes one snapshot of the configuration at entry and uses it
/// throughout, so a reload landing mid-query is never observed half-way.
pub struct Engine {
    options: EngineOptions,
    store: ConfigStore,
    fs: Arc<dyn FileSystem>,
    notifier: Arc<dyn Notifier>,
}

impl Engine {
    pub fn new(options: EngineOptions, fs: Arc<dyn FileSystem>, notifier: Arc<dyn Notifier>) -> Self {
        let store = ConfigStore::new(options.config_path.to_string_lossy());
        Self {
            options,
            store,
            fs,
            notifier,
        }
    }

    /// An engine reading from the local disk and notifying through `log`.
    pub fn with_defaults(options: EngineOptions) -> Self {
        Self::new(options, Arc::new(StdFileSystem), Arc::new(LogNotifier))
    }

    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    #[must_use]
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Loads the configuration if the file exists. A missing file is not an
    /// error here: the engine simply stays idle until the file appears.
    ///
    /// # Errors
    /// Returns the load error if the file exists but cannot be read or parsed.
    pub fn initialize(&self) -> Result<(), ConfigError> {
        match self.reload_config() {
            Ok(_) | Err(ConfigError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Re-reads the configuration file and replaces the snapshot.
    ///
    /// The reload takes a ticket before touching the file system, so when
    /// reloads overlap only the most recently started one changes the store.
    /// A superseded reload returns `Ok(CommitOutcome::Superseded)` and raises
    /// no notification; otherwise exactly one is raised: success, not found,
    /// or failure.
    ///
    /// # Errors
    /// `NotFound` if the file is missing, `Io` if it cannot be read,
    /// `Malformed` if it does not parse. The store is left without a
    /// configuration in all three cases.
    pub fn reload_config(&self) -> Result<CommitOutcome, ConfigError> {
        let path = &self.options.config_path;
        let display = path.display().to_string();
        let ticket = self.store.begin_reload();

        if !self.fs.exists(path) {
            if !self.store.commit_absent(ticket) {
                return Ok(CommitOutcome::Superseded);
            }
            let err = ConfigError::NotFound { path: display };
            self.notifier.notify(Notification::info(err.to_string()));
            return Err(err);
        }

        let source = match self.fs.read(path) {
            Ok(source) => source,
            Err(io_err) => {
                if !self.store.commit_absent(ticket) {
                    return Ok(CommitOutcome::Superseded);
                }
                let err = ConfigError::Io {
                    path: display,
                    reason: io_err.to_string(),
                };
                self.notifier.notify(Notification::error(err.to_string()));
                return Err(err);
            }
        };

        match self.store.commit(ticket, &source) {
            Ok(CommitOutcome::Superseded) => {
                debug!("reload of {display} superseded by a newer one");
                Ok(CommitOutcome::Superseded)
            }
            Ok(applied) => {
                self.notifier
                    .notify(Notification::info(format!("Placeholder configuration {display} loaded")));
                Ok(applied)
            }
            Err(err) => {
                self.notifier.notify(Notification::error(err.to_string()));
                Err(err)
            }
        }
    }

    /// Reacts to a file watcher event. Events for other files are ignored.
    ///
    /// Paths are compared after lexical normalization (`.` dropped, `..`
    /// folded); the comparison stays case-sensitive and does not follow
    /// symlinks, so the host must report the path the engine was configured with.
    pub fn on_config_file_changed(&self, event: &FileEvent) {
        if normalize_path(&event.path) != normalize_path(&self.options.config_path) {
            debug!("ignoring {:?} event for {}", event.kind, event.path.display());
            return;
        }
        match event.kind {
            FileEventKind::Created | FileEventKind::Changed => {
                if let Err(err) = self.reload_config() {
                    debug!("reload after {:?} event failed: {err}", event.kind);
                }
            }
            FileEventKind::Deleted => {
                self.store.on_delete();
                self.notifier.notify(Notification::warning(format!(
                    "Placeholder configuration {} deleted",
                    event.path.display()
                )));
            }
        }
    }

    /// Recomputes diagnostics for a document whose text changed.
    pub fn on_text_changed(&self, document_name: &str, text: &str) -> Vec<PlaceholderDiagnostic> {
        self.diagnostics(document_name, text)
    }

    /// Child keys of the path typed so far, for a placeholder ending at `caret`.
    pub fn completion(&self, text: &str, caret: usize) -> Vec<String> {
        match self.store.current() {
            Some(snapshot) => complete(&snapshot, text, caret)
                .map(|node| node.keys().map(str::to_string).collect())
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Like [`Engine::completion`], with each child's value rendered as detail.
    pub fn completion_items(&self, text: &str, caret: usize) -> Vec<CompletionItem> {
        let Some(snapshot) = self.store.current() else {
            return Vec::new();
        };
        match complete(&snapshot, text, caret) {
            Some(Node::Object(pairs)) => pairs
                .iter()
                .map(|pair| CompletionItem {
                    label: pair.key.clone(),
                    detail: render(&pair.value),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// One error per placeholder that does not resolve, in text order.
    /// Empty when no configuration is loaded or the document's name does not
    /// end with a configured suffix.
    pub fn diagnostics(&self, document_name: &str, text: &str) -> Vec<PlaceholderDiagnostic> {
        let Some(snapshot) = self.store.current() else {
            return Vec::new();
        };
        if !snapshot.applies_to(document_name) {
            return Vec::new();
        }
        let data = snapshot.data();
        Scanner::new(text)
            .filter_map(|occurrence| match resolve(data, occurrence.lookup_path()) {
                Resolution::Resolved(_) => None,
                broken @ Resolution::Broken { segment, .. } => Some(PlaceholderDiagnostic {
                    span: occurrence.span(),
                    key: segment.to_string(),
                    message: broken.failure_message().unwrap_or_default(),
                    severity: Severity::Error,
                }),
            })
            .collect()
    }

    /// Compact rendering of the value behind the placeholder at `position`.
    /// A broken path renders as its diagnostic message.
    pub fn hover(&self, text: &str, position: usize) -> Option<String> {
        let snapshot = self.store.current()?;
        let occurrence = occurrence_at(text, position)?;
        let resolution = resolve(snapshot.data(), occurrence.lookup_path());
        match resolution.value() {
            Some(node) => Some(render(node)),
            None => resolution.failure_message(),
        }
    }
}

/// Resolves the completed part of the placeholder prefix ending at `caret`.
/// Only key maps can offer completions.
fn complete<'a>(snapshot: &'a ConfigDocument, text: &str, caret: usize) -> Option<&'a Node> {
    let prefix = prefix_at(text, caret)?;
    let node = resolve(snapshot.data(), prefix.parent_path()).value()?;
    matches!(node, Node::Object(_)).then_some(node)
}
