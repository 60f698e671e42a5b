pub mod api;
pub mod ast;
pub mod error;
pub mod host;
pub mod lsp;
pub mod parser;
pub mod resolver;
pub mod serialization;
pub mod store;
pub mod utils;

pub use api::{Engine, EngineOptions};
pub use ast::{ConfigDocument, Node, Pair};
pub use error::{ConfigError, KeyNotFound};
pub use parser::{occurrence_at, prefix_at, scan_all, PlaceholderOccurrence, PlaceholderPrefix};
pub use resolver::{resolve, Resolution};
pub use store::{ConfigStatus, ConfigStore};
