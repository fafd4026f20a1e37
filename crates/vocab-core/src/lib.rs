//! vocab core library
//!
//! This crate provides the storage layer for vocab, a local, file-backed
//! store of vocabulary databases. Each database maps a word to a record of
//! translations, the date it was last touched and a review counter.
//!
//! # Architecture
//!
//! - **Database**: one named word → record map, persisted to one file
//! - **DatabasesView**: registry of attached databases plus the links between them
//! - **Codec**: JSON or CBOR encoding of the `(name, records)` file layout
//!
//! Every mutation happens in memory; nothing reaches the disk until a
//! database (or the whole view) is dumped.
//!
//! # Quick Start
//!
//! ```text
//! let mut view = DatabasesView::new(Codec::Json);
//! view.create("spanish", "/data/spanish.json")?;
//! view.update("spanish", "cat", &["gato"], None)?;
//! view.dump()?;
//! ```
//!
//! # Modules
//!
//! - `record`: the per-word record
//! - `database`: a single file-backed database
//! - `graph`: links between databases
//! - `view`: the registry (attach, detach, delete, merge)
//! - `storage`: codecs and errors
//! - `config`: application configuration
//! - `session`: registry opened from, and saved to, the configuration

pub mod config;
pub mod database;
pub mod graph;
pub mod record;
pub mod session;
pub mod storage;
pub mod view;

pub use config::{Config, DatabaseEntry};
pub use database::Database;
pub use graph::{Link, LinkGraph};
pub use record::Record;
pub use session::Session;
pub use storage::{Codec, ErrorKind, StorageError, StorageResult};
pub use view::{DatabasesView, MergeMode, MergeReport, UpdateParameters};
