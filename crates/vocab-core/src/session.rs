//! Configured registry
//!
//! A [`Session`] opens every database listed in the config file into a
//! [`DatabasesView`] and writes both back on [`Session::save`]. It is the
//! only place that touches the persisted attachment list, so attach,
//! create, detach and delete stay symmetric with the config file.
//!
//! ## Usage
//!
//! ```ignore
//! let mut session = Session::open(None)?;
//! session.create("spanish", None)?;
//! session.view_mut().update("spanish", "cat", &["gato"], None)?;
//! session.save()?;
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

use crate::config::{Config, DatabaseEntry};
use crate::database::Database;
use crate::graph::LinkGraph;
use crate::storage::Codec;
use crate::view::DatabasesView;

/// Configuration plus the registry it describes
pub struct Session {
    config: Config,
    config_path: PathBuf,
    view: DatabasesView,
}

impl Session {
    /// Load the config (from `config_path` or the default location) and open
    /// every attached database
    pub fn open(config_path: Option<&PathBuf>) -> Result<Self> {
        let path = config_path
            .cloned()
            .unwrap_or_else(Config::config_file_path);
        let config = Config::load_from_path(&path).context("Failed to load configuration")?;
        Self::open_with_config(config, path)
    }

    /// Open the databases described by an already loaded config
    pub fn open_with_config(config: Config, config_path: PathBuf) -> Result<Self> {
        let mut databases = Vec::with_capacity(config.databases.len());

        for entry in &config.databases {
            let codec = codec_for(&entry.path, config.codec);
            let database = Database::load(&entry.path, codec).with_context(|| {
                format!(
                    "Failed to load database '{}' from {:?}",
                    entry.alias, entry.path
                )
            })?;

            if database.name() != entry.alias {
                bail!(
                    "Database file {:?} is named '{}' but attached as '{}'",
                    entry.path,
                    database.name(),
                    entry.alias
                );
            }
            databases.push(database);
        }

        let view = DatabasesView::with_databases(config.codec, config.links.clone(), databases)
            .context("Configuration does not describe a consistent set of databases")?;

        debug!(config = ?config_path, databases = view.len(), "Opened session");

        Ok(Self {
            config,
            config_path,
            view,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn view(&self) -> &DatabasesView {
        &self.view
    }

    /// Mutable registry access; call [`Session::save`] afterwards
    pub fn view_mut(&mut self) -> &mut DatabasesView {
        &mut self.view
    }

    /// Attach an existing database file; returns its name
    pub fn attach_file(&mut self, path: &Path) -> Result<String> {
        let codec = codec_for(path, self.config.codec);
        let database = Database::load(path, codec)
            .with_context(|| format!("Failed to load database from {:?}", path))?;
        let name = database.name().to_string();

        self.view
            .attach(database)
            .with_context(|| format!("Failed to attach {:?}", path))?;
        Ok(name)
    }

    /// Create a new empty database, by default inside the data directory
    ///
    /// Refuses to reuse a path that already holds a file.
    pub fn create(&mut self, name: &str, path: Option<PathBuf>) -> Result<PathBuf> {
        let path = path.unwrap_or_else(|| self.config.database_path(name));
        if path.exists() {
            bail!(
                "{:?} already exists. Use `vocab attach` to add an existing database.",
                path
            );
        }

        self.view
            .create(name, path.clone())
            .with_context(|| format!("Failed to create database '{}'", name))?;
        Ok(path)
    }

    /// Detach a database, keeping its file
    pub fn detach(&mut self, name: &str) -> Result<Database> {
        self.view
            .detach(name)
            .with_context(|| format!("Failed to detach '{}'", name))
    }

    /// Detach a database and delete its file
    pub fn delete(&mut self, name: &str) -> Result<()> {
        self.view
            .delete(name)
            .with_context(|| format!("Failed to delete '{}'", name))
    }

    /// Write every attached database, then the config file
    ///
    /// The config file is written even if some databases failed to dump,
    /// so the attachment list never lags behind the registry. A database
    /// whose file still does not exist after a failed dump is left out of
    /// it, together with its links, so the saved config keeps opening.
    /// Settings are taken from the file as written, never from environment
    /// overrides.
    pub fn save(&mut self) -> Result<()> {
        let dumped = self.view.dump();

        let (databases, links) = registry_entries(&self.view, false);
        self.config.databases = databases;
        self.config.links = links;

        let mut persisted =
            Config::load_file(&self.config_path).context("Failed to load configuration")?;
        let (databases, links) = registry_entries(&self.view, dumped.is_err());
        persisted.databases = databases;
        persisted.links = links;
        persisted
            .save_to_path(&self.config_path)
            .context("Failed to save configuration")?;

        dumped.context("Failed to save databases")?;
        debug!(config = ?self.config_path, "Saved session");
        Ok(())
    }
}

/// Attachment list and link map describing the registry
///
/// With `skip_unwritten`, databases without a backing file are dropped
/// along with every link to or from them.
fn registry_entries(
    view: &DatabasesView,
    skip_unwritten: bool,
) -> (Vec<DatabaseEntry>, LinkGraph) {
    let mut links = view.graph().clone();
    let mut databases = Vec::with_capacity(view.len());

    for db in view.databases() {
        if skip_unwritten && !db.path().is_file() {
            warn!(database = %db.name(), path = ?db.path(), "Not recording unwritten database");
            links.prune(db.name());
            continue;
        }
        databases.push(DatabaseEntry {
            alias: db.name().to_string(),
            path: db.path().to_path_buf(),
        });
    }

    (databases, links)
}

/// Codec for an existing file: its extension if recognized, else the configured one
fn codec_for(path: &Path, fallback: Codec) -> Codec {
    Codec::from_path(path).unwrap_or(fallback)
}
