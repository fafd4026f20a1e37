//! Registry of attached databases
//!
//! [`DatabasesView`] owns every attached [`Database`] plus the
//! [`LinkGraph`] between them. It guarantees two things:
//!
//! - database names are unique
//! - the link graph never mentions a database that is not attached
//!
//! Single-database mutations are delegated to [`Database`]; errors coming
//! from there are returned unchanged.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::{debug, info, warn};

use crate::database::{validate_name, Database};
use crate::graph::{Link, LinkGraph};
use crate::record::Record;
use crate::storage::{Codec, FlushFailure, StorageError, StorageResult};

/// Extra options for [`DatabasesView::update`]; reserved, none are supported yet
pub type UpdateParameters = BTreeMap<String, String>;

/// Conflict policy when folding one database into another
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// Source records replace target records wholesale
    Override,
    /// Union of contents, later date, summed repeat counts
    Extend,
}

impl FromStr for MergeMode {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "override" => Ok(MergeMode::Override),
            "extend" => Ok(MergeMode::Extend),
            other => Err(StorageError::InvalidArgument(format!(
                "unknown merge mode '{}' (expected override or extend)",
                other
            ))),
        }
    }
}

impl fmt::Display for MergeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MergeMode::Override => f.write_str("override"),
            MergeMode::Extend => f.write_str("extend"),
        }
    }
}

/// What a merge did to the target database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Words that already existed in the target
    pub updated: usize,
    /// Words that were new to the target
    pub created: usize,
}

/// In-memory owner of all attached databases and their links
#[derive(Debug)]
pub struct DatabasesView {
    codec: Codec,
    databases: BTreeMap<String, Database>,
    graph: LinkGraph,
}

impl DatabasesView {
    /// Create an empty registry; `codec` is used for databases made by [`Self::create`]
    pub fn new(codec: Codec) -> Self {
        Self {
            codec,
            databases: BTreeMap::new(),
            graph: LinkGraph::new(),
        }
    }

    /// Build a registry from pre-loaded databases and an initial link map
    ///
    /// Fails if two databases share a name or a link mentions a database
    /// that is not in `databases`.
    pub fn with_databases(
        codec: Codec,
        links: LinkGraph,
        databases: impl IntoIterator<Item = Database>,
    ) -> StorageResult<Self> {
        let mut view = Self::new(codec);
        for database in databases {
            view.attach(database)?;
        }

        if let Some(missing) = links.names().find(|name| !view.contains(name)) {
            return Err(StorageError::DatabaseNotFound(missing.to_string()));
        }
        view.graph = links;

        Ok(view)
    }

    pub fn codec(&self) -> Codec {
        self.codec
    }

    // ==================== Lookup ====================

    /// Names of all attached databases, sorted
    pub fn db_names(&self) -> Vec<String> {
        self.databases.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.databases.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.databases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    pub fn database(&self, name: &str) -> StorageResult<&Database> {
        self.databases
            .get(name)
            .ok_or_else(|| StorageError::DatabaseNotFound(name.to_string()))
    }

    pub fn database_mut(&mut self, name: &str) -> StorageResult<&mut Database> {
        self.databases
            .get_mut(name)
            .ok_or_else(|| StorageError::DatabaseNotFound(name.to_string()))
    }

    /// Iterate over attached databases in name order
    pub fn databases(&self) -> impl Iterator<Item = &Database> {
        self.databases.values()
    }

    pub fn graph(&self) -> &LinkGraph {
        &self.graph
    }

    /// Outgoing links of an attached database
    pub fn links(&self, name: &str) -> StorageResult<&[Link]> {
        self.ensure_attached(name)?;
        Ok(self.graph.links(name))
    }

    // ==================== Records ====================

    /// Add each value to `key` in order, stopping at the first failure
    ///
    /// Values added before the failure stay applied. If at least one value
    /// went in, the error is a [`StorageError::PartialUpdate`] listing them;
    /// its kind is the kind of the failed add.
    pub fn update<S: AsRef<str>>(
        &mut self,
        db_name: &str,
        key: &str,
        values: &[S],
        parameters: Option<&UpdateParameters>,
    ) -> StorageResult<()> {
        if parameters.is_some() {
            return Err(StorageError::NotImplemented(
                "update parameters are not supported".to_string(),
            ));
        }

        let database = self.database_mut(db_name)?;
        let mut applied: Vec<String> = Vec::with_capacity(values.len());

        for value in values {
            let value = value.as_ref();
            if let Err(err) = database.add(key, value) {
                if applied.is_empty() {
                    return Err(err);
                }
                return Err(StorageError::PartialUpdate {
                    database: db_name.to_string(),
                    key: key.to_string(),
                    applied,
                    failed: value.to_string(),
                    source: Box::new(err),
                });
            }
            applied.push(value.to_string());
        }

        debug!(database = db_name, key, count = applied.len(), "Updated word");
        Ok(())
    }

    // ==================== Attachment ====================

    /// Register an already constructed database under its own name
    pub fn attach(&mut self, database: Database) -> StorageResult<()> {
        let name = database.name().to_string();
        if self.databases.contains_key(&name) {
            return Err(StorageError::AlreadyExists(name));
        }

        info!(database = %name, path = ?database.path(), "Attached database");
        self.databases.insert(name, database);
        Ok(())
    }

    /// Create and attach an empty database
    ///
    /// Nothing is written until the database is dumped.
    pub fn create(&mut self, name: &str, path: impl Into<PathBuf>) -> StorageResult<()> {
        validate_name(name)?;
        if self.contains(name) {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }
        let database = Database::new(name, path, self.codec)?;
        self.attach(database)
    }

    /// Remove a database from the registry, keeping its file
    ///
    /// Links from and to the database are pruned.
    pub fn detach(&mut self, name: &str) -> StorageResult<Database> {
        let database = self
            .databases
            .remove(name)
            .ok_or_else(|| StorageError::DatabaseNotFound(name.to_string()))?;

        let pruned = self.graph.prune(name);
        info!(database = name, pruned_links = pruned, "Detached database");
        Ok(database)
    }

    /// Detach a database and delete its backing file
    ///
    /// If the file cannot be removed the database stays attached. A file
    /// that was never written counts as already deleted.
    pub fn delete(&mut self, name: &str) -> StorageResult<()> {
        let path = self.database(name)?.path().to_path_buf();

        match fs::remove_file(&path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(database = name, path = ?path, "Backing file already absent");
            }
            Err(e) => return Err(StorageError::from_io(e, path)),
        }

        self.detach(name)?;
        info!(database = name, path = ?path, "Deleted database");
        Ok(())
    }

    // ==================== Links ====================

    /// Add an edge `from → to`; duplicates are kept
    pub fn link(&mut self, from: &str, to: &str, reverse: bool) -> StorageResult<()> {
        self.ensure_attached(from)?;
        self.ensure_attached(to)?;

        self.graph.push(from, to, reverse);
        debug!(from, to, reverse, "Linked databases");
        Ok(())
    }

    /// Remove the first edge `from → to`
    pub fn unlink(&mut self, from: &str, to: &str) -> StorageResult<()> {
        self.ensure_attached(from)?;
        self.ensure_attached(to)?;

        if !self.graph.remove_first(from, to) {
            return Err(StorageError::NoSuchEdge {
                from: from.to_string(),
                to: to.to_string(),
            });
        }
        debug!(from, to, "Unlinked databases");
        Ok(())
    }

    // ==================== Merge ====================

    /// Fold every word of `from` into `to`
    ///
    /// The source database is left unchanged. Nothing is rolled back if a
    /// later step fails; snapshot beforehand if that matters.
    pub fn merge(&mut self, from: &str, to: &str, mode: MergeMode) -> StorageResult<MergeReport> {
        let source = self.database(from)?.records();
        self.ensure_attached(to)?;
        if from == to {
            return Err(StorageError::InvalidArgument(format!(
                "cannot merge database '{}' into itself",
                from
            )));
        }

        let target = self.database_mut(to)?;
        let mut report = MergeReport::default();

        for (word, record) in source {
            if target.contains(&word) {
                report.updated += 1;
            } else {
                report.created += 1;
            }

            match mode {
                MergeMode::Override => target.put_record(record),
                MergeMode::Extend => match target.record_mut(&word) {
                    Some(existing) => existing.extend_from(&record),
                    None => {
                        let mut fresh =
                            Record::with_contents(word, Vec::new(), record.last_update, 0);
                        fresh.extend_from(&record);
                        target.put_record(fresh);
                    }
                },
            }
        }

        info!(
            from,
            to,
            mode = %mode,
            updated = report.updated,
            created = report.created,
            "Merged databases"
        );
        Ok(report)
    }

    // ==================== Persistence ====================

    /// Write every attached database
    ///
    /// A failing database does not stop the others from being written;
    /// all failures are reported together.
    pub fn dump(&self) -> StorageResult<()> {
        let mut failures = Vec::new();

        for (name, database) in &self.databases {
            if let Err(error) = database.dump() {
                warn!(database = %name, error = %error, "Failed to dump database");
                failures.push(FlushFailure {
                    database: name.clone(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            debug!(databases = self.databases.len(), "Dumped all databases");
            Ok(())
        } else {
            Err(StorageError::Flush { failures })
        }
    }

    fn ensure_attached(&self, name: &str) -> StorageResult<()> {
        if self.contains(name) {
            Ok(())
        } else {
            Err(StorageError::DatabaseNotFound(name.to_string()))
        }
    }
}
