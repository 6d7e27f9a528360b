// crates/formsmith-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Form Store
// Description: Durable FormStore backed by SQLite WAL.
// Purpose: Persist form list snapshots with deterministic serialization.
// Dependencies: formsmith-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`FormStore`] using `SQLite`. Each save
//! produces a canonical JSON snapshot of the full form list, stored in an
//! append-only version table keyed by the store key. Loads verify integrity
//! via stored hashes and fail closed on corruption. Database contents are
//! treated as untrusted input.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use formsmith_core::FormDefinition;
use formsmith_core::FormStore;
use formsmith_core::HashAlgorithm;
use formsmith_core::StoreError;
use formsmith_core::core::hashing::canonical_json_bytes;
use formsmith_core::core::hashing::hash_bytes;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum store key length in bytes.
const MAX_KEY_LENGTH: usize = 255;
/// Maximum form list snapshot size accepted by the store.
/// Acts as a hard upper bound for the configurable payload limit.
pub const MAX_PAYLOAD_BYTES: usize = 16 * 1024 * 1024;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` form store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `max_versions`, when set, must be greater than zero.
/// - `max_payload_bytes`, when set, must be greater than zero and no more
///   than [`MAX_PAYLOAD_BYTES`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
    /// Optional maximum versions per key (older versions pruned).
    #[serde(default)]
    pub max_versions: Option<u64>,
    /// Optional maximum snapshot size in bytes.
    #[serde(default)]
    pub max_payload_bytes: Option<usize>,
}

impl SqliteStoreConfig {
    /// Returns a configuration with default settings for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
            max_versions: None,
            max_payload_bytes: None,
        }
    }

    /// Returns the effective snapshot size limit.
    #[must_use]
    pub const fn payload_limit(&self) -> usize {
        match self.max_payload_bytes {
            Some(limit) => limit,
            None => MAX_PAYLOAD_BYTES,
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

/// Validates numeric limits in the store configuration.
fn validate_limits(config: &SqliteStoreConfig) -> Result<(), SqliteStoreError> {
    if config.max_versions == Some(0) {
        return Err(SqliteStoreError::Invalid(
            "max_versions must be greater than zero".to_string(),
        ));
    }
    if let Some(max_bytes) = config.max_payload_bytes
        && (max_bytes == 0 || max_bytes > MAX_PAYLOAD_BYTES)
    {
        return Err(SqliteStoreError::Invalid(format!(
            "max_payload_bytes out of range: {max_bytes} (max {MAX_PAYLOAD_BYTES})"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
///
/// # Invariants
/// - Error messages avoid embedding raw form payloads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Store corruption or hash mismatch.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// Store payload exceeded configured size limits.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "form snapshot exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

/// Maps any `rusqlite` error into [`SqliteStoreError::Db`].
fn db_error(err: &rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Snapshot Model
// ============================================================================

/// Snapshot written for one save.
#[derive(Debug, Serialize)]
struct SnapshotRef<'a> {
    /// Store key the snapshot belongs to.
    key: &'a str,
    /// Saved forms in order.
    forms: &'a [FormDefinition],
}

/// Snapshot read back on load.
#[derive(Debug, Deserialize)]
struct Snapshot {
    /// Store key the snapshot belongs to.
    key: String,
    /// Saved forms in order.
    forms: Vec<FormDefinition>,
}

/// Summary metadata for a stored key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSetSummary {
    /// Store key.
    pub key: String,
    /// Latest stored version.
    pub latest_version: i64,
    /// Number of forms in the latest version.
    pub form_count: i64,
    /// Timestamp when the latest version was saved (unix ms).
    pub saved_at: i64,
}

/// Summary metadata for a specific snapshot version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSetVersion {
    /// Stored version number.
    pub version: i64,
    /// Timestamp when the version was saved (unix ms).
    pub saved_at: i64,
    /// Stored payload hash.
    pub payload_hash: String,
    /// Stored hash algorithm label.
    pub hash_algorithm: String,
    /// Number of forms in the snapshot.
    pub form_count: i64,
    /// Stored payload length in bytes.
    pub payload_bytes: usize,
}

/// Prepared snapshot ready for insertion.
#[derive(Debug)]
struct PreparedSnapshot {
    /// Canonical JSON bytes.
    payload: Vec<u8>,
    /// Hash of `payload`.
    payload_hash: String,
    /// Hash algorithm used for `payload_hash`.
    hash_algorithm: HashAlgorithm,
    /// Number of forms in the snapshot.
    form_count: i64,
    /// Save timestamp in unix milliseconds.
    saved_at: i64,
}

/// Raw payload fetched from the version table.
#[derive(Debug)]
struct StoredPayload {
    /// Stored JSON bytes.
    bytes: Vec<u8>,
    /// Stored hash value.
    hash_value: String,
    /// Stored hash algorithm label.
    hash_algorithm: String,
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed form store with WAL support.
///
/// # Invariants
/// - Loads verify stored hashes before deserialization.
/// - `SQLite` connection access is serialized through a mutex.
#[derive(Debug, Clone)]
pub struct SqliteFormStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteFormStore {
    /// Opens an `SQLite`-backed form store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the configuration is invalid or the
    /// database cannot be opened or initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        validate_limits(&config)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the store configuration.
    #[must_use]
    pub const fn config(&self) -> &SqliteStoreConfig {
        &self.config
    }

    /// Locks the shared connection.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection.lock().map_err(|_| SqliteStoreError::Db("sqlite mutex poisoned".to_string()))
    }

    /// Builds a hashed snapshot for `forms`.
    fn prepare_snapshot(
        &self,
        key: &str,
        forms: &[FormDefinition],
    ) -> Result<PreparedSnapshot, SqliteStoreError> {
        let payload = canonical_json_bytes(&SnapshotRef {
            key,
            forms,
        })
        .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
        let limit = self.config.payload_limit();
        if payload.len() > limit {
            return Err(SqliteStoreError::TooLarge {
                max_bytes: limit,
                actual_bytes: payload.len(),
            });
        }
        let form_count = i64::try_from(forms.len())
            .map_err(|_| SqliteStoreError::Invalid("form count exceeds i64".to_string()))?;
        let digest = hash_bytes(HashAlgorithm::default(), &payload);
        Ok(PreparedSnapshot {
            payload,
            payload_hash: digest.value,
            hash_algorithm: digest.algorithm,
            form_count,
            saved_at: unix_millis(),
        })
    }

    /// Loads the latest snapshot for `key`.
    fn load_latest(&self, key: &str) -> Result<Option<Vec<FormDefinition>>, SqliteStoreError> {
        validate_key(key)?;
        let payload = {
            let mut guard = self.lock()?;
            let tx = guard.transaction().map_err(|err| db_error(&err))?;
            let latest_version: Option<i64> = tx
                .query_row(
                    "SELECT latest_version FROM form_sets WHERE set_key = ?1",
                    params![key],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| db_error(&err))?;
            let payload = match latest_version {
                None => None,
                Some(version) if version < 1 => {
                    return Err(SqliteStoreError::Corrupt(format!(
                        "invalid latest_version for key {key}"
                    )));
                }
                Some(version) => {
                    let payload =
                        fetch_payload(&tx, key, version, self.config.payload_limit())?;
                    Some(payload.ok_or_else(|| {
                        SqliteStoreError::Corrupt(format!(
                            "missing version {version} for key {key}"
                        ))
                    })?)
                }
            };
            tx.commit().map_err(|err| db_error(&err))?;
            payload
        };
        payload.map(|payload| decode_payload(key, &payload)).transpose()
    }

    /// Appends a snapshot for `key` and applies retention.
    fn save_snapshot(&self, key: &str, forms: &[FormDefinition]) -> Result<(), SqliteStoreError> {
        validate_key(key)?;
        let snapshot = self.prepare_snapshot(key, forms)?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_error(&err))?;
        let latest_version: Option<i64> = tx
            .query_row(
                "SELECT latest_version FROM form_sets WHERE set_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| db_error(&err))?;
        let next_version = match latest_version {
            None => 1,
            Some(value) if value < 1 => {
                return Err(SqliteStoreError::Corrupt(format!(
                    "invalid latest_version for key {key}"
                )));
            }
            Some(value) => value.checked_add(1).ok_or_else(|| {
                SqliteStoreError::Corrupt(format!("version overflow for key {key}"))
            })?,
        };
        tx.execute(
            "INSERT INTO form_sets (set_key, latest_version) VALUES (?1, ?2) ON CONFLICT(set_key) \
             DO UPDATE SET latest_version = excluded.latest_version",
            params![key, next_version],
        )
        .map_err(|err| db_error(&err))?;
        tx.execute(
            "INSERT INTO form_set_versions (set_key, version, payload, payload_hash, \
             hash_algorithm, form_count, saved_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                key,
                next_version,
                snapshot.payload.as_slice(),
                snapshot.payload_hash.as_str(),
                snapshot.hash_algorithm.as_str(),
                snapshot.form_count,
                snapshot.saved_at
            ],
        )
        .map_err(|err| db_error(&err))?;
        enforce_retention(&tx, key, next_version, self.config.max_versions)?;
        tx.commit().map_err(|err| db_error(&err))?;
        drop(guard);
        Ok(())
    }

    /// Lists stored keys, most recently saved first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the database query fails.
    pub fn list_keys(&self) -> Result<Vec<FormSetSummary>, SqliteStoreError> {
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT form_sets.set_key, form_sets.latest_version, form_set_versions.form_count, \
                 form_set_versions.saved_at
                 FROM form_sets
                 JOIN form_set_versions
                   ON form_sets.set_key = form_set_versions.set_key
                  AND form_sets.latest_version = form_set_versions.version",
            )
            .map_err(|err| db_error(&err))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(FormSetSummary {
                    key: row.get(0)?,
                    latest_version: row.get(1)?,
                    form_count: row.get(2)?,
                    saved_at: row.get(3)?,
                })
            })
            .map_err(|err| db_error(&err))?;
        let mut results = Vec::new();
        for row in rows {
            results.push(row.map_err(|err| db_error(&err))?);
        }
        drop(stmt);
        drop(guard);
        results.sort_by(|a, b| b.saved_at.cmp(&a.saved_at).then_with(|| a.key.cmp(&b.key)));
        Ok(results)
    }

    /// Lists all stored versions for a key, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the query fails or a stored payload
    /// exceeds the size limit.
    pub fn list_versions(&self, key: &str) -> Result<Vec<FormSetVersion>, SqliteStoreError> {
        validate_key(key)?;
        let limit = self.config.payload_limit();
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT version, saved_at, payload_hash, hash_algorithm, form_count, \
                 length(payload) FROM form_set_versions WHERE set_key = ?1 ORDER BY version DESC",
            )
            .map_err(|err| db_error(&err))?;
        let rows = stmt
            .query_map(params![key], |row| {
                let version: i64 = row.get(0)?;
                let saved_at: i64 = row.get(1)?;
                let payload_hash: String = row.get(2)?;
                let hash_algorithm: String = row.get(3)?;
                let form_count: i64 = row.get(4)?;
                let length: i64 = row.get(5)?;
                Ok((version, saved_at, payload_hash, hash_algorithm, form_count, length))
            })
            .map_err(|err| db_error(&err))?;
        let mut results = Vec::new();
        for row in rows {
            let (version, saved_at, payload_hash, hash_algorithm, form_count, length) =
                row.map_err(|err| db_error(&err))?;
            let payload_bytes = checked_length(length, limit, key)?;
            results.push(FormSetVersion {
                version,
                saved_at,
                payload_hash,
                hash_algorithm,
                form_count,
                payload_bytes,
            });
        }
        drop(stmt);
        drop(guard);
        Ok(results)
    }

    /// Loads a specific snapshot version.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the version is invalid, the payload is
    /// corrupt, or the stored hash does not match the payload.
    pub fn load_version(
        &self,
        key: &str,
        version: i64,
    ) -> Result<Option<Vec<FormDefinition>>, SqliteStoreError> {
        validate_key(key)?;
        if version < 1 {
            return Err(SqliteStoreError::Invalid("version must be >= 1".to_string()));
        }
        let payload = {
            let mut guard = self.lock()?;
            let tx = guard.transaction().map_err(|err| db_error(&err))?;
            let payload = fetch_payload(&tx, key, version, self.config.payload_limit())?;
            tx.commit().map_err(|err| db_error(&err))?;
            payload
        };
        payload.map(|payload| decode_payload(key, &payload)).transpose()
    }

    /// Prunes older versions, keeping the most recent `keep` entries.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if `keep` is less than 1 or if the database
    /// query fails.
    pub fn prune_versions(&self, key: &str, keep: u64) -> Result<u64, SqliteStoreError> {
        validate_key(key)?;
        if keep == 0 {
            return Err(SqliteStoreError::Invalid("keep must be >= 1".to_string()));
        }
        let keep = i64::try_from(keep)
            .map_err(|_| SqliteStoreError::Invalid(format!("keep value out of range: {keep}")))?;
        let mut guard = self.lock()?;
        let tx = guard.transaction().map_err(|err| db_error(&err))?;
        let latest_version: Option<i64> = tx
            .query_row(
                "SELECT latest_version FROM form_sets WHERE set_key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| db_error(&err))?;
        let deleted = match latest_version {
            Some(latest) if latest > keep => tx
                .execute(
                    "DELETE FROM form_set_versions WHERE set_key = ?1 AND version <= ?2",
                    params![key, latest - keep],
                )
                .map_err(|err| db_error(&err))?,
            _ => 0,
        };
        tx.commit().map_err(|err| db_error(&err))?;
        drop(guard);
        u64::try_from(deleted)
            .map_err(|_| SqliteStoreError::Invalid(format!("pruned count exceeds u64: {deleted}")))
    }
}

impl FormStore for SqliteFormStore {
    fn load(&self, key: &str) -> Result<Option<Vec<FormDefinition>>, StoreError> {
        self.load_latest(key).map_err(StoreError::from)
    }

    fn save(&self, key: &str, forms: &[FormDefinition]) -> Result<(), StoreError> {
        self.save_snapshot(key, forms).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.display().to_string().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        if component.as_os_str().to_string_lossy().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Validates a store key.
fn validate_key(key: &str) -> Result<(), SqliteStoreError> {
    if key.is_empty() {
        return Err(SqliteStoreError::Invalid("store key must not be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(SqliteStoreError::Invalid(format!(
            "store key exceeds {MAX_KEY_LENGTH} bytes"
        )));
    }
    Ok(())
}

/// Opens an `SQLite` connection with durable defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|err| db_error(&err))?;
    connection.execute_batch("PRAGMA foreign_keys = ON;").map_err(|err| db_error(&err))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| db_error(&err))?;
    Ok(connection)
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| db_error(&err))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| db_error(&err))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| db_error(&err))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| db_error(&err))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS form_sets (
                    set_key TEXT NOT NULL PRIMARY KEY,
                    latest_version INTEGER NOT NULL
                );
                CREATE TABLE IF NOT EXISTS form_set_versions (
                    set_key TEXT NOT NULL,
                    version INTEGER NOT NULL,
                    payload BLOB NOT NULL,
                    payload_hash TEXT NOT NULL,
                    hash_algorithm TEXT NOT NULL,
                    form_count INTEGER NOT NULL,
                    saved_at INTEGER NOT NULL,
                    PRIMARY KEY (set_key, version),
                    FOREIGN KEY (set_key) REFERENCES form_sets(set_key) ON DELETE CASCADE
                );",
            )
            .map_err(|err| db_error(&err))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| db_error(&err))?;
    Ok(())
}

/// Enforces version retention if configured.
fn enforce_retention(
    tx: &rusqlite::Transaction<'_>,
    key: &str,
    latest_version: i64,
    max_versions: Option<u64>,
) -> Result<(), SqliteStoreError> {
    let Some(max_versions) = max_versions else {
        return Ok(());
    };
    let max_versions = i64::try_from(max_versions)
        .map_err(|_| SqliteStoreError::Invalid("max_versions too large".to_string()))?;
    if latest_version > max_versions {
        tx.execute(
            "DELETE FROM form_set_versions WHERE set_key = ?1 AND version <= ?2",
            params![key, latest_version - max_versions],
        )
        .map_err(|err| db_error(&err))?;
    }
    Ok(())
}

/// Fetches a stored payload, checking its length before reading the blob.
fn fetch_payload(
    tx: &rusqlite::Transaction<'_>,
    key: &str,
    version: i64,
    limit: usize,
) -> Result<Option<StoredPayload>, SqliteStoreError> {
    let metadata = tx
        .query_row(
            "SELECT length(payload), payload_hash, hash_algorithm FROM form_set_versions WHERE \
             set_key = ?1 AND version = ?2",
            params![key, version],
            |row| {
                let length: i64 = row.get(0)?;
                let hash: String = row.get(1)?;
                let algorithm: String = row.get(2)?;
                Ok((length, hash, algorithm))
            },
        )
        .optional()
        .map_err(|err| db_error(&err))?;
    let Some((length, hash_value, hash_algorithm)) = metadata else {
        return Ok(None);
    };
    checked_length(length, limit, key)?;
    let bytes: Vec<u8> = tx
        .query_row(
            "SELECT payload FROM form_set_versions WHERE set_key = ?1 AND version = ?2",
            params![key, version],
            |row| row.get(0),
        )
        .map_err(|err| db_error(&err))?;
    Ok(Some(StoredPayload {
        bytes,
        hash_value,
        hash_algorithm,
    }))
}

/// Converts a stored length and enforces the size limit.
fn checked_length(length: i64, limit: usize, key: &str) -> Result<usize, SqliteStoreError> {
    let length = usize::try_from(length).map_err(|_| {
        SqliteStoreError::Invalid(format!("negative payload length for key {key}"))
    })?;
    if length > limit {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: limit,
            actual_bytes: length,
        });
    }
    Ok(length)
}

/// Verifies the payload hash and decodes the snapshot.
fn decode_payload(
    key: &str,
    payload: &StoredPayload,
) -> Result<Vec<FormDefinition>, SqliteStoreError> {
    let algorithm = parse_hash_algorithm(&payload.hash_algorithm)?;
    let expected = hash_bytes(algorithm, &payload.bytes);
    if expected.value != payload.hash_value {
        return Err(SqliteStoreError::Corrupt(format!("hash mismatch for key {key}")));
    }
    let snapshot: Snapshot = serde_json::from_slice(&payload.bytes)
        .map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if snapshot.key != key {
        return Err(SqliteStoreError::Invalid(
            "store key mismatch between row and payload".to_string(),
        ));
    }
    Ok(snapshot.forms)
}

/// Returns the current unix epoch in milliseconds.
fn unix_millis() -> i64 {
    let now = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default();
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}

/// Parses a hash algorithm label.
fn parse_hash_algorithm(label: &str) -> Result<HashAlgorithm, SqliteStoreError> {
    match label {
        "sha256" => Ok(HashAlgorithm::Sha256),
        other => Err(SqliteStoreError::Invalid(format!("unsupported hash algorithm: {other}"))),
    }
}
