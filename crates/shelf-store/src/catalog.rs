//! The score catalog: one row per indexed file, keyed by relative path.

use camino::{Utf8Path, Utf8PathBuf};
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension, Row, params, params_from_iter};
use tracing::{debug, info};

use shelf_core::{FxHashSet, NewScore, Score, ScoreId, unix_millis};

use crate::error::CatalogError;

/// The persisted table of indexed scores.
///
/// Exactly one record exists per relative path; re-indexing the same path
/// overwrites in place. Identity ([`ScoreId`]) is derived from the relative
/// path, so a record keeps its id across rewrites.
///
/// # Examples
///
/// ```
/// use shelf_store::Catalog;
/// use shelf_core::NewScore;
/// use camino::Utf8PathBuf;
///
/// let catalog = Catalog::open_in_memory()?;
/// let id = catalog.upsert(&NewScore {
///     filename: "a.pdf".to_owned(),
///     relative_path: Utf8PathBuf::from("a.pdf"),
///     folder: String::new(),
///     file_size: 512,
///     modified_at: 1_700_000_000_000,
///     pages: Some(3),
/// })?;
///
/// assert!(catalog.get(&id)?.is_some());
/// # Ok::<(), shelf_store::CatalogError>(())
/// ```
#[derive(Debug)]
pub struct Catalog {
    conn: Mutex<Connection>,
}

const SCORE_COLUMNS: &str =
    "id, filename, relative_path, folder, file_size, modified_at, pages, indexed_at";

impl Catalog {
    /// Opens (or creates) the catalog database at `path`.
    ///
    /// The parent directory is created when missing, so the default
    /// `./data/` location works on first run.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Prepare`] when the parent directory cannot
    /// be created and [`CatalogError::Sqlite`] when opening the database
    /// or initializing the schema fails.
    pub fn open(path: &Utf8Path) -> Result<Self, CatalogError> {
        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| CatalogError::Prepare {
                    path: parent.to_owned(),
                    source,
                })?;
            }
        }

        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        info!(path = %path, "Catalog opened");

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens an in-memory catalog, used by tests and one-shot scans.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Sqlite`] when schema creation fails.
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Initializes pragmas and the schema.
    ///
    /// WAL mode plus a busy timeout keeps concurrent readers (including
    /// external inspection of the database file) from blocking the
    /// single-writer server process.
    fn init_schema(conn: &Connection) -> Result<(), CatalogError> {
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA busy_timeout = 5000;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS scores (
                id TEXT PRIMARY KEY,
                filename TEXT NOT NULL,
                relative_path TEXT UNIQUE NOT NULL,
                folder TEXT NOT NULL DEFAULT '',
                file_size INTEGER NOT NULL,
                modified_at INTEGER NOT NULL,
                pages INTEGER,
                indexed_at INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_scores_folder ON scores(folder);
            CREATE INDEX IF NOT EXISTS idx_scores_filename ON scores(filename);
            CREATE INDEX IF NOT EXISTS idx_scores_modified ON scores(modified_at);
            ",
        )?;
        Ok(())
    }

    /// Inserts or updates the record for `score.relative_path`.
    ///
    /// The upsert is a single atomic statement, so two reconcilers racing
    /// on the same path cannot interleave a lost update; last write wins
    /// whole-row.
    ///
    /// Returns the assigned identifier.
    pub fn upsert(&self, score: &NewScore) -> Result<ScoreId, CatalogError> {
        let id = ScoreId::from_relative_path(&score.relative_path);
        let indexed_at = unix_millis();

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO scores (id, filename, relative_path, folder, file_size, modified_at, pages, indexed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(relative_path) DO UPDATE SET
                filename = excluded.filename,
                folder = excluded.folder,
                file_size = excluded.file_size,
                modified_at = excluded.modified_at,
                pages = excluded.pages,
                indexed_at = excluded.indexed_at",
            params![
                id.as_str(),
                score.filename,
                score.relative_path.as_str(),
                score.folder,
                i64::try_from(score.file_size).unwrap_or(i64::MAX),
                score.modified_at,
                score.pages,
                indexed_at,
            ],
        )?;

        debug!(path = %score.relative_path, id = %id, "Upserted score");
        Ok(id)
    }

    /// Point lookup by identifier.
    pub fn get(&self, id: &ScoreId) -> Result<Option<Score>, CatalogError> {
        let conn = self.conn.lock();
        let score = conn
            .query_row(
                &format!("SELECT {SCORE_COLUMNS} FROM scores WHERE id = ?1"),
                params![id.as_str()],
                row_to_score,
            )
            .optional()?;
        Ok(score)
    }

    /// Point lookup by relative path (used by the reconciliation
    /// primitive's mtime short-circuit).
    pub fn get_by_path(&self, relative_path: &Utf8Path) -> Result<Option<Score>, CatalogError> {
        let conn = self.conn.lock();
        let score = conn
            .query_row(
                &format!("SELECT {SCORE_COLUMNS} FROM scores WHERE relative_path = ?1"),
                params![relative_path.as_str()],
                row_to_score,
            )
            .optional()?;
        Ok(score)
    }

    /// Lists records, optionally filtered, ordered by folder then filename.
    ///
    /// `search` is a case-insensitive substring match against the filename
    /// or the relative path; `folder` is a prefix match against the folder
    /// column. Both filters combine with AND.
    pub fn list(
        &self,
        search: Option<&str>,
        folder: Option<&str>,
    ) -> Result<Vec<Score>, CatalogError> {
        let mut sql = format!("SELECT {SCORE_COLUMNS} FROM scores WHERE 1=1");
        let mut values: Vec<String> = Vec::new();

        if let Some(term) = search.filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            values.push(pattern.clone());
            sql.push_str(&format!(" AND (filename LIKE ?{}", values.len()));
            values.push(pattern);
            sql.push_str(&format!(" OR relative_path LIKE ?{})", values.len()));
        }

        if let Some(prefix) = folder.filter(|f| !f.is_empty()) {
            values.push(format!("{prefix}%"));
            sql.push_str(&format!(" AND folder LIKE ?{}", values.len()));
        }

        sql.push_str(" ORDER BY folder, filename");

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_score)?;

        let mut scores = Vec::new();
        for row in rows {
            scores.push(row?);
        }
        Ok(scores)
    }

    /// Deletes the record for `relative_path`.
    ///
    /// Returns `true` when a record was removed; deleting an absent path
    /// is a no-op (the scanner's diff and a watcher delete may race, and
    /// double-delete must be harmless).
    pub fn delete(&self, relative_path: &Utf8Path) -> Result<bool, CatalogError> {
        let conn = self.conn.lock();
        let affected = conn.execute(
            "DELETE FROM scores WHERE relative_path = ?1",
            params![relative_path.as_str()],
        )?;
        Ok(affected > 0)
    }

    /// Number of catalogued scores.
    pub fn count(&self) -> Result<u64, CatalogError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM scores", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Distinct non-empty folder values, sorted ascending.
    pub fn folders(&self) -> Result<Vec<String>, CatalogError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT DISTINCT folder FROM scores WHERE folder != '' ORDER BY folder",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut folders = Vec::new();
        for row in rows {
            folders.push(row?);
        }
        Ok(folders)
    }

    /// Snapshot of every catalogued relative path.
    ///
    /// The scanner takes this snapshot before its walk begins; the
    /// vanished-file diff only ever removes paths from this set, so a
    /// record added by a watcher event mid-scan can never be removed by
    /// the closing diff.
    pub fn relative_paths(&self) -> Result<FxHashSet<Utf8PathBuf>, CatalogError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT relative_path FROM scores")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut paths = FxHashSet::default();
        for row in rows {
            paths.insert(Utf8PathBuf::from(row?));
        }
        Ok(paths)
    }

    /// Removes every record. Test and maintenance helper.
    pub fn clear(&self) -> Result<(), CatalogError> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM scores", [])?;
        Ok(())
    }
}

fn row_to_score(row: &Row<'_>) -> rusqlite::Result<Score> {
    let file_size: i64 = row.get(4)?;
    Ok(Score {
        id: ScoreId::from_raw(row.get::<_, String>(0)?),
        filename: row.get(1)?,
        relative_path: Utf8PathBuf::from(row.get::<_, String>(2)?),
        folder: row.get(3)?,
        file_size: u64::try_from(file_size).unwrap_or(0),
        modified_at: row.get(5)?,
        pages: row.get(6)?,
        indexed_at: row.get(7)?,
    })
}
