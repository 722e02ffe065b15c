//! SQLite-backed film store implementation.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use crate::film::FilmEntry;

use super::query::compile_terms;
use super::types::{DownloadListRow, DownloadStatus, Recording, StatusEntry, StoreError};

/// Status-table key stamped when a catalog ingest is published.
pub const STATUS_LAST_REFRESH: &str = "last_refresh";
/// Status-table key holding the live catalog's entry count.
pub const STATUS_CATALOG_SIZE: &str = "catalog_size";
/// Status-table key stamped when a download batch finishes.
pub const STATUS_LAST_DOWNLOAD: &str = "last_download";

/// Film columns in schema order, shared with the query compiler.
pub(crate) const FILM_COLUMNS: &str = "station, topic, title, date, time, duration, size_mb, \
     description, url, website, url_subtitles, url_rtmp, url_small, url_rtmp_small, url_hd, \
     url_rtmp_hd, date_l, url_history, geo, is_new, id";

/// Same list qualified for joins against the downloads table.
const FILM_COLUMNS_QUALIFIED: &str = "f.station, f.topic, f.title, f.date, f.time, f.duration, \
     f.size_mb, f.description, f.url, f.website, f.url_subtitles, f.url_rtmp, f.url_small, \
     f.url_rtmp_small, f.url_hd, f.url_rtmp_hd, f.date_l, f.url_history, f.geo, f.is_new, f.id";

const FILM_COLUMN_DEFS: &str = "station TEXT NOT NULL,
    topic TEXT NOT NULL,
    title TEXT NOT NULL,
    date TEXT,
    time TEXT,
    duration TEXT,
    size_mb INTEGER NOT NULL,
    description TEXT NOT NULL,
    url TEXT NOT NULL,
    website TEXT NOT NULL,
    url_subtitles TEXT NOT NULL,
    url_rtmp TEXT NOT NULL,
    url_small TEXT NOT NULL,
    url_rtmp_small TEXT NOT NULL,
    url_hd TEXT NOT NULL,
    url_rtmp_hd TEXT NOT NULL,
    date_l INTEGER,
    url_history TEXT NOT NULL,
    geo TEXT NOT NULL,
    is_new INTEGER NOT NULL,
    id TEXT PRIMARY KEY";

/// SQLite-backed store for the catalog, downloads, recordings and status
/// tables.
///
/// All writes serialize through the one connection lock, so at most one
/// write transaction is ever in flight from this process. A second process
/// on the same file surfaces as a plain database error; there is no retry.
pub struct SqliteFilmStore {
    conn: Mutex<Connection>,
}

impl SqliteFilmStore {
    /// Opens (creating if needed) the store at `path`.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(&format!(
            r#"
            CREATE TABLE IF NOT EXISTS films ({FILM_COLUMN_DEFS});

            CREATE INDEX IF NOT EXISTS idx_films_station ON films(station);
            CREATE INDEX IF NOT EXISTS idx_films_topic ON films(topic);

            CREATE TABLE IF NOT EXISTS downloads (
                id TEXT PRIMARY KEY,
                scheduled_date TEXT,
                status TEXT NOT NULL,
                status_date TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS recordings (
                station TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                film_date TEXT,
                file_path TEXT PRIMARY KEY,
                completed_date TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS status (
                key TEXT PRIMARY KEY,
                timestamp TEXT NOT NULL,
                text TEXT
            );
            "#
        ))
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ------------------------------------------------------------------
    // Catalog bulk load
    // ------------------------------------------------------------------

    /// Starts a catalog refresh.
    ///
    /// The new catalog is built into a shadow table inside one transaction
    /// and only replaces the live table when [`Ingest::commit`] runs.
    /// Dropping the guard without committing rolls everything back; the
    /// previous catalog stays untouched and queryable throughout.
    pub fn begin_ingest(&self) -> Result<Ingest<'_>, StoreError> {
        let conn = self.lock();
        let begin = format!(
            "BEGIN IMMEDIATE;
             DROP TABLE IF EXISTS films_ingest;
             CREATE TABLE films_ingest ({FILM_COLUMN_DEFS});"
        );
        if let Err(e) = conn.execute_batch(&begin) {
            let _ = conn.execute_batch("ROLLBACK;");
            return Err(StoreError::Database(e.to_string()));
        }
        Ok(Ingest {
            conn,
            inserted: 0,
            committed: false,
        })
    }

    /// Number of entries in the live catalog.
    pub fn count_films(&self) -> Result<u64, StoreError> {
        let conn = self.lock();
        conn.query_row("SELECT COUNT(*) FROM films", [], |row| row.get::<_, u64>(0))
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    // ------------------------------------------------------------------
    // Search
    // ------------------------------------------------------------------

    /// Compiles the search terms and returns the matching entries.
    pub fn search(&self, terms: &[String]) -> Result<Vec<FilmEntry>, StoreError> {
        let compiled = compile_terms(terms)?;
        debug!(sql = %compiled.sql, "executing search");

        let conn = self.lock();
        let mut stmt = conn
            .prepare(&compiled.sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(compiled.params.iter()),
                row_to_entry,
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        collect_rows(rows)
    }

    /// Fetches full entries for a set of ids, in no particular order.
    pub fn films_by_ids(&self, ids: &[String]) -> Result<Vec<FilmEntry>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {FILM_COLUMNS} FROM films WHERE id IN ({})",
            placeholders(ids.len())
        );
        let conn = self.lock();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(ids.iter()), row_to_entry)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        collect_rows(rows)
    }

    // ------------------------------------------------------------------
    // Downloads
    // ------------------------------------------------------------------

    /// Tracks entries for download with insert-or-ignore semantics.
    ///
    /// Re-selecting an already-tracked entry is a no-op and preserves its
    /// current status. Returns the number of newly tracked entries.
    pub fn save_downloads(
        &self,
        entries: &[FilmEntry],
        status: DownloadStatus,
    ) -> Result<usize, StoreError> {
        let conn = self.lock();
        let today = today();
        let mut added = 0;
        let mut stmt = conn
            .prepare(
                "INSERT OR IGNORE INTO downloads (id, scheduled_date, status, status_date)
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        for entry in entries {
            added += stmt
                .execute(params![
                    entry.id(),
                    entry.date.map(|d| d.to_string()),
                    status.code(),
                    today,
                ])
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }
        Ok(added)
    }

    /// Moves one tracked download to a new status, stamping the change date.
    pub fn update_download_status(
        &self,
        id: &str,
        status: DownloadStatus,
    ) -> Result<(), StoreError> {
        let conn = self.lock();
        conn.execute(
            "UPDATE downloads SET status = ?1, status_date = ?2 WHERE id = ?3",
            params![status.code(), today(), id],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    /// UI projection of tracked downloads joined with their catalog rows,
    /// newest status change first. An empty status list means all statuses.
    pub fn read_download_list(
        &self,
        statuses: &[DownloadStatus],
    ) -> Result<Vec<DownloadListRow>, StoreError> {
        let statuses = statuses_or_all(statuses);
        let sql = format!(
            "SELECT d.id, d.status, d.status_date, f.station, f.topic, f.title, f.duration, f.date
             FROM films AS f JOIN downloads AS d ON f.id = d.id
             WHERE d.status IN ({})
             ORDER BY d.status_date DESC",
            placeholders(statuses.len())
        );
        let conn = self.lock();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(statuses.iter().map(|s| s.code())),
                |row| {
                    let status: String = row.get(1)?;
                    Ok(DownloadListRow {
                        id: row.get(0)?,
                        status: DownloadStatus::from_code(&status)
                            .unwrap_or(DownloadStatus::Queued),
                        status_date: get_date(row, 2)?,
                        station: row.get(3)?,
                        topic: row.get(4)?,
                        title: row.get(5)?,
                        duration: get_time(row, 6)?,
                        date: get_date(row, 7)?,
                    })
                },
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        collect_rows(rows)
    }

    /// Full entries for tracked downloads in the given statuses,
    /// reconstructed from their catalog rows.
    pub fn read_download_entries(
        &self,
        statuses: &[DownloadStatus],
    ) -> Result<Vec<FilmEntry>, StoreError> {
        let statuses = statuses_or_all(statuses);
        let sql = format!(
            "SELECT {FILM_COLUMNS_QUALIFIED}
             FROM films AS f JOIN downloads AS d ON f.id = d.id
             WHERE d.status IN ({})",
            placeholders(statuses.len())
        );
        let conn = self.lock();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(statuses.iter().map(|s| s.code())),
                row_to_entry,
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        collect_rows(rows)
    }

    /// Removes tracked downloads by id. Returns the number removed.
    pub fn delete_downloads(&self, ids: &[String]) -> Result<usize, StoreError> {
        let conn = self.lock();
        let mut removed = 0;
        let mut stmt = conn
            .prepare("DELETE FROM downloads WHERE id = ?1")
            .map_err(|e| StoreError::Database(e.to_string()))?;
        for id in ids {
            removed += stmt
                .execute(params![id])
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Recordings (provenance)
    // ------------------------------------------------------------------

    /// Records which local file a completed download produced.
    ///
    /// A no-op when the entry is no longer in the catalog.
    pub fn save_recording(&self, id: &str, file_path: &Path) -> Result<(), StoreError> {
        let conn = self.lock();
        let row = conn
            .query_row(
                "SELECT station, title, description, date FROM films WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                },
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                e => Err(StoreError::Database(e.to_string())),
            })?;

        let Some((station, title, description, film_date)) = row else {
            debug!(id, "skipping recording for entry not in catalog");
            return Ok(());
        };

        conn.execute(
            "INSERT OR IGNORE INTO recordings
                 (station, title, description, film_date, file_path, completed_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                station,
                title,
                description,
                film_date,
                file_path.to_string_lossy(),
                today(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    pub fn read_recordings(&self) -> Result<Vec<Recording>, StoreError> {
        let conn = self.lock();
        let mut stmt = conn
            .prepare(
                "SELECT station, title, description, film_date, file_path, completed_date
                 FROM recordings ORDER BY completed_date DESC",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let rows = stmt
            .query_map([], |row| {
                Ok(Recording {
                    station: row.get(0)?,
                    title: row.get(1)?,
                    description: row.get(2)?,
                    film_date: get_date(row, 3)?,
                    file_path: row.get(4)?,
                    completed_date: get_date(row, 5)?,
                })
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;
        collect_rows(rows)
    }

    /// Removes provenance rows by file path. Returns the number removed.
    pub fn delete_recordings(&self, file_paths: &[String]) -> Result<usize, StoreError> {
        let conn = self.lock();
        let mut removed = 0;
        let mut stmt = conn
            .prepare("DELETE FROM recordings WHERE file_path = ?1")
            .map_err(|e| StoreError::Database(e.to_string()))?;
        for path in file_paths {
            removed += stmt
                .execute(params![path])
                .map_err(|e| StoreError::Database(e.to_string()))?;
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Status table
    // ------------------------------------------------------------------

    /// Upserts one status row, stamping the current instant.
    pub fn save_status(&self, key: &str, text: Option<&str>) -> Result<(), StoreError> {
        let conn = self.lock();
        upsert_status(&conn, key, text)
    }

    pub fn read_status(&self, keys: &[&str]) -> Result<Vec<StatusEntry>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT key, timestamp, text FROM status WHERE key IN ({})",
            placeholders(keys.len())
        );
        let conn = self.lock();
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(keys.iter().copied()), |row| {
                let timestamp: String = row.get(1)?;
                Ok(StatusEntry {
                    key: row.get(0)?,
                    timestamp: DateTime::parse_from_rfc3339(&timestamp)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                    text: row.get(2)?,
                })
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;
        collect_rows(rows)
    }
}

/// In-flight catalog refresh. Commit publishes atomically; drop rolls back.
pub struct Ingest<'a> {
    conn: MutexGuard<'a, Connection>,
    inserted: u64,
    committed: bool,
}

impl Ingest<'_> {
    /// Adds one entry to the shadow table.
    pub fn insert(&mut self, entry: &FilmEntry) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO films_ingest VALUES
                 (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17,
                  ?18, ?19, ?20, ?21)",
                params![
                    entry.station,
                    entry.topic,
                    entry.title,
                    entry.date.map(|d| d.to_string()),
                    entry.time.map(|t| t.to_string()),
                    entry.duration.map(|d| d.to_string()),
                    entry.size_mb as i64,
                    entry.description,
                    entry.url,
                    entry.website,
                    entry.url_subtitles,
                    entry.url_rtmp,
                    entry.url_small,
                    entry.url_rtmp_small,
                    entry.url_hd,
                    entry.url_rtmp_hd,
                    entry.date_l,
                    entry.url_history,
                    entry.geo,
                    entry.new,
                    entry.id(),
                ],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        self.inserted += 1;
        Ok(())
    }

    /// Builds the indices, swaps the shadow table in for the live catalog
    /// and commits, then stamps the refresh status rows.
    pub fn commit(mut self) -> Result<u64, StoreError> {
        self.conn
            .execute_batch(
                "DROP TABLE IF EXISTS films;
                 ALTER TABLE films_ingest RENAME TO films;
                 CREATE INDEX idx_films_station ON films(station);
                 CREATE INDEX idx_films_topic ON films(topic);
                 COMMIT;",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;
        self.committed = true;

        upsert_status(&self.conn, STATUS_LAST_REFRESH, None)?;
        upsert_status(
            &self.conn,
            STATUS_CATALOG_SIZE,
            Some(&self.inserted.to_string()),
        )?;
        Ok(self.inserted)
    }
}

impl Drop for Ingest<'_> {
    fn drop(&mut self) {
        if !self.committed {
            // abandoned refresh: the live catalog was never touched
            let _ = self.conn.execute_batch("ROLLBACK;");
        }
    }
}

fn upsert_status(conn: &Connection, key: &str, text: Option<&str>) -> Result<(), StoreError> {
    conn.execute(
        "INSERT OR REPLACE INTO status (key, timestamp, text) VALUES (?1, ?2, ?3)",
        params![key, Utc::now().to_rfc3339(), text],
    )
    .map_err(|e| StoreError::Database(e.to_string()))?;
    Ok(())
}

fn today() -> String {
    Local::now().date_naive().to_string()
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(",")
}

fn statuses_or_all(statuses: &[DownloadStatus]) -> Vec<DownloadStatus> {
    if statuses.is_empty() {
        DownloadStatus::ALL.to_vec()
    } else {
        statuses.to_vec()
    }
}

fn collect_rows<T>(
    rows: impl Iterator<Item = rusqlite::Result<T>>,
) -> Result<Vec<T>, StoreError> {
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
    }
    Ok(out)
}

fn get_date(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let value: Option<String> = row.get(idx)?;
    Ok(value.as_deref().and_then(|v| v.parse().ok()))
}

fn get_time(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<Option<NaiveTime>> {
    let value: Option<String> = row.get(idx)?;
    Ok(value
        .as_deref()
        .and_then(|v| NaiveTime::parse_from_str(v, "%H:%M:%S").ok()))
}

/// Maps one films row (in [`FILM_COLUMNS`] order) back to an entry.
fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<FilmEntry> {
    Ok(FilmEntry {
        station: row.get(0)?,
        topic: row.get(1)?,
        title: row.get(2)?,
        date: get_date(row, 3)?,
        time: get_time(row, 4)?,
        duration: get_time(row, 5)?,
        size_mb: row.get::<_, i64>(6)? as u64,
        description: row.get(7)?,
        url: row.get(8)?,
        website: row.get(9)?,
        url_subtitles: row.get(10)?,
        url_rtmp: row.get(11)?,
        url_small: row.get(12)?,
        url_rtmp_small: row.get(13)?,
        url_hd: row.get(14)?,
        url_rtmp_hd: row.get(15)?,
        date_l: row.get(16)?,
        url_history: row.get(17)?,
        geo: row.get(18)?,
        new: row.get(19)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::film_entry;

    fn store_with_entries(entries: &[FilmEntry]) -> SqliteFilmStore {
        let store = SqliteFilmStore::in_memory().unwrap();
        let mut ingest = store.begin_ingest().unwrap();
        for entry in entries {
            ingest.insert(entry).unwrap();
        }
        ingest.commit().unwrap();
        store
    }

    #[test]
    fn test_ingest_publishes_entries() {
        let store = store_with_entries(&[
            film_entry("ARD", "News", "One"),
            film_entry("ZDF", "Doku", "Two"),
        ]);
        assert_eq!(store.count_films().unwrap(), 2);

        let all = store.search(&[]).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_aborted_ingest_keeps_previous_catalog() {
        let store = store_with_entries(&[film_entry("ARD", "News", "Old")]);

        {
            let mut ingest = store.begin_ingest().unwrap();
            ingest.insert(&film_entry("ZDF", "Doku", "New")).unwrap();
            // dropped without commit
        }

        let all = store.search(&[]).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Old");
    }

    #[test]
    fn test_ingest_after_abort_still_works() {
        let store = store_with_entries(&[film_entry("ARD", "News", "Old")]);
        drop(store.begin_ingest().unwrap());

        let mut ingest = store.begin_ingest().unwrap();
        ingest.insert(&film_entry("ZDF", "Doku", "New")).unwrap();
        ingest.commit().unwrap();

        let all = store.search(&[]).unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "New");
    }

    #[test]
    fn test_reingest_is_idempotent_for_downloads() {
        let entry = film_entry("ARD", "News", "Tracked");
        let store = store_with_entries(&[entry.clone()]);
        store
            .save_downloads(&[entry.clone()], DownloadStatus::Queued)
            .unwrap();

        // wholesale replace with the same content
        let mut ingest = store.begin_ingest().unwrap();
        ingest.insert(&entry).unwrap();
        ingest.commit().unwrap();

        // the download row still joins against the fresh catalog
        let entries = store
            .read_download_entries(&[DownloadStatus::Queued])
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id(), entry.id());
    }

    #[test]
    fn test_search_round_trips_entry_fields() {
        let mut entry = film_entry("ARD", "News", "Round trip");
        entry.url_hd = "42|hd.mp4".to_string();
        let store = store_with_entries(&[entry.clone()]);

        let found = store.search(&["sender:ARD".to_string()]).unwrap();
        assert_eq!(found, vec![entry]);
    }

    #[test]
    fn test_search_with_parameters_filters() {
        let store = store_with_entries(&[
            film_entry("ARD", "News", "One"),
            film_entry("ZDF", "Doku", "Two"),
        ]);

        let found = store.search(&["thema:Doku".to_string()]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].station, "ZDF");

        let found = store.search(&["one".to_string(), "two".to_string()]).unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_raw_query_passthrough_executes() {
        let store = store_with_entries(&[
            film_entry("ARD", "News", "One"),
            film_entry("ZDF", "Doku", "Two"),
        ]);
        let found = store
            .search(&["select".to_string(), "*".to_string(), "from".to_string(), "films".to_string()])
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[test]
    fn test_save_downloads_is_insert_or_ignore() {
        let entry = film_entry("ARD", "News", "Once");
        let store = store_with_entries(&[entry.clone()]);

        assert_eq!(
            store
                .save_downloads(&[entry.clone()], DownloadStatus::Queued)
                .unwrap(),
            1
        );
        // second save is a no-op
        assert_eq!(
            store
                .save_downloads(&[entry.clone()], DownloadStatus::Queued)
                .unwrap(),
            0
        );

        // and it does not clobber an existing status
        store
            .update_download_status(&entry.id(), DownloadStatus::Failed)
            .unwrap();
        store
            .save_downloads(&[entry.clone()], DownloadStatus::Queued)
            .unwrap();
        let rows = store.read_download_list(&[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, DownloadStatus::Failed);
    }

    #[test]
    fn test_download_list_projection() {
        let entry = film_entry("ARD", "News", "Projected");
        let store = store_with_entries(&[entry.clone()]);
        store
            .save_downloads(&[entry.clone()], DownloadStatus::Queued)
            .unwrap();

        let rows = store.read_download_list(&[DownloadStatus::Queued]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, entry.id());
        assert_eq!(rows[0].station, "ARD");
        assert_eq!(rows[0].title, "Projected");
        assert_eq!(rows[0].date, entry.date);

        // no rows for other statuses
        assert!(store
            .read_download_list(&[DownloadStatus::Complete])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_delete_downloads() {
        let entry = film_entry("ARD", "News", "Doomed");
        let store = store_with_entries(&[entry.clone()]);
        store
            .save_downloads(&[entry.clone()], DownloadStatus::Queued)
            .unwrap();

        assert_eq!(store.delete_downloads(&[entry.id()]).unwrap(), 1);
        assert!(store.read_download_list(&[]).unwrap().is_empty());
        assert_eq!(store.delete_downloads(&[entry.id()]).unwrap(), 0);
    }

    #[test]
    fn test_recordings_round_trip() {
        let entry = film_entry("ARD", "News", "Saved");
        let store = store_with_entries(&[entry.clone()]);

        store
            .save_recording(&entry.id(), Path::new("/media/ard_saved.mp4"))
            .unwrap();
        let recordings = store.read_recordings().unwrap();
        assert_eq!(recordings.len(), 1);
        assert_eq!(recordings[0].station, "ARD");
        assert_eq!(recordings[0].file_path, "/media/ard_saved.mp4");
        assert_eq!(recordings[0].film_date, entry.date);

        assert_eq!(
            store
                .delete_recordings(&["/media/ard_saved.mp4".to_string()])
                .unwrap(),
            1
        );
        assert!(store.read_recordings().unwrap().is_empty());
    }

    #[test]
    fn test_recording_for_unknown_entry_is_a_noop() {
        let store = SqliteFilmStore::in_memory().unwrap();
        store
            .save_recording("no-such-id", Path::new("/media/x.mp4"))
            .unwrap();
        assert!(store.read_recordings().unwrap().is_empty());
    }

    #[test]
    fn test_status_upsert_by_key() {
        let store = SqliteFilmStore::in_memory().unwrap();
        store.save_status(STATUS_CATALOG_SIZE, Some("10")).unwrap();
        store.save_status(STATUS_CATALOG_SIZE, Some("20")).unwrap();

        let rows = store.read_status(&[STATUS_CATALOG_SIZE]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text.as_deref(), Some("20"));
    }

    #[test]
    fn test_commit_stamps_refresh_status() {
        let store = store_with_entries(&[
            film_entry("ARD", "News", "One"),
            film_entry("ZDF", "Doku", "Two"),
        ]);
        let rows = store
            .read_status(&[STATUS_LAST_REFRESH, STATUS_CATALOG_SIZE])
            .unwrap();
        assert_eq!(rows.len(), 2);
        let size = rows.iter().find(|r| r.key == STATUS_CATALOG_SIZE).unwrap();
        assert_eq!(size.text.as_deref(), Some("2"));
    }
}
