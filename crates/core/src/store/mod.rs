//! Catalog, downloads, recordings and status persistence.
//!
//! One SQLite file holds everything. A catalog refresh builds into a
//! shadow table and swaps it in atomically, so readers never see a partial
//! catalog; downloads and recordings are keyed by the content-hash entry
//! id and survive refreshes. All writes serialize through the single
//! connection lock.

mod query;
mod sqlite;
mod types;

pub use query::{
    compile_terms, parse_terms, CompiledQuery, Connector, DateOp, QueryError, SearchExpr,
    SearchNode,
};
pub use sqlite::{
    Ingest, SqliteFilmStore, STATUS_CATALOG_SIZE, STATUS_LAST_DOWNLOAD, STATUS_LAST_REFRESH,
};
pub use types::{DownloadListRow, DownloadStatus, Recording, StatusEntry, StoreError};
