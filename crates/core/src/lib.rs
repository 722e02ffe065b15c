pub mod config;
pub mod downloader;
pub mod film;
pub mod filmlist;
pub mod filter;
pub mod store;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, CatalogConfig,
    Config, ConfigError, DatabaseConfig, ServerConfig,
};
pub use downloader::{
    transfer_from_config, CommandTransfer, DownloadError, DownloadOutcome, DownloadSummary,
    Downloader, DownloaderConfig, HttpTransfer, Transfer,
};
pub use film::{FilmEntry, InvalidField, Quality, FIELD_COUNT};
pub use filmlist::{
    ingest_catalog, open_source, update_catalog, EntryStream, IngestError, IngestOptions,
    IngestReport, InheritFields, ParseError, SourceError, SourceReader, UpdateSource,
    DEFAULT_CATALOG_URL, DEFAULT_CHUNK_SIZE,
};
pub use filter::{CompositeFilter, FilmFilter, HasDate, MaxAge, MinDuration};
pub use store::{
    compile_terms, parse_terms, CompiledQuery, DownloadListRow, DownloadStatus, QueryError,
    Recording, SqliteFilmStore, StatusEntry, StoreError, STATUS_CATALOG_SIZE,
    STATUS_LAST_DOWNLOAD, STATUS_LAST_REFRESH,
};
