//! Streaming access to the published catalog.
//!
//! The catalog arrives as one huge XZ-compressed text document: a header
//! segment followed by back-to-back entry segments, each a JSON array of 20
//! strings, separated by a recurring `"X":` marker. [`EntryStream`] splits
//! that stream in fixed-size chunks so peak memory stays independent of the
//! catalog size; [`open_source`] resolves where the bytes come from;
//! [`ingest_catalog`] drives a full refresh into the store.

mod ingest;
mod parser;
mod source;

pub use ingest::{ingest_catalog, update_catalog, IngestError, IngestOptions, IngestReport};
pub use parser::{EntryStream, InheritFields, ParseError, DEFAULT_CHUNK_SIZE};
pub use source::{open_source, SourceError, SourceReader, UpdateSource, DEFAULT_CATALOG_URL};
