//! Film entry model - one broadcast item from the published catalog.
//!
//! The catalog transmits each entry as a fixed-order list of 20 string
//! fields. [`FilmEntry`] is the normalized in-memory form; the stable
//! identifier is a content hash over the identifying fields, so re-ingesting
//! the same catalog produces the same ids.

mod types;

pub use types::*;
