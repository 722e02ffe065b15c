//! Chunked record splitter over the catalog text stream.

use std::collections::VecDeque;
use std::io::Read;

use regex_lite::Regex;
use thiserror::Error;

use crate::film::{FilmEntry, InvalidField, FIELD_COUNT};

/// Default read size. Peak memory is a small multiple of this, not of the
/// catalog size.
pub const DEFAULT_CHUNK_SIZE: usize = 8 * 1024;

/// Which positional fields take part in carry-forward reconstruction.
///
/// The source omits a field when it repeats the previous segment's value.
/// Observed feeds only ever do this for station and topic, but some
/// variants have been seen omitting more, so the scope is configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InheritFields {
    /// Station and topic only.
    #[default]
    StationTopic,
    /// All 20 positional fields.
    All,
}

impl InheritFields {
    fn field_count(self) -> usize {
        match self {
            Self::StationTopic => 2,
            Self::All => FIELD_COUNT,
        }
    }
}

/// Fatal parse failure. No partial entry is ever emitted past one of
/// these; the offending raw segment is carried for diagnostics.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("reading catalog stream failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("catalog stream is not valid UTF-8")]
    Utf8,

    #[error("segment is not a JSON string array: {segment}")]
    Malformed { segment: String },

    #[error("segment has {found} fields, expected {expected}: {segment}")]
    FieldCount {
        expected: usize,
        found: usize,
        segment: String,
    },

    #[error("{source}: {segment}")]
    Field {
        #[source]
        source: InvalidField,
        segment: String,
    },
}

/// Lazy, forward-only iterator of catalog entries over a text stream.
///
/// Reads the source in fixed-size chunks, re-splitting the undecided tail
/// on the record marker, so the marker may straddle chunk boundaries
/// freely. The very first segment is catalog metadata and is discarded.
/// The first error is fatal: iteration ends after yielding it.
pub struct EntryStream<R: Read> {
    reader: R,
    chunk: Vec<u8>,
    /// Bytes read but not yet decodable as UTF-8 (a chunk boundary may
    /// split a multi-byte character).
    undecoded: Vec<u8>,
    /// Text after the last marker match, waiting for more input.
    carry: String,
    /// Complete raw segments not yet decoded.
    ready: VecDeque<String>,
    marker: Regex,
    header_skipped: bool,
    eof: bool,
    finished: bool,
    /// Previous segment after inheritance, the source of carry-forward
    /// values. Threaded here rather than any shared state.
    last_raw: Option<Vec<String>>,
    inherit: InheritFields,
}

impl<R: Read> EntryStream<R> {
    pub fn new(reader: R) -> Self {
        Self::with_options(reader, DEFAULT_CHUNK_SIZE, InheritFields::default())
    }

    pub fn with_options(reader: R, chunk_size: usize, inherit: InheritFields) -> Self {
        assert!(chunk_size > 0, "chunk size must be positive");
        Self {
            reader,
            chunk: vec![0; chunk_size],
            undecoded: Vec::new(),
            carry: String::new(),
            ready: VecDeque::new(),
            marker: Regex::new(r#",\s*"X"\s*:\s*"#).expect("static regex"),
            header_skipped: false,
            eof: false,
            finished: false,
            last_raw: None,
            inherit,
        }
    }

    /// Reads one chunk and moves the valid UTF-8 prefix into the carry.
    fn fill(&mut self) -> Result<(), ParseError> {
        let n = self.reader.read(&mut self.chunk)?;
        if n == 0 {
            self.eof = true;
            if !self.undecoded.is_empty() {
                return Err(ParseError::Utf8);
            }
            return Ok(());
        }
        self.undecoded.extend_from_slice(&self.chunk[..n]);

        let valid_up_to = match std::str::from_utf8(&self.undecoded) {
            Ok(s) => s.len(),
            Err(e) => {
                if e.error_len().is_some() {
                    return Err(ParseError::Utf8);
                }
                e.valid_up_to()
            }
        };
        if valid_up_to > 0 {
            self.carry.push_str(
                std::str::from_utf8(&self.undecoded[..valid_up_to]).expect("validated prefix"),
            );
            self.undecoded.drain(..valid_up_to);
            self.split_carry();
        }
        Ok(())
    }

    /// Re-splits the carry on the marker. Everything before the last match
    /// becomes ready segments, the remainder stays carried forward.
    fn split_carry(&mut self) {
        let mut parts: Vec<String> = self.marker.split(&self.carry).map(str::to_string).collect();
        if parts.len() <= 1 {
            return;
        }
        self.carry = parts.pop().expect("split yields at least one part");
        for part in parts {
            if !self.header_skipped {
                // first segment of the stream is list metadata, not an entry
                self.header_skipped = true;
                continue;
            }
            self.ready.push_back(part);
        }
    }

    /// The retained tail at end of stream is the final entry; the closing
    /// brace of the enclosing document is stripped off it.
    fn flush_tail(&mut self) -> Option<String> {
        let mut tail = std::mem::take(&mut self.carry);
        if !self.header_skipped {
            // no marker ever matched: the whole input was header metadata
            return None;
        }
        tail.truncate(tail.trim_end().len());
        if tail.ends_with('}') {
            tail.pop();
            tail.truncate(tail.trim_end().len());
        }
        if tail.is_empty() {
            None
        } else {
            Some(tail)
        }
    }

    /// Decodes one raw segment, applying carry-forward substitution before
    /// any typed interpretation.
    fn decode(&mut self, raw: &str) -> Result<FilmEntry, ParseError> {
        let mut fields: Vec<String> =
            serde_json::from_str(raw.trim()).map_err(|_| ParseError::Malformed {
                segment: raw.to_string(),
            })?;
        if fields.len() != FIELD_COUNT {
            return Err(ParseError::FieldCount {
                expected: FIELD_COUNT,
                found: fields.len(),
                segment: raw.to_string(),
            });
        }

        if let Some(last) = &self.last_raw {
            for i in 0..self.inherit.field_count() {
                if fields[i].is_empty() {
                    fields[i] = last[i].clone();
                }
            }
        }

        let entry = FilmEntry::from_fields(&fields).map_err(|source| ParseError::Field {
            source,
            segment: raw.to_string(),
        })?;
        self.last_raw = Some(fields);
        Ok(entry)
    }
}

impl<R: Read> Iterator for EntryStream<R> {
    type Item = Result<FilmEntry, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            if let Some(segment) = self.ready.pop_front() {
                let result = self.decode(&segment);
                if result.is_err() {
                    self.finished = true;
                }
                return Some(result);
            }
            if self.eof {
                self.finished = true;
                let tail = self.flush_tail()?;
                return Some(self.decode(&tail));
            }
            if let Err(e) = self.fill() {
                self.finished = true;
                return Some(Err(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{filmlist_text, raw_segment};

    fn parse_all(input: &str, chunk_size: usize) -> Vec<FilmEntry> {
        EntryStream::with_options(input.as_bytes(), chunk_size, InheritFields::default())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    fn three_segment_input() -> String {
        filmlist_text(&[
            raw_segment("ARD", "News", "Title1", "01.01.2024"),
            raw_segment("ZDF", "Magazin", "Title2", "02.01.2024"),
            raw_segment("ARTE", "Doku", "Title3", "03.01.2024"),
        ])
    }

    #[test]
    fn test_parses_all_segments_and_discards_header() {
        let entries = parse_all(&three_segment_input(), DEFAULT_CHUNK_SIZE);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].station, "ARD");
        assert_eq!(entries[2].title, "Title3");
    }

    #[test]
    fn test_chunk_size_does_not_change_the_result() {
        let input = three_segment_input();
        let whole = parse_all(&input, input.len());
        for chunk_size in [1, 7, 8192] {
            assert_eq!(parse_all(&input, chunk_size), whole, "chunk size {chunk_size}");
        }
    }

    #[test]
    fn test_final_entry_is_flushed_at_eof() {
        // the last segment has no trailing marker; it lives in the carry
        // until end of stream
        let entries = parse_all(&three_segment_input(), 16);
        assert_eq!(entries.last().unwrap().title, "Title3");
    }

    #[test]
    fn test_station_and_topic_inherit_from_previous_segment() {
        let input = filmlist_text(&[
            raw_segment("ARD", "News", "Title1", "01.01.2024"),
            raw_segment("", "News", "Title2", "02.01.2024"),
            raw_segment("", "", "Title3", "03.01.2024"),
        ]);
        let entries = parse_all(&input, DEFAULT_CHUNK_SIZE);
        assert_eq!(entries[1].station, "ARD");
        assert_eq!(entries[2].station, "ARD");
        assert_eq!(entries[2].topic, "News");
    }

    #[test]
    fn test_inheritance_scope_all_covers_every_field() {
        let mut second = raw_segment("", "News", "Title2", "");
        second[8] = String::new(); // url
        let input = filmlist_text(&[
            raw_segment("ARD", "News", "Title1", "01.01.2024"),
            second.clone(),
        ]);

        let narrow: Vec<_> =
            EntryStream::with_options(input.as_bytes(), 64, InheritFields::StationTopic)
                .collect::<Result<Vec<_>, _>>()
                .unwrap();
        assert_eq!(narrow[1].date, None);

        let wide: Vec<_> = EntryStream::with_options(input.as_bytes(), 64, InheritFields::All)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        assert_eq!(wide[1].date, narrow[0].date);
        assert_eq!(wide[1].url, narrow[0].url);
    }

    #[test]
    fn test_wrong_field_count_is_fatal_and_surfaces_segment() {
        let mut bad = raw_segment("ARD", "News", "Broken", "01.01.2024");
        bad.pop();
        let input = filmlist_text(&[
            raw_segment("ARD", "News", "Ok", "01.01.2024"),
            bad,
            raw_segment("ZDF", "Magazin", "Never reached", "02.01.2024"),
        ]);

        let mut stream = EntryStream::new(input.as_bytes());
        assert!(stream.next().unwrap().is_ok());
        let err = stream.next().unwrap().unwrap_err();
        match &err {
            ParseError::FieldCount { found, segment, .. } => {
                assert_eq!(*found, 19);
                assert!(segment.contains("Broken"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // fatal: iteration ends, the third segment is never parsed
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_non_json_segment_is_malformed() {
        let input = r#"{"Filmliste":["head"],"X":not json}"#;
        let mut stream = EntryStream::new(input.as_bytes());
        let err = stream.next().unwrap().unwrap_err();
        assert!(matches!(err, ParseError::Malformed { .. }));
    }

    #[test]
    fn test_bad_typed_field_is_fatal() {
        let input = filmlist_text(&[raw_segment("ARD", "News", "X", "31.31.2024")]);
        let mut stream = EntryStream::new(input.as_bytes());
        let err = stream.next().unwrap().unwrap_err();
        assert!(matches!(err, ParseError::Field { .. }));
    }

    #[test]
    fn test_header_only_input_yields_nothing() {
        let input = r#"{"Filmliste":["only","metadata"]}"#;
        let entries: Vec<_> = EntryStream::new(input.as_bytes()).collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_multibyte_characters_survive_chunk_splits() {
        let input = filmlist_text(&[raw_segment("ARD", "Größenwahn", "Übermütig", "01.01.2024")]);
        for chunk_size in [1, 3] {
            let entries = parse_all(&input, chunk_size);
            assert_eq!(entries[0].topic, "Größenwahn");
            assert_eq!(entries[0].title, "Übermütig");
        }
    }
}
