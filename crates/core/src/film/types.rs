//! Types for the film entry model.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Number of positional fields in one raw catalog segment.
pub const FIELD_COUNT: usize = 20;

/// Separator used when hashing the identifying fields into the entry id.
const ID_FIELD_SEPARATOR: char = '\x1f';

/// Media quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    /// High-definition variant.
    Hd,
    /// Standard quality - the base URL of the entry.
    Sd,
    /// Reduced-bandwidth variant.
    Low,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hd => "HD",
            Self::Sd => "SD",
            Self::Low => "LOW",
        }
    }
}

impl std::fmt::Display for Quality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HD" => Ok(Self::Hd),
            "SD" => Ok(Self::Sd),
            "LOW" => Ok(Self::Low),
            _ => Err(format!("invalid quality: {s}")),
        }
    }
}

/// A raw field failed to parse into its typed form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field} value {value:?}")]
pub struct InvalidField {
    pub field: &'static str,
    pub value: String,
}

/// One normalized broadcast item from the catalog.
///
/// Field order mirrors the positional layout of the source segments. The
/// alternate-quality URLs (`url_small`, `url_hd` and their rtmp twins) hold
/// either a full URL or a compact `offset|suffix` diff against [`url`](Self::url).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilmEntry {
    pub station: String,
    pub topic: String,
    pub title: String,
    /// Broadcast date. `None` marks a live/placeholder stream; such entries
    /// are never stored.
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    /// Running time as transmitted (`HH:MM:SS`), `None` when unknown.
    pub duration: Option<NaiveTime>,
    /// Size in megabytes, 0 when the source field was empty.
    pub size_mb: u64,
    pub description: String,
    /// Base media URL (the SD variant).
    pub url: String,
    pub website: String,
    pub url_subtitles: String,
    pub url_rtmp: String,
    pub url_small: String,
    pub url_rtmp_small: String,
    pub url_hd: String,
    pub url_rtmp_hd: String,
    /// Broadcast instant as epoch seconds, when transmitted.
    pub date_l: Option<i64>,
    pub url_history: String,
    pub geo: String,
    pub new: bool,
}

impl FilmEntry {
    /// Builds an entry from the 20 raw positional fields of one segment.
    ///
    /// Empty optional fields become `None`; a non-empty field that fails to
    /// parse is an error (the whole segment is then rejected upstream).
    pub fn from_fields(fields: &[String]) -> Result<Self, InvalidField> {
        debug_assert_eq!(fields.len(), FIELD_COUNT);

        Ok(Self {
            station: fields[0].clone(),
            topic: fields[1].clone(),
            title: fields[2].clone(),
            date: parse_date_opt(&fields[3])?,
            time: parse_time_opt("time", &fields[4])?,
            duration: parse_time_opt("duration", &fields[5])?,
            size_mb: parse_u64_opt("size", &fields[6])?.unwrap_or(0),
            description: fields[7].clone(),
            url: fields[8].clone(),
            website: fields[9].clone(),
            url_subtitles: fields[10].clone(),
            url_rtmp: fields[11].clone(),
            url_small: fields[12].clone(),
            url_rtmp_small: fields[13].clone(),
            url_hd: fields[14].clone(),
            url_rtmp_hd: fields[15].clone(),
            date_l: parse_i64_opt("date_l", &fields[16])?,
            url_history: fields[17].clone(),
            geo: fields[18].clone(),
            new: fields[19] == "true",
        })
    }

    /// Stable content-addressed identifier.
    ///
    /// SHA-256 over (station, topic, title, date, time, url); re-ingesting
    /// the same catalog yields the same id for the same broadcast.
    pub fn id(&self) -> String {
        let date = self.date.map(|d| d.to_string()).unwrap_or_default();
        let time = self.time.map(|t| t.to_string()).unwrap_or_default();

        let mut hasher = Sha256::new();
        for part in [
            self.station.as_str(),
            self.topic.as_str(),
            self.title.as_str(),
            date.as_str(),
            time.as_str(),
            self.url.as_str(),
        ] {
            hasher.update(part.as_bytes());
            hasher.update([ID_FIELD_SEPARATOR as u8]);
        }
        format!("{:x}", hasher.finalize())
    }

    /// Running time in whole minutes, seconds above 30 rounding up.
    ///
    /// `None` when the catalog did not transmit a duration - callers must
    /// not treat such entries as "too short".
    pub fn duration_minutes(&self) -> Option<u32> {
        self.duration.map(|d| {
            let mut minutes = d.hour() * 60 + d.minute();
            if d.second() > 30 {
                minutes += 1;
            }
            minutes
        })
    }

    /// Resolves the media URL for a requested quality.
    ///
    /// Returns the actually available quality along with the URL; the two
    /// differ when the entry lacks the requested variant. The decision
    /// table is fixed: an SD request, or any request against an entry with
    /// no HD variant, yields the base URL; an HD request with an HD variant
    /// resolves it; a LOW request with an HD variant resolves the small
    /// variant (base URL when the small variant is absent too).
    pub fn preferred_url(&self, requested: Quality) -> (Quality, String) {
        if requested == Quality::Sd || self.url_hd.is_empty() {
            return (Quality::Sd, self.url.clone());
        }
        if requested == Quality::Hd {
            return (Quality::Hd, resolve_variant(&self.url, &self.url_hd));
        }
        if self.url_small.is_empty() {
            return (Quality::Sd, self.url.clone());
        }
        (Quality::Low, resolve_variant(&self.url, &self.url_small))
    }
}

/// Expands an alternate-quality field against the base URL.
///
/// The compact form is `offset|suffix`: keep the first `offset` bytes of
/// the base URL and append the suffix. Anything else is taken as a full URL.
fn resolve_variant(base: &str, variant: &str) -> String {
    if let Some((offset, suffix)) = variant.split_once('|') {
        if let Ok(offset) = offset.parse::<usize>() {
            if offset <= base.len() {
                return format!("{}{}", &base[..offset], suffix);
            }
        }
    }
    variant.to_string()
}

/// Parses a date in `D.M.Y` or ISO `Y-M-D` form, empty meaning absent.
fn parse_date_opt(value: &str) -> Result<Option<NaiveDate>, InvalidField> {
    if value.is_empty() {
        return Ok(None);
    }
    let format = if value.contains('.') { "%d.%m.%Y" } else { "%Y-%m-%d" };
    NaiveDate::parse_from_str(value, format)
        .map(Some)
        .map_err(|_| InvalidField {
            field: "date",
            value: value.to_string(),
        })
}

fn parse_time_opt(field: &'static str, value: &str) -> Result<Option<NaiveTime>, InvalidField> {
    if value.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .map(Some)
        .map_err(|_| InvalidField {
            field,
            value: value.to_string(),
        })
}

fn parse_u64_opt(field: &'static str, value: &str) -> Result<Option<u64>, InvalidField> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| InvalidField {
        field,
        value: value.to_string(),
    })
}

fn parse_i64_opt(field: &'static str, value: &str) -> Result<Option<i64>, InvalidField> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse().map(Some).map_err(|_| InvalidField {
        field,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::film_entry;

    fn raw_fields() -> Vec<String> {
        [
            "ARD",
            "Tagesschau",
            "Tagesschau 20:00",
            "01.02.2024",
            "20:00:00",
            "00:15:31",
            "320",
            "Nachrichten des Tages",
            "https://media.example/ard/tagesschau_sd.mp4",
            "https://example/ard/tagesschau",
            "https://media.example/ard/tagesschau.ttml",
            "",
            "35|klein.mp4",
            "",
            "35|hd.mp4",
            "",
            "1706817600",
            "",
            "",
            "true",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    #[test]
    fn test_from_fields_parses_typed_values() {
        let entry = FilmEntry::from_fields(&raw_fields()).unwrap();
        assert_eq!(entry.station, "ARD");
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(entry.time, NaiveTime::from_hms_opt(20, 0, 0));
        assert_eq!(entry.size_mb, 320);
        assert_eq!(entry.date_l, Some(1706817600));
        assert!(entry.new);
    }

    #[test]
    fn test_from_fields_accepts_iso_date() {
        let mut fields = raw_fields();
        fields[3] = "2024-02-01".to_string();
        let entry = FilmEntry::from_fields(&fields).unwrap();
        assert_eq!(entry.date, NaiveDate::from_ymd_opt(2024, 2, 1));
    }

    #[test]
    fn test_from_fields_rejects_garbage_date() {
        let mut fields = raw_fields();
        fields[3] = "not-a-date".to_string();
        let err = FilmEntry::from_fields(&fields).unwrap_err();
        assert_eq!(err.field, "date");
    }

    #[test]
    fn test_empty_optionals_become_none() {
        let mut fields = raw_fields();
        fields[3].clear();
        fields[4].clear();
        fields[5].clear();
        fields[6].clear();
        fields[16].clear();
        let entry = FilmEntry::from_fields(&fields).unwrap();
        assert_eq!(entry.date, None);
        assert_eq!(entry.time, None);
        assert_eq!(entry.duration, None);
        assert_eq!(entry.size_mb, 0);
        assert_eq!(entry.date_l, None);
    }

    #[test]
    fn test_id_is_deterministic_and_content_addressed() {
        let a = FilmEntry::from_fields(&raw_fields()).unwrap();
        let b = FilmEntry::from_fields(&raw_fields()).unwrap();
        assert_eq!(a.id(), b.id());

        let mut fields = raw_fields();
        fields[2] = "Tagesschau 20:15".to_string();
        let c = FilmEntry::from_fields(&fields).unwrap();
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn test_duration_rounds_seconds_up_past_half_minute() {
        let entry = FilmEntry::from_fields(&raw_fields()).unwrap();
        // 00:15:31 rounds up
        assert_eq!(entry.duration_minutes(), Some(16));

        let mut fields = raw_fields();
        fields[5] = "00:15:30".to_string();
        let entry = FilmEntry::from_fields(&fields).unwrap();
        assert_eq!(entry.duration_minutes(), Some(15));
    }

    #[test]
    fn test_preferred_url_hd_applies_offset_diff() {
        let entry = FilmEntry::from_fields(&raw_fields()).unwrap();
        let (quality, url) = entry.preferred_url(Quality::Hd);
        assert_eq!(quality, Quality::Hd);
        assert_eq!(url, "https://media.example/ard/hd.mp4");
    }

    #[test]
    fn test_preferred_url_falls_back_to_base_without_hd_variant() {
        let mut entry = film_entry("ZDF", "Magazin", "Folge 3");
        entry.url_hd = String::new();
        let (quality, url) = entry.preferred_url(Quality::Hd);
        assert_eq!(quality, Quality::Sd);
        assert_eq!(url, entry.url);
    }

    #[test]
    fn test_preferred_url_sd_request_returns_base() {
        let entry = FilmEntry::from_fields(&raw_fields()).unwrap();
        let (quality, url) = entry.preferred_url(Quality::Sd);
        assert_eq!(quality, Quality::Sd);
        assert_eq!(url, entry.url);
    }

    #[test]
    fn test_preferred_url_low_resolves_small_variant() {
        let entry = FilmEntry::from_fields(&raw_fields()).unwrap();
        let (quality, url) = entry.preferred_url(Quality::Low);
        assert_eq!(quality, Quality::Low);
        assert_eq!(url, "https://media.example/ard/klein.mp4");
    }

    #[test]
    fn test_variant_with_full_url_is_used_verbatim() {
        let mut entry = film_entry("ZDF", "Magazin", "Folge 3");
        entry.url_hd = "https://cdn.example/other/full_hd.mp4".to_string();
        let (quality, url) = entry.preferred_url(Quality::Hd);
        assert_eq!(quality, Quality::Hd);
        assert_eq!(url, "https://cdn.example/other/full_hd.mp4");
    }
}
