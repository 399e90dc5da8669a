//! Podcast catalog records and the static genre table.
//!
//! Records come straight from the remote JSON payload. Decoding is lenient:
//! a record with a missing or null title, genre list, or season count still
//! decodes, and a record that cannot be decoded at all is skipped, so a single
//! malformed entry never takes the whole view down.

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use tracing::warn;

/// A single podcast show as delivered by the catalog API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Podcast {
  #[serde(default, deserialize_with = "string_or_number")]
  pub id: String,
  #[serde(default, deserialize_with = "null_as_default")]
  pub title: String,
  #[serde(default)]
  pub description: Option<String>,
  #[serde(default)]
  pub image: Option<String>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub genres: Vec<i64>,
  #[serde(default, deserialize_with = "null_as_default")]
  pub updated: String,
  #[serde(default, deserialize_with = "lenient_seasons")]
  pub seasons: Option<u32>,
}

impl Podcast {
  /// Season count, with a missing value counted as zero.
  pub fn season_count(&self) -> u32 {
    self.seasons.unwrap_or(0)
  }

  /// Parsed `updated` timestamp, or `None` when the field is not a recognisable date.
  pub fn updated_at(&self) -> Option<DateTime<Utc>> {
    parse_timestamp(&self.updated)
  }

  pub fn has_genre(&self, genre_id: i64) -> bool {
    self.genres.contains(&genre_id)
  }
}

/// Parse an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
  let raw = raw.trim();
  if raw.is_empty() {
    return None;
  }
  if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
    return Some(dt.with_timezone(&Utc));
  }
  NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|d| d.and_hms_opt(0, 0, 0)).map(|dt| dt.and_utc())
}

/// Catalog ids are strings in the API, but tolerate numeric ids too.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Id {
    Str(String),
    Num(serde_json::Number),
  }

  Ok(match Id::deserialize(deserializer)? {
    Id::Str(s) => s,
    Id::Num(n) => n.to_string(),
  })
}

/// An explicit `null` decodes the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
  D: Deserializer<'de>,
  T: Default + Deserialize<'de>,
{
  Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Anything that is not a non-negative integer reads as no season count.
fn lenient_seasons<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
  Ok(raw.as_ref().and_then(serde_json::Value::as_u64).and_then(|n| u32::try_from(n).ok()))
}

/// A genre the catalog can be filtered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Genre {
  pub id: i64,
  pub title: &'static str,
}

pub static GENRES: &[Genre] = &[
  Genre { id: 1, title: "Personal Growth" },
  Genre { id: 2, title: "Investigative Journalism" },
  Genre { id: 3, title: "History" },
  Genre { id: 4, title: "Comedy" },
  Genre { id: 5, title: "Entertainment" },
  Genre { id: 6, title: "Business" },
  Genre { id: 7, title: "Fiction" },
  Genre { id: 8, title: "News" },
  Genre { id: 9, title: "Kids and Family" },
];

/// Look up a genre's display title. Unknown ids render as `#id`.
pub fn genre_title(id: i64) -> String {
  GENRES.iter().find(|g| g.id == id).map_or_else(|| format!("#{}", id), |g| g.title.to_string())
}

/// Decode a catalog payload (a JSON array of podcasts).
///
/// The payload must be an array; individual records that fail to decode are
/// logged and skipped.
pub fn parse_catalog(json: &str) -> anyhow::Result<Vec<Podcast>> {
  let records: Vec<serde_json::Value> = serde_json::from_str(json).context("Catalog payload is not a JSON array")?;
  let total = records.len();
  let podcasts: Vec<Podcast> = records
    .into_iter()
    .enumerate()
    .filter_map(|(index, record)| match serde_json::from_value(record) {
      Ok(podcast) => Some(podcast),
      Err(e) => {
        warn!(index, err = %e, "catalog: skipping malformed record");
        None
      }
    })
    .collect();
  if podcasts.len() < total {
    warn!(kept = podcasts.len(), total, "catalog: some records were skipped");
  }
  Ok(podcasts)
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{Datelike, Timelike};

  #[test]
  fn parses_full_record() {
    let json = r#"[{
      "id": "10716",
      "title": "Something Was Wrong",
      "description": "An Emmy-nominated docuseries",
      "seasons": 14,
      "image": "https://example.com/img.jpg",
      "genres": [2, 1],
      "updated": "2022-11-03T07:00:00.000Z"
    }]"#;
    let podcasts = parse_catalog(json).unwrap();
    assert_eq!(podcasts.len(), 1);
    let p = &podcasts[0];
    assert_eq!(p.id, "10716");
    assert_eq!(p.title, "Something Was Wrong");
    assert_eq!(p.genres, vec![2, 1]);
    assert_eq!(p.seasons, Some(14));
    assert!(p.has_genre(1));
    assert!(!p.has_genre(3));
  }

  #[test]
  fn missing_fields_fall_back() {
    let podcasts = parse_catalog(r#"[{"id": "1"}]"#).unwrap();
    let p = &podcasts[0];
    assert_eq!(p.title, "");
    assert!(p.genres.is_empty());
    assert_eq!(p.season_count(), 0);
    assert!(p.updated_at().is_none());
  }

  #[test]
  fn null_seasons_counts_as_zero() {
    let podcasts = parse_catalog(r#"[{"id": "1", "seasons": null}]"#).unwrap();
    assert_eq!(podcasts[0].season_count(), 0);
  }

  #[test]
  fn null_fields_fall_back() {
    let json = r#"[
      {"id": "1", "title": "Good", "genres": [1], "updated": "2024-01-01", "seasons": 2},
      {"id": "2", "title": null},
      {"id": "3", "title": "No genres", "genres": null},
      {"id": "4", "title": "No date", "updated": null},
      {"id": "5", "title": "Negative", "seasons": -1},
      {"id": "6", "title": null, "description": null, "image": null, "genres": null, "updated": null, "seasons": null}
    ]"#;
    let podcasts = parse_catalog(json).unwrap();
    let ids: Vec<&str> = podcasts.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["1", "2", "3", "4", "5", "6"]);

    assert_eq!(podcasts[0].season_count(), 2);
    assert_eq!(podcasts[1].title, "");
    assert!(podcasts[2].genres.is_empty());
    assert!(podcasts[3].updated_at().is_none());
    assert_eq!(podcasts[4].season_count(), 0);
    assert_eq!(podcasts[5].title, "");
    assert!(podcasts[5].description.is_none());
  }

  #[test]
  fn undecodable_record_is_skipped() {
    let json = r#"[
      {"id": "1", "title": "Good"},
      {"id": "2", "title": "Bad genres", "genres": ["comedy"]},
      "not a record",
      {"id": "3", "title": 7}
    ]"#;
    let podcasts = parse_catalog(json).unwrap();
    assert_eq!(podcasts.len(), 1);
    assert_eq!(podcasts[0].title, "Good");
  }

  #[test]
  fn numeric_id_becomes_string() {
    let podcasts = parse_catalog(r#"[{"id": 42, "title": "x"}]"#).unwrap();
    assert_eq!(podcasts[0].id, "42");
  }

  #[test]
  fn malformed_payload_is_an_error() {
    assert!(parse_catalog(r#"{"not": "an array"}"#).is_err());
  }

  #[test]
  fn timestamp_formats() {
    let dt = parse_timestamp("2022-11-03T07:00:00.000Z").unwrap();
    assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2022, 11, 3, 7));

    let dt = parse_timestamp("2024-01-01").unwrap();
    assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2024, 1, 1, 0));

    assert!(parse_timestamp("yesterday").is_none());
    assert!(parse_timestamp("").is_none());
  }

  #[test]
  fn genre_titles() {
    assert_eq!(genre_title(3), "History");
    assert_eq!(genre_title(99), "#99");
  }
}
