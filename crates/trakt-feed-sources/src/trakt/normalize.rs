//! Reduction of Trakt list payloads to [`NormalizedItem`]s.
//!
//! Trakt wraps media differently per endpoint: trending and watchlist rows
//! carry a `movie` or `show` object, playback progress carries both `show` and
//! `episode`, and some endpoints return the media object itself. Each raw row
//! is classified into a [`RecordShape`] before any field is read.

use serde_json::{Map, Value};
use trakt_feed_models::{IdScheme, MediaKind, NormalizedItem};

/// What to extract from each record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub id_scheme: IdScheme,
    pub media_kind: bool,
    pub title: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            id_scheme: IdScheme::Imdb,
            media_kind: true,
            title: false,
        }
    }
}

impl NormalizeOptions {
    pub fn new(id_scheme: IdScheme) -> Self {
        Self {
            id_scheme,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordShape<'a> {
    /// `{show, episode}` rows from the playback feed; the show is the item
    ProgressWrapped(&'a Value),
    MovieWrapped(&'a Value),
    ShowWrapped(&'a Value),
    /// Output of this module fed back in (`{id, type, mediaType?, title?}`)
    Normalized(&'a Map<String, Value>),
    Bare(&'a Value),
}

fn object_field<'a>(record: &'a Value, key: &str) -> Option<&'a Value> {
    record.get(key).filter(|v| v.is_object())
}

impl<'a> RecordShape<'a> {
    pub fn classify(record: &'a Value) -> Self {
        let movie = object_field(record, "movie");
        let show = object_field(record, "show");
        let episode = object_field(record, "episode");

        match (movie, show, episode) {
            (_, Some(show), Some(_)) => RecordShape::ProgressWrapped(show),
            (Some(movie), _, _) => RecordShape::MovieWrapped(movie),
            (None, Some(show), _) => RecordShape::ShowWrapped(show),
            _ => match record.as_object() {
                Some(map) if is_normalized(map) => RecordShape::Normalized(map),
                _ => RecordShape::Bare(record),
            },
        }
    }

    /// The media object whose `ids` identify the item
    pub fn media(&self) -> Option<&'a Value> {
        match *self {
            RecordShape::ProgressWrapped(v)
            | RecordShape::MovieWrapped(v)
            | RecordShape::ShowWrapped(v)
            | RecordShape::Bare(v) => Some(v),
            RecordShape::Normalized(_) => None,
        }
    }

    pub fn media_kind(&self) -> Option<MediaKind> {
        match *self {
            RecordShape::ProgressWrapped(_) | RecordShape::ShowWrapped(_) => Some(MediaKind::Tv),
            RecordShape::MovieWrapped(_) => Some(MediaKind::Movie),
            RecordShape::Bare(v) => {
                // Only show objects carry an episode count
                if v.get("aired_episodes").is_some() {
                    Some(MediaKind::Tv)
                } else {
                    Some(MediaKind::Movie)
                }
            }
            RecordShape::Normalized(map) => map
                .get("mediaType")
                .and_then(|v| serde_json::from_value(v.clone()).ok()),
        }
    }
}

fn is_normalized(map: &Map<String, Value>) -> bool {
    !map.contains_key("ids")
        && map.get("id").map_or(false, Value::is_string)
        && map
            .get("type")
            .and_then(Value::as_str)
            .map_or(false, |t| t == "imdb" || t == "tmdb")
}

/// Pull the identifier for `scheme` out of a media object's `ids`.
///
/// IMDb ids are strings and pass through unchanged. TMDB ids are numeric and
/// are stringified; digit-only strings are accepted too.
pub fn extract_id(media: &Value, scheme: IdScheme) -> Option<String> {
    let ids = media.get("ids")?.as_object()?;
    let raw = ids.get(scheme.as_str())?;

    match scheme {
        IdScheme::Imdb => raw
            .as_str()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string),
        IdScheme::Tmdb => match raw {
            Value::Number(n) => n.as_u64().map(|id| id.to_string()),
            Value::String(s) if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) => {
                Some(s.clone())
            }
            _ => None,
        },
    }
}

pub fn normalize_record(record: &Value, options: &NormalizeOptions) -> Option<NormalizedItem> {
    let shape = RecordShape::classify(record);

    let (external_id, title) = match shape {
        RecordShape::Normalized(map) => {
            let scheme = map.get("type").and_then(Value::as_str)?;
            if scheme != options.id_scheme.as_str() {
                return None;
            }
            let id = map.get("id").and_then(Value::as_str).filter(|s| !s.is_empty())?;
            (id.to_string(), map.get("title").and_then(Value::as_str))
        }
        _ => {
            let media = shape.media()?;
            let id = extract_id(media, options.id_scheme)?;
            (id, media.get("title").and_then(Value::as_str))
        }
    };

    let mut item = NormalizedItem::new(external_id, options.id_scheme);
    if options.media_kind {
        item.media_kind = shape.media_kind();
    }
    if options.title {
        item.title = title.map(str::to_string);
    }
    Some(item)
}

/// Normalize a list payload. Anything that is not a JSON array yields nothing;
/// rows without the selected identifier are dropped.
pub fn normalize_records(payload: &Value, options: &NormalizeOptions) -> Vec<NormalizedItem> {
    match payload.as_array() {
        Some(records) => records
            .iter()
            .filter_map(|record| normalize_record(record, options))
            .collect(),
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tmdb() -> NormalizeOptions {
        NormalizeOptions::new(IdScheme::Tmdb)
    }

    #[test]
    fn test_show_without_imdb_is_dropped_under_imdb_policy() {
        let record = json!({"show": {"ids": {"tmdb": 1396}}});
        assert_eq!(normalize_record(&record, &NormalizeOptions::default()), None);

        let item = normalize_record(&record, &tmdb()).unwrap();
        assert_eq!(item, NormalizedItem::new("1396", IdScheme::Tmdb).with_media_kind(MediaKind::Tv));
    }

    #[test]
    fn test_progress_shape_resolves_to_show() {
        let record = json!({
            "progress": 41.2,
            "type": "episode",
            "episode": {"season": 1, "number": 3, "title": "...And the Bag's in the River", "ids": {"imdb": "tt0959621", "tmdb": 62087}},
            "show": {"title": "Breaking Bad", "ids": {"imdb": "tt0903747", "tmdb": 1396}}
        });

        assert!(matches!(RecordShape::classify(&record), RecordShape::ProgressWrapped(_)));

        let options = NormalizeOptions { title: true, ..NormalizeOptions::default() };
        let item = normalize_record(&record, &options).unwrap();
        assert_eq!(item.external_id, "tt0903747");
        assert_eq!(item.media_kind, Some(MediaKind::Tv));
        assert_eq!(item.title.as_deref(), Some("Breaking Bad"));
    }

    #[test]
    fn test_movie_wrapper_wins_over_show() {
        let record = json!({
            "movie": {"title": "Inception", "ids": {"imdb": "tt1375666"}},
            "show": {"title": "Other", "ids": {"imdb": "tt0000001"}}
        });
        let item = normalize_record(&record, &NormalizeOptions::default()).unwrap();
        assert_eq!(item.external_id, "tt1375666");
        assert_eq!(item.media_kind, Some(MediaKind::Movie));
    }

    #[test]
    fn test_null_wrappers_fall_through() {
        let record = json!({"movie": null, "show": {"ids": {"imdb": "tt0944947"}}});
        let item = normalize_record(&record, &NormalizeOptions::default()).unwrap();
        assert_eq!(item.external_id, "tt0944947");
        assert_eq!(item.media_kind, Some(MediaKind::Tv));
    }

    #[test]
    fn test_bare_media_kind_from_aired_episodes() {
        let show = json!({"title": "The Wire", "aired_episodes": 60, "ids": {"imdb": "tt0306414"}});
        let movie = json!({"title": "Heat", "ids": {"imdb": "tt0113277"}});

        assert!(matches!(RecordShape::classify(&show), RecordShape::Bare(_)));
        assert_eq!(normalize_record(&show, &NormalizeOptions::default()).unwrap().media_kind, Some(MediaKind::Tv));
        assert_eq!(normalize_record(&movie, &NormalizeOptions::default()).unwrap().media_kind, Some(MediaKind::Movie));
    }

    #[test]
    fn test_imdb_passes_through_verbatim() {
        let record = json!({"movie": {"ids": {"imdb": "tt0816692", "tmdb": 157336}}});
        let options = NormalizeOptions { media_kind: false, ..NormalizeOptions::default() };
        let item = normalize_record(&record, &options).unwrap();
        assert_eq!(item, NormalizedItem::new("tt0816692", IdScheme::Imdb));
    }

    #[test]
    fn test_missing_or_blank_ids_are_dropped() {
        let payload = json!([
            {"movie": {"title": "No ids"}},
            {"movie": {"ids": {"imdb": ""}}},
            {"movie": {"ids": {"imdb": null, "tmdb": 12}}},
            {"show": {"ids": {"tmdb": "not-a-number"}}},
            "garbage",
            42,
            {"movie": {"ids": {"imdb": "tt0133093", "tmdb": 603}}}
        ]);

        let imdb = normalize_records(&payload, &NormalizeOptions::default());
        assert_eq!(imdb.len(), 1);
        assert_eq!(imdb[0].external_id, "tt0133093");

        let tmdb_items = normalize_records(&payload, &tmdb());
        let ids: Vec<_> = tmdb_items.iter().map(|i| i.external_id.as_str()).collect();
        assert_eq!(ids, vec!["12", "603"]);
    }

    #[test]
    fn test_non_array_payload_yields_nothing() {
        assert!(normalize_records(&json!({"error": "nope"}), &NormalizeOptions::default()).is_empty());
        assert!(normalize_records(&Value::Null, &NormalizeOptions::default()).is_empty());
    }

    #[test]
    fn test_normalized_records_pass_through_matching_scheme() {
        let payload = json!([
            {"id": "tt0816692", "type": "imdb", "mediaType": "movie"},
            {"id": "1396", "type": "tmdb", "mediaType": "tv"}
        ]);

        let items = normalize_records(&payload, &NormalizeOptions::default());
        assert_eq!(items, vec![NormalizedItem::new("tt0816692", IdScheme::Imdb).with_media_kind(MediaKind::Movie)]);

        let items = normalize_records(&payload, &tmdb());
        assert_eq!(items, vec![NormalizedItem::new("1396", IdScheme::Tmdb).with_media_kind(MediaKind::Tv)]);
    }
}
