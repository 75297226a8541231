//! Multi-format track field extraction.
//!
//! Spotify's recently-played items and Apple Music's recent-tracks items
//! carry the same information under different shapes. Extraction is
//! lenient: a missing field yields a default, never an error, so one odd
//! item cannot abort a whole batch.

use chrono::NaiveDateTime;
use serde_json::Value;

/// Default edge used when substituting Apple's `{w}x{h}` artwork template
const ARTWORK_EDGE: &str = "640";

/// One play event in source-independent form
#[derive(Debug, Clone, PartialEq)]
pub struct PlayedTrack {
    pub external_id: String,
    pub name: String,
    /// Free-text artist credit as given by the source
    pub artist_credit: String,
    pub album: String,
    pub genre: String,
    pub duration_ms: i64,
    pub artwork_url: Option<String>,
    /// None when the source does not report a timestamp (Apple); the
    /// ingest time is used instead.
    pub played_at: Option<NaiveDateTime>,
}

impl PlayedTrack {
    /// Extract from one Spotify `/me/player/recently-played` item
    pub fn from_spotify_item(item: &Value) -> Self {
        let track = &item["track"];

        let artist_credit = track["artists"]
            .as_array()
            .map(|artists| {
                artists
                    .iter()
                    .filter_map(|a| a["name"].as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        let artwork_url = track["album"]["images"]
            .as_array()
            .and_then(|images| images.first())
            .and_then(|image| image["url"].as_str())
            .map(str::to_string);

        Self {
            external_id: str_field(track, "id"),
            name: str_field(track, "name"),
            artist_credit,
            album: str_field(&track["album"], "name"),
            genre: String::new(),
            duration_ms: track["duration_ms"].as_i64().unwrap_or(0),
            artwork_url,
            played_at: parse_timestamp(item["played_at"].as_str()),
        }
    }

    /// Extract from one Apple Music `/me/recent/played/tracks` item
    pub fn from_apple_item(item: &Value) -> Self {
        let attributes = &item["attributes"];

        let artwork_url = attributes["artwork"]["url"]
            .as_str()
            .map(|template| {
                template
                    .replace("{w}", ARTWORK_EDGE)
                    .replace("{h}", ARTWORK_EDGE)
            });

        let genre = attributes["genreNames"]
            .as_array()
            .and_then(|genres| genres.first())
            .and_then(|g| g.as_str())
            .unwrap_or_default()
            .to_string();

        Self {
            external_id: str_field(item, "id"),
            name: str_field(attributes, "name"),
            artist_credit: str_field(attributes, "artistName"),
            album: str_field(attributes, "albumName"),
            genre,
            duration_ms: attributes["durationInMillis"].as_i64().unwrap_or(0),
            artwork_url,
            played_at: parse_timestamp(attributes["lastPlayedDate"].as_str()),
        }
    }

    /// An item without an id or name cannot be stored or matched
    pub fn is_usable(&self) -> bool {
        !self.external_id.is_empty() && !self.name.is_empty()
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value[key].as_str().unwrap_or_default().to_string()
}

/// RFC 3339 timestamp to a naive UTC timestamp; None on anything else
fn parse_timestamp(raw: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw?;
    chrono::DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spotify_item() -> Value {
        json!({
            "played_at": "2024-03-01T12:30:00.000Z",
            "track": {
                "id": "5ghIJDpPoe3CfHMGu71E6T",
                "name": "Mask Off",
                "duration_ms": 204600,
                "artists": [
                    {"name": "Future"},
                    {"name": "Metro Boomin"}
                ],
                "album": {
                    "name": "FUTURE",
                    "images": [
                        {"url": "https://i.scdn.co/image/large", "width": 640},
                        {"url": "https://i.scdn.co/image/small", "width": 64}
                    ]
                }
            }
        })
    }

    fn apple_item() -> Value {
        json!({
            "id": "1440881047",
            "type": "songs",
            "attributes": {
                "name": "Mask Off",
                "artistName": "Future",
                "albumName": "FUTURE",
                "durationInMillis": 204600,
                "genreNames": ["Hip-Hop/Rap", "Music"],
                "artwork": {
                    "url": "https://is1-ssl.mzstatic.com/image/{w}x{h}bb.jpg",
                    "width": 3000,
                    "height": 3000
                }
            }
        })
    }

    #[test]
    fn test_spotify_extraction() {
        let play = PlayedTrack::from_spotify_item(&spotify_item());
        assert_eq!(play.external_id, "5ghIJDpPoe3CfHMGu71E6T");
        assert_eq!(play.name, "Mask Off");
        assert_eq!(play.artist_credit, "Future, Metro Boomin");
        assert_eq!(play.album, "FUTURE");
        assert_eq!(play.duration_ms, 204600);
        assert_eq!(
            play.artwork_url.as_deref(),
            Some("https://i.scdn.co/image/large")
        );
        assert!(play.played_at.is_some());
        assert!(play.genre.is_empty());
        assert!(play.is_usable());
    }

    #[test]
    fn test_apple_extraction() {
        let play = PlayedTrack::from_apple_item(&apple_item());
        assert_eq!(play.external_id, "1440881047");
        assert_eq!(play.name, "Mask Off");
        assert_eq!(play.artist_credit, "Future");
        assert_eq!(play.album, "FUTURE");
        assert_eq!(play.duration_ms, 204600);
        assert_eq!(play.genre, "Hip-Hop/Rap");
        assert!(play.played_at.is_none());
        assert!(play.is_usable());
    }

    #[test]
    fn test_apple_artwork_template_substitution() {
        let play = PlayedTrack::from_apple_item(&apple_item());
        assert_eq!(
            play.artwork_url.as_deref(),
            Some("https://is1-ssl.mzstatic.com/image/640x640bb.jpg")
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let play = PlayedTrack::from_spotify_item(&json!({}));
        assert!(play.external_id.is_empty());
        assert!(play.artist_credit.is_empty());
        assert_eq!(play.duration_ms, 0);
        assert!(play.artwork_url.is_none());
        assert!(play.played_at.is_none());
        assert!(!play.is_usable());
    }

    #[test]
    fn test_apple_last_played_date_parses() {
        let mut item = apple_item();
        item["attributes"]["lastPlayedDate"] =
            Value::String("2024-03-01T12:30:00Z".to_string());
        let play = PlayedTrack::from_apple_item(&item);
        assert!(play.played_at.is_some());
    }

    #[test]
    fn test_bad_timestamp_is_none() {
        let mut item = spotify_item();
        item["played_at"] = Value::String("not-a-date".to_string());
        let play = PlayedTrack::from_spotify_item(&item);
        assert!(play.played_at.is_none());
    }
}
