//! End-to-end tests over the matching pipeline: credit splitting,
//! fuzzy acceptance, and multi-format extraction working together the
//! way the fetch and image-cache passes use them.

use serde_json::json;
use trackcer_backend::matching::{
    best_match, names_match, similarity_percent, split_artist_credit, PlayedTrack,
    NAME_MATCH_THRESHOLD,
};

#[test]
fn test_known_acts_survive_a_full_split_pass() {
    // Credits as they actually appear in recently-played payloads
    let cases: Vec<(&str, Vec<&str>)> = vec![
        ("Future, Metro Boomin", vec!["Future", "Metro Boomin"]),
        ("Earth, Wind & Fire", vec!["Earth, Wind & Fire"]),
        (
            "Tyler, The Creator & Kali Uchis",
            vec!["Tyler, The Creator", "Kali Uchis"],
        ),
        ("Silk Sonic (feat. Bootsy Collins)", vec!["Silk Sonic", "Bootsy Collins"]),
        ("Kool & The Gang", vec!["Kool & The Gang"]),
        ("Brooks & Dunn", vec!["Brooks & Dunn"]),
        ("Daft Punk ft. Pharrell Williams", vec!["Daft Punk", "Pharrell Williams"]),
    ];

    for (credit, expected) in cases {
        assert_eq!(split_artist_credit(credit), expected, "credit: {credit}");
    }
}

#[test]
fn test_split_then_match_accepts_search_result_casing() {
    // The image-cache pass splits a credit, then fuzzy-matches each act
    // against Spotify search results
    let names = split_artist_credit("metro boomin & future");
    assert_eq!(names, vec!["metro boomin", "future"]);

    let candidates = ["Metro Boomin", "Metro Station"];
    let (idx, score) = best_match(&names[0], &candidates).unwrap();
    assert_eq!(idx, 0);
    assert_eq!(score, 100.0);
}

#[test]
fn test_low_similarity_candidates_are_rejected() {
    // Below the threshold the lookup records a miss instead of caching a
    // wrong artist's image
    assert!(similarity_percent("Burial", "Burial Grounds") < NAME_MATCH_THRESHOLD);
    assert!(!names_match("Burial", "Burial Grounds"));
    assert_eq!(best_match("Burial", &["Burial Grounds", "Burials R Us"]), None);
}

#[test]
fn test_both_source_shapes_normalize_to_the_same_track() {
    let spotify_play = PlayedTrack::from_spotify_item(&json!({
        "played_at": "2024-03-01T12:30:00Z",
        "track": {
            "id": "sp-1",
            "name": "Nikes",
            "duration_ms": 314000,
            "artists": [{"name": "Frank Ocean"}],
            "album": {"name": "Blonde", "images": [{"url": "https://img/sp"}]}
        }
    }));

    let apple_play = PlayedTrack::from_apple_item(&json!({
        "id": "am-1",
        "attributes": {
            "name": "Nikes",
            "artistName": "Frank Ocean",
            "albumName": "Blonde",
            "durationInMillis": 314000,
            "genreNames": ["R&B/Soul"],
            "artwork": {"url": "https://img/{w}x{h}/am.jpg"}
        }
    }));

    // Same logical track across heterogeneous shapes
    assert_eq!(spotify_play.name, apple_play.name);
    assert_eq!(spotify_play.artist_credit, apple_play.artist_credit);
    assert_eq!(spotify_play.album, apple_play.album);
    assert_eq!(spotify_play.duration_ms, apple_play.duration_ms);

    // Shape-specific details still differ as expected
    assert!(spotify_play.genre.is_empty());
    assert_eq!(apple_play.genre, "R&B/Soul");
    assert_eq!(apple_play.artwork_url.as_deref(), Some("https://img/640x640/am.jpg"));
}

#[test]
fn test_credit_from_extraction_splits_cleanly() {
    // Spotify joins multiple artists into one credit; splitting must
    // recover the individual acts
    let play = PlayedTrack::from_spotify_item(&json!({
        "played_at": "2024-03-01T12:30:00Z",
        "track": {
            "id": "sp-2",
            "name": "Mask Off",
            "duration_ms": 204600,
            "artists": [{"name": "Future"}, {"name": "Metro Boomin"}],
            "album": {"name": "FUTURE", "images": []}
        }
    }));

    assert_eq!(play.artist_credit, "Future, Metro Boomin");
    assert_eq!(
        split_artist_credit(&play.artist_credit),
        vec!["Future", "Metro Boomin"]
    );
}

#[test]
fn test_threshold_is_eighty_five_percent() {
    assert_eq!(NAME_MATCH_THRESHOLD, 85.0);

    // 17 chars, 1 substitution: ~94.1% — accepted
    assert!(names_match("Kendrick Lamar Jr", "Kendrick Lamar Sr"));
    // 6 chars, 1 edit: ~83.3% — just below the threshold, rejected
    assert!(!names_match("Khalid", "Khaled"));
}
