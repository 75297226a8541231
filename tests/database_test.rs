//! Repository tests against a live PostgreSQL instance.
//!
//! These run with `cargo test -- --ignored` once TEST_DATABASE_URL points
//! at a scratch database.

mod helpers;

use helpers::*;
use uuid::Uuid;

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_user_create_and_find() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "Nadia", "nadia@example.com").await;
    let found = db
        .user_repo
        .find_by_id(user.id)
        .await
        .expect("query failed")
        .expect("user missing");

    assert_users_equal(&user, &found);
    assert!(!found.has_spotify());

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_find_or_create_is_idempotent() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let first = db
        .user_repo
        .find_or_create_by_email("Sam", "sam@example.com")
        .await
        .expect("create failed");
    let second = db
        .user_repo
        .find_or_create_by_email("Sam", "sam@example.com")
        .await
        .expect("find failed");

    assert_users_equal(&first, &second);

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_insert_play_deduplicates_on_repoll() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "Ira", "ira@example.com").await;
    let played_at = ts("2024-03-01 12:30:00");

    let first_session = Uuid::new_v4();
    let inserted =
        insert_test_play(&db, user.id, "t1", "Mask Off", "Future", "", played_at, first_session)
            .await;
    assert!(inserted);

    // Same play seen again on the next polling run
    let second_session = Uuid::new_v4();
    let inserted_again =
        insert_test_play(&db, user.id, "t1", "Mask Off", "Future", "", played_at, second_session)
            .await;
    assert!(!inserted_again);

    let count = db
        .history_repo
        .count_for_session(first_session)
        .await
        .expect("count failed");
    assert_eq!(count, 1);

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_latest_played_at_tracks_cursor() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "Ira", "ira@example.com").await;
    let session = Uuid::new_v4();

    insert_test_play(&db, user.id, "t1", "A", "X", "", ts("2024-03-01 10:00:00"), session).await;
    insert_test_play(&db, user.id, "t2", "B", "X", "", ts("2024-03-01 11:00:00"), session).await;

    let latest = db
        .history_repo
        .latest_played_at(user.id, "spotify")
        .await
        .expect("query failed");
    assert_eq!(latest, Some(ts("2024-03-01 11:00:00")));

    let none = db
        .history_repo
        .latest_played_at(user.id, "apple_music")
        .await
        .expect("query failed");
    assert!(none.is_none());

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_genre_breakdown_buckets_unresolved_rows() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "Ira", "ira@example.com").await;
    let session = Uuid::new_v4();

    insert_test_play(&db, user.id, "t1", "A", "X", "rap", ts("2024-03-01 10:00:00"), session).await;
    insert_test_play(&db, user.id, "t2", "B", "X", "rap", ts("2024-03-01 11:00:00"), session).await;
    insert_test_play(&db, user.id, "t3", "C", "Y", "", ts("2024-03-01 12:00:00"), session).await;

    let breakdown = db
        .history_repo
        .genre_breakdown_for_user(user.id)
        .await
        .expect("query failed");

    assert_eq!(breakdown[0].genre, "rap");
    assert_eq!(breakdown[0].play_count, 2);
    assert!(breakdown.iter().any(|g| g.genre == "unknown" && g.play_count == 1));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_fill_missing_genre_only_touches_empty_rows() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "Ira", "ira@example.com").await;
    let session = Uuid::new_v4();

    insert_test_play(&db, user.id, "t1", "A", "Future", "", ts("2024-03-01 10:00:00"), session)
        .await;
    insert_test_play(&db, user.id, "t2", "B", "Future", "trap", ts("2024-03-01 11:00:00"), session)
        .await;

    let updated = db
        .history_repo
        .fill_missing_genre("future", "rap")
        .await
        .expect("update failed");
    assert_eq!(updated, 1);

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_producer_upsert_preserves_first_external_id() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let first = db
        .producer_repo
        .upsert_by_name("Metro Boomin", "genius", Some("158762"), None)
        .await
        .expect("upsert failed");

    let second = db
        .producer_repo
        .upsert_by_name("Metro Boomin", "discogs", Some("999"), Some("https://img"))
        .await
        .expect("upsert failed");

    assert_eq!(first.id, second.id);
    assert_eq!(second.external_id.as_deref(), Some("158762"));
    // Image was absent the first time, so the second write fills it
    assert_eq!(second.image_url.as_deref(), Some("https://img"));

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_follow_favourite_and_top_producers() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "Ira", "ira@example.com").await;
    let session = Uuid::new_v4();

    insert_test_play(&db, user.id, "t1", "Mask Off", "Future", "", ts("2024-03-01 10:00:00"), session).await;
    insert_test_play(&db, user.id, "t1", "Mask Off", "Future", "", ts("2024-03-01 11:00:00"), session).await;
    insert_test_play(&db, user.id, "t2", "Other", "X", "", ts("2024-03-01 12:00:00"), session).await;

    let metro = create_test_producer_with_track(&db, "Metro Boomin", "t1", "Mask Off").await;
    let other = create_test_producer_with_track(&db, "Someone Else", "t2", "Other").await;

    let top = db
        .producer_repo
        .top_for_user(user.id, 10)
        .await
        .expect("query failed");
    assert_eq!(top[0].name, "Metro Boomin");
    assert_eq!(top[0].play_count, 2);

    db.producer_repo
        .follow(user.id, other.id)
        .await
        .expect("follow failed");
    db.producer_repo
        .set_favourite(user.id, metro.id, true)
        .await
        .expect("favourite failed");

    let followed = db
        .producer_repo
        .followed_by_user(user.id)
        .await
        .expect("query failed");
    assert_eq!(followed.len(), 2);
    // Favourites sort first
    assert_eq!(followed[0].name, "Metro Boomin");
    assert!(followed[0].favourite);

    let removed = db
        .producer_repo
        .unfollow(user.id, other.id)
        .await
        .expect("unfollow failed");
    assert!(removed);

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_collaboration_edges_count_shared_tracks() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let metro = create_test_producer_with_track(&db, "Metro Boomin", "t1", "Mask Off").await;
    let southside = create_test_producer_with_track(&db, "Southside", "t1", "Mask Off").await;
    create_test_producer_with_track(&db, "Unrelated", "t9", "Elsewhere").await;

    db.producer_repo
        .link_track(metro.id, "spotify", "t2", "Too Many Nights", "Metro Boomin")
        .await
        .expect("link failed");
    db.producer_repo
        .link_track(southside.id, "spotify", "t2", "Too Many Nights", "Metro Boomin")
        .await
        .expect("link failed");

    let edges = db
        .producer_repo
        .collaborators_of(metro.id)
        .await
        .expect("query failed");

    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].name, "Southside");
    assert_eq!(edges[0].shared_tracks, 2);

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_unattributed_queue_shrinks_as_tracks_resolve() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "Ira", "ira@example.com").await;
    let session = Uuid::new_v4();

    insert_test_play(&db, user.id, "t1", "Mask Off", "Future", "", ts("2024-03-01 10:00:00"), session).await;
    insert_test_play(&db, user.id, "t2", "Nikes", "Frank Ocean", "", ts("2024-03-01 11:00:00"), session).await;
    insert_test_play(&db, user.id, "t3", "Obscure", "Nobody", "", ts("2024-03-01 12:00:00"), session).await;

    let queue = db
        .history_repo
        .find_unattributed(10)
        .await
        .expect("query failed");
    assert_eq!(queue.len(), 3);

    // One track gets a credit, one is recorded as unmatched
    create_test_producer_with_track(&db, "Metro Boomin", "t1", "Mask Off").await;
    db.unmatched_repo
        .record("spotify", "t3", "Obscure", "Nobody", "no producer credit")
        .await
        .expect("record failed");

    let queue = db
        .history_repo
        .find_unattributed(10)
        .await
        .expect("query failed");
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].track_external_id, "t2");

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_artist_image_cache_roundtrip() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "Ira", "ira@example.com").await;
    let session = Uuid::new_v4();
    insert_test_play(&db, user.id, "t1", "A", "Future", "", ts("2024-03-01 10:00:00"), session)
        .await;

    let uncached = db
        .history_repo
        .distinct_uncached_artist_names(10)
        .await
        .expect("query failed");
    assert_eq!(uncached, vec!["Future"]);

    db.artist_image_repo
        .upsert("Future", Some("sp-future"), Some("https://img/future"), "rap")
        .await
        .expect("upsert failed");

    // Lookup is case-insensitive and the credit no longer counts as uncached
    let cached = db
        .artist_image_repo
        .find_by_name("future")
        .await
        .expect("query failed")
        .expect("row missing");
    assert!(cached.is_resolved());

    let uncached = db
        .history_repo
        .distinct_uncached_artist_names(10)
        .await
        .expect("query failed");
    assert!(uncached.is_empty());

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_notifications_mark_read_scoped_to_user() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let ira = create_test_user(&db, "Ira", "ira@example.com").await;
    let sam = create_test_user(&db, "Sam", "sam@example.com").await;

    let note = db
        .notification_repo
        .create(ira.id, None, "Metro Boomin produced \"Mask Off\"")
        .await
        .expect("create failed");

    // Another user cannot read it away
    let updated = db
        .notification_repo
        .mark_read(note.id, sam.id)
        .await
        .expect("update failed");
    assert!(!updated);

    let updated = db
        .notification_repo
        .mark_read(note.id, ira.id)
        .await
        .expect("update failed");
    assert!(updated);

    let unread = db
        .notification_repo
        .find_for_user(ira.id, true, 10)
        .await
        .expect("query failed");
    assert!(unread.is_empty());

    db.cleanup().await;
}

#[tokio::test]
#[ignore = "requires a PostgreSQL database"]
async fn test_playlist_upsert_refreshes_metadata() {
    let db = TestDatabase::new().await;
    db.cleanup().await;

    let user = create_test_user(&db, "Ira", "ira@example.com").await;

    db.playlist_repo
        .upsert(user.id, "spotify", "pl-1", "Heavy Rotation", 40)
        .await
        .expect("upsert failed");
    let refreshed = db
        .playlist_repo
        .upsert(user.id, "spotify", "pl-1", "Heavy Rotation 2024", 42)
        .await
        .expect("upsert failed");

    assert_eq!(refreshed.name, "Heavy Rotation 2024");
    assert_eq!(refreshed.track_count, 42);

    let all = db
        .playlist_repo
        .find_for_user(user.id)
        .await
        .expect("query failed");
    assert_eq!(all.len(), 1);

    db.cleanup().await;
}
