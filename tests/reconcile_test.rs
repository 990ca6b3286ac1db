mod common;

use std::{
    sync::{Arc, atomic::Ordering},
    time::Duration,
};

use chrono::Utc;
use common::*;
use mockito::{Matcher, Server};
use radiosync::config::ScheduleSettings;
use radiosync::management::{PlaylistCache, TokenManager, TrackCache};
use radiosync::reconcile::{Outcome, Reconciler};
use radiosync::spotify::{Catalog, SpotifyClient};
use radiosync::types::{Resolution, SongQuery};
use reqwest::Client;
use serde_json::json;
use tokio_util::sync::CancellationToken;

const BELFAST: &str = "Belfast+Child+Simple+Minds";

#[tokio::test]
async fn test_monthly_scenario_against_spotify() {
    let mut server = Server::new_async().await;
    let list = server
        .mock("GET", "/users/owner/playlists")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(json!({"items": [], "next": null}).to_string())
        .expect(1)
        .create_async()
        .await;
    let create = server
        .mock("POST", "/users/owner/playlists")
        .match_body(Matcher::Json(json!({"name": "StationName March 2024", "public": true})))
        .with_status(201)
        .with_body(json!({"id": "pl-march", "name": "StationName March 2024", "public": true}).to_string())
        .expect(1)
        .create_async()
        .await;
    let search = server
        .mock("GET", "/search")
        .match_query(Matcher::UrlEncoded("q".into(), "Belfast Child Simple Minds".into()))
        .with_status(200)
        .with_body(
            json!({"tracks": {"items": [
                {"id": "t55", "name": "Belfast Child", "popularity": 55, "uri": "spotify:track:t55", "artists": []},
                {"id": "t82", "name": "Belfast Child", "popularity": 82, "uri": "spotify:track:t82", "artists": []}
            ]}})
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let add = server
        .mock("POST", "/users/owner/playlists/pl-march/tracks")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("position".into(), "0".into()),
            Matcher::UrlEncoded("uris".into(), "spotify:track:t82".into()),
        ]))
        .with_status(201)
        .with_body(r#"{"snapshot_id":"s1"}"#)
        .expect(1)
        .create_async()
        .await;

    let (_dir, db) = temp_database().await;
    db.credentials()
        .save(&credential("test-token", "r1", Utc::now().timestamp()))
        .await
        .unwrap();
    let settings = settings(&server.url());
    let tokens = Arc::new(TokenManager::new(settings.clone(), db.credentials(), Client::new()).unwrap());
    let catalog: Arc<dyn Catalog> = Arc::new(SpotifyClient::new(Client::new(), &settings, tokens));

    let source = FakeSource::new("StationName", "Belfast Child", "Simple Minds");
    let reconciler = reconciler(&db, catalog, vec![source.boxed()]);

    let outcomes = reconciler.tick(march_2024()).await.unwrap();
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].song.as_ref().unwrap().as_str(), BELFAST);
    assert!(matches!(&outcomes[0].outcome, Outcome::Added(track) if track.id == "t82"));

    // The same song on the next tick is answered from storage
    let outcomes = reconciler.tick(march_2024()).await.unwrap();
    assert_eq!(outcomes[0].outcome, Outcome::AlreadyRecorded);

    list.assert_async().await;
    create.assert_async().await;
    search.assert_async().await;
    add.assert_async().await;

    let record = db
        .tracks()
        .get("pl-march", &SongQuery::from_normalized(BELFAST))
        .await
        .unwrap()
        .unwrap();
    match record.resolution {
        Resolution::Found(track) => assert_eq!(track.popularity, 82),
        Resolution::NotFound => panic!("expected a positive record"),
    }
    assert!(
        db.playlists()
            .get("StationName March 2024")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_recorded_song_is_never_searched_again() {
    let (_dir, db) = temp_database().await;
    let catalog = Arc::new(FakeCatalog::default().with_match(BELFAST, track("t82", 82)));
    let reconciler = reconciler(
        &db,
        catalog.clone(),
        vec![FakeSource::new("Red", "Belfast Child", "Simple Minds").boxed()],
    );

    for _ in 0..3 {
        reconciler.tick(march_2024()).await.unwrap();
    }

    assert_eq!(catalog.searches(), 1);
    assert_eq!(catalog.adds(), 1);
    assert_eq!(
        catalog.added.lock().unwrap().clone(),
        vec![("created-0".to_string(), "spotify:track:t82".to_string())]
    );
}

#[tokio::test]
async fn test_negative_result_survives_restart() {
    let (_dir, db) = temp_database().await;
    let catalog = Arc::new(FakeCatalog::default());

    let first = reconciler(
        &db,
        catalog.clone(),
        vec![FakeSource::new("Red", "WHITE TRASH BEAUTIFUL   ", "").boxed()],
    );
    let outcomes = first.tick(march_2024()).await.unwrap();
    assert_eq!(outcomes[0].outcome, Outcome::NotFound);
    drop(first);

    // A new reconciler over the same database stands in for a process restart
    let second = reconciler(
        &db,
        catalog.clone(),
        vec![FakeSource::new("Red", "WHITE TRASH BEAUTIFUL", "").boxed()],
    );
    let outcomes = second.tick(march_2024()).await.unwrap();
    assert_eq!(outcomes[0].outcome, Outcome::AlreadyRecorded);
    assert_eq!(catalog.searches(), 1);

    let sentinel = db
        .tracks()
        .get("created-0", &SongQuery::from_normalized("WHITE+TRASH+BEAUTIFUL+"))
        .await
        .unwrap()
        .unwrap();
    assert!(sentinel.is_negative());
}

#[tokio::test]
async fn test_failed_add_is_retried() {
    let (_dir, db) = temp_database().await;
    let catalog = Arc::new(FakeCatalog::default().with_match(BELFAST, track("t82", 82)));
    catalog.reject_adds.store(true, Ordering::SeqCst);
    let reconciler = reconciler(
        &db,
        catalog.clone(),
        vec![FakeSource::new("Red", "Belfast Child", "Simple Minds").boxed()],
    );

    let outcomes = reconciler.tick(march_2024()).await.unwrap();
    assert!(matches!(outcomes[0].outcome, Outcome::NotAdded(_)));

    catalog.reject_adds.store(false, Ordering::SeqCst);
    let outcomes = reconciler.tick(march_2024()).await.unwrap();
    assert!(matches!(outcomes[0].outcome, Outcome::Added(_)));

    assert_eq!(catalog.searches(), 2);
    assert_eq!(catalog.adds(), 2);
}

#[tokio::test]
async fn test_empty_source_touches_nothing() {
    let (_dir, db) = temp_database().await;
    let catalog = Arc::new(FakeCatalog::default().with_match(BELFAST, track("t82", 82)));
    let silent = FakeSource::silent("Eksen");
    let silent_calls = Arc::clone(&silent.calls);
    let reconciler = reconciler(
        &db,
        catalog.clone(),
        vec![
            silent.boxed(),
            FakeSource::new("Red", "Belfast Child", "Simple Minds").boxed(),
        ],
    );

    let outcomes = reconciler.tick(march_2024()).await.unwrap();
    assert_eq!(outcomes[0].outcome, Outcome::NoSong);
    assert!(matches!(outcomes[1].outcome, Outcome::Added(_)));
    assert_eq!(silent_calls.load(Ordering::SeqCst), 1);

    // Only the second source reached the catalog
    assert_eq!(catalog.lists(), 1);
    assert_eq!(catalog.searches(), 1);
    assert!(db.playlists().get("Eksen March 2024").await.unwrap().is_none());
}

#[tokio::test]
async fn test_fatal_error_aborts_remaining_sources() {
    let (_dir, db) = temp_database().await;
    let catalog = Arc::new(FakeCatalog::default());
    catalog.fail_auth.store(true, Ordering::SeqCst);
    let second = FakeSource::new("Eksen", "Africa", "Toto");
    let second_calls = Arc::clone(&second.calls);
    let reconciler = reconciler(
        &db,
        catalog.clone(),
        vec![
            FakeSource::new("Red", "Belfast Child", "Simple Minds").boxed(),
            second.boxed(),
        ],
    );

    let err = reconciler.tick(march_2024()).await.unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_playlist_resolution_is_cached() {
    let (_dir, db) = temp_database().await;
    let catalog = Arc::new(FakeCatalog::default());
    catalog
        .playlists
        .lock()
        .unwrap()
        .push(playlist("existing", "Red March 2024"));
    let cache = PlaylistCache::new(db.playlists(), catalog.clone(), OWNER);

    let first = cache.resolve("Red March 2024").await.unwrap().unwrap();
    let second = cache.resolve("Red March 2024").await.unwrap().unwrap();

    assert_eq!(first, second);
    assert_eq!(first.id, "existing");
    assert_eq!(catalog.lists(), 1);
    assert_eq!(catalog.creates(), 0);
    assert_eq!(cache.cached().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_playlist_created_once_when_missing() {
    let (_dir, db) = temp_database().await;
    let catalog = Arc::new(FakeCatalog::default());
    let cache = PlaylistCache::new(db.playlists(), catalog.clone(), OWNER);

    for _ in 0..3 {
        let resolved = cache.resolve("Joy March 2024").await.unwrap().unwrap();
        assert_eq!(resolved.id, "created-0");
    }
    assert_eq!(catalog.lists(), 1);
    assert_eq!(catalog.creates(), 1);
}

#[tokio::test]
async fn test_listing_failure_never_creates() {
    let (_dir, db) = temp_database().await;
    let catalog = Arc::new(FakeCatalog::default().with_match(BELFAST, track("t82", 82)));
    catalog.fail_listing.store(true, Ordering::SeqCst);
    let reconciler = reconciler(
        &db,
        catalog.clone(),
        vec![FakeSource::new("Red", "Belfast Child", "Simple Minds").boxed()],
    );

    let outcomes = reconciler.tick(march_2024()).await.unwrap();
    assert_eq!(outcomes[0].outcome, Outcome::NoPlaylist);
    assert_eq!(catalog.creates(), 0);
    assert_eq!(catalog.searches(), 0);

    // Nothing was cached, so the next tick looks the playlist up again
    catalog.fail_listing.store(false, Ordering::SeqCst);
    let outcomes = reconciler.tick(march_2024()).await.unwrap();
    assert!(matches!(outcomes[0].outcome, Outcome::Added(_)));
    assert_eq!(catalog.lists(), 2);
}

#[tokio::test]
async fn test_track_cache_records() {
    let (_dir, db) = temp_database().await;
    let cache = TrackCache::new(db.tracks());
    let target = playlist("pl1", "Red March 2024");
    let song = SongQuery::from_normalized(BELFAST);

    assert!(!cache.exists(&target, &song).await.unwrap());
    cache.record_not_found(&target, &song).await.unwrap();
    assert!(cache.exists(&target, &song).await.unwrap());

    // A later match overwrites the sentinel under the same key
    cache
        .record_found(&target, &song, track("t82", 82))
        .await
        .unwrap();
    let record = cache.get(&target, &song).await.unwrap().unwrap();
    assert!(!record.is_negative());
    assert_eq!(cache.for_playlist(&target).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_run_stops_on_cancellation() {
    let (_dir, db) = temp_database().await;
    let catalog: Arc<dyn Catalog> =
        Arc::new(FakeCatalog::default().with_match(BELFAST, track("t82", 82)));
    let source = FakeSource::new("Red", "Belfast Child", "Simple Minds");
    let calls = Arc::clone(&source.calls);
    let reconciler = Reconciler::new(
        vec![source.boxed()],
        Arc::clone(&catalog),
        PlaylistCache::new(db.playlists(), catalog, OWNER),
        TrackCache::new(db.tracks()),
        ScheduleSettings {
            short_sleep: Duration::from_secs(3600),
            long_sleep: Duration::from_secs(3600),
            quiet_after_hour: 23,
        },
        OWNER,
    );

    let cancel = CancellationToken::new();
    let handle = tokio::spawn({
        let cancel = cancel.clone();
        async move { reconciler.run(cancel).await }
    });

    // Let the first pass finish before cancelling the sleep
    while calls.load(Ordering::SeqCst) == 0 {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    tokio::time::sleep(Duration::from_millis(50)).await;
    cancel.cancel();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("run did not observe cancellation")
        .unwrap();
    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
