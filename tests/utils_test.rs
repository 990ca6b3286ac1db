use std::time::Duration;

use chrono::{TimeZone, Utc};
use radiosync::config::ScheduleSettings;
use radiosync::types::{Credential, SongQuery, TokenResponse};
use radiosync::utils::*;

#[test]
fn test_generate_state() {
    let state = generate_state();

    // Should be exactly 32 characters
    assert_eq!(state.len(), 32);

    // Should contain only alphanumeric characters
    assert!(state.chars().all(|c| c.is_ascii_alphanumeric()));

    // Two generated states should be different
    assert_ne!(state, generate_state());
}

#[test]
fn test_basic_credentials() {
    assert_eq!(
        basic_credentials("id", "secret"),
        "Basic aWQ6c2VjcmV0".to_string()
    );
}

#[test]
fn test_monthly_playlist_name() {
    let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    assert_eq!(monthly_playlist_name("Red", now), "Red March 2024");
    assert_eq!(
        monthly_playlist_name("Joy Turk Rock", now),
        "Joy Turk Rock March 2024"
    );

    // Month boundaries are taken in UTC
    let new_year = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(monthly_playlist_name("Eksen", new_year), "Eksen January 2025");
}

#[test]
fn test_next_sleep_daytime() {
    let schedule = ScheduleSettings::default();
    let noon = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
    assert_eq!(next_sleep(noon, &schedule), Duration::from_secs(240));

    // The quiet hour itself still counts as daytime
    let ten_pm = Utc.with_ymd_and_hms(2024, 3, 15, 22, 59, 0).unwrap();
    assert_eq!(next_sleep(ten_pm, &schedule), Duration::from_secs(240));
}

#[test]
fn test_next_sleep_overnight() {
    let schedule = ScheduleSettings::default();
    let late = Utc.with_ymd_and_hms(2024, 3, 15, 23, 5, 0).unwrap();
    assert_eq!(
        next_sleep(late, &schedule),
        Duration::from_secs(8 * 60 * 60 + 240)
    );
}

#[test]
fn test_human_duration() {
    assert_eq!(human_duration(Duration::from_secs(240)), "4m 0s");
    assert_eq!(human_duration(Duration::from_secs(8 * 3600 + 240)), "8h 4m");
    assert_eq!(human_duration(Duration::from_secs(59)), "0m 59s");
}

#[test]
fn test_song_query_normalization() {
    let query = SongQuery::from_parts("Belfast Child", "Simple Minds").unwrap();
    assert_eq!(query.as_str(), "Belfast+Child+Simple+Minds");
    assert_eq!(query.search_terms(), "Belfast Child Simple Minds");
}

#[test]
fn test_song_query_empty_artist_keeps_separator() {
    let query = SongQuery::from_parts("WHITE TRASH BEAUTIFUL   ", "").unwrap();
    assert_eq!(query.as_str(), "WHITE+TRASH+BEAUTIFUL+");
    assert_eq!(query.search_terms(), "WHITE TRASH BEAUTIFUL");
}

#[test]
fn test_song_query_collapses_whitespace() {
    let query = SongQuery::from_parts("  Under \t the   Bridge ", " Red Hot\nChili Peppers").unwrap();
    assert_eq!(query.as_str(), "Under+the+Bridge+Red+Hot+Chili+Peppers");
}

#[test]
fn test_song_query_blank_is_none() {
    assert!(SongQuery::from_parts("   ", "").is_none());
    assert!(SongQuery::from_parts("", "").is_none());
}

#[test]
fn test_credential_validity_margin() {
    let credential = Credential {
        access_token: "abc".to_string(),
        refresh_token: "r1".to_string(),
        token_type: "Bearer".to_string(),
        scope: String::new(),
        expires_in: 3600,
        issued_at: 1_000,
    };

    assert!(credential.is_valid_at(1_000 + 3589, 10));
    // Within the last ten seconds the token is treated as expired
    assert!(!credential.is_valid_at(1_000 + 3590, 10));
    assert_eq!(credential.authorization(), "Bearer abc");
}

#[test]
fn test_credential_keeps_previous_refresh_token() {
    let response: TokenResponse = serde_json::from_str(
        r#"{"access_token":"new","token_type":"Bearer","scope":"s","expires_in":3600}"#,
    )
    .unwrap();
    let credential = Credential::from_response(response, "r1", 42);
    assert_eq!(credential.refresh_token, "r1");
    assert_eq!(credential.issued_at, 42);

    let response: TokenResponse = serde_json::from_str(
        r#"{"access_token":"new","refresh_token":"r2","expires_in":3600}"#,
    )
    .unwrap();
    let credential = Credential::from_response(response, "r1", 42);
    assert_eq!(credential.refresh_token, "r2");
    assert_eq!(credential.token_type, "Bearer");
}
