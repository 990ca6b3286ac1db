use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, SecondsFormat, Timelike, Utc};
use rand::{Rng, distr::Alphanumeric};

use crate::config::ScheduleSettings;

/// Random value for the OAuth `state` parameter.
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// `Basic` authorization header value for the token endpoint.
pub fn basic_credentials(client_id: &str, client_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{client_id}:{client_secret}"))
    )
}

/// Playlist collecting a station's songs for the month of `now`,
/// e.g. `Red March 2024`.
pub fn monthly_playlist_name(label: &str, now: DateTime<Utc>) -> String {
    format!("{} {}", label, now.format("%B %Y"))
}

/// How long to wait before the next reconciliation pass.
///
/// Stations change songs every few minutes during the day. Late in the
/// evening (UTC hour strictly after `quiet_after_hour`) they are assumed to be
/// in overnight rotation, so the long pause is taken before the regular one.
pub fn next_sleep(now: DateTime<Utc>, schedule: &ScheduleSettings) -> Duration {
    if now.hour() > schedule.quiet_after_hour {
        schedule.long_sleep + schedule.short_sleep
    } else {
        schedule.short_sleep
    }
}

pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Formats a duration as `4m 0s` / `8h 4m` for log lines.
pub fn human_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m {seconds}s")
    }
}
