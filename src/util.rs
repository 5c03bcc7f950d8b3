use once_cell::sync::Lazy;
use regex::Regex;

static PROFILE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"spotify\.com/user/([^/?]+)").expect("valid profile url regex"));

/// Extract the Spotify user id from a profile link such as
/// `https://open.spotify.com/user/abc123?si=...`.
/// Returns None when the link does not point at a user profile.
pub fn spotify_user_id_from_url(url: &str) -> Option<String> {
    PROFILE_URL_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn track_uri(track_id: &str) -> String {
    format!("spotify:track:{}", track_id)
}
