pub mod pkce;
pub mod spotify_auth;
