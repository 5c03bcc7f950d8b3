//! Core library for sato: PKCE authorization, blends and track tournaments
pub mod config;
pub mod models;
pub mod api;
pub mod blend;
pub mod tournament;
pub mod util;
