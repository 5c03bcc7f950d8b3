use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sato as lib;
use lib::api::pkce::{self, PkcePair};
use lib::config::Config;
use lib::models::{AudioFeatures, AudioFilters, FriendTracks, UserTracks};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::subscriber as tracing_subscriber_global;
use tracing_appender::rolling::RollingFileAppender;
use tracing_log::LogTracer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "sato", version)]
struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a PKCE verifier and its S256 challenge
    Pkce {
        /// Verifier length; defaults to verifier_length from the config
        #[arg(long)]
        length: Option<usize>,
    },
    /// Print the S256 challenge for a given verifier
    Challenge {
        verifier: String,
    },
    /// Authorize with Spotify (interactive) and print the token request
    Authorize,
    /// Blend several users' weighted tracks (JSON input)
    Blend {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
    },
    /// Rank tracks for a weighted friends blend (JSON input)
    Rank {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
    },
    /// Build a tournament bracket from a JSON array of track ids
    Bracket {
        #[arg(long, value_name = "FILE")]
        input: PathBuf,
    },
    /// Validate config file and exit
    ConfigValidate,
}

#[derive(Deserialize)]
struct BlendInput {
    users: Vec<UserTracks>,
    #[serde(default)]
    filters: AudioFilters,
    #[serde(default)]
    features: AudioFeatures,
}

#[derive(Deserialize)]
struct RankInput {
    #[serde(default)]
    own_top_tracks: Vec<String>,
    #[serde(default)]
    friends: Vec<FriendTracks>,
    /// friend user id -> weight in percent
    #[serde(default)]
    weights: HashMap<String, f64>,
}

#[derive(Serialize)]
struct RankOutput {
    tracks: Vec<lib::models::RankedTrack>,
    uris: Vec<String>,
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&s).with_context(|| format!("parsing {}", path.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    // Resolve config path: explicit --config overrides; otherwise prefer
    // /etc/sato/config.toml and fall back to the repository example config.
    let resolved_config_path: PathBuf = match &cli.config {
        Some(p) => p.clone(),
        None => {
            let etc_path = Path::new("/etc/sato/config.toml");
            if etc_path.exists() {
                etc_path.to_path_buf()
            } else {
                PathBuf::from("config/example-config.toml")
            }
        }
    };

    let cfg = Config::from_path(&resolved_config_path)
        .with_context(|| format!("loading config from {}", resolved_config_path.display()))?;

    // Logs go to a daily-rotated file in cfg.log_dir and to stderr, so
    // command output on stdout stays machine-readable.
    let _ = LogTracer::init();
    let file_appender: RollingFileAppender = tracing_appender::rolling::daily(&cfg.log_dir, "sato.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    // Honor RUST_LOG if set, otherwise default to info.
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer().with_writer(non_blocking);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer);

    tracing_subscriber_global::set_global_default(subscriber)
        .context("failed to set global tracing subscriber")?;

    match cli.command {
        Commands::Pkce { length } => {
            let length = length.unwrap_or(cfg.verifier_length);
            if !lib::config::VERIFIER_LENGTH_RANGE.contains(&length) {
                tracing::warn!("verifier length {} is outside the PKCE range 43..=128", length);
            }
            let pair = PkcePair::generate(length)?;
            println!("code_verifier={}", pair.verifier);
            println!("code_challenge={}", pair.challenge);
        }
        Commands::Challenge { verifier } => {
            println!("{}", pkce::generate_code_challenge(&verifier)?);
        }
        Commands::Authorize => {
            lib::api::spotify_auth::run_interactive_authorization(&cfg)
                .with_context(|| "running authorization".to_string())?;
        }
        Commands::Blend { input } => {
            let inp: BlendInput = read_json(&input)?;
            let blended = lib::blend::create_multi_blend(&inp.users, &inp.filters, &inp.features);
            println!("{}", serde_json::to_string_pretty(&blended)?);
        }
        Commands::Rank { input } => {
            let inp: RankInput = read_json(&input)?;
            let tracks = lib::blend::rank_weighted_blend(
                &inp.own_top_tracks,
                &inp.friends,
                &inp.weights,
                cfg.own_track_weight,
                cfg.blend_track_limit,
            );
            let uris = lib::blend::track_uris(&tracks);
            println!("{}", serde_json::to_string_pretty(&RankOutput { tracks, uris })?);
        }
        Commands::Bracket { input } => {
            let tracks: Vec<String> = read_json(&input)?;
            let bracket = lib::tournament::generate_bracket(tracks, &mut rand::thread_rng());
            println!("{}", serde_json::to_string_pretty(&bracket)?);
        }
        Commands::ConfigValidate => {
            match cfg.validate() {
                Ok(()) => println!("OK"),
                Err(e) => {
                    eprintln!("Config validation failed: {}", e);
                    std::process::exit(2);
                }
            }
        }
    }

    Ok(())
}
