use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// One user's candidate tracks; `weights[i]` belongs to `tracks[i]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserTracks {
    pub user: String,
    pub tracks: Vec<String>,
    #[serde(default)]
    pub weights: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlendedTrack {
    pub track_id: String,
    // user -> percentage share, one decimal
    pub contributors: BTreeMap<String, f64>,
}

/// Inclusive bounds for a single audio feature (energy, tempo, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    #[serde(default)]
    pub min: Option<f64>,
    #[serde(default)]
    pub max: Option<f64>,
}

impl FeatureRange {
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |m| value >= m) && self.max.map_or(true, |m| value <= m)
    }
}

pub type AudioFilters = BTreeMap<String, FeatureRange>;

/// track id -> feature name -> value
pub type AudioFeatures = HashMap<String, HashMap<String, f64>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FriendTracks {
    pub profile_url: String,
    #[serde(default)]
    pub tracks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedTrack {
    pub track_id: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: usize,
    pub track1: String,
    pub track2: String,
    pub winner: Option<String>,
}

/// One bracket round. `bye` holds a winner that had no opponent this round
/// and goes straight into the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub matches: Vec<Match>,
    #[serde(default)]
    pub bye: Option<String>,
}
