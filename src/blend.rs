use crate::models::{AudioFeatures, AudioFilters, BlendedTrack, FriendTracks, RankedTrack, UserTracks};
use crate::util::{spotify_user_id_from_url, track_uri};
use log::{debug, info};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Round to one decimal, ties to even, judged on the exact value of `x`
/// rather than on the rounded product `x * 10`.
fn round1(x: f64) -> f64 {
    let y = x * 10.0;
    // exact remainder of the product
    let err = x.mul_add(10.0, -y);
    let floor = y.floor();
    let r = if y - floor == 0.5 {
        if err > 0.0 {
            floor + 1.0
        } else if err < 0.0 || floor % 2.0 == 0.0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        y.round()
    };
    r / 10.0
}

/// Tracks in first-appearance order paired with their contributions.
fn aggregate_contributions(users: &[UserTracks]) -> Vec<(String, Vec<(String, f64)>)> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<(String, Vec<(String, f64)>)> = Vec::new();
    for user in users {
        if user.tracks.len() != user.weights.len() {
            debug!(
                "user {} has {} tracks but {} weights; extra entries ignored",
                user.user,
                user.tracks.len(),
                user.weights.len()
            );
        }
        for (track, weight) in user.tracks.iter().zip(user.weights.iter()) {
            let i = *index.entry(track.clone()).or_insert_with(|| {
                out.push((track.clone(), Vec::new()));
                out.len() - 1
            });
            out[i].1.push((user.user.clone(), *weight));
        }
    }
    out
}

/// Keep tracks whose known feature values all fall inside the filter
/// ranges. Tracks without feature data are kept.
pub fn apply_audio_filters<'a, I>(track_ids: I, filters: &AudioFilters, features: &AudioFeatures) -> Vec<String>
where
    I: IntoIterator<Item = &'a String>,
{
    track_ids
        .into_iter()
        .filter(|id| {
            let Some(values) = features.get(*id) else {
                return true;
            };
            filters.iter().all(|(name, range)| match values.get(name) {
                Some(v) => range.contains(*v),
                None => true,
            })
        })
        .cloned()
        .collect()
}

/// Blend several users' tracks and report each user's percentage share of
/// every surviving track.
pub fn create_multi_blend(users: &[UserTracks], filters: &AudioFilters, features: &AudioFeatures) -> Vec<BlendedTrack> {
    let contributions = aggregate_contributions(users);
    let ids: Vec<String> = contributions.iter().map(|(id, _)| id.clone()).collect();
    let kept: HashSet<String> = apply_audio_filters(&ids, filters, features).into_iter().collect();

    let mut blended = Vec::new();
    for (track_id, contribs) in contributions {
        if !kept.contains(&track_id) {
            continue;
        }
        let total: f64 = contribs.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            debug!("dropping track {} with non-positive total weight", track_id);
            continue;
        }
        let mut per_user: BTreeMap<String, f64> = BTreeMap::new();
        for (user, w) in contribs {
            *per_user.entry(user).or_insert(0.0) += w;
        }
        let contributors = per_user
            .into_iter()
            .map(|(user, w)| (user, round1(w / total * 100.0)))
            .collect();
        blended.push(BlendedTrack { track_id, contributors });
    }
    info!("multi blend: {} users -> {} tracks", users.len(), blended.len());
    blended
}

/// Score tracks for a "Custom Blend" playlist.
///
/// Each friend's distinct tracks gain `weights[friend_id] / 100`, where the
/// id comes from the friend's profile URL. Each entry of `own_top_tracks`
/// gains `own_weight`. Highest scores first, ties in first-seen order.
pub fn rank_weighted_blend(
    own_top_tracks: &[String],
    friends: &[FriendTracks],
    weights: &HashMap<String, f64>,
    own_weight: f64,
    limit: usize,
) -> Vec<RankedTrack> {
    let mut order: Vec<String> = Vec::new();
    let mut scores: HashMap<String, f64> = HashMap::new();
    let mut bump = |track: &str, by: f64| {
        match scores.get_mut(track) {
            Some(s) => *s += by,
            None => {
                order.push(track.to_string());
                scores.insert(track.to_string(), by);
            }
        }
    };

    for friend in friends {
        let Some(friend_id) = spotify_user_id_from_url(&friend.profile_url) else {
            debug!("skipping friend with unrecognised profile url {}", friend.profile_url);
            continue;
        };
        let weight = weights.get(&friend_id).copied().unwrap_or(0.0) / 100.0;
        let mut seen = HashSet::new();
        for track in &friend.tracks {
            if seen.insert(track.as_str()) {
                bump(track, weight);
            }
        }
    }
    for track in own_top_tracks {
        bump(track, own_weight);
    }

    let mut ranked: Vec<RankedTrack> = order
        .into_iter()
        .map(|track_id| {
            let score = scores[&track_id];
            RankedTrack { track_id, score }
        })
        .collect();
    // sort_by is stable, so equal scores keep insertion order
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(limit);
    ranked
}

pub fn track_uris(ranked: &[RankedTrack]) -> Vec<String> {
    ranked.iter().map(|r| track_uri(&r.track_id)).collect()
}
