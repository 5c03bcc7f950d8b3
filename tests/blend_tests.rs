use sato::blend::{apply_audio_filters, create_multi_blend, rank_weighted_blend, track_uris};
use sato::models::{AudioFeatures, AudioFilters, FeatureRange, FriendTracks, UserTracks};
use std::collections::HashMap;

fn user(name: &str, tracks: &[&str], weights: &[f64]) -> UserTracks {
    UserTracks {
        user: name.into(),
        tracks: tracks.iter().map(|s| s.to_string()).collect(),
        weights: weights.to_vec(),
    }
}

fn friend(url: &str, tracks: &[&str]) -> FriendTracks {
    FriendTracks {
        profile_url: url.into(),
        tracks: tracks.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn multi_blend_reports_percent_shares() {
    let users = vec![
        user("alice", &["t1", "t2"], &[3.0, 1.0]),
        user("bob", &["t1", "t3"], &[1.0, 2.0]),
    ];
    let out = create_multi_blend(&users, &AudioFilters::new(), &AudioFeatures::new());
    let ids: Vec<&str> = out.iter().map(|b| b.track_id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t2", "t3"]);
    assert_eq!(out[0].contributors["alice"], 75.0);
    assert_eq!(out[0].contributors["bob"], 25.0);
    assert_eq!(out[1].contributors["alice"], 100.0);
    assert_eq!(out[2].contributors.len(), 1);
}

#[test]
fn multi_blend_rounds_to_one_decimal() {
    let users = vec![
        user("a", &["t"], &[1.0]),
        user("b", &["t"], &[1.0]),
        user("c", &["t"], &[1.0]),
    ];
    let out = create_multi_blend(&users, &AudioFilters::new(), &AudioFeatures::new());
    assert_eq!(out[0].contributors["a"], 33.3);
}

#[test]
fn multi_blend_rounds_exact_ties_to_even() {
    let users = vec![user("a", &["t"], &[1.0]), user("b", &["t"], &[15.0])];
    let out = create_multi_blend(&users, &AudioFilters::new(), &AudioFeatures::new());
    assert_eq!(out[0].contributors["a"], 6.2);
    assert_eq!(out[0].contributors["b"], 93.8);
    let total: f64 = out[0].contributors.values().sum();
    assert!((total - 100.0).abs() < 1e-9);
}

#[test]
fn multi_blend_ignores_unweighted_tracks_and_zero_totals() {
    let users = vec![
        user("a", &["t1", "t2", "t3"], &[1.0]),
        user("b", &["t4"], &[0.0]),
    ];
    let out = create_multi_blend(&users, &AudioFilters::new(), &AudioFeatures::new());
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].track_id, "t1");
}

#[test]
fn audio_filters_drop_out_of_range_tracks() {
    let mut filters = AudioFilters::new();
    filters.insert("energy".into(), FeatureRange { min: Some(0.5), max: None });
    let mut features = AudioFeatures::new();
    features.insert("loud".into(), HashMap::from([("energy".to_string(), 0.9)]));
    features.insert("calm".into(), HashMap::from([("energy".to_string(), 0.1)]));
    features.insert("untagged".into(), HashMap::from([("tempo".to_string(), 120.0)]));

    let ids: Vec<String> = ["loud", "calm", "untagged", "unknown"].iter().map(|s| s.to_string()).collect();
    let kept = apply_audio_filters(&ids, &filters, &features);
    assert_eq!(kept, vec!["loud", "untagged", "unknown"]);

    let users = vec![user("a", &["loud", "calm"], &[1.0, 1.0])];
    let out = create_multi_blend(&users, &filters, &features);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].track_id, "loud");
}

#[test]
fn weighted_rank_combines_friends_and_own_tracks() {
    let friends = vec![
        friend("https://open.spotify.com/user/alice?si=1", &["x", "y", "x"]),
        friend("https://open.spotify.com/user/bob", &["y", "z"]),
        friend("https://example.com/not-a-profile", &["w"]),
    ];
    let weights = HashMap::from([("alice".to_string(), 80.0), ("bob".to_string(), 40.0)]);
    let own = vec!["z".to_string()];

    let ranked = rank_weighted_blend(&own, &friends, &weights, 0.5, 50);
    let ids: Vec<&str> = ranked.iter().map(|r| r.track_id.as_str()).collect();
    // y = 0.8 + 0.4, z = 0.4 + 0.5, x = 0.8 (counted once)
    assert_eq!(ids, vec!["y", "z", "x"]);
    assert!((ranked[0].score - 1.2).abs() < 1e-9);
    assert!((ranked[2].score - 0.8).abs() < 1e-9);
}

#[test]
fn weighted_rank_keeps_first_seen_order_on_ties_and_limits() {
    let friends = vec![friend("https://open.spotify.com/user/u", &["a", "b", "c"])];
    let weights = HashMap::from([("u".to_string(), 50.0)]);
    let ranked = rank_weighted_blend(&[], &friends, &weights, 0.5, 2);
    let ids: Vec<&str> = ranked.iter().map(|r| r.track_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b"]);
}

#[test]
fn own_tracks_count_every_occurrence() {
    let own = vec!["a".to_string(), "a".to_string()];
    let ranked = rank_weighted_blend(&own, &[], &HashMap::new(), 0.5, 10);
    assert_eq!(ranked.len(), 1);
    assert!((ranked[0].score - 1.0).abs() < 1e-9);
    assert_eq!(track_uris(&ranked), vec!["spotify:track:a"]);
}
