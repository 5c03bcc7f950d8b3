use crate::models::{Match, Round};
use anyhow::{anyhow, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

/// Shuffle `tracks` and pair them off into first-round matches numbered from 1.
/// With an odd count the last shuffled track sits the tournament out.
pub fn generate_bracket<R: Rng + ?Sized>(mut tracks: Vec<String>, rng: &mut R) -> Round {
    tracks.shuffle(rng);
    if tracks.len() % 2 == 1 {
        debug!("odd track count {}; one track gets no match", tracks.len());
        tracks.pop();
    }
    Round { matches: pair_up(tracks), bye: None }
}

fn pair_up(tracks: Vec<String>) -> Vec<Match> {
    let mut bracket = Vec::with_capacity(tracks.len() / 2);
    let mut it = tracks.into_iter();
    while let (Some(track1), Some(track2)) = (it.next(), it.next()) {
        bracket.push(Match {
            match_id: bracket.len() + 1,
            track1,
            track2,
            winner: None,
        });
    }
    bracket
}

impl Match {
    pub fn record_winner(&mut self, track: &str) -> Result<()> {
        if track != self.track1 && track != self.track2 {
            return Err(anyhow!(
                "track {} is not playing in match {}",
                track,
                self.match_id
            ));
        }
        self.winner = Some(track.to_string());
        Ok(())
    }
}

/// Build the next round from the winners of `round`.
///
/// A track holding a bye plays first, followed by the winners in match
/// order. When the count is odd the last winner gets the bye, so no
/// unbeaten track is ever dropped.
pub fn next_round(round: &Round) -> Result<Round> {
    let mut entrants: Vec<String> = round.bye.iter().cloned().collect();
    for m in &round.matches {
        let w = m
            .winner
            .clone()
            .ok_or_else(|| anyhow!("match {} has no winner yet", m.match_id))?;
        entrants.push(w);
    }
    let bye = if entrants.len() % 2 == 1 { entrants.pop() } else { None };
    if let Some(b) = &bye {
        debug!("track {} gets a bye", b);
    }
    Ok(Round { matches: pair_up(entrants), bye })
}

/// The overall winner once the bracket is down to one decided match.
pub fn champion(round: &Round) -> Option<&str> {
    match (round.matches.as_slice(), &round.bye) {
        ([only], None) => only.winner.as_deref(),
        _ => None,
    }
}
