use serde::Serialize;
use thiserror::Error;

use crate::audio::features::ComparisonResult;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoundScore {
    pub clip_id: String,
    pub score: u32,
    pub duration_match: f32,
    pub pitch_match: f32,
    pub amplitude_match: f32,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session already has all {0} rounds")]
    Complete(usize),
    #[error("clip '{0}' was already played this session")]
    AlreadyPlayed(String),
}

/// Round bookkeeping for one game: a fixed number of rounds, each clip
/// played at most once.
#[derive(Debug)]
pub struct Session {
    total_rounds: usize,
    scores: Vec<RoundScore>,
}

impl Session {
    pub fn new(total_rounds: usize) -> Self {
        Self {
            total_rounds: total_rounds.max(1),
            scores: Vec::new(),
        }
    }

    pub fn record(
        &mut self,
        clip_id: &str,
        result: &ComparisonResult,
    ) -> Result<&RoundScore, SessionError> {
        if self.is_complete() {
            return Err(SessionError::Complete(self.total_rounds));
        }
        if self.scores.iter().any(|s| s.clip_id == clip_id) {
            return Err(SessionError::AlreadyPlayed(clip_id.to_string()));
        }

        self.scores.push(RoundScore {
            clip_id: clip_id.to_string(),
            score: result.score,
            duration_match: result.duration_match,
            pitch_match: result.pitch_match,
            amplitude_match: result.amplitude_match,
        });
        log::debug!("Recorded round {}/{}", self.scores.len(), self.total_rounds);
        Ok(&self.scores[self.scores.len() - 1])
    }

    pub fn scores(&self) -> &[RoundScore] {
        &self.scores
    }

    pub fn total_rounds(&self) -> usize {
        self.total_rounds
    }

    /// 1-based number of the round being played (the last one once complete).
    pub fn round_number(&self) -> usize {
        (self.scores.len() + 1).min(self.total_rounds)
    }

    pub fn is_complete(&self) -> bool {
        self.scores.len() >= self.total_rounds
    }

    /// Ids from `ids` that have not been played yet, in the given order.
    pub fn unused_clips<'a, I>(&self, ids: I) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a str>,
    {
        ids.into_iter()
            .filter(|id| !self.scores.iter().any(|s| s.clip_id == *id))
            .collect()
    }

    /// Mean round score, or `None` before the first round.
    pub fn final_score(&self) -> Option<f32> {
        if self.scores.is_empty() {
            return None;
        }
        let total: u32 = self.scores.iter().map(|s| s.score).sum();
        Some(total as f32 / self.scores.len() as f32)
    }

    pub fn verdict(&self) -> Option<&'static str> {
        self.final_score().map(verdict_for)
    }
}

pub fn verdict_for(score: f32) -> &'static str {
    if score >= 90.0 {
        "You have potential..."
    } else if score >= 75.0 {
        "You might have a future in elevator music."
    } else if score >= 50.0 {
        "Never pick up a microphone again..."
    } else if score >= 25.0 {
        "Stick to singing in the shower..."
    } else {
        "I have no words for this..."
    }
}
