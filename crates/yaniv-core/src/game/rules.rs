use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How the score reset is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetRule {
    /// Landing exactly on a multiple of 50 from below.
    #[default]
    Exact,
    /// Moving from below a multiple of 50 to at or above it.
    Crossing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub hand_size: usize,
    /// Highest hand value that may call Yaniv.
    pub yaniv_limit: u32,
    pub assaf_penalty: u32,
    /// Players above this score are out.
    pub elimination_score: u32,
    pub reset_rule: ResetRule,
}

pub const RESET_STEP: u32 = 50;

impl Default for GameRules {
    fn default() -> Self {
        Self {
            hand_size: 5,
            yaniv_limit: 5,
            assaf_penalty: 30,
            elimination_score: 100,
            reset_rule: ResetRule::Exact,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RulesError {
    #[error("hand size must be between 1 and 10, got {0}")]
    HandSize(usize),
    #[error("elimination score must be at least {RESET_STEP}, got {0}")]
    EliminationScore(u32),
}

impl GameRules {
    pub fn validate(&self) -> Result<(), RulesError> {
        if !(1..=10).contains(&self.hand_size) {
            return Err(RulesError::HandSize(self.hand_size));
        }
        if self.elimination_score < RESET_STEP {
            return Err(RulesError::EliminationScore(self.elimination_score));
        }
        Ok(())
    }

    /// Scores that trigger a reset: every multiple of 50 up to the
    /// elimination score.
    pub fn reset_marks(&self) -> impl Iterator<Item = u32> {
        let ceiling = self.elimination_score;
        (1..)
            .map(|step| step * RESET_STEP)
            .take_while(move |mark| *mark <= ceiling)
    }

    /// Score after the reset rule, or `None` when it does not fire.
    pub fn reset(&self, previous: u32, current: u32) -> Option<u32> {
        if current <= previous {
            return None;
        }
        let fires = match self.reset_rule {
            ResetRule::Exact => self.reset_marks().any(|mark| mark == current),
            ResetRule::Crossing => self
                .reset_marks()
                .any(|mark| previous < mark && mark <= current),
        };
        fires.then(|| current - RESET_STEP)
    }
}
