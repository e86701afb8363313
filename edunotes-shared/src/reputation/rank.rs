/// Rank tiers derived from a user's score
///
/// Rank is a pure function of score. The `users.rank` column is a cache that
/// the reputation engine rewrites in the same transaction as every score change.
///
/// | score      | rank         |
/// |------------|--------------|
/// | `< 10`     | incompetent  |
/// | `10..20`   | beginner     |
/// | `20..30`   | specialist   |
/// | `30..40`   | expert       |
/// | `>= 40`    | master       |

use serde::{Deserialize, Serialize};
use std::fmt;

/// Five ordered tiers, lowest first
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "user_rank", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Incompetent,
    Beginner,
    Specialist,
    Expert,
    Master,
}

impl Rank {
    /// Inclusive lower score bound of each tier above the lowest
    pub const THRESHOLDS: [(i32, Rank); 4] = [
        (40, Rank::Master),
        (30, Rank::Expert),
        (20, Rank::Specialist),
        (10, Rank::Beginner),
    ];

    /// Maps a score to its tier; negative scores are `Incompetent`
    pub fn for_score(score: i32) -> Rank {
        Self::THRESHOLDS
            .iter()
            .find(|(min, _)| score >= *min)
            .map(|(_, rank)| *rank)
            .unwrap_or(Rank::Incompetent)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Rank::Incompetent => "incompetent",
            Rank::Beginner => "beginner",
            Rank::Specialist => "specialist",
            Rank::Expert => "expert",
            Rank::Master => "master",
        }
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank::Incompetent
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
