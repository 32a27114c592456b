//! Derived statistics models.
//!
//! All aggregates are transient: built fresh from the full record set per
//! query, never persisted.

use serde::{Deserialize, Serialize};

/// Wins over total, guarding the zero denominator.
///
/// Returns `0.0` when `total` is zero; callers that need to distinguish
/// "no data" from a genuine zero rate check the counts, not the rate.
pub fn win_rate(wins: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}

/// Match and game tallies for one deck across the whole record set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckStats {
    /// Display label (first seen in the sheet)
    pub name: String,

    /// Matches the deck participated in
    pub matches: u32,

    /// Matches won (winner recorded and on the deck's side)
    pub wins: u32,

    /// Matches lost (winner recorded on the opposing side)
    pub losses: u32,

    /// Game wins for the deck's side, summed across matches
    pub game_wins: u32,

    /// All games played in the deck's matches, both sides
    pub game_total: u32,

    /// wins / matches (0.0 to 1.0)
    pub match_win_rate: f64,

    /// game_wins / game_total (0.0 to 1.0)
    pub game_win_rate: f64,
}

impl DeckStats {
    pub fn new(
        name: String,
        matches: u32,
        wins: u32,
        losses: u32,
        game_wins: u32,
        game_total: u32,
    ) -> Self {
        Self {
            name,
            matches,
            wins,
            losses,
            game_wins,
            game_total,
            match_win_rate: win_rate(wins, matches),
            game_win_rate: win_rate(game_wins, game_total),
        }
    }
}

/// One row of the meta overview: a deck's standing across all matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckAggregate {
    pub name: String,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub game_wins: u32,
    pub game_total: u32,
    pub match_win_rate: f64,
    pub game_win_rate: f64,
}

impl DeckAggregate {
    pub fn new(
        name: String,
        matches: u32,
        wins: u32,
        losses: u32,
        game_wins: u32,
        game_total: u32,
    ) -> Self {
        Self {
            name,
            matches,
            wins,
            losses,
            game_wins,
            game_total,
            match_win_rate: win_rate(wins, matches),
            game_win_rate: win_rate(game_wins, game_total),
        }
    }
}

/// A deck's record against one specific opponent deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupAggregate {
    /// Opponent deck display label
    pub name: String,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub game_wins: u32,
    pub game_total: u32,
    pub match_win_rate: f64,
    pub game_win_rate: f64,
}

impl MatchupAggregate {
    pub fn new(
        name: String,
        matches: u32,
        wins: u32,
        losses: u32,
        game_wins: u32,
        game_total: u32,
    ) -> Self {
        Self {
            name,
            matches,
            wins,
            losses,
            game_wins,
            game_total,
            match_win_rate: win_rate(wins, matches),
            game_win_rate: win_rate(game_wins, game_total),
        }
    }
}

/// One pilot's record on a given deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PilotAggregate {
    /// Player name
    pub name: String,
    pub matches: u32,
    pub wins: u32,
    pub losses: u32,
    pub game_wins: u32,
    pub game_total: u32,
    pub match_win_rate: f64,
    pub game_win_rate: f64,
}

impl PilotAggregate {
    pub fn new(
        name: String,
        matches: u32,
        wins: u32,
        losses: u32,
        game_wins: u32,
        game_total: u32,
    ) -> Self {
        Self {
            name,
            matches,
            wins,
            losses,
            game_wins,
            game_total,
            match_win_rate: win_rate(wins, matches),
            game_win_rate: win_rate(game_wins, game_total),
        }
    }
}

/// Head-to-head record between two specific decks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadToHead {
    /// Display label of the first queried deck
    pub deck_a: String,

    /// Display label of the second queried deck
    pub deck_b: String,

    /// Matches between the pair, in either seat order
    pub matches: u32,

    pub wins_a: u32,
    pub wins_b: u32,

    /// Game wins accumulated under each deck's label
    pub games_a: u32,
    pub games_b: u32,
}

impl HeadToHead {
    /// Share of decided matches won by deck A.
    pub fn match_share_a(&self) -> f64 {
        win_rate(self.wins_a, self.wins_a + self.wins_b)
    }

    /// Share of all games won by deck A.
    pub fn game_share_a(&self) -> f64 {
        win_rate(self.games_a, self.games_a + self.games_b)
    }
}

/// Result letter for one trend point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "L")]
    Loss,
    #[serde(rename = "-")]
    Unknown,
}

impl std::fmt::Display for TrendResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendResult::Win => write!(f, "W"),
            TrendResult::Loss => write!(f, "L"),
            TrendResult::Unknown => write!(f, "-"),
        }
    }
}

/// One deck appearance in the time-ordered trend sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Date as written in the sheet
    pub date: String,

    pub result: TrendResult,
}
