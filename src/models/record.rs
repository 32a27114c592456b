//! Match record model: one recorded contest between two players.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::normalize::norm_key;

/// Date formats accepted from the sheet, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y", "%m/%d/%Y"];

/// Placeholder shown when the sheet carries no date for a row.
pub const NO_DATE: &str = "n/a";

/// Which seat of a match a player/deck occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Seat {
    One,
    Two,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::One => Seat::Two,
            Seat::Two => Seat::One,
        }
    }
}

/// Outcome of a match from one seat's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOutcome {
    Win,
    Loss,
    /// No winner recorded, or the winner matches neither player.
    Unknown,
}

/// A single validated match between two players.
///
/// Deck identity is compared via [`MatchRecord::deck_key`]; the original
/// display labels are kept for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Date as written in the sheet (`"n/a"` when absent).
    pub date: String,

    /// Parsed calendar date, when `date` matches an accepted format.
    pub played_on: Option<NaiveDate>,

    /// Player 1 name
    pub player1: String,

    /// Player 2 name
    pub player2: String,

    /// Player 1 deck label
    pub deck1: String,

    /// Player 2 deck label
    pub deck2: String,

    /// Recorded winner, when the sheet has one.
    pub winner: Option<String>,

    /// Game wins for player 1 within the match
    pub games1: u32,

    /// Game wins for player 2 within the match
    pub games2: u32,
}

impl MatchRecord {
    pub fn player(&self, seat: Seat) -> &str {
        match seat {
            Seat::One => &self.player1,
            Seat::Two => &self.player2,
        }
    }

    pub fn deck(&self, seat: Seat) -> &str {
        match seat {
            Seat::One => &self.deck1,
            Seat::Two => &self.deck2,
        }
    }

    pub fn games(&self, seat: Seat) -> u32 {
        match seat {
            Seat::One => self.games1,
            Seat::Two => self.games2,
        }
    }

    pub fn games_total(&self) -> u32 {
        self.games1 + self.games2
    }

    /// Normalized comparison key for the deck in `seat`.
    pub fn deck_key(&self, seat: Seat) -> String {
        norm_key(self.deck(seat))
    }

    /// Seat holding the deck with normalized key `key`.
    ///
    /// Mirror matches resolve to seat one.
    pub fn seat_of_deck(&self, key: &str) -> Option<Seat> {
        if key.is_empty() {
            return None;
        }
        if self.deck_key(Seat::One) == key {
            Some(Seat::One)
        } else if self.deck_key(Seat::Two) == key {
            Some(Seat::Two)
        } else {
            None
        }
    }

    /// Seat of the recorded winner, when it names one of the players.
    pub fn winner_seat(&self) -> Option<Seat> {
        let winner = self.winner.as_deref()?;
        if winner == self.player1 {
            Some(Seat::One)
        } else if winner == self.player2 {
            Some(Seat::Two)
        } else {
            None
        }
    }

    /// Classify the match from `seat`'s point of view.
    pub fn outcome_for(&self, seat: Seat) -> MatchOutcome {
        match self.winner_seat() {
            Some(w) if w == seat => MatchOutcome::Win,
            Some(_) => MatchOutcome::Loss,
            None => MatchOutcome::Unknown,
        }
    }
}

/// Parse a sheet date string against the accepted formats.
pub fn parse_match_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() || s == NO_DATE {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}
