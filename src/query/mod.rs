//! Named queries over the record set.
//!
//! Maps a query name plus typed parameters onto the calculation engine or
//! matrix builder and shapes a presentation-agnostic response payload.
//! Parameter validation happens at construction, so a `Query` value is
//! well-formed by the time it reaches [`dispatch`]. No I/O here: callers
//! hand in an already-fetched, already-normalized record set.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calculate::{self, TREND_WINDOW};
use crate::matrix::MatchupMatrix;
use crate::models::{
    DeckAggregate, DeckStats, HeadToHead, MatchRecord, MatchupAggregate, PilotAggregate,
    TrendPoint,
};
use crate::normalize::{matrix_rows, RawRow};

/// Bounds for user-supplied counts (`recent`, pilot limit).
pub const MIN_COUNT: i64 = 1;
pub const MAX_COUNT: i64 = 20;

/// Default number of matches listed by `recent`.
pub const DEFAULT_RECENT_COUNT: usize = 5;

/// Default pilot ranking depth.
pub const DEFAULT_PILOT_LIMIT: usize = 3;

/// Parameter validation failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueryError {
    #[error("missing or empty parameter: {0}")]
    MissingParameter(&'static str),

    #[error("count {0} outside the allowed range 1..=20")]
    CountOutOfRange(i64),
}

/// A validated query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "query", rename_all = "snake_case")]
pub enum Query {
    DeckStats { deck: String },
    Meta,
    Matchups { deck: String },
    TopPilots { deck: String, limit: usize },
    HeadToHead { deck_a: String, deck_b: String },
    Trend { deck: String },
    Recent { count: usize },
    Matrix,
}

impl Query {
    pub fn deck_stats(deck: &str) -> Result<Self, QueryError> {
        Ok(Self::DeckStats {
            deck: required(deck, "deck")?,
        })
    }

    pub fn meta() -> Self {
        Self::Meta
    }

    pub fn matchups(deck: &str) -> Result<Self, QueryError> {
        Ok(Self::Matchups {
            deck: required(deck, "deck")?,
        })
    }

    pub fn top_pilots(deck: &str, limit: Option<i64>) -> Result<Self, QueryError> {
        Ok(Self::TopPilots {
            deck: required(deck, "deck")?,
            limit: bounded(limit, DEFAULT_PILOT_LIMIT)?,
        })
    }

    pub fn head_to_head(deck_a: &str, deck_b: &str) -> Result<Self, QueryError> {
        Ok(Self::HeadToHead {
            deck_a: required(deck_a, "deck1")?,
            deck_b: required(deck_b, "deck2")?,
        })
    }

    pub fn trend(deck: &str) -> Result<Self, QueryError> {
        Ok(Self::Trend {
            deck: required(deck, "deck")?,
        })
    }

    pub fn recent(count: Option<i64>) -> Result<Self, QueryError> {
        Ok(Self::Recent {
            count: bounded(count, DEFAULT_RECENT_COUNT)?,
        })
    }

    pub fn matrix() -> Self {
        Self::Matrix
    }
}

fn required(value: &str, name: &'static str) -> Result<String, QueryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(QueryError::MissingParameter(name))
    } else {
        Ok(trimmed.to_string())
    }
}

fn bounded(value: Option<i64>, default: usize) -> Result<usize, QueryError> {
    match value {
        None => Ok(default),
        Some(n) if (MIN_COUNT..=MAX_COUNT).contains(&n) => Ok(n as usize),
        Some(n) => Err(QueryError::CountOutOfRange(n)),
    }
}

/// Presentation-agnostic query result.
///
/// `NoData` is the empty-result payload: a valid query that matched nothing.
/// It is a successful outcome, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryResponse {
    DeckStats {
        stats: DeckStats,
    },
    Meta {
        decks: Vec<DeckAggregate>,
    },
    Matchups {
        deck: String,
        opponents: Vec<MatchupAggregate>,
    },
    TopPilots {
        deck: String,
        pilots: Vec<PilotAggregate>,
    },
    HeadToHead {
        record: HeadToHead,
    },
    Trend {
        deck: String,
        points: Vec<TrendPoint>,
    },
    Recent {
        matches: Vec<MatchRecord>,
    },
    Matrix {
        matrix: MatchupMatrix,
    },
    NoData {
        subject: String,
    },
}

/// Run a query against the validated record set.
pub fn dispatch(records: &[MatchRecord], query: &Query) -> QueryResponse {
    match query {
        Query::DeckStats { deck } => match calculate::deck_stats(records, deck) {
            Some(stats) => QueryResponse::DeckStats { stats },
            None => no_data(deck),
        },
        Query::Meta => {
            let decks = calculate::meta_overview(records);
            if decks.is_empty() {
                no_data("the meta")
            } else {
                QueryResponse::Meta { decks }
            }
        }
        Query::Matchups { deck } => {
            let opponents = calculate::matchups(records, deck);
            if opponents.is_empty() {
                no_data(deck)
            } else {
                QueryResponse::Matchups {
                    deck: display_or_input(records, deck),
                    opponents,
                }
            }
        }
        Query::TopPilots { deck, limit } => {
            let pilots = calculate::top_pilots(records, deck, *limit);
            if pilots.is_empty() {
                no_data(deck)
            } else {
                QueryResponse::TopPilots {
                    deck: display_or_input(records, deck),
                    pilots,
                }
            }
        }
        Query::HeadToHead { deck_a, deck_b } => {
            match calculate::head_to_head(records, deck_a, deck_b) {
                Some(record) => QueryResponse::HeadToHead { record },
                None => no_data(&format!("{deck_a} vs {deck_b}")),
            }
        }
        Query::Trend { deck } => {
            let points = calculate::trend(records, deck, TREND_WINDOW);
            if points.is_empty() {
                no_data(deck)
            } else {
                QueryResponse::Trend {
                    deck: display_or_input(records, deck),
                    points,
                }
            }
        }
        Query::Recent { count } => {
            let matches = calculate::recent(records, *count);
            if matches.is_empty() {
                no_data("recent matches")
            } else {
                QueryResponse::Recent { matches }
            }
        }
        Query::Matrix => {
            let matrix = MatchupMatrix::from_records(records);
            if matrix.is_empty() {
                no_data("the matchup matrix")
            } else {
                QueryResponse::Matrix { matrix }
            }
        }
    }
}

/// Build the matrix response from the pre-aggregated matchup sheet.
pub fn dispatch_matrix_sheet(rows: &[RawRow]) -> QueryResponse {
    let kept = matrix_rows(rows);
    let matrix = MatchupMatrix::from_sheet(&kept);
    if matrix.is_empty() {
        no_data("the matchup matrix")
    } else {
        QueryResponse::Matrix { matrix }
    }
}

fn no_data(subject: &str) -> QueryResponse {
    QueryResponse::NoData {
        subject: subject.to_string(),
    }
}

fn display_or_input(records: &[MatchRecord], deck: &str) -> String {
    calculate::deck_display(records, deck).unwrap_or_else(|| deck.trim().to_string())
}
