//! Deck × deck matchup grid.
//!
//! Produces the data an external heatmap rasterizer consumes: a square grid
//! of display cells plus a parallel heat intensity per cell. The grid is
//! built either from the validated record set or from the pre-aggregated
//! matchup sheet the league maintains by hand.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::{MatchRecord, Seat};
use crate::normalize::RawRow;

/// Sheet column holding the row deck label.
const DECK_COLUMN: &str = "DECK";

/// Display text for diagonal (self) cells.
const MIRROR_CELL: &str = "MIRROR";

/// Display text for cells with nothing recorded.
const EMPTY_CELL: &str = "-";

/// Heat intensity for one cell.
///
/// `NoData` is distinct from `Percent(0)`: an unplayed matchup gets the
/// neutral band, a 0% matchup gets the coldest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Heat {
    Percent(u8),
    NoData,
    Mirror,
}

/// One grid cell: display text plus heat intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixCell {
    pub text: String,
    pub heat: Heat,
}

impl MatrixCell {
    fn empty() -> Self {
        Self {
            text: EMPTY_CELL.to_string(),
            heat: Heat::NoData,
        }
    }

    fn mirror(text: &str) -> Self {
        Self {
            text: if text.is_empty() {
                MIRROR_CELL.to_string()
            } else {
                text.to_string()
            },
            heat: Heat::Mirror,
        }
    }
}

/// Square matchup grid: `cells[i][j]` is row deck `i` versus column deck `j`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchupMatrix {
    /// Deck labels, in axis order
    pub decks: Vec<String>,

    pub cells: Vec<Vec<MatrixCell>>,
}

impl MatchupMatrix {
    pub fn is_empty(&self) -> bool {
        self.decks.is_empty()
    }

    /// Build from the pre-aggregated matchup sheet.
    ///
    /// Axis order is the sheet's header order (the `DECK` label column is
    /// dropped from the axes). Cell text is taken verbatim; heat comes from
    /// the `(<digits>%)` pattern inside it. A deck with no matching sheet
    /// row yields a row of no-data cells, so the grid stays square.
    pub fn from_sheet(rows: &[RawRow]) -> Self {
        let Some(first) = rows.first() else {
            return Self {
                decks: Vec::new(),
                cells: Vec::new(),
            };
        };

        let decks: Vec<String> = first
            .keys()
            .filter(|k| !k.eq_ignore_ascii_case(DECK_COLUMN))
            .map(|k| k.to_string())
            .collect();

        let row_by_deck: HashMap<String, &RawRow> = rows
            .iter()
            .filter_map(|row| {
                row.field(DECK_COLUMN)
                    .map(|label| (crate::normalize::norm_key(label), row))
            })
            .collect();

        let cells = decks
            .iter()
            .map(|row_deck| {
                let sheet_row = row_by_deck.get(&crate::normalize::norm_key(row_deck));
                decks
                    .iter()
                    .map(|col_deck| {
                        let text = sheet_row
                            .and_then(|r| r.field(col_deck))
                            .unwrap_or_default();
                        if row_deck.eq_ignore_ascii_case(col_deck) {
                            MatrixCell::mirror(text)
                        } else if text.is_empty() || text == EMPTY_CELL {
                            MatrixCell::empty()
                        } else {
                            MatrixCell {
                                text: text.to_string(),
                                heat: heat_from_text(text),
                            }
                        }
                    })
                    .collect()
            })
            .collect();

        Self { decks, cells }
    }

    /// Build from the validated record set.
    ///
    /// Axis order is first-seen deck order. Cell `(i, j)` shows
    /// `"W-L (P%)"` over decided matches of row deck `i` versus column deck
    /// `j`; matchups with no decided matches stay no-data.
    pub fn from_records(records: &[MatchRecord]) -> Self {
        let mut decks: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for record in records {
            for seat in [Seat::One, Seat::Two] {
                let key = record.deck_key(seat);
                if key.is_empty() || index.contains_key(&key) {
                    continue;
                }
                index.insert(key, decks.len());
                decks.push(record.deck(seat).to_string());
            }
        }

        // wins[i][j] = decided matches deck i won against deck j
        let n = decks.len();
        let mut wins = vec![vec![0u32; n]; n];
        for record in records {
            let Some(winner_seat) = record.winner_seat() else {
                continue;
            };
            let winner_key = record.deck_key(winner_seat);
            let loser_key = record.deck_key(winner_seat.other());
            let (Some(&w), Some(&l)) = (index.get(&winner_key), index.get(&loser_key)) else {
                continue;
            };
            if w != l {
                wins[w][l] += 1;
            }
        }

        let cells = (0..n)
            .map(|i| {
                (0..n)
                    .map(|j| {
                        if i == j {
                            return MatrixCell::mirror("");
                        }
                        let won = wins[i][j];
                        let lost = wins[j][i];
                        let decided = won + lost;
                        if decided == 0 {
                            return MatrixCell::empty();
                        }
                        let pct = ((won as f64 / decided as f64) * 100.0).round() as u8;
                        MatrixCell {
                            text: format!("{won}-{lost} ({pct}%)"),
                            heat: Heat::Percent(pct),
                        }
                    })
                    .collect()
            })
            .collect();

        Self { decks, cells }
    }
}

/// Extract the heat percentage from cell text.
///
/// The value lives inside parentheses (`"12-3 (80%)"` → 80); anything
/// without that pattern means no data, not zero.
pub fn heat_from_text(text: &str) -> Heat {
    static PERCENT: OnceLock<Regex> = OnceLock::new();
    let re = PERCENT.get_or_init(|| Regex::new(r"\((\d+)%\)").expect("valid percent pattern"));

    match re
        .captures(text)
        .and_then(|caps| caps[1].parse::<u32>().ok())
    {
        Some(pct) => Heat::Percent(pct.min(100) as u8),
        None => Heat::NoData,
    }
}
