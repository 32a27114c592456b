//! Raw sheet rows → validated match records.
//!
//! The sheet service delivers either a bare JSON array of flat rows or an
//! object wrapping that array under a `data` field. Keys arrive with
//! inconsistent casing and stray whitespace (`P1_deck` vs `p1_deck`,
//! `"Winner "`); values may be strings or numbers. Everything is cleaned
//! here, once, so the calculation layer never re-checks casing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::models::{parse_match_date, MatchRecord, NO_DATE};

/// Errors raised while interpreting the raw sheet response.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unexpected sheet response shape: expected an array of rows or an object with a `data` array")]
    MalformedSource,
}

/// Normalized comparison key: trimmed, lower-cased.
///
/// Used for every deck and matrix label comparison. Player and winner names
/// are compared as written (trimmed only).
pub fn norm_key(s: &str) -> String {
    s.trim().to_lowercase()
}

/// One cleaned sheet row: trimmed keys and values in original column order.
///
/// Column order matters for the pre-aggregated matrix sheet, whose header
/// order defines the grid axes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRow {
    cells: Vec<(String, String)>,
}

impl RawRow {
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.cells.push((key.into(), value.into()));
    }

    /// Look up a field by canonical name, accepting any casing variant.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Column keys in sheet order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|(_, v)| v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl FromIterator<(String, String)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}

/// Extract cleaned rows from a raw sheet response.
///
/// Accepts a bare array or `{"data": [...]}`. Keys and string values are
/// trimmed, empty keys and entirely blank rows are dropped.
pub fn rows_from_source(raw: &Value) -> Result<Vec<RawRow>, SourceError> {
    let rows = match raw {
        Value::Array(rows) => rows,
        Value::Object(obj) => match obj.get("data") {
            Some(Value::Array(rows)) => rows,
            _ => return Err(SourceError::MalformedSource),
        },
        _ => return Err(SourceError::MalformedSource),
    };

    Ok(rows
        .iter()
        .filter_map(|row| row.as_object())
        .map(|obj| {
            obj.iter()
                .filter_map(|(key, value)| {
                    let key = key.trim();
                    if key.is_empty() {
                        return None;
                    }
                    Some((key.to_string(), cell_text(value)))
                })
                .collect::<RawRow>()
        })
        .filter(|row| !row.is_blank())
        .collect())
}

/// Flatten a JSON cell to trimmed text. Nested values count as blank.
fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

/// Build validated match records from cleaned rows.
///
/// A row is kept when both player names are present and both game counts
/// parse. The winner stays optional: a missing or unrecognized winner keeps
/// the record in match counts without contributing win/loss tallies.
pub fn validate_records(rows: &[RawRow]) -> Vec<MatchRecord> {
    rows.iter().filter_map(to_record).collect()
}

fn to_record(row: &RawRow) -> Option<MatchRecord> {
    let player1 = row.field("P1").unwrap_or_default();
    let player2 = row.field("P2").unwrap_or_default();
    if player1.is_empty() || player2.is_empty() {
        return None;
    }

    let games1 = parse_games(row.field("P1W"))?;
    let games2 = parse_games(row.field("P2W"))?;

    let date = match row.field("Date") {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => NO_DATE.to_string(),
    };

    let winner = row
        .field("Winner")
        .filter(|w| !w.is_empty())
        .map(|w| w.to_string());

    Some(MatchRecord {
        played_on: parse_match_date(&date),
        date,
        player1: player1.to_string(),
        player2: player2.to_string(),
        deck1: row.field("P1_deck").unwrap_or_default().to_string(),
        deck2: row.field("P2_deck").unwrap_or_default().to_string(),
        winner,
        games1,
        games2,
    })
}

/// An absent or blank game cell counts as zero; anything else must parse.
fn parse_games(cell: Option<&str>) -> Option<u32> {
    match cell {
        None => Some(0),
        Some(s) if s.is_empty() => Some(0),
        Some(s) => s.parse().ok(),
    }
}

/// Matrix-sheet feed filter: keep rows with a usable `DECK` label.
///
/// Placeholder labels (`"-"`, spreadsheet `#NAME?` errors) mark filler rows
/// the sheet exports below the real grid.
pub fn matrix_rows(rows: &[RawRow]) -> Vec<RawRow> {
    rows.iter()
        .filter(|row| {
            row.field("DECK")
                .is_some_and(|d| !d.is_empty() && d != "-" && !d.contains("#NAME?"))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sheet_row(date: &str, p1: &str, p2: &str, d1: &str, d2: &str, winner: &str) -> Value {
        json!({
            "Date": date,
            "P1": p1,
            "P2": p2,
            "P1_deck": d1,
            "P2_deck": d2,
            "Winner": winner,
            "P1W": "2",
            "P2W": "1",
        })
    }

    #[test]
    fn test_rows_from_bare_array() {
        let raw = json!([sheet_row("2025-11-02", "Alice", "Bob", "Burn", "Control", "Alice")]);
        let rows = rows_from_source(&raw).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].field("P1"), Some("Alice"));
    }

    #[test]
    fn test_rows_from_data_wrapper() {
        let raw = json!({"data": [sheet_row("2025-11-02", "Alice", "Bob", "Burn", "Control", "Alice")]});
        let rows = rows_from_source(&raw).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_rows_from_malformed_shapes() {
        assert!(rows_from_source(&json!({"rows": []})).is_err());
        assert!(rows_from_source(&json!("nope")).is_err());
        assert!(rows_from_source(&json!(42)).is_err());
    }

    #[test]
    fn test_keys_and_values_trimmed() {
        let raw = json!([{" P1 ": "  Alice  ", "P2": "Bob", "": "dropped"}]);
        let rows = rows_from_source(&raw).unwrap();
        assert_eq!(rows[0].field("P1"), Some("Alice"));
        assert_eq!(rows[0].len(), 2);
    }

    #[test]
    fn test_blank_rows_dropped() {
        let raw = json!([
            {"P1": "", "P2": "", "Winner": ""},
            {"P1": "Alice", "P2": "Bob"},
        ]);
        let rows = rows_from_source(&raw).unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_numeric_cells_stringified() {
        let raw = json!([{"P1": "Alice", "P2": "Bob", "P1W": 2, "P2W": 0}]);
        let rows = rows_from_source(&raw).unwrap();
        assert_eq!(rows[0].field("P1W"), Some("2"));
    }

    #[test]
    fn test_field_lookup_accepts_case_variants() {
        let raw = json!([
            {"p1_deck": "Burn", "P1": "Alice", "P2": "Bob", "p1w": "2", "P2W": "1", "winner": "Alice"},
        ]);
        let rows = rows_from_source(&raw).unwrap();
        assert_eq!(rows[0].field("P1_deck"), Some("Burn"));
        assert_eq!(rows[0].field("Winner"), Some("Alice"));

        let records = validate_records(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].deck1, "Burn");
        assert_eq!(records[0].games1, 2);
    }

    #[test]
    fn test_validate_drops_missing_players() {
        let raw = json!([
            {"P1": "Alice", "P2": "", "P1W": "2", "P2W": "1"},
            {"P1": "", "P2": "Bob", "P1W": "2", "P2W": "1"},
        ]);
        let rows = rows_from_source(&raw).unwrap();
        assert!(validate_records(&rows).is_empty());
    }

    #[test]
    fn test_validate_drops_unparseable_games() {
        let raw = json!([{"P1": "Alice", "P2": "Bob", "P1W": "two", "P2W": "1"}]);
        let rows = rows_from_source(&raw).unwrap();
        assert!(validate_records(&rows).is_empty());
    }

    #[test]
    fn test_validate_blank_games_count_as_zero() {
        let raw = json!([{"P1": "Alice", "P2": "Bob", "P1W": "", "P2W": ""}]);
        let rows = rows_from_source(&raw).unwrap();
        let records = validate_records(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].games_total(), 0);
    }

    #[test]
    fn test_validate_keeps_empty_winner_as_none() {
        let raw = json!([sheet_row("2025-11-02", "Alice", "Bob", "Burn", "Control", "")]);
        let rows = rows_from_source(&raw).unwrap();
        let records = validate_records(&rows);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].winner, None);
    }

    #[test]
    fn test_validate_parses_date_or_keeps_placeholder() {
        let raw = json!([
            sheet_row("2025-11-02", "Alice", "Bob", "Burn", "Control", "Alice"),
            sheet_row("", "Carol", "Dave", "Elves", "Tron", "Dave"),
        ]);
        let records = validate_records(&rows_from_source(&raw).unwrap());
        assert!(records[0].played_on.is_some());
        assert_eq!(records[1].date, "n/a");
        assert_eq!(records[1].played_on, None);
    }

    #[test]
    fn test_matrix_rows_filters_placeholders() {
        let raw = json!([
            {"DECK": "Burn", "Burn": "MIRROR", "Control": "3-1 (75%)"},
            {"DECK": "-", "Burn": "", "Control": ""},
            {"DECK": "#NAME?", "Burn": "", "Control": ""},
            {"DECK": "", "Burn": "x", "Control": ""},
        ]);
        let rows = rows_from_source(&raw).unwrap();
        let kept = matrix_rows(&rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].field("DECK"), Some("Burn"));
    }

    #[test]
    fn test_norm_key() {
        assert_eq!(norm_key("  Burn "), "burn");
        assert_eq!(norm_key("MONO Blue"), "mono blue");
    }
}
