//! Statistics calculation engine.
//!
//! Computes derived metrics from the validated record set:
//! - Per-deck win/loss and game aggregates
//! - Meta overview across all decks
//! - Per-opponent matchup tables
//! - Pilot rankings for a deck
//! - Head-to-head records and trend sequences
//!
//! Every function is pure over an immutable record slice; aggregates are
//! rebuilt from scratch on each call. Losses follow the explicit policy: a
//! loss is tallied only when the sheet records a winner and that winner is
//! the opposing player. A missing or unrecognized winner leaves the match
//! counted but undecided.

use std::collections::HashMap;

use crate::models::{
    DeckAggregate, DeckStats, HeadToHead, MatchOutcome, MatchRecord, MatchupAggregate,
    PilotAggregate, Seat, TrendPoint, TrendResult,
};
use crate::normalize::norm_key;

/// Default window for [`trend`].
pub const TREND_WINDOW: usize = 12;

/// Running tallies shared by the aggregation passes.
#[derive(Debug, Clone, Default)]
struct Tally {
    name: String,
    matches: u32,
    wins: u32,
    losses: u32,
    game_wins: u32,
    game_total: u32,
}

impl Tally {
    fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    fn add(&mut self, record: &MatchRecord, seat: Seat) {
        self.matches += 1;
        match record.outcome_for(seat) {
            MatchOutcome::Win => self.wins += 1,
            MatchOutcome::Loss => self.losses += 1,
            MatchOutcome::Unknown => {}
        }
        self.game_wins += record.games(seat);
        self.game_total += record.games_total();
    }
}

/// Ordered tally map: first-seen insertion order is preserved so stable
/// sorts keep sheet order on ties.
#[derive(Debug, Default)]
struct TallyBook {
    index: HashMap<String, usize>,
    entries: Vec<Tally>,
}

impl TallyBook {
    fn entry(&mut self, key: &str, label: &str) -> &mut Tally {
        let idx = match self.index.get(key) {
            Some(&idx) => idx,
            None => {
                let idx = self.entries.len();
                self.index.insert(key.to_string(), idx);
                self.entries.push(Tally::named(label));
                idx
            }
        };
        &mut self.entries[idx]
    }
}

/// Full-record-set stats for one deck. `None` when the deck never appears.
pub fn deck_stats(records: &[MatchRecord], deck: &str) -> Option<DeckStats> {
    let key = norm_key(deck);
    let mut tally: Option<Tally> = None;

    for record in records {
        let Some(seat) = record.seat_of_deck(&key) else {
            continue;
        };
        tally
            .get_or_insert_with(|| Tally::named(record.deck(seat)))
            .add(record, seat);
    }

    tally.map(|t| DeckStats::new(t.name, t.matches, t.wins, t.losses, t.game_wins, t.game_total))
}

/// One aggregate per distinct deck key seen on either side of any record,
/// sorted by match count descending (ties keep first-seen order).
///
/// Records lacking a deck label on either side are skipped entirely, so a
/// half-labeled row never produces a phantom opponent.
pub fn meta_overview(records: &[MatchRecord]) -> Vec<DeckAggregate> {
    let mut book = TallyBook::default();

    for record in records {
        let key1 = record.deck_key(Seat::One);
        let key2 = record.deck_key(Seat::Two);
        if key1.is_empty() || key2.is_empty() {
            continue;
        }

        for seat in [Seat::One, Seat::Two] {
            let key = record.deck_key(seat);
            book.entry(&key, record.deck(seat)).add(record, seat);
        }
    }

    let mut decks: Vec<DeckAggregate> = book
        .entries
        .into_iter()
        .map(|t| DeckAggregate::new(t.name, t.matches, t.wins, t.losses, t.game_wins, t.game_total))
        .collect();
    decks.sort_by(|a, b| b.matches.cmp(&a.matches));
    decks
}

/// Per-opponent record for one deck, sorted by match count descending and
/// win rate descending on ties.
pub fn matchups(records: &[MatchRecord], deck: &str) -> Vec<MatchupAggregate> {
    let key = norm_key(deck);
    let mut book = TallyBook::default();

    for record in records {
        let Some(seat) = record.seat_of_deck(&key) else {
            continue;
        };
        let opponent = seat.other();
        let opp_key = record.deck_key(opponent);
        if opp_key.is_empty() {
            continue;
        }
        book.entry(&opp_key, record.deck(opponent)).add(record, seat);
    }

    let mut opponents: Vec<MatchupAggregate> = book
        .entries
        .into_iter()
        .map(|t| {
            MatchupAggregate::new(t.name, t.matches, t.wins, t.losses, t.game_wins, t.game_total)
        })
        .collect();
    opponents.sort_by(|a, b| {
        b.matches
            .cmp(&a.matches)
            .then(b.match_win_rate.total_cmp(&a.match_win_rate))
    });
    opponents
}

/// Pilot ranking for one deck: match win rate, then game win rate, then
/// match count, all descending; ties beyond that keep first-seen order.
pub fn top_pilots(records: &[MatchRecord], deck: &str, limit: usize) -> Vec<PilotAggregate> {
    let key = norm_key(deck);
    if key.is_empty() {
        return Vec::new();
    }
    let mut book = TallyBook::default();

    for record in records {
        for seat in [Seat::One, Seat::Two] {
            let player = record.player(seat);
            if record.deck_key(seat) == key && !player.is_empty() {
                book.entry(player, player).add(record, seat);
            }
        }
    }

    let mut pilots: Vec<PilotAggregate> = book
        .entries
        .into_iter()
        .map(|t| {
            PilotAggregate::new(t.name, t.matches, t.wins, t.losses, t.game_wins, t.game_total)
        })
        .collect();
    pilots.sort_by(|a, b| {
        b.match_win_rate
            .total_cmp(&a.match_win_rate)
            .then(b.game_win_rate.total_cmp(&a.game_win_rate))
            .then(b.matches.cmp(&a.matches))
    });
    pilots.truncate(limit);
    pilots
}

/// Record between two specific decks, in either seat order.
/// `None` when the pair never met.
pub fn head_to_head(records: &[MatchRecord], deck_a: &str, deck_b: &str) -> Option<HeadToHead> {
    let key_a = norm_key(deck_a);
    let key_b = norm_key(deck_b);
    if key_a.is_empty() || key_b.is_empty() {
        return None;
    }

    let mut result: Option<HeadToHead> = None;

    for record in records {
        let key1 = record.deck_key(Seat::One);
        let key2 = record.deck_key(Seat::Two);
        let paired =
            (key1 == key_a && key2 == key_b) || (key1 == key_b && key2 == key_a);
        if !paired {
            continue;
        }

        // Mirror pairs (key_a == key_b) resolve deck A to seat one.
        let seat_a = if key1 == key_a { Seat::One } else { Seat::Two };
        let seat_b = seat_a.other();

        let h2h = result.get_or_insert_with(|| HeadToHead {
            deck_a: record.deck(seat_a).to_string(),
            deck_b: record.deck(seat_b).to_string(),
            matches: 0,
            wins_a: 0,
            wins_b: 0,
            games_a: 0,
            games_b: 0,
        });

        h2h.matches += 1;
        match record.outcome_for(seat_a) {
            MatchOutcome::Win => h2h.wins_a += 1,
            MatchOutcome::Loss => h2h.wins_b += 1,
            MatchOutcome::Unknown => {}
        }
        h2h.games_a += record.games(seat_a);
        h2h.games_b += record.games(seat_b);
    }

    result
}

/// Time-ordered result sequence for one deck: the last `window` appearances
/// in sheet order, most recent last.
pub fn trend(records: &[MatchRecord], deck: &str, window: usize) -> Vec<TrendPoint> {
    let key = norm_key(deck);
    let mut points: Vec<TrendPoint> = records
        .iter()
        .filter_map(|record| {
            let seat = record.seat_of_deck(&key)?;
            let result = match record.outcome_for(seat) {
                MatchOutcome::Win => TrendResult::Win,
                MatchOutcome::Loss => TrendResult::Loss,
                MatchOutcome::Unknown => TrendResult::Unknown,
            };
            Some(TrendPoint {
                date: record.date.clone(),
                result,
            })
        })
        .collect();

    if points.len() > window {
        points.drain(..points.len() - window);
    }
    points
}

/// The most recent `count` records, most recent first.
///
/// Records with a parseable date sort by date; the rest fall back to sheet
/// order (later rows treated as more recent) behind the dated ones.
pub fn recent(records: &[MatchRecord], count: usize) -> Vec<MatchRecord> {
    let mut indexed: Vec<(usize, &MatchRecord)> = records.iter().enumerate().collect();
    indexed.sort_by(|(idx_a, a), (idx_b, b)| {
        (b.played_on, idx_b).cmp(&(a.played_on, idx_a))
    });
    indexed
        .into_iter()
        .take(count)
        .map(|(_, r)| r.clone())
        .collect()
}

/// First-seen display label for a deck key, when the deck appears at all.
pub fn deck_display(records: &[MatchRecord], deck: &str) -> Option<String> {
    let key = norm_key(deck);
    records.iter().find_map(|record| {
        record
            .seat_of_deck(&key)
            .map(|seat| record.deck(seat).to_string())
    })
}
