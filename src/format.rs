//! Chat-ready text rendering of query responses.
//!
//! Pure templating: the dispatcher's payloads become the multi-line bodies
//! the chat layer posts. Markdown bold markers survive both the chat
//! platform and a plain terminal, so they are used as-is.

use crate::models::MatchRecord;
use crate::query::QueryResponse;

/// Render a response as a chat message body.
pub fn render(response: &QueryResponse) -> String {
    match response {
        QueryResponse::DeckStats { stats } => format!(
            "**Deck Stats: {}**\nMatches: **{}-{}** ({} WR)\nGames: **{}-{}** ({} GWR)",
            stats.name,
            stats.wins,
            stats.losses,
            percent(stats.match_win_rate),
            stats.game_wins,
            stats.game_total - stats.game_wins,
            percent(stats.game_win_rate),
        ),
        QueryResponse::Meta { decks } => {
            let mut out = String::from("**Current Meta Overview**\n");
            for (i, d) in decks.iter().enumerate() {
                out.push_str(&format!(
                    "\n{}. **{}** — {} matches, {}-{} ({} WR, {} GWR)",
                    i + 1,
                    d.name,
                    d.matches,
                    d.wins,
                    d.losses,
                    percent(d.match_win_rate),
                    percent(d.game_win_rate),
                ));
            }
            out
        }
        QueryResponse::Matchups { deck, opponents } => {
            let mut out = format!("**Matchups for {deck}**\n");
            for m in opponents {
                out.push_str(&format!(
                    "\n• vs **{}** — {} matches, {}-{} ({} WR)",
                    m.name,
                    m.matches,
                    m.wins,
                    m.losses,
                    percent(m.match_win_rate),
                ));
            }
            out
        }
        QueryResponse::TopPilots { deck, pilots } => {
            let mut out = format!("**Top Pilots of {deck}**\n");
            for (i, p) in pilots.iter().enumerate() {
                out.push_str(&format!(
                    "\n{}) **{}** — {}-{} ({} WR)",
                    i + 1,
                    p.name,
                    p.wins,
                    p.losses,
                    percent(p.match_win_rate),
                ));
            }
            out
        }
        QueryResponse::HeadToHead { record } => format!(
            "**{} vs {}**\nMatches: {}-{} ({} WR)\nGames: {}-{} ({} GWR)",
            record.deck_a,
            record.deck_b,
            record.wins_a,
            record.wins_b,
            percent(record.match_share_a()),
            record.games_a,
            record.games_b,
            percent(record.game_share_a()),
        ),
        QueryResponse::Trend { deck, points } => {
            let mut out = format!("**Recent results for {deck}** (latest last)\n");
            for p in points {
                out.push_str(&format!("\n{}: {}", p.date, p.result));
            }
            out
        }
        QueryResponse::Recent { matches } => {
            let mut out = format!("**Recent Matches (last {})**\n", matches.len());
            for m in matches {
                out.push_str(&format!("\n{}", recent_line(m)));
            }
            out
        }
        QueryResponse::Matrix { matrix } => {
            let mut out = format!("**Matchup Matrix** ({} decks)\n", matrix.decks.len());
            out.push_str(&format!("\nDECK | {}", matrix.decks.join(" | ")));
            for (deck, row) in matrix.decks.iter().zip(&matrix.cells) {
                let cells: Vec<&str> = row.iter().map(|c| c.text.as_str()).collect();
                out.push_str(&format!("\n{} | {}", deck, cells.join(" | ")));
            }
            out
        }
        QueryResponse::NoData { subject } => {
            format!("No data found for **{subject}**.")
        }
    }
}

fn recent_line(m: &MatchRecord) -> String {
    let winner = m.winner.as_deref().unwrap_or("?");
    format!(
        "**{}** – {} ({}) vs {} ({}) → **{}** {}-{}",
        m.date, m.player1, m.deck1, m.player2, m.deck2, winner, m.games1, m.games2,
    )
}

fn percent(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}
