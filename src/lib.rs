//! # QuarterMaster
//!
//! A league match tracker: deck meta statistics computed over a shared
//! results sheet, served to a chat front-end.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (match records, aggregates, trends)
//! - **normalize**: Raw sheet rows → validated match records
//! - **calculate**: Statistics and derived metrics computation
//! - **matrix**: Deck × deck matchup grid with heat values
//! - **query**: Named queries + parameter validation → response payloads
//! - **format**: Chat-ready text rendering of query responses
//! - **fetch**: HTTP client for the remote sheet service
//! - **api**: REST API endpoints
//! - **reminder**: Scheduled countdown message task
//! - **config**: Configuration loading and validation

pub mod api;
pub mod calculate;
pub mod config;
pub mod fetch;
pub mod format;
pub mod matrix;
pub mod models;
pub mod normalize;
pub mod query;
pub mod reminder;

pub use models::*;

use std::time::Duration;

/// Parse a human-friendly duration string (e.g., "7d", "6h", "30m", "90s").
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('d') {
        (n, 86400)
    } else if let Some(n) = s.strip_suffix('h') {
        (n, 3600)
    } else if let Some(n) = s.strip_suffix('m') {
        (n, 60)
    } else if let Some(n) = s.strip_suffix('s') {
        (n, 1)
    } else {
        // Default to seconds
        (s, 1)
    };

    let num: u64 = num_str.parse().ok()?;
    Some(Duration::from_secs(num * multiplier))
}
