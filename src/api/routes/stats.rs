use axum::extract::{Path, Query as QueryParams, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::models::MatchRecord;
use crate::normalize::{rows_from_source, validate_records};
use crate::query::{dispatch, Query, QueryResponse};

/// Fetch and normalize the full record set for one request.
pub(super) async fn load_records(state: &AppState) -> Result<Vec<MatchRecord>, ApiError> {
    let raw = state.source.fetch_rows().await?;
    let rows = rows_from_source(&raw)?;
    Ok(validate_records(&rows))
}

#[derive(Debug, Deserialize)]
pub struct CountParams {
    pub count: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct VersusParams {
    pub deck1: Option<String>,
    pub deck2: Option<String>,
}

pub async fn meta(State(state): State<AppState>) -> Result<Json<QueryResponse>, ApiError> {
    let records = load_records(&state).await?;
    Ok(Json(dispatch(&records, &Query::meta())))
}

pub async fn deck_stats(
    State(state): State<AppState>,
    Path(deck): Path<String>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = Query::deck_stats(&deck)?;
    let records = load_records(&state).await?;
    Ok(Json(dispatch(&records, &query)))
}

pub async fn deck_matchups(
    State(state): State<AppState>,
    Path(deck): Path<String>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = Query::matchups(&deck)?;
    let records = load_records(&state).await?;
    Ok(Json(dispatch(&records, &query)))
}

pub async fn deck_pilots(
    State(state): State<AppState>,
    Path(deck): Path<String>,
    QueryParams(params): QueryParams<LimitParams>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = Query::top_pilots(&deck, params.limit)?;
    let records = load_records(&state).await?;
    Ok(Json(dispatch(&records, &query)))
}

pub async fn deck_trend(
    State(state): State<AppState>,
    Path(deck): Path<String>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = Query::trend(&deck)?;
    let records = load_records(&state).await?;
    Ok(Json(dispatch(&records, &query)))
}

pub async fn versus(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<VersusParams>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = Query::head_to_head(
        params.deck1.as_deref().unwrap_or_default(),
        params.deck2.as_deref().unwrap_or_default(),
    )?;
    let records = load_records(&state).await?;
    Ok(Json(dispatch(&records, &query)))
}

pub async fn recent(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<CountParams>,
) -> Result<Json<QueryResponse>, ApiError> {
    let query = Query::recent(params.count)?;
    let records = load_records(&state).await?;
    Ok(Json(dispatch(&records, &query)))
}

#[cfg(test)]
mod tests {
    use crate::api::build_router;
    use crate::api::state::AppState;
    use crate::fetch::StaticSource;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn fixture_rows() -> Value {
        json!([
            {"Date": "2025-11-01", "P1": "Alice", "P2": "Bob", "P1_deck": "Burn",
             "P2_deck": "Control", "Winner": "Alice", "P1W": "2", "P2W": "1"},
            {"Date": "2025-11-02", "P1": "Carol", "P2": "Bob", "P1_deck": "Elves",
             "P2_deck": "Control", "Winner": "Bob", "P1W": "0", "P2W": "2"},
            {"Date": "2025-11-03", "P1": "Alice", "P2": "Carol", "P1_deck": "Burn",
             "P2_deck": "Elves", "Winner": "Alice", "P1W": "2", "P2W": "0"},
        ])
    }

    fn test_state(rows: Value) -> AppState {
        AppState {
            source: Arc::new(StaticSource::new(rows)),
            matrix_sheet: None,
        }
    }

    async fn get_json(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let resp = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state(fixture_rows()));
        let (status, json) = get_json(app, "/api/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_meta_ranked_by_matches() {
        let app = build_router(test_state(fixture_rows()));
        let (status, json) = get_json(app, "/api/meta").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "meta");
        let decks = json["decks"].as_array().unwrap();
        assert_eq!(decks.len(), 3);
        assert_eq!(decks[0]["matches"], 2);
    }

    #[tokio::test]
    async fn test_deck_stats_route() {
        let app = build_router(test_state(fixture_rows()));
        let (status, json) = get_json(app, "/api/decks/burn/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "deck_stats");
        assert_eq!(json["stats"]["name"], "Burn");
        assert_eq!(json["stats"]["matches"], 2);
        assert_eq!(json["stats"]["wins"], 2);
    }

    #[tokio::test]
    async fn test_unknown_deck_is_no_data_not_error() {
        let app = build_router(test_state(fixture_rows()));
        let (status, json) = get_json(app, "/api/decks/storm/stats").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "no_data");
        assert_eq!(json["subject"], "storm");
    }

    #[tokio::test]
    async fn test_recent_count_out_of_range() {
        let app = build_router(test_state(fixture_rows()));
        let (status, json) = get_json(app, "/api/recent?count=99").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_recent_defaults_and_orders() {
        let app = build_router(test_state(fixture_rows()));
        let (status, json) = get_json(app, "/api/recent").await;

        assert_eq!(status, StatusCode::OK);
        let matches = json["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 3);
        assert_eq!(matches[0]["date"], "2025-11-03");
    }

    #[tokio::test]
    async fn test_versus_requires_both_decks() {
        let app = build_router(test_state(fixture_rows()));
        let (status, _) = get_json(app, "/api/versus?deck1=Burn").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_versus_route() {
        let app = build_router(test_state(fixture_rows()));
        let (status, json) = get_json(app, "/api/versus?deck1=burn&deck2=control").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "head_to_head");
        assert_eq!(json["record"]["matches"], 1);
        assert_eq!(json["record"]["wins_a"], 1);
    }

    #[tokio::test]
    async fn test_pilots_limit_param() {
        let app = build_router(test_state(fixture_rows()));
        let (status, json) = get_json(app, "/api/decks/control/pilots?limit=1").await;

        assert_eq!(status, StatusCode::OK);
        let pilots = json["pilots"].as_array().unwrap();
        assert_eq!(pilots.len(), 1);
        assert_eq!(pilots[0]["name"], "Bob");
    }

    #[tokio::test]
    async fn test_trend_route() {
        let app = build_router(test_state(fixture_rows()));
        let (status, json) = get_json(app, "/api/decks/burn/trend").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "trend");
        let points = json["points"].as_array().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0]["result"], "W");
    }

    #[tokio::test]
    async fn test_malformed_source_is_bad_gateway() {
        let app = build_router(test_state(json!({"unexpected": "shape"})));
        let (status, json) = get_json(app, "/api/meta").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
    }
}
