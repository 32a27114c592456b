use axum::extract::State;
use axum::Json;

use crate::api::state::AppState;
use crate::api::ApiError;
use crate::normalize::rows_from_source;
use crate::query::{dispatch, dispatch_matrix_sheet, Query, QueryResponse};

/// Matchup matrix, preferring the hand-maintained sheet when configured.
pub async fn matrix(State(state): State<AppState>) -> Result<Json<QueryResponse>, ApiError> {
    match &state.matrix_sheet {
        Some(sheet) => {
            let raw = state.source.fetch_sheet(sheet).await?;
            let rows = rows_from_source(&raw)?;
            Ok(Json(dispatch_matrix_sheet(&rows)))
        }
        None => {
            let records = super::stats::load_records(&state).await?;
            Ok(Json(dispatch(&records, &Query::matrix())))
        }
    }
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
    async fn test_matrix_from_configured_sheet() {
        let source = StaticSource::new(json!([])).with_sheet(
            "Deck_Matchup_Matrix",
            json!([
                {"DECK": "Burn", "Burn": "", "Control": "12-3 (80%)"},
                {"DECK": "Control", "Burn": "3-12 (20%)", "Control": ""},
                {"DECK": "-", "Burn": "", "Control": ""},
            ]),
        );
        let state = AppState {
            source: Arc::new(source),
            matrix_sheet: Some("Deck_Matchup_Matrix".to_string()),
        };

        let (status, json) = get_json(build_router(state), "/api/matrix").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "matrix");
        let decks = json["matrix"]["decks"].as_array().unwrap();
        assert_eq!(decks.len(), 2);
        let cell = &json["matrix"]["cells"][0][1];
        assert_eq!(cell["text"], "12-3 (80%)");
        assert_eq!(cell["heat"]["kind"], "percent");
        assert_eq!(cell["heat"]["value"], 80);
    }

    #[tokio::test]
    async fn test_matrix_falls_back_to_records() {
        let source = StaticSource::new(json!([
            {"Date": "2025-11-01", "P1": "Alice", "P2": "Bob", "P1_deck": "Burn",
             "P2_deck": "Control", "Winner": "Alice", "P1W": "2", "P2W": "1"},
        ]));
        let state = AppState {
            source: Arc::new(source),
            matrix_sheet: None,
        };

        let (status, json) = get_json(build_router(state), "/api/matrix").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["kind"], "matrix");
        assert_eq!(json["matrix"]["cells"][0][1]["text"], "1-0 (100%)");
    }

    #[tokio::test]
    async fn test_matrix_missing_sheet_is_bad_gateway() {
        let state = AppState {
            source: Arc::new(StaticSource::new(json!([]))),
            matrix_sheet: Some("Deck_Matchup_Matrix".to_string()),
        };

        let (status, json) = get_json(build_router(state), "/api/matrix").await;

        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
    }
}
