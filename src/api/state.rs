use std::sync::Arc;

use crate::fetch::RowSource;

#[derive(Clone)]
pub struct AppState {
    /// Sheet row provider (live client in production, fixture in tests)
    pub source: Arc<dyn RowSource>,

    /// Named sheet holding the pre-aggregated matchup matrix, when the
    /// league maintains one. Without it the matrix is built from records.
    pub matrix_sheet: Option<String>,
}
