use axum::extract::State;
use axum::Json;
use rotor_core::cursor::CurrentRow;

use crate::state::AppState;

/// GET /row: the row under the cursor with its index and the dataset length.
pub async fn current_row(State(app): State<AppState>) -> Json<CurrentRow> {
    Json(app.rotor.current())
}
