//! Catalog maintenance handlers.

use axum::{extract::State, response::Redirect};
use tower_sessions::Session;
use tracing::instrument;

use super::session::push_notice;
use crate::error::Result;
use crate::models::Notice;
use crate::services::catalog::LoadOutcome;
use crate::state::AppState;

/// Retry the catalog fetch.
///
/// The fetch runs inline so the redirected page shows the outcome; a failure
/// is rendered by the grid itself. A retry while another fetch is in flight
/// is ignored.
#[instrument(skip(state, session))]
pub async fn reload(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    match state.catalog().load().await {
        LoadOutcome::Loaded | LoadOutcome::Failed => {}
        LoadOutcome::AlreadyRunning => {
            push_notice(&session, Notice::info("The catalog is already loading.")).await?;
        }
    }
    Ok(Redirect::to("/"))
}
