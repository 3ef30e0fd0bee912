//! Routes for the question form

pub mod ask;
pub mod page;

use axum::{extract::DefaultBodyLimit, routing::get, Router};

use crate::server::state::AppState;

/// Build the form routes
pub fn form_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new().route(
        "/",
        get(ask::show_form)
            .post(ask::submit)
            .layer(DefaultBodyLimit::max(max_upload_size)),
    )
}
