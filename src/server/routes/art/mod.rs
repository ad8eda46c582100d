use crate::server::router::PantryState;
use axum::{
    Router,
    routing::{get, post},
};

pub mod extract;
pub mod handlers;

pub fn router() -> Router<PantryState> {
    Router::new()
        .route("/api/save", post(handlers::save_artwork_handler))
        .route("/api/art", get(handlers::list_artworks_handler))
        .route(
            "/api/art/{id}",
            get(handlers::get_artwork_handler).delete(handlers::delete_artwork_handler),
        )
}
