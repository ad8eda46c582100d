use super::extract::{ArtworkId, SaveArtworkForm};
use crate::artwork::Artwork;
use crate::error::PantryError;
use crate::server::router::PantryState;
use axum::{
    Json,
    extract::{Query, State, rejection::QueryRejection},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Artwork record as returned to clients, with the path to fetch its bytes.
#[derive(Debug, Serialize)]
pub struct ArtworkResponse {
    #[serde(flatten)]
    pub artwork: Artwork,
    pub url: String,
}

impl From<Artwork> for ArtworkResponse {
    fn from(artwork: Artwork) -> Self {
        let url = artwork.url();
        Self { artwork, url }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// POST /api/save
pub(super) async fn save_artwork_handler(
    State(state): State<PantryState>,
    form: SaveArtworkForm,
) -> Result<Json<ArtworkResponse>, PantryError> {
    debug!(
        width = form.width,
        height = form.height,
        data_url_len = form.data_url.len(),
        "Incoming save request"
    );

    let artwork = state
        .store
        .create(&form.data_url, form.width, form.height)
        .await?;
    Ok(Json(artwork.into()))
}

/// GET /api/art?limit=N
pub(super) async fn list_artworks_handler(
    State(state): State<PantryState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<Vec<ArtworkResponse>>, PantryError> {
    let Query(params) = params.map_err(|_| PantryError::InvalidLimit)?;
    let artworks = state.store.list(params.limit).await?;
    Ok(Json(artworks.into_iter().map(ArtworkResponse::from).collect()))
}

/// GET /api/art/{id}
pub(super) async fn get_artwork_handler(
    State(state): State<PantryState>,
    ArtworkId(id): ArtworkId,
) -> Result<Response, PantryError> {
    let bytes = state.store.get(id).await?;
    Ok(([(CONTENT_TYPE, "image/png")], bytes).into_response())
}

/// DELETE /api/art/{id}
pub(super) async fn delete_artwork_handler(
    State(state): State<PantryState>,
    ArtworkId(id): ArtworkId,
) -> Result<Json<DeleteResponse>, PantryError> {
    state.store.delete(id).await?;
    Ok(Json(DeleteResponse { deleted: true }))
}
