use crate::error::PantryError;
use axum::{
    Form,
    extract::{FromRequest, FromRequestParts, Multipart, Path, Request},
    http::{header::CONTENT_TYPE, request::Parts},
};
use serde::Deserialize;
use tracing::debug;

/// Fields of a save request, accepted as `multipart/form-data` (browser `FormData`)
/// or `application/x-www-form-urlencoded`.
#[derive(Debug)]
pub(crate) struct SaveArtworkForm {
    pub(crate) data_url: String,
    pub(crate) width: i64,
    pub(crate) height: i64,
}

/// Fields as they arrive; numbers stay text until validated.
#[derive(Debug, Default, Deserialize)]
struct RawSaveForm {
    data_url: Option<String>,
    width: Option<String>,
    height: Option<String>,
}

impl<S> FromRequest<S> for SaveArtworkForm
where
    S: Send + Sync,
{
    type Rejection = PantryError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        let raw = if is_multipart {
            let multipart = Multipart::from_request(req, state).await?;
            read_multipart(multipart).await?
        } else {
            let Form(raw) = Form::<RawSaveForm>::from_request(req, state).await?;
            raw
        };

        raw.validate()
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<RawSaveForm, PantryError> {
    let mut raw = RawSaveForm::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "data_url" => raw.data_url = Some(field.text().await?),
            "width" => raw.width = Some(field.text().await?),
            "height" => raw.height = Some(field.text().await?),
            _ => debug!(field = %name, "Ignoring unknown save form field"),
        }
    }
    Ok(raw)
}

impl RawSaveForm {
    fn validate(self) -> Result<SaveArtworkForm, PantryError> {
        let data_url = self
            .data_url
            .ok_or_else(|| PantryError::InvalidForm("missing field `data_url`".to_string()))?;
        let width = parse_dimension("width", self.width)?;
        let height = parse_dimension("height", self.height)?;

        Ok(SaveArtworkForm {
            data_url,
            width,
            height,
        })
    }
}

fn parse_dimension(field: &str, value: Option<String>) -> Result<i64, PantryError> {
    let value = value.ok_or_else(|| PantryError::InvalidForm(format!("missing field `{field}`")))?;
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| PantryError::InvalidForm(format!("field `{field}` must be an integer")))
}

/// Artwork id from the `{id}` path segment.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ArtworkId(pub(crate) i64);

impl<S> FromRequestParts<S> for ArtworkId
where
    S: Send + Sync,
{
    type Rejection = PantryError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| PantryError::InvalidId(e.body_text()))?;

        raw.trim()
            .parse::<i64>()
            .map(ArtworkId)
            .map_err(|_| PantryError::InvalidId(raw))
    }
}
