//! Artwork persistence: PNG bytes on disk bound to a metadata row.

pub mod data_url;
pub mod filename;
pub mod model;
pub mod reconcile;
pub mod store;

pub use data_url::{PNG_DATA_URL_PREFIX, decode_png_data_url, encode_png_data_url};
pub use model::Artwork;
pub use reconcile::ReconcileReport;
pub use store::ArtworkStore;
