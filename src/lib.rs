pub mod artwork;
pub mod config;
pub mod db;
pub mod error;
pub mod server;

pub use artwork::{Artwork, ArtworkStore};
pub use error::PantryError;
