mod pantry;

pub use pantry::{ApiErrorBody, ApiErrorObject, PantryError};
