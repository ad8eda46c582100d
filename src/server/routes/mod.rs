pub mod art;
pub mod health;
