//! Axum route handlers.

pub mod images;
pub mod meshes;
