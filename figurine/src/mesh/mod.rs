//! Mesh synthesis for the placeholder model.
//!
//! - [`types`]: the indexed triangle mesh and its basic operations
//! - [`primitives`]: closed sphere and cylinder generators
//! - [`humanoid`]: the fixed five-primitive figure assembly

pub mod humanoid;
pub mod primitives;
pub mod types;

pub use humanoid::humanoid_figure;
pub use types::TriMesh;
