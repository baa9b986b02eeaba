//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for the two operations
//! - **[`models`]**: Request/response data structures
//! - **[`cors`]**: permissive CORS middleware and preflight handling
//!
//! Both operations are `POST` with a JSON body naming a staged upload:
//!
//! - `/v1/image` — echo the uploaded image bytes back to the caller
//! - `/v1/model` — synthesize the placeholder humanoid GLB and publish it
//!
//! Endpoints are documented with OpenAPI annotations via `utoipa`; the
//! rendered docs are served at `/docs`.

pub mod cors;
pub mod handlers;
pub mod models;
