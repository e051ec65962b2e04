//! Gridwalk API Library
//!
//! HTTP handlers for the layer registry, application setup and state.

mod api_doc;
pub mod constants;
mod handlers;
pub mod setup;
mod telemetry;

pub mod error;
pub mod state;

pub use api_doc::get_openapi_spec;
pub use error::ErrorResponse;
