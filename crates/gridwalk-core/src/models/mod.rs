//! Data models for the application

mod layer;

pub use layer::*;
