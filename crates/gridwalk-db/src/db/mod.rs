//! Database repositories for data access layer
//!
//! `layer` holds the upload registry (`gridwalk.layers`); `source` inspects the
//! layer data schema where per-layer tables live.

pub mod layer;
pub mod source;

pub use layer::{LayerRepository, LayerStore};
pub use source::{SourceRepository, SourceStore};
