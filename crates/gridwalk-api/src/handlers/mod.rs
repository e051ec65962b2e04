pub mod layers;
pub mod sources;
