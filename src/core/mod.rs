pub mod composer;
pub mod context;
pub mod engine;
pub mod sampler;
pub mod types;
