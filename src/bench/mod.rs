pub mod classify;
pub mod engine;
pub mod resolver;
pub mod stats;
pub mod types;
