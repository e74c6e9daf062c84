pub mod auto_rotate;
pub mod config;
pub mod dome;
pub mod engine;
pub mod gesture;
pub mod inertia;
pub mod ports;
pub mod rotation;
pub mod tiles;
