pub mod engine;
pub mod instances;
pub mod mesh;
pub mod pipeline;
pub mod scene;
pub mod texture;
