pub mod integration;
pub mod settings;
pub mod style;
