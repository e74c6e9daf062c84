pub mod radius;
pub mod style;
