//! Human and machine readable views of a diff

pub mod json_render;
pub mod listing_render;

pub use json_render::{render_json, DiffDocument, NodeRecord};
pub use listing_render::render_listing;
