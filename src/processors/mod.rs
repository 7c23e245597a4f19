//! Pure image and score transformations used by the pipeline stages.

pub mod normalization;
pub mod resize;
pub mod topk;

pub use normalization::{scale_to_unit, NormalizeImage};
pub use resize::{center_crop, resize_exact, resize_shortest_side};
pub use topk::{softmax, Topk};
