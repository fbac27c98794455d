pub mod paint;

pub use paint::{Theme, VelloRenderer, paint_scene};
