pub mod document;
pub mod geometry;
pub mod hit;
pub mod id;
pub mod model;
pub mod persist;
pub mod render;

pub use document::Document;
pub use hit::{HIT_RADIUS, HandleRef, LineHit};
pub use id::{HandleId, IdGen, LineId};
pub use model::{Handle, Line, MIN_HANDLES};
pub use persist::{LoadReport, SkippedLine};
pub use render::{Overlay, Renderer, paint_document};

// Re-export kurbo's point type so downstream crates share one geometry type
pub use kurbo::Point;
