//! Skyline core: projection and painter's-algorithm ordering of 3D building
//! geometry for plain 2D path-drawing surfaces.
//!
//! The stateless pieces (camera, projection, depth ordering) are separate
//! from the frame loop so any host with a begin/move/line/stroke/fill
//! surface can drive them.

pub mod animation;
pub mod camera;
pub mod config;
pub mod depth;
pub mod error;
pub mod geojson;
pub mod geometry;
pub mod math;
pub mod paint;
pub mod projection;

// Re-export commonly used types
pub use animation::{LoopSettings, LoopState, RenderLoop, StopSignal, Tick, TickOutcome};
pub use camera::{Camera, Viewport};
pub use config::ViewerConfig;
pub use depth::{depth_metric, order_for_painting};
pub use error::{Error, Result};
pub use geometry::{Geometry, PlaneCollection, Polygon, Ring};
pub use paint::{Color, Finalize, FrameStats, GeometryClass, Layer, Style, Surface};
pub use projection::{build_transform, ProjectionSettings, ProjectionTransform};
