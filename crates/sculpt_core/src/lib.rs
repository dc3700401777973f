//! Sculpt Core - CSG scene graph over signed distance fields.
//!
//! This crate provides:
//!
//! - **Primitives**: `Sphere`, `RoundedBox` and their distance functions
//! - **Scene graph**: `Scene` of `CsgNode`s folded into one distance field
//! - **Camera frame**: orthonormal viewing basis with a bounding interval
//! - **Parameter blocks**: fixed-layout uniforms shared with GPU shaders
//!
//! # Example
//!
//! ```
//! use sculpt_core::{CsgNode, Primitive, Scene};
//! use sculpt_math::Vec3;
//!
//! let mut scene = Scene::new();
//! scene.add(CsgNode::new("ball", Primitive::sphere(Vec3::ZERO, 1.0)?))?;
//! assert_eq!(scene.evaluate(Vec3::ZERO), -1.0);
//! # Ok::<(), sculpt_core::ConfigError>(())
//! ```

pub mod camera;
pub mod error;
pub mod params;
pub mod primitive;
pub mod scene;
pub mod uniforms;

// Re-export commonly used types
pub use camera::CameraFrame;
pub use error::{ConfigError, ConfigResult};
pub use params::{FrameState, TraceParams};
pub use primitive::{Primitive, RoundedBox, Sphere};
pub use scene::{Action, CsgNode, Material, NodeId, Scene};
