//! Fixed-layout parameter blocks shared with GPU shaders.
//!
//! Layouts follow the shader side: a `float3` occupies 16 bytes, a
//! `float3x3` is three such columns, and every implicit gap is spelled out
//! as a `_pad` field so the blocks are `Pod`.
//!
//! - **3D core**: [`FrameData`], [`RenderUniform`], [`ModelerUniform`],
//!   [`ModelerHitUniform`]
//! - **Canvas** (2D UI primitives, interface only): see [`canvas`]

pub mod canvas;

use sculpt_math::{Mat3, Vec2, Vec3};

use crate::camera::CameraFrame;
use crate::params::{FrameState, TraceParams};
use crate::scene::CsgNode;
use crate::primitive::Primitive;

/// Pad a `Vec3` to a 16-byte shader `float3`.
#[inline]
fn float3(v: Vec3) -> [f32; 4] {
    [v.x, v.y, v.z, 0.0]
}

/// Shader `float3x3`: three padded columns.
#[inline]
fn float3x3(m: Mat3) -> [[f32; 4]; 3] {
    [float3(m.x_axis), float3(m.y_axis), float3(m.z_axis)]
}

/// Bounding interval and basis of a camera frame, zeroed when unbounded.
fn frame_bounds(frame: &CameraFrame) -> ([f32; 4], [f32; 4], [[f32; 4]; 3]) {
    let (p, l) = frame.bounds().unwrap_or((Vec3::ZERO, Vec3::ZERO));
    (float3(p), float3(l), float3x3(frame.basis()))
}

/// Time and frame counter.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FrameData {
    pub time: f32,
    pub frame: u32,
}

impl From<FrameState> for FrameData {
    fn from(state: FrameState) -> Self {
        Self {
            time: state.time,
            frame: state.frame,
        }
    }
}

/// Per-dispatch parameters of the path tracer.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RenderUniform {
    pub random_vector: [f32; 4],
    pub camera_origin: [f32; 4],
    pub camera_look_at: [f32; 4],
    pub samples: i32,
    pub depth: i32,
    pub max_depth: i32,
    pub _pad0: i32,
    pub p: [f32; 4],
    pub l: [f32; 4],
    pub f: [[f32; 4]; 3],
    pub max_distance: f32,
    pub _pad1: [f32; 3],
}

impl RenderUniform {
    pub fn new(params: &TraceParams, frame: &CameraFrame) -> Self {
        let (p, l, f) = frame_bounds(frame);
        Self {
            random_vector: float3(params.random_vector),
            camera_origin: float3(frame.origin()),
            camera_look_at: float3(frame.look_at()),
            samples: params.samples as i32,
            depth: params.depth as i32,
            max_depth: params.max_depth as i32,
            _pad0: 0,
            p,
            l,
            f,
            max_distance: params.max_distance,
            _pad1: [0.0; 3],
        }
    }
}

/// Parameters for previewing a single node in the modeler.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelerUniform {
    pub action_type: i32,
    pub primitive_type: i32,
    pub _pad0: [i32; 2],
    pub random_vector: [f32; 4],
    pub position: [f32; 4],
    pub rotation: [f32; 4],
    pub radius: f32,
    pub _pad1: [f32; 3],
    pub size: [f32; 4],
    pub rounding: f32,
    pub samples: i32,
    pub depth: i32,
    pub max_depth: i32,
    pub p: [f32; 4],
    pub l: [f32; 4],
    pub f: [[f32; 4]; 3],
    pub max_distance: f32,
    pub _pad2: [f32; 3],
}

impl ModelerUniform {
    pub fn new(node: &CsgNode, params: &TraceParams, frame: &CameraFrame) -> Self {
        let (p, l, f) = frame_bounds(frame);
        let (position, rotation, radius, size, rounding) = match &node.primitive {
            Primitive::Sphere(sphere) => (sphere.center, Vec3::ZERO, sphere.radius, Vec3::ZERO, 0.0),
            Primitive::Box(b) => (b.center(), b.rotation(), 0.0, b.half_extents(), b.rounding()),
        };
        Self {
            action_type: node.action.code(),
            primitive_type: node.primitive.type_code(),
            _pad0: [0; 2],
            random_vector: float3(params.random_vector),
            position: float3(position),
            rotation: float3(rotation),
            radius,
            _pad1: [0.0; 3],
            size: float3(size),
            rounding,
            samples: params.samples as i32,
            depth: params.depth as i32,
            max_depth: params.max_depth as i32,
            p,
            l,
            f,
            max_distance: params.max_distance,
            _pad2: [0.0; 3],
        }
    }
}

/// Parameters for picking a surface point under the cursor.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ModelerHitUniform {
    pub random_vector: [f32; 4],
    pub uv: [f32; 2],
    pub size: [f32; 2],
    pub scale: f32,
    pub _pad0: [f32; 3],
    pub camera_origin: [f32; 4],
    pub camera_look_at: [f32; 4],
}

impl ModelerHitUniform {
    pub fn new(random_vector: Vec3, uv: Vec2, size: Vec2, scale: f32, frame: &CameraFrame) -> Self {
        Self {
            random_vector: float3(random_vector),
            uv: uv.to_array(),
            size: size.to_array(),
            scale,
            _pad0: [0.0; 3],
            camera_origin: float3(frame.origin()),
            camera_look_at: float3(frame.look_at()),
        }
    }
}
