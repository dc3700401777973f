//! Parameter blocks consumed by the 2D canvas renderer (UI primitives).
//!
//! The modeler core never reads these; they only share the screen size and
//! time context with it. Colors are straight RGBA in [0, 1].

/// Quad vertex with texture coordinate.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct VertexUniform {
    pub position: [f32; 2],
    pub texture_coordinate: [f32; 2],
}

/// Textured quad placement.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextureUniform {
    pub screen_size: [f32; 2],
    pub pos: [f32; 2],
    pub size: [f32; 2],
    pub global_alpha: f32,
    pub _pad0: f32,
}

/// Filled disc with optional border, onion ring and texture.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DiscUniform {
    pub fill_color: [f32; 4],
    pub border_color: [f32; 4],
    pub radius: f32,
    pub border_size: f32,
    pub rotation: f32,
    /// Non-zero draws only a hollow ring near the boundary
    pub onion: f32,
    pub has_texture: i32,
    pub _pad0: f32,
    pub texture_size: [f32; 2],
}

/// Rounded rectangle with optional border, onion ring and texture.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BoxUniform {
    pub screen_size: [f32; 2],
    pub pos: [f32; 2],
    pub size: [f32; 2],
    pub round: f32,
    pub border_size: f32,
    pub fill_color: [f32; 4],
    pub border_color: [f32; 4],
    pub rotation: f32,
    pub onion: f32,
    pub has_texture: i32,
    pub _pad0: f32,
    pub texture_size: [f32; 2],
    pub _pad1: [f32; 2],
}

/// One glyph from a font atlas.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TextUniform {
    pub atlas_size: [f32; 2],
    pub font_pos: [f32; 2],
    pub font_size: [f32; 2],
    pub _pad0: [f32; 2],
    pub color: [f32; 4],
}

impl BoxUniform {
    /// Solid rectangle without border or texture.
    pub fn filled(screen_size: [f32; 2], pos: [f32; 2], size: [f32; 2], fill_color: [f32; 4]) -> Self {
        Self {
            screen_size,
            pos,
            size,
            fill_color,
            ..Default::default()
        }
    }
}

impl DiscUniform {
    /// Solid disc without border or texture.
    pub fn filled(radius: f32, fill_color: [f32; 4]) -> Self {
        Self {
            radius,
            fill_color,
            ..Default::default()
        }
    }
}
