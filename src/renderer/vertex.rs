//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    /// #0b0f19
    pub const BACKGROUND: [f32; 4] = [0.043, 0.059, 0.098, 1.0];
    /// #ef4444
    pub const TARGET: [f32; 4] = [0.937, 0.267, 0.267, 1.0];
    /// #3b82f6
    pub const PLAYER: [f32; 4] = [0.231, 0.510, 0.965, 1.0];

    /// Same background as a wgpu clear color
    pub fn clear_color() -> wgpu::Color {
        wgpu::Color {
            r: BACKGROUND[0] as f64,
            g: BACKGROUND[1] as f64,
            b: BACKGROUND[2] as f64,
            a: BACKGROUND[3] as f64,
        }
    }
}
