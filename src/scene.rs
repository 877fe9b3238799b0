//! The small fixed-geometry demos (triangle, rotation, cube, texturing),
//! described as data and drawn by one generic render loop.

use std::path::{Path, PathBuf};

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct SceneVertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub uv: [f32; 2],
}

const fn vertex(position: [f32; 3], color: [f32; 3], uv: [f32; 2]) -> SceneVertex {
    SceneVertex {
        position,
        color,
        uv,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    TriangleStrip,
    /// Groups of four vertices, each an independent quad.
    Quads,
}

#[derive(Debug, Clone)]
pub struct Scene {
    pub name: &'static str,
    pub vertices: Vec<SceneVertex>,
    pub primitive: Primitive,
    /// Applied to every vertex position once per frame.
    pub rotation: Mat4,
    pub texture: Option<PathBuf>,
    pub depth_test: bool,
}

pub const SCENE_NAMES: [&str; 5] = ["triangle", "rotate", "cube", "texture", "cube_texture"];

const RED: [f32; 3] = [1.0, 0.0, 0.0];
const GREEN: [f32; 3] = [0.0, 1.0, 0.0];
const BLUE: [f32; 3] = [0.0, 0.0, 1.0];
const WHITE: [f32; 3] = [1.0, 1.0, 1.0];
const NO_UV: [f32; 2] = [0.0, 0.0];

fn one_degree() -> f32 {
    1.0f32.to_radians()
}

impl Scene {
    /// Looks up a preset by name; `texture` is used by the textured ones.
    pub fn by_name(name: &str, texture: &Path) -> Option<Scene> {
        match name {
            "triangle" => Some(Scene::triangle()),
            "rotate" => Some(Scene::rotate()),
            "cube" => Some(Scene::cube()),
            "texture" => Some(Scene::texture(texture)),
            "cube_texture" => Some(Scene::cube_texture(texture)),
            _ => None,
        }
    }

    pub fn triangle() -> Scene {
        Scene {
            name: "triangle",
            vertices: vec![
                vertex([-0.5, -0.5, 0.0], RED, NO_UV),
                vertex([0.5, -0.5, 0.0], GREEN, NO_UV),
                vertex([0.0, 0.5, 0.0], BLUE, NO_UV),
            ],
            primitive: Primitive::Triangles,
            rotation: Mat4::IDENTITY,
            texture: None,
            depth_test: true,
        }
    }

    /// The triangle, turning one degree per frame around Z.
    pub fn rotate() -> Scene {
        Scene {
            name: "rotate",
            rotation: Mat4::from_rotation_z(one_degree()),
            ..Scene::triangle()
        }
    }

    /// A cube drawn as a single 14-vertex triangle strip, white in front and
    /// red at the back.
    pub fn cube() -> Scene {
        const BACK: [f32; 3] = RED;
        let strip = [
            ([-0.5, 0.5, 0.5], WHITE),
            ([0.5, 0.5, 0.5], WHITE),
            ([-0.5, -0.5, 0.5], WHITE),
            ([0.5, -0.5, 0.5], WHITE),
            ([0.5, -0.5, -0.5], BACK),
            ([0.5, 0.5, 0.5], WHITE),
            ([0.5, 0.5, -0.5], BACK),
            ([-0.5, 0.5, 0.5], WHITE),
            ([-0.5, 0.5, -0.5], BACK),
            ([-0.5, -0.5, 0.5], WHITE),
            ([-0.5, -0.5, -0.5], BACK),
            ([0.5, -0.5, -0.5], BACK),
            ([-0.5, 0.5, -0.5], BACK),
            ([0.5, 0.5, -0.5], BACK),
        ];
        // Applied to a vertex: z first, then y, then x.
        let rotation = Mat4::from_rotation_x(one_degree())
            * Mat4::from_rotation_y(one_degree())
            * Mat4::from_rotation_z(one_degree());
        Scene {
            name: "cube",
            vertices: strip
                .into_iter()
                .map(|(position, color)| vertex(position, color, NO_UV))
                .collect(),
            primitive: Primitive::TriangleStrip,
            rotation,
            texture: None,
            depth_test: true,
        }
    }

    /// A static textured quad.
    pub fn texture(texture: &Path) -> Scene {
        Scene {
            name: "texture",
            vertices: vec![
                vertex([-0.5, -0.5, 0.0], RED, [0.0, 0.0]),
                vertex([0.5, -0.5, 0.0], GREEN, [1.0, 0.0]),
                vertex([0.5, 0.5, 0.0], BLUE, [1.0, 1.0]),
                vertex([-0.5, 0.5, 0.0], BLUE, [0.0, 1.0]),
            ],
            primitive: Primitive::Quads,
            rotation: Mat4::IDENTITY,
            texture: Some(texture.to_path_buf()),
            depth_test: true,
        }
    }

    /// Six textured, tinted faces tumbling around (0.35, 1, 0).
    pub fn cube_texture(texture: &Path) -> Scene {
        let faces: [([[f32; 3]; 4], [f32; 3]); 6] = [
            (
                [[-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]],
                WHITE,
            ),
            (
                [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5]],
                RED,
            ),
            (
                [[-0.5, -0.5, 0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [-0.5, 0.5, 0.5]],
                GREEN,
            ),
            (
                [[0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5]],
                BLUE,
            ),
            (
                [[-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5]],
                [1.0, 0.0, 1.0],
            ),
            (
                [[-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [-0.5, -0.5, -0.5]],
                [0.0, 1.0, 1.0],
            ),
        ];
        const UVS: [[f32; 2]; 4] = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let vertices = faces
            .iter()
            .flat_map(|(corners, color)| {
                corners
                    .iter()
                    .zip(UVS)
                    .map(move |(&position, uv)| vertex(position, *color, uv))
            })
            .collect();
        Scene {
            name: "cube_texture",
            vertices,
            primitive: Primitive::Quads,
            rotation: Mat4::from_axis_angle(Vec3::new(0.35, 1.0, 0.0).normalize(), one_degree()),
            texture: Some(texture.to_path_buf()),
            depth_test: true,
        }
    }

    pub fn is_animated(&self) -> bool {
        self.rotation != Mat4::IDENTITY
    }

    /// Rotates every vertex by one frame's worth of rotation.
    pub fn advance(&mut self) {
        if !self.is_animated() {
            return;
        }
        for vertex in &mut self.vertices {
            let position = Vec3::from_array(vertex.position);
            vertex.position = self.rotation.transform_vector3(position).to_array();
        }
    }
}
