//! Scene graph nodes
//!
//! An [`Object3D`] owns its children by value, so every scene is an
//! independent tree: cloning or mutating one never touches another.

use nalgebra::{Matrix4, Point3};

use crate::color::Color;
use crate::geometry::{BoundingBox, Geometry};
use crate::helpers::Helper;
use crate::transform::Transform;

/// Surface appearance of a mesh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMaterial {
    pub color: Color,
    /// Draw triangle outlines instead of filled faces
    pub wireframe: bool,
    /// Shade with the scene's lights; unlit meshes use their flat colour
    pub lit: bool,
}

impl MeshMaterial {
    pub fn lambert(color: Color) -> Self {
        Self {
            color,
            wireframe: false,
            lit: true,
        }
    }

    pub fn basic(color: Color) -> Self {
        Self {
            color,
            wireframe: false,
            lit: false,
        }
    }
}

impl Default for MeshMaterial {
    fn default() -> Self {
        Self::lambert(Color::WHITE)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineMaterial {
    pub color: Color,
}

impl LineMaterial {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: MeshMaterial,
}

/// Disconnected line segments sharing one material
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegments {
    pub segments: Vec<[Point3<f32>; 2]>,
    pub material: LineMaterial,
}

/// Parallel light shining from the node's position toward `target`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub target: Point3<f32>,
}

impl DirectionalLight {
    pub fn new(color: Color, intensity: f32) -> Self {
        Self {
            color,
            intensity,
            target: Point3::origin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKind {
    Group,
    Mesh(Mesh),
    Lines(LineSegments),
    Helper(Helper),
    Light(DirectionalLight),
}

/// A node in the scene graph
#[derive(Debug, Clone, PartialEq)]
pub struct Object3D {
    pub name: String,
    pub transform: Transform,
    pub visible: bool,
    pub kind: ObjectKind,
    children: Vec<Object3D>,
}

impl Object3D {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            name: String::new(),
            transform: Transform::identity(),
            visible: true,
            kind,
            children: Vec::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(ObjectKind::Group)
    }

    pub fn mesh(geometry: Geometry, material: MeshMaterial) -> Self {
        Self::new(ObjectKind::Mesh(Mesh { geometry, material }))
    }

    pub fn lines(segments: Vec<[Point3<f32>; 2]>, material: LineMaterial) -> Self {
        Self::new(ObjectKind::Lines(LineSegments { segments, material }))
    }

    pub fn helper(helper: impl Into<Helper>) -> Self {
        Self::new(ObjectKind::Helper(helper.into()))
    }

    pub fn light(light: DirectionalLight) -> Self {
        Self::new(ObjectKind::Light(light))
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.transform.set_position(x, y, z);
        self
    }

    pub fn add(&mut self, child: Object3D) {
        self.children.push(child);
    }

    pub fn add_all<I: IntoIterator<Item = Object3D>>(&mut self, children: I) {
        self.children.extend(children);
    }

    pub fn children(&self) -> &[Object3D] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Object3D> {
        &mut self.children
    }

    /// Depth-first search by name, including `self`
    pub fn find(&self, name: &str) -> Option<&Object3D> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Visit this node and every visible descendant with its world matrix
    pub fn traverse_visible<F>(&self, parent: &Matrix4<f32>, visit: &mut F)
    where
        F: FnMut(&Object3D, &Matrix4<f32>),
    {
        if !self.visible {
            return;
        }
        let world = parent * self.transform.matrix();
        visit(self, &world);
        for child in &self.children {
            child.traverse_visible(&world, visit);
        }
    }

    /// World-space bounds of this node's drawable content and descendants
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut bounds: Option<BoundingBox> = None;
        self.traverse_visible(&Matrix4::identity(), &mut |object, world| {
            let local = match &object.kind {
                ObjectKind::Mesh(mesh) => mesh.geometry.bounding_box(),
                ObjectKind::Lines(lines) => {
                    BoundingBox::from_points(lines.segments.iter().flatten().copied())
                }
                _ => None,
            };
            if let Some(local) = local {
                let world_bounds = local.transformed(world);
                bounds = Some(match bounds {
                    Some(existing) => existing.union(&world_bounds),
                    None => world_bounds,
                });
            }
        });
        bounds
    }
}

/// Group any number of objects under a single composite node.
///
/// The children keep the order they were given in.
pub fn create_group<I: IntoIterator<Item = Object3D>>(objects: I) -> Object3D {
    let mut group = Object3D::group();
    group.add_all(objects);
    group
}
