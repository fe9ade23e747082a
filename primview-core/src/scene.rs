/// Scene graph root
use nalgebra::Matrix4;

use crate::color::Color;
use crate::object::Object3D;

/// The root of a scene graph: an ordered list of top-level objects
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    /// Overrides the renderer's clear colour when set
    pub background: Option<Color>,
    children: Vec<Object3D>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: Object3D) {
        self.children.push(object);
    }

    pub fn add_all<I: IntoIterator<Item = Object3D>>(&mut self, objects: I) {
        self.children.extend(objects);
    }

    /// Remove the first top-level object called `name`
    pub fn remove(&mut self, name: &str) -> Option<Object3D> {
        let index = self.children.iter().position(|child| child.name == name)?;
        Some(self.children.remove(index))
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn children(&self) -> &[Object3D] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Object3D> {
        &mut self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Depth-first search by name
    pub fn find(&self, name: &str) -> Option<&Object3D> {
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Visit every visible object with its world matrix
    pub fn traverse_visible<F>(&self, mut visit: F)
    where
        F: FnMut(&Object3D, &Matrix4<f32>),
    {
        let identity = Matrix4::identity();
        for child in &self.children {
            child.traverse_visible(&identity, &mut visit);
        }
    }
}
