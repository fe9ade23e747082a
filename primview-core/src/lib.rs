/// primview Core Library - scene bootstrap and the pieces it wires together
///
/// This library provides the scene graph, geometry primitives, perspective
/// camera, orbit controls, helper objects and software renderer used by the
/// primview demo gallery, plus the bootstrap that assembles them for a host
/// surface.
pub mod bootstrap;
pub mod color;
pub mod config;
pub mod container;
pub mod controls;
pub mod demos;
pub mod edges;
pub mod error;
pub mod geometry;
pub mod helpers;
pub mod object;
pub mod primitives;
pub mod projection;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod stl;
pub mod transform;

// Re-export commonly used types
pub use bootstrap::{
    bootstrap, create_geometry_instances, create_instances, Instances, SceneOptions,
};
pub use color::Color;
pub use config::{load_config, Config, TerminalOptions};
pub use container::{Canvas, Container, HeadlessCanvas, HeadlessContainer};
pub use controls::OrbitControls;
pub use edges::create_edges;
pub use error::{Error, Result};
pub use geometry::{BoundingBox, Geometry, Triangle, Vertex};
pub use helpers::Helper;
pub use object::{create_group, DirectionalLight, LineMaterial, MeshMaterial, Object3D, ObjectKind};
pub use projection::PerspectiveCamera;
pub use raster::FrameBuffer;
pub use renderer::{RenderInfo, Renderer, RendererOptions};
pub use scene::Scene;
pub use transform::{RotationState, Transform};
