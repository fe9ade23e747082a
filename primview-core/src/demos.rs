//! The demo gallery: one entry per page, each bootstrapping a scene and
//! adding the primitive or helper it shows.
//!
//! Paths mirror the gallery's hash routes (`geometry/box`, `helper/grid`);
//! [`find`] accepts them with or without a leading `#/`.

use std::f32::consts::{FRAC_PI_2, TAU};

use nalgebra::{Point2, Point3, Vector3};

use crate::bootstrap::{bootstrap, Instances, SceneOptions};
use crate::color::Color;
use crate::container::Container;
use crate::edges::create_edges;
use crate::error::Result;
use crate::geometry::Geometry;
use crate::helpers::{
    ArrowHelper, BoxHelper, CameraHelper, DirectionalLightHelper, GridHelper, PolarGridHelper,
};
use crate::object::{create_group, DirectionalLight, MeshMaterial, Object3D};
use crate::primitives;
use crate::projection::PerspectiveCamera;
use crate::scene::Scene;

/// Colour of demo surfaces
pub const SURFACE_COLOR: Color = Color::from_hex(0x3d89e0);

/// Largest extent a user-supplied model is scaled to
const SHOWCASE_EXTENT: f32 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Grid, axis arrows and a light
    Geometry,
    /// Optional grid only
    Helper { show_grid: bool },
}

impl Variant {
    pub fn options(self) -> SceneOptions {
        match self {
            Variant::Geometry => SceneOptions::geometry(),
            Variant::Helper { show_grid } => SceneOptions::helper(show_grid),
        }
    }
}

pub struct Demo {
    pub path: &'static str,
    pub title: &'static str,
    pub variant: Variant,
    populate: fn(&mut Scene),
}

impl Demo {
    /// Add this demo's objects to an already bootstrapped scene
    pub fn populate(&self, scene: &mut Scene) {
        (self.populate)(scene);
    }

    /// Bootstrap into `container` and populate the scene
    pub fn bootstrap<T: Container>(&self, container: &mut T) -> Result<Instances<T::Canvas>> {
        let mut instances = bootstrap(container, &self.variant.options())?;
        self.populate(&mut instances.scene);
        Ok(instances)
    }
}

impl std::fmt::Debug for Demo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Demo")
            .field("path", &self.path)
            .field("title", &self.title)
            .field("variant", &self.variant)
            .finish()
    }
}

macro_rules! geometry_demo {
    ($path:literal, $title:literal, $populate:expr) => {
        Demo {
            path: $path,
            title: $title,
            variant: Variant::Geometry,
            populate: $populate,
        }
    };
}

static DEMOS: &[Demo] = &[
    geometry_demo!("geometry/overview", "Overview", overview),
    geometry_demo!("geometry/plane", "Plane", |s| show(s, primitives::plane(40.0, 40.0, 4, 4))),
    geometry_demo!("geometry/tetrahedron", "Tetrahedron", |s| show(s, primitives::tetrahedron(20.0))),
    geometry_demo!("geometry/box", "Box", |s| show(s, primitives::box_geometry(30.0, 30.0, 30.0))),
    geometry_demo!("geometry/octahedron", "Octahedron", |s| show(s, primitives::octahedron(20.0))),
    geometry_demo!("geometry/dodecahedron", "Dodecahedron", |s| show(s, primitives::dodecahedron(20.0))),
    geometry_demo!("geometry/icosahedron", "Icosahedron", |s| show(s, primitives::icosahedron(20.0))),
    geometry_demo!("geometry/sphere", "Sphere", |s| show(s, primitives::sphere(20.0, 16, 12))),
    geometry_demo!("geometry/ring", "Ring", |s| show(s, primitives::ring(10.0, 25.0, 32))),
    geometry_demo!("geometry/circle", "Circle", |s| show(s, primitives::circle(25.0, 32))),
    geometry_demo!("geometry/cone", "Cone", |s| show(s, primitives::cone(15.0, 30.0, 24))),
    geometry_demo!("geometry/cylinder", "Cylinder", |s| {
        show(s, primitives::cylinder(15.0, 15.0, 30.0, 24, false))
    }),
    geometry_demo!("geometry/torus", "Torus", |s| show(s, primitives::torus(20.0, 6.0, 12, 48))),
    geometry_demo!("geometry/torus-knot", "Torus knot", |s| {
        show(s, primitives::torus_knot(15.0, 4.0, 96, 12, 2, 3))
    }),
    geometry_demo!("geometry/lathe", "Lathe", |s| show(s, primitives::lathe(&vase_profile(), 24))),
    geometry_demo!("geometry/tube", "Tube", |s| show(s, primitives::tube(helix, 96, 3.0, 8, false))),
    Demo {
        path: "helper/grid",
        title: "Grid helper",
        variant: Variant::Helper { show_grid: false },
        populate: grid_demo,
    },
    Demo {
        path: "helper/arrow",
        title: "Arrow helper",
        variant: Variant::Helper { show_grid: true },
        populate: arrow_demo,
    },
    Demo {
        path: "helper/box",
        title: "Box helper",
        variant: Variant::Helper { show_grid: true },
        populate: box_demo,
    },
    Demo {
        path: "helper/camera",
        title: "Camera helper",
        variant: Variant::Helper { show_grid: true },
        populate: camera_demo,
    },
    Demo {
        path: "helper/directional-light",
        title: "Directional light helper",
        variant: Variant::Helper { show_grid: true },
        populate: directional_light_demo,
    },
    Demo {
        path: "helper/polar",
        title: "Polar grid helper",
        variant: Variant::Helper { show_grid: false },
        populate: polar_demo,
    },
];

pub fn catalog() -> &'static [Demo] {
    DEMOS
}

/// Look up a demo by path, ignoring a leading `#` and slashes
pub fn find(path: &str) -> Option<&'static Demo> {
    let path = path.trim().trim_start_matches('#').trim_matches('/');
    DEMOS.iter().find(|demo| demo.path == path)
}

/// A surface mesh with its outline, grouped so they move together
pub fn showcase(geometry: Geometry) -> Object3D {
    let edges = create_edges(&geometry).with_name("edges");
    let mesh = Object3D::mesh(geometry, MeshMaterial::lambert(SURFACE_COLOR)).with_name("surface");
    create_group([mesh, edges]).with_name("showcase")
}

fn show(scene: &mut Scene, geometry: Geometry) {
    scene.add(showcase(geometry));
}

/// Centre an arbitrary model on the origin and scale it to fit the grid
pub fn show_model(scene: &mut Scene, mut geometry: Geometry) {
    geometry.center();
    let extent = geometry
        .bounding_box()
        .map(|bounds| bounds.size().max())
        .unwrap_or(0.0);
    let mut object = showcase(geometry);
    if extent > f32::EPSILON {
        let factor = SHOWCASE_EXTENT / extent;
        object.transform.scale = Vector3::new(factor, factor, factor);
    }
    scene.add(object);
}

fn vase_profile() -> Vec<Point2<f32>> {
    (0..10)
        .map(|i| {
            let t = i as f32;
            Point2::new((t * 0.2).sin() * 10.0 + 5.0, (t - 5.0) * 4.0)
        })
        .collect()
}

/// Three turns around the Y axis
fn helix(t: f32) -> Point3<f32> {
    let angle = t * 3.0 * TAU;
    Point3::new(15.0 * angle.cos(), t * 40.0 - 20.0, 15.0 * angle.sin())
}

fn overview(scene: &mut Scene) {
    let shapes = [
        primitives::box_geometry(10.0, 10.0, 10.0),
        primitives::tetrahedron(7.0),
        primitives::octahedron(7.0),
        primitives::dodecahedron(7.0),
        primitives::icosahedron(7.0),
        primitives::sphere(7.0, 12, 8),
        primitives::cone(6.0, 12.0, 16),
        primitives::cylinder(6.0, 6.0, 12.0, 16, false),
        primitives::torus(6.0, 2.0, 8, 24),
        primitives::torus_knot(5.0, 1.5, 64, 8, 2, 3),
    ];
    for (i, geometry) in shapes.into_iter().enumerate() {
        let column = (i % 5) as f32;
        let row = (i / 5) as f32;
        scene.add(showcase(geometry).with_position(-40.0 + column * 20.0, 8.0, -15.0 + row * 30.0));
    }
}

fn grid_demo(scene: &mut Scene) {
    scene.add(Object3D::helper(GridHelper::new(80.0, 8)).with_name("demo-grid"));
    let mut tilted = GridHelper::new(40.0, 10);
    tilted.grid_color = Color::from_hex(0x3d89e0);
    let mut vertical = Object3D::helper(tilted).with_name("vertical-grid");
    vertical.transform.rotation.x = FRAC_PI_2;
    vertical.transform.set_position(0.0, 20.0, -40.0);
    scene.add(vertical);
}

fn arrow_demo(scene: &mut Scene) {
    let arrow = ArrowHelper::new(
        Vector3::new(1.0, 1.0, 1.0),
        Point3::origin(),
        40.0,
        Color::from_hex(0xffaa00),
        6.0,
    );
    scene.add(Object3D::helper(arrow).with_name("arrow"));
}

fn box_demo(scene: &mut Scene) {
    let sphere = Object3D::mesh(primitives::sphere(15.0, 16, 12), MeshMaterial::basic(SURFACE_COLOR))
        .with_name("sphere")
        .with_position(0.0, 15.0, 0.0);
    if let Some(helper) = BoxHelper::from_object(&sphere, Color::YELLOW) {
        scene.add(Object3D::helper(helper).with_name("box-helper"));
    }
    scene.add(sphere);
}

fn camera_demo(scene: &mut Scene) {
    let mut camera = PerspectiveCamera::new(45.0, 1.5, 5.0, 40.0);
    camera.set_position(30.0, 20.0, 30.0);
    camera.look_at(Point3::origin());
    scene.add(Object3D::helper(CameraHelper::new(&camera)).with_name("camera-helper"));
}

fn directional_light_demo(scene: &mut Scene) {
    let light = DirectionalLight::new(Color::WHITE, 1.0);
    let position = Point3::new(20.0, 30.0, 10.0);
    scene.add(
        Object3D::light(light)
            .with_name("demo-light")
            .with_position(position.x, position.y, position.z),
    );
    scene.add(Object3D::helper(DirectionalLightHelper::new(position, &light, 5.0)).with_name("light-helper"));
    scene.add(
        Object3D::mesh(primitives::box_geometry(20.0, 20.0, 20.0), MeshMaterial::lambert(SURFACE_COLOR))
            .with_name("lit-box")
            .with_position(0.0, 10.0, 0.0),
    );
}

fn polar_demo(scene: &mut Scene) {
    scene.add(Object3D::helper(PolarGridHelper::new(40.0, 16, 8, 64)).with_name("polar-grid"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::HeadlessContainer;
    use crate::object::ObjectKind;

    #[test]
    fn test_paths_are_unique() {
        let mut paths: Vec<_> = catalog().iter().map(|d| d.path).collect();
        paths.sort_unstable();
        paths.dedup();
        assert_eq!(paths.len(), catalog().len());
    }

    #[test]
    fn test_find_accepts_hash_routes() {
        assert_eq!(find("#/geometry/box").map(|d| d.title), Some("Box"));
        assert_eq!(find("/helper/grid/").map(|d| d.path), Some("helper/grid"));
        assert!(find("geometry/text").is_none());
    }

    #[test]
    fn test_tube_demo_sweeps_helix() {
        let demo = find("geometry/tube").unwrap();
        assert_eq!(demo.title, "Tube");
        assert!(helix(0.0).y < helix(1.0).y);
        assert!((helix(1.0) - Point3::new(15.0, 20.0, 0.0)).norm() < 1e-3);

        let mut container = HeadlessContainer::new(64, 48);
        let mut instances = demo.bootstrap(&mut container).unwrap();
        instances.render().unwrap();
    }

    #[test]
    fn test_every_demo_adds_objects() {
        for demo in catalog() {
            let mut container = HeadlessContainer::new(64, 48);
            let instances = demo.bootstrap(&mut container).unwrap();
            let helpers = demo.variant.options().helper_count();
            assert!(
                instances.scene.len() > helpers,
                "{} added nothing to the scene",
                demo.path
            );
        }
    }

    #[test]
    fn test_showcase_groups_surface_and_edges() {
        let group = showcase(primitives::box_geometry(1.0, 1.0, 1.0));
        assert_eq!(group.kind, ObjectKind::Group);
        let names: Vec<_> = group.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["surface", "edges"]);
    }

    #[test]
    fn test_show_model_scales_to_fit() {
        let mut scene = Scene::new();
        show_model(&mut scene, primitives::box_geometry(4.0, 2.0, 2.0));
        let bounds = scene.children()[0].bounding_box().unwrap();
        assert!((bounds.size().x - SHOWCASE_EXTENT).abs() < 1e-3);
    }
}
