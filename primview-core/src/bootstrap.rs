//! Scene bootstrap: everything a demo page needs before it adds its own
//! geometry.
//!
//! [`bootstrap`] measures a [`Container`], appends a canvas to it and
//! returns a fresh [`Instances`] set. Nothing is shared between calls and
//! nothing is registered globally; the caller threads the returned handles
//! through its own state and drives the frame loop itself.

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::color::Color;
use crate::container::{Canvas, Container};
use crate::controls::OrbitControls;
use crate::error::Result;
use crate::helpers::{ArrowHelper, GridHelper};
use crate::object::{DirectionalLight, Object3D};
use crate::projection::PerspectiveCamera;
use crate::renderer::{Renderer, RendererOptions};
use crate::scene::Scene;

pub const FIELD_OF_VIEW: f32 = 75.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 1000.0;
pub const CAMERA_POSITION: [f32; 3] = [0.0, 40.0, 80.0];
pub const CLEAR_COLOR: Color = Color::from_hex(0x222842);

pub const GRID_SIZE: f32 = 100.0;
pub const GRID_DIVISIONS: u32 = 20;

pub const AXIS_LENGTH: f32 = 55.0;
pub const AXIS_HEAD_LENGTH: f32 = 4.0;
/// X, Y and Z arrow colours
pub const AXIS_COLORS: [Color; 3] = [Color::RED, Color::YELLOW, Color::BLUE];

pub const LIGHT_POSITION: [f32; 3] = [0.0, 100.0, 500.0];
pub const LIGHT_INTENSITY: f32 = 1.0;

/// Which helper objects to place in a new scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneOptions {
    /// A 100 unit grid with 20 divisions
    pub grid: bool,
    /// Red, yellow and blue arrows along X, Y and Z
    pub axes: bool,
    /// A white directional light
    pub light: bool,
}

impl SceneOptions {
    /// Grid, axis arrows and a light: the setup of the geometry demos
    pub fn geometry() -> Self {
        Self {
            grid: true,
            axes: true,
            light: true,
        }
    }

    /// An optional grid and nothing else: the setup of the helper demos
    pub fn helper(show_grid: bool) -> Self {
        Self {
            grid: show_grid,
            axes: false,
            light: false,
        }
    }

    /// Number of objects the bootstrap adds to the scene
    pub fn helper_count(&self) -> usize {
        usize::from(self.grid) + 3 * usize::from(self.axes) + usize::from(self.light)
    }
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self::helper(true)
    }
}

/// The handles produced by one bootstrap call.
///
/// Dropping (or [`dispose`](Instances::dispose)-ing) the set detaches the
/// canvas from its container and stops the controls.
pub struct Instances<C: Canvas> {
    pub scene: Scene,
    pub camera: PerspectiveCamera,
    pub renderer: Renderer<C>,
    pub controls: OrbitControls,
}

impl<C: Canvas> Instances<C> {
    /// Apply pending control input to the camera
    pub fn update(&mut self, dt: f32) -> bool {
        self.controls.update(&mut self.camera, dt)
    }

    /// Draw one frame of the scene
    pub fn render(&mut self) -> Result<()> {
        self.renderer.render(&self.scene, &self.camera)
    }

    /// Resize the renderer and keep the camera aspect in step
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        self.renderer.set_size(width, height)?;
        self.camera.set_aspect(aspect_ratio(width, height));
        Ok(())
    }

    pub fn is_disposed(&self) -> bool {
        self.renderer.is_disposed()
    }

    /// Release the canvas and stop the controls
    pub fn dispose(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.renderer.is_disposed() {
            self.controls.dispose();
            self.renderer.dispose();
            debug!("Scene instances released");
        }
    }
}

impl<C: Canvas> Drop for Instances<C> {
    fn drop(&mut self) {
        self.release();
    }
}

fn aspect_ratio(width: u32, height: u32) -> f32 {
    if width == 0 || height == 0 {
        1.0
    } else {
        width as f32 / height as f32
    }
}

/// The grid used by every demo
pub fn grid() -> Object3D {
    Object3D::helper(GridHelper::new(GRID_SIZE, GRID_DIVISIONS)).with_name("grid")
}

/// Arrows for the X, Y and Z axes, in that order
pub fn axis_arrows() -> [Object3D; 3] {
    let names = ["axis-x", "axis-y", "axis-z"];
    let directions = [Vector3::x(), Vector3::y(), Vector3::z()];
    std::array::from_fn(|i| {
        Object3D::helper(ArrowHelper::new(
            directions[i],
            Point3::origin(),
            AXIS_LENGTH,
            AXIS_COLORS[i],
            AXIS_HEAD_LENGTH,
        ))
        .with_name(names[i])
    })
}

/// The white key light of the geometry demos
pub fn key_light() -> Object3D {
    let [x, y, z] = LIGHT_POSITION;
    Object3D::light(DirectionalLight::new(Color::WHITE, LIGHT_INTENSITY))
        .with_name("light")
        .with_position(x, y, z)
}

/// Build a scene, camera, renderer and orbit controls sized to `container`.
///
/// A canvas is appended to `container`. A container that has not been laid
/// out yet (zero width or height) yields a zero-sized renderer that draws
/// nothing.
pub fn bootstrap<T: Container>(
    container: &mut T,
    options: &SceneOptions,
) -> Result<Instances<T::Canvas>> {
    let width = container.offset_width();
    let height = container.offset_height();
    if width == 0 || height == 0 {
        warn!(width, height, "Bootstrapping into a container with no area");
    }

    let mut camera = PerspectiveCamera::new(FIELD_OF_VIEW, aspect_ratio(width, height), NEAR, FAR);
    let [x, y, z] = CAMERA_POSITION;
    camera.set_position(x, y, z);
    camera.look_at(Point3::origin());

    let canvas = container.append_canvas(width, height)?;
    let mut renderer = Renderer::new(canvas, width, height, RendererOptions { antialias: true });
    renderer.set_clear_color(CLEAR_COLOR, 1.0);

    let mut controls = OrbitControls::new(Point3::origin());
    controls.auto_rotate = false;

    let mut scene = Scene::new();
    if options.grid {
        scene.add(grid());
    }
    if options.axes {
        scene.add_all(axis_arrows());
    }
    if options.light {
        scene.add(key_light());
    }

    debug!(width, height, helpers = scene.len(), "Scene bootstrapped");
    Ok(Instances {
        scene,
        camera,
        renderer,
        controls,
    })
}

/// Bootstrap for the helper demos: only a grid, and only when `show_grid`
pub fn create_instances<T: Container>(
    container: &mut T,
    show_grid: bool,
) -> Result<Instances<T::Canvas>> {
    bootstrap(container, &SceneOptions::helper(show_grid))
}

/// Bootstrap for the geometry demos: grid, three axis arrows and a light
pub fn create_geometry_instances<T: Container>(container: &mut T) -> Result<Instances<T::Canvas>> {
    bootstrap(container, &SceneOptions::geometry())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::HeadlessContainer;

    #[test]
    fn test_helper_counts() {
        assert_eq!(SceneOptions::geometry().helper_count(), 5);
        assert_eq!(SceneOptions::helper(true).helper_count(), 1);
        assert_eq!(SceneOptions::helper(false).helper_count(), 0);
        assert_eq!(SceneOptions::default(), SceneOptions::helper(true));
    }

    #[test]
    fn test_zero_area_falls_back_to_square_aspect() {
        let mut container = HeadlessContainer::new(640, 0);
        let instances = create_instances(&mut container, true).unwrap();
        assert_eq!(instances.camera.aspect, 1.0);
        assert_eq!(instances.renderer.size(), (640, 0));

        let mut container = HeadlessContainer::new(0, 480);
        let mut instances = create_instances(&mut container, true).unwrap();
        assert_eq!(instances.camera.aspect, 1.0);
        assert!(instances.camera.project(&Point3::origin()).is_some());
        instances.render().unwrap();

        instances.resize(0, 240).unwrap();
        assert_eq!(instances.camera.aspect, 1.0);
    }

    #[test]
    fn test_drop_releases_canvas() {
        let mut container = HeadlessContainer::new(64, 48);
        {
            let _instances = create_geometry_instances(&mut container).unwrap();
            assert_eq!(container.child_count(), 1);
        }
        assert_eq!(container.child_count(), 0);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut container = HeadlessContainer::new(64, 48);
        let mut instances = create_instances(&mut container, false).unwrap();
        instances.resize(100, 50).unwrap();
        assert_eq!(instances.camera.aspect, 2.0);
        assert_eq!(instances.renderer.size(), (100, 50));
    }

    #[test]
    fn test_options_from_toml() {
        let options: SceneOptions = toml::from_str("grid = false\nlight = true").unwrap();
        assert_eq!(
            options,
            SceneOptions {
                grid: false,
                axes: false,
                light: true
            }
        );
    }
}
