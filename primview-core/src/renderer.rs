//! Software renderer drawing a [`Scene`] through a [`PerspectiveCamera`]
//! into a frame buffer presented on a [`Canvas`].

use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use tracing::{debug, trace};

use crate::color::Color;
use crate::container::Canvas;
use crate::error::{Error, Result};
use crate::object::{Mesh, ObjectKind};
use crate::projection::PerspectiveCamera;
use crate::raster::{FrameBuffer, ScreenPoint};
use crate::scene::Scene;

/// Light reaching faces that no directional light hits
const AMBIENT: f32 = 0.3;

/// Supersampling factor used when antialiasing
const SUPERSAMPLE: usize = 2;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RendererOptions {
    pub antialias: bool,
}

/// What the last `render` call drew
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderInfo {
    pub frame: u64,
    pub triangles: usize,
    pub lines: usize,
}

struct Light {
    /// Unit vector pointing from the surface toward the light
    direction: Vector3<f32>,
    intensity: f32,
}

pub struct Renderer<C: Canvas> {
    canvas: Option<C>,
    width: u32,
    height: u32,
    antialias: bool,
    clear_color: Color,
    clear_alpha: f32,
    target: FrameBuffer,
    output: FrameBuffer,
    info: RenderInfo,
}

impl<C: Canvas> Renderer<C> {
    pub fn new(canvas: C, width: u32, height: u32, options: RendererOptions) -> Self {
        let mut renderer = Self {
            canvas: Some(canvas),
            width,
            height,
            antialias: options.antialias,
            clear_color: Color::BLACK,
            clear_alpha: 1.0,
            target: FrameBuffer::new(0, 0),
            output: FrameBuffer::new(0, 0),
            info: RenderInfo::default(),
        };
        renderer.allocate();
        renderer
    }

    /// Size the buffers for the current dimensions. The supersampled
    /// target only exists while antialiasing.
    fn allocate(&mut self) {
        let (width, height) = (self.width as usize, self.height as usize);
        if self.antialias {
            self.target.resize(width * SUPERSAMPLE, height * SUPERSAMPLE);
        } else {
            self.target.resize(0, 0);
        }
        self.output.resize(width, height);
    }

    /// Size of the buffer the scene is drawn into
    pub fn target_size(&self) -> (usize, usize) {
        let target = if self.antialias {
            &self.target
        } else {
            &self.output
        };
        (target.width(), target.height())
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Resize the frame buffers and the canvas
    pub fn set_size(&mut self, width: u32, height: u32) -> Result<()> {
        let canvas = self.canvas.as_mut().ok_or(Error::Disposed)?;
        canvas.resize(width, height)?;
        self.width = width;
        self.height = height;
        self.allocate();
        debug!(width, height, "Renderer resized");
        Ok(())
    }

    pub fn set_clear_color(&mut self, color: Color, alpha: f32) {
        self.clear_color = color;
        self.clear_alpha = alpha;
    }

    pub fn clear_color(&self) -> (Color, f32) {
        (self.clear_color, self.clear_alpha)
    }

    pub fn antialias(&self) -> bool {
        self.antialias
    }

    pub fn canvas(&self) -> Option<&C> {
        self.canvas.as_ref()
    }

    pub fn canvas_mut(&mut self) -> Option<&mut C> {
        self.canvas.as_mut()
    }

    /// The last frame handed to the canvas
    pub fn frame(&self) -> &FrameBuffer {
        &self.output
    }

    pub fn info(&self) -> RenderInfo {
        self.info
    }

    pub fn is_disposed(&self) -> bool {
        self.canvas.is_none()
    }

    /// Detach the canvas and free the frame buffers. Safe to call twice.
    pub fn dispose(&mut self) {
        if let Some(mut canvas) = self.canvas.take() {
            canvas.detach();
            self.target = FrameBuffer::new(0, 0);
            self.output = FrameBuffer::new(0, 0);
            debug!("Renderer disposed");
        }
    }

    /// Draw `scene` as seen by `camera` and present it
    pub fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Result<()> {
        if self.canvas.is_none() {
            return Err(Error::Disposed);
        }

        let background = scene.background.unwrap_or(self.clear_color);
        let mut info = RenderInfo {
            frame: self.info.frame + 1,
            ..RenderInfo::default()
        };

        if !self.output.is_empty() {
            let target = if self.antialias {
                &mut self.target
            } else {
                &mut self.output
            };
            target.clear(background, self.clear_alpha);
            draw_scene(target, scene, camera, &mut info);
            if self.antialias {
                self.target.downsample_into(SUPERSAMPLE, &mut self.output);
            }
        }

        self.info = info;
        trace!(
            frame = info.frame,
            triangles = info.triangles,
            lines = info.lines,
            "Frame rendered"
        );

        match self.canvas.as_mut() {
            Some(canvas) => canvas.present(&self.output),
            None => Err(Error::Disposed),
        }
    }
}

impl<C: Canvas> Drop for Renderer<C> {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn collect_lights(scene: &Scene) -> Vec<Light> {
    let mut lights = Vec::new();
    scene.traverse_visible(|object, world| {
        if let ObjectKind::Light(light) = &object.kind {
            let position = world.transform_point(&Point3::origin());
            if let Some(direction) = (position - light.target).try_normalize(1e-9) {
                lights.push(Light {
                    direction,
                    intensity: light.intensity,
                });
            }
        }
    });
    lights
}

fn draw_scene(
    target: &mut FrameBuffer,
    scene: &Scene,
    camera: &PerspectiveCamera,
    info: &mut RenderInfo,
) {
    let lights = collect_lights(scene);
    let view_projection = camera.view_projection();
    let viewport = (target.width() as f32, target.height() as f32);

    scene.traverse_visible(|object, world| {
        let mvp = view_projection * world;
        match &object.kind {
            ObjectKind::Mesh(mesh) => {
                info.triangles += draw_mesh(target, mesh, world, &mvp, viewport, camera, &lights);
            }
            ObjectKind::Lines(lines) => {
                let color = lines.material.color;
                for [start, end] in &lines.segments {
                    if draw_segment(target, start, end, &mvp, viewport, color) {
                        info.lines += 1;
                    }
                }
            }
            ObjectKind::Helper(helper) => {
                for segment in helper.segments() {
                    if draw_segment(target, &segment.start, &segment.end, &mvp, viewport, segment.color) {
                        info.lines += 1;
                    }
                }
            }
            ObjectKind::Group | ObjectKind::Light(_) => {}
        }
    });
}

/// Map a clip-space position to pixel coordinates and NDC depth
fn to_screen(clip: &Vector4<f32>, viewport: (f32, f32)) -> ScreenPoint {
    let ndc_x = clip.x / clip.w;
    let ndc_y = clip.y / clip.w;
    (
        (ndc_x + 1.0) * 0.5 * viewport.0,
        (1.0 - ndc_y) * 0.5 * viewport.1,
        clip.z / clip.w,
    )
}

/// Inside the near and far planes
fn within_depth(clip: &Vector4<f32>) -> bool {
    clip.w > f32::EPSILON && clip.z >= -clip.w && clip.z <= clip.w
}

fn draw_mesh(
    target: &mut FrameBuffer,
    mesh: &Mesh,
    world: &Matrix4<f32>,
    mvp: &Matrix4<f32>,
    viewport: (f32, f32),
    camera: &PerspectiveCamera,
    lights: &[Light],
) -> usize {
    let color = mesh.material.color;
    let mut drawn = 0;

    for triangle in &mesh.geometry.triangles {
        let clip = triangle
            .vertices
            .map(|v| mvp * v.position.to_homogeneous());
        // Triangles crossing the near or far plane are skipped
        if !clip.iter().all(within_depth) {
            continue;
        }
        let screen = clip.map(|c| to_screen(&c, viewport));

        if mesh.material.wireframe {
            for i in 0..3 {
                target.draw_line(screen[i], screen[(i + 1) % 3], color);
            }
        } else {
            let shade = if mesh.material.lit {
                let world_positions = triangle
                    .vertices
                    .map(|v| world.transform_point(&v.position));
                lambert(&world_positions, camera, lights)
            } else {
                1.0
            };
            target.fill_triangle(&screen, color.scale(shade));
        }
        drawn += 1;
    }
    drawn
}

/// Two-sided flat Lambert term for a world-space triangle
fn lambert(positions: &[Point3<f32>; 3], camera: &PerspectiveCamera, lights: &[Light]) -> f32 {
    let Some(mut normal) = (positions[1] - positions[0])
        .cross(&(positions[2] - positions[0]))
        .try_normalize(1e-12)
    else {
        return AMBIENT;
    };
    if normal.dot(&(camera.position - positions[0])) < 0.0 {
        normal = -normal;
    }
    let diffuse: f32 = lights
        .iter()
        .map(|light| normal.dot(&light.direction).max(0.0) * light.intensity)
        .sum();
    (AMBIENT + (1.0 - AMBIENT) * diffuse).min(1.0)
}

/// Returns whether any part of the segment survived clipping
fn draw_segment(
    target: &mut FrameBuffer,
    start: &Point3<f32>,
    end: &Point3<f32>,
    mvp: &Matrix4<f32>,
    viewport: (f32, f32),
    color: Color,
) -> bool {
    let mut a = mvp * start.to_homogeneous();
    let mut b = mvp * end.to_homogeneous();

    // Clip against the near (z = -w) and far (z = w) planes
    for sign in [1.0f32, -1.0] {
        let da = a.w + sign * a.z;
        let db = b.w + sign * b.z;
        if da < 0.0 && db < 0.0 {
            return false;
        }
        if da < 0.0 {
            a += (b - a) * (da / (da - db));
        } else if db < 0.0 {
            b += (a - b) * (db / (db - da));
        }
    }
    if a.w <= f32::EPSILON || b.w <= f32::EPSILON {
        return false;
    }

    target.draw_line(to_screen(&a, viewport), to_screen(&b, viewport), color);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::{Container, HeadlessContainer};
    use crate::object::{LineMaterial, MeshMaterial, Object3D};
    use crate::primitives;

    fn camera(aspect: f32) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(75.0, aspect, 0.1, 1000.0);
        camera.set_position(0.0, 0.0, 50.0);
        camera.look_at(Point3::origin());
        camera
    }

    fn renderer(width: u32, height: u32, antialias: bool) -> Renderer<crate::container::HeadlessCanvas> {
        let mut container = HeadlessContainer::new(width, height);
        let canvas = container.append_canvas(width, height).unwrap();
        Renderer::new(canvas, width, height, RendererOptions { antialias })
    }

    #[test]
    fn test_empty_scene_is_clear_color() {
        let mut renderer = renderer(16, 8, false);
        renderer.set_clear_color(Color::from_hex(0x222842), 1.0);
        renderer.render(&Scene::new(), &camera(2.0)).unwrap();
        assert_eq!(renderer.frame().pixel_color(3, 3), Some(Color::from_hex(0x222842)));
        assert_eq!(renderer.canvas().unwrap().frames_presented(), 1);
        assert_eq!(renderer.info().frame, 1);
    }

    #[test]
    fn test_unlit_mesh_covers_center() {
        let mut renderer = renderer(32, 32, false);
        let mut scene = Scene::new();
        scene.add(Object3D::mesh(
            primitives::box_geometry(20.0, 20.0, 20.0),
            MeshMaterial::basic(Color::RED),
        ));
        renderer.render(&scene, &camera(1.0)).unwrap();
        assert_eq!(renderer.frame().pixel_color(16, 16), Some(Color::RED));
        assert!(renderer.info().triangles > 0);
    }

    #[test]
    fn test_antialiased_output_matches_requested_size() {
        let mut renderer = renderer(20, 10, true);
        let mut scene = Scene::new();
        scene.add(Object3D::lines(
            vec![[Point3::new(-10.0, 0.0, 0.0), Point3::new(10.0, 0.0, 0.0)]],
            LineMaterial::new(Color::WHITE),
        ));
        renderer.render(&scene, &camera(2.0)).unwrap();
        assert_eq!((renderer.frame().width(), renderer.frame().height()), (20, 10));
        assert_eq!(renderer.info().lines, 1);
    }

    #[test]
    fn test_supersampled_target_only_when_antialiasing() {
        let mut plain = renderer(20, 10, false);
        assert_eq!(plain.target_size(), (20, 10));
        assert!(plain.target.is_empty());
        plain.set_size(30, 15).unwrap();
        assert!(plain.target.is_empty());
        assert_eq!(plain.target_size(), (30, 15));
        plain.set_clear_color(Color::BLUE, 1.0);
        plain.render(&Scene::new(), &camera(2.0)).unwrap();
        assert_eq!(plain.frame().pixel_color(29, 14), Some(Color::BLUE));

        let mut smooth = renderer(20, 10, true);
        assert_eq!(smooth.target_size(), (20 * SUPERSAMPLE, 10 * SUPERSAMPLE));
        smooth.set_size(30, 15).unwrap();
        assert_eq!(smooth.target_size(), (30 * SUPERSAMPLE, 15 * SUPERSAMPLE));
        assert_eq!((smooth.frame().width(), smooth.frame().height()), (30, 15));
    }

    #[test]
    fn test_segment_behind_camera_is_dropped() {
        let mut renderer = renderer(16, 16, false);
        let mut scene = Scene::new();
        scene.add(Object3D::lines(
            vec![[Point3::new(0.0, 0.0, 60.0), Point3::new(1.0, 0.0, 70.0)]],
            LineMaterial::new(Color::WHITE),
        ));
        renderer.render(&scene, &camera(1.0)).unwrap();
        assert_eq!(renderer.info().lines, 0);
    }

    #[test]
    fn test_lit_faces_are_shaded() {
        let positions = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let cam = camera(1.0);
        assert_eq!(lambert(&positions, &cam, &[]), AMBIENT);
        let facing = Light {
            direction: Vector3::z(),
            intensity: 1.0,
        };
        assert!((lambert(&positions, &cam, &[facing]) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_dispose_detaches_and_blocks_rendering() {
        let mut container = HeadlessContainer::new(8, 8);
        let canvas = container.append_canvas(8, 8).unwrap();
        let mut renderer = Renderer::new(canvas, 8, 8, RendererOptions::default());
        renderer.dispose();
        renderer.dispose();
        assert_eq!(container.child_count(), 0);
        assert!(matches!(
            renderer.render(&Scene::new(), &camera(1.0)),
            Err(Error::Disposed)
        ));
        assert!(matches!(renderer.set_size(4, 4), Err(Error::Disposed)));
    }

    #[test]
    fn test_zero_sized_target_still_presents() {
        let mut renderer = renderer(0, 0, true);
        renderer.render(&Scene::new(), &camera(1.0)).unwrap();
        assert!(renderer.frame().is_empty());
        assert_eq!(renderer.canvas().unwrap().frames_presented(), 1);
    }
}
