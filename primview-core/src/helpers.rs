//! Helper objects: visual aids for spatial orientation that render as
//! coloured line segments

use std::f32::consts::TAU;

use nalgebra::{Point3, Vector3};

use crate::color::Color;
use crate::geometry::BoundingBox;
use crate::object::{DirectionalLight, Object3D};
use crate::projection::PerspectiveCamera;

/// A line segment with its own colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColoredSegment {
    pub start: Point3<f32>,
    pub end: Point3<f32>,
    pub color: Color,
}

impl ColoredSegment {
    pub fn new(start: Point3<f32>, end: Point3<f32>, color: Color) -> Self {
        Self { start, end, color }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Helper {
    Grid(GridHelper),
    PolarGrid(PolarGridHelper),
    Arrow(ArrowHelper),
    Box(BoxHelper),
    Camera(CameraHelper),
    DirectionalLight(DirectionalLightHelper),
}

impl Helper {
    /// Segments in the helper's local space
    pub fn segments(&self) -> Vec<ColoredSegment> {
        match self {
            Helper::Grid(grid) => grid.segments(),
            Helper::PolarGrid(polar) => polar.segments(),
            Helper::Arrow(arrow) => arrow.segments(),
            Helper::Box(helper) => helper.segments(),
            Helper::Camera(helper) => helper.segments(),
            Helper::DirectionalLight(helper) => helper.segments(),
        }
    }
}

macro_rules! impl_into_helper {
    ($($ty:ident => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Helper {
                fn from(helper: $ty) -> Self {
                    Helper::$variant(helper)
                }
            }
        )*
    };
}

impl_into_helper! {
    GridHelper => Grid,
    PolarGridHelper => PolarGrid,
    ArrowHelper => Arrow,
    BoxHelper => Box,
    CameraHelper => Camera,
    DirectionalLightHelper => DirectionalLight,
}

const CENTER_LINE_COLOR: Color = Color::from_hex(0x444444);
const GRID_LINE_COLOR: Color = Color::from_hex(0x888888);

/// Square grid on the XZ plane, centred on the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub center_color: Color,
    pub grid_color: Color,
}

impl GridHelper {
    pub fn new(size: f32, divisions: u32) -> Self {
        Self {
            size,
            divisions: divisions.max(1),
            center_color: CENTER_LINE_COLOR,
            grid_color: GRID_LINE_COLOR,
        }
    }

    pub fn segments(&self) -> Vec<ColoredSegment> {
        let half = self.size / 2.0;
        let step = self.size / self.divisions as f32;
        let center = self.divisions / 2;
        let mut segments = Vec::with_capacity(2 * (self.divisions as usize + 1));
        for i in 0..=self.divisions {
            let k = -half + i as f32 * step;
            let color = if i == center && self.divisions % 2 == 0 {
                self.center_color
            } else {
                self.grid_color
            };
            segments.push(ColoredSegment::new(
                Point3::new(-half, 0.0, k),
                Point3::new(half, 0.0, k),
                color,
            ));
            segments.push(ColoredSegment::new(
                Point3::new(k, 0.0, -half),
                Point3::new(k, 0.0, half),
                color,
            ));
        }
        segments
    }
}

/// Concentric rings and radial sectors on the XZ plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolarGridHelper {
    pub radius: f32,
    pub sectors: u32,
    pub rings: u32,
    pub divisions: u32,
    pub color1: Color,
    pub color2: Color,
}

impl PolarGridHelper {
    pub fn new(radius: f32, sectors: u32, rings: u32, divisions: u32) -> Self {
        Self {
            radius,
            sectors,
            rings,
            divisions: divisions.max(3),
            color1: CENTER_LINE_COLOR,
            color2: GRID_LINE_COLOR,
        }
    }

    pub fn segments(&self) -> Vec<ColoredSegment> {
        let mut segments = Vec::new();
        for i in 0..self.sectors {
            let angle = i as f32 / self.sectors as f32 * TAU;
            let color = if i % 2 == 0 { self.color1 } else { self.color2 };
            segments.push(ColoredSegment::new(
                Point3::origin(),
                Point3::new(angle.sin() * self.radius, 0.0, angle.cos() * self.radius),
                color,
            ));
        }
        for ring in 1..=self.rings {
            let r = self.radius * ring as f32 / self.rings as f32;
            let color = if ring % 2 == 0 { self.color1 } else { self.color2 };
            let point = |j: u32| {
                let angle = j as f32 / self.divisions as f32 * TAU;
                Point3::new(angle.sin() * r, 0.0, angle.cos() * r)
            };
            for j in 0..self.divisions {
                segments.push(ColoredSegment::new(point(j), point(j + 1), color));
            }
        }
        segments
    }
}

impl Default for PolarGridHelper {
    fn default() -> Self {
        Self::new(10.0, 16, 8, 64)
    }
}

/// An arrow from `origin` along `direction`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowHelper {
    pub direction: Vector3<f32>,
    pub origin: Point3<f32>,
    pub length: f32,
    pub color: Color,
    pub head_length: f32,
    pub head_width: f32,
}

impl ArrowHelper {
    /// Head width defaults to a fifth of the head length
    pub fn new(
        direction: Vector3<f32>,
        origin: Point3<f32>,
        length: f32,
        color: Color,
        head_length: f32,
    ) -> Self {
        Self {
            direction: direction.try_normalize(1e-9).unwrap_or_else(Vector3::y),
            origin,
            length,
            color,
            head_length: head_length.min(length),
            head_width: 0.2 * head_length,
        }
    }

    pub fn tip(&self) -> Point3<f32> {
        self.origin + self.direction * self.length
    }

    pub fn segments(&self) -> Vec<ColoredSegment> {
        let tip = self.tip();
        let base = self.origin + self.direction * (self.length - self.head_length);
        let (u, v) = perpendicular_basis(&self.direction);
        let rim: Vec<Point3<f32>> = [u, v, -u, -v]
            .iter()
            .map(|axis| base + axis * self.head_width)
            .collect();

        let mut segments = vec![ColoredSegment::new(self.origin, base, self.color)];
        for (i, point) in rim.iter().enumerate() {
            segments.push(ColoredSegment::new(tip, *point, self.color));
            segments.push(ColoredSegment::new(*point, rim[(i + 1) % rim.len()], self.color));
        }
        segments
    }
}

/// Two unit vectors perpendicular to `direction` and to each other
fn perpendicular_basis(direction: &Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let reference = if direction.y.abs() > 0.99 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = direction.cross(&reference).normalize();
    let v = direction.cross(&u).normalize();
    (u, v)
}

/// Wireframe box around an object's world-space bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxHelper {
    pub bounds: BoundingBox,
    pub color: Color,
}

impl BoxHelper {
    pub fn new(bounds: BoundingBox, color: Color) -> Self {
        Self { bounds, color }
    }

    /// Snapshot the bounds of `object`; `None` when it draws nothing
    pub fn from_object(object: &Object3D, color: Color) -> Option<Self> {
        object.bounding_box().map(|bounds| Self::new(bounds, color))
    }

    pub fn segments(&self) -> Vec<ColoredSegment> {
        box_edges(&self.bounds.corners(), self.color, self.color)
    }
}

/// Edges of a hexahedron whose first four corners form one face and last
/// four the opposite face, in matching order
fn box_edges(corners: &[Point3<f32>; 8], face_color: Color, side_color: Color) -> Vec<ColoredSegment> {
    let mut segments = Vec::with_capacity(12);
    for i in 0..4 {
        let j = (i + 1) % 4;
        segments.push(ColoredSegment::new(corners[i], corners[j], face_color));
        segments.push(ColoredSegment::new(corners[i + 4], corners[j + 4], face_color));
        segments.push(ColoredSegment::new(corners[i], corners[i + 4], side_color));
    }
    segments
}

const FRUSTUM_COLOR: Color = Color::from_hex(0xffaa00);
const CONE_COLOR: Color = Color::from_hex(0xff0000);
const TARGET_COLOR: Color = Color::WHITE;

/// Frustum of a camera, captured when the helper is built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraHelper {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub corners: [Point3<f32>; 8],
}

impl CameraHelper {
    pub fn new(camera: &PerspectiveCamera) -> Self {
        Self {
            position: camera.position,
            target: camera.target,
            corners: camera.frustum_corners(),
        }
    }

    /// Re-read the camera after it moved
    pub fn update(&mut self, camera: &PerspectiveCamera) {
        *self = Self::new(camera);
    }

    pub fn segments(&self) -> Vec<ColoredSegment> {
        let mut segments = box_edges(&self.corners, FRUSTUM_COLOR, FRUSTUM_COLOR);
        for corner in &self.corners[..4] {
            segments.push(ColoredSegment::new(self.position, *corner, CONE_COLOR));
        }
        segments.push(ColoredSegment::new(self.position, self.target, TARGET_COLOR));
        segments
    }
}

/// Square outline at a light's position plus a line to its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLightHelper {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub size: f32,
    pub color: Color,
}

impl DirectionalLightHelper {
    pub fn new(position: Point3<f32>, light: &DirectionalLight, size: f32) -> Self {
        Self {
            position,
            target: light.target,
            size,
            color: light.color,
        }
    }

    pub fn segments(&self) -> Vec<ColoredSegment> {
        let direction = (self.target - self.position)
            .try_normalize(1e-9)
            .unwrap_or_else(|| -Vector3::y());
        let (u, v) = perpendicular_basis(&direction);
        let corner = |a: f32, b: f32| self.position + u * (a * self.size) + v * (b * self.size);
        let square = [
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        ];
        let mut segments: Vec<ColoredSegment> = (0..4)
            .map(|i| ColoredSegment::new(square[i], square[(i + 1) % 4], self.color))
            .collect();
        segments.push(ColoredSegment::new(self.position, self.target, self.color));
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_line_count_and_extent() {
        let grid = GridHelper::new(100.0, 20);
        let segments = grid.segments();
        assert_eq!(segments.len(), 42);
        assert!(segments
            .iter()
            .all(|s| s.start.y == 0.0 && s.start.x.abs() <= 50.0 && s.end.z.abs() <= 50.0));
        let center_lines = segments
            .iter()
            .filter(|s| s.color == CENTER_LINE_COLOR)
            .count();
        assert_eq!(center_lines, 2);
    }

    #[test]
    fn test_arrow_tip_and_head() {
        let arrow = ArrowHelper::new(Vector3::x(), Point3::origin(), 55.0, Color::RED, 4.0);
        assert!((arrow.tip() - Point3::new(55.0, 0.0, 0.0)).norm() < 1e-5);
        let segments = arrow.segments();
        // shaft + four head edges + four rim edges
        assert_eq!(segments.len(), 9);
        assert_eq!(segments[0].end, Point3::new(51.0, 0.0, 0.0));
        assert!(segments.iter().all(|s| s.color == Color::RED));
    }

    #[test]
    fn test_arrow_along_y_axis() {
        let arrow = ArrowHelper::new(Vector3::y(), Point3::origin(), 10.0, Color::YELLOW, 2.0);
        for segment in arrow.segments() {
            assert!(segment.start.iter().all(|c| c.is_finite()));
        }
    }

    #[test]
    fn test_box_helper_has_twelve_edges() {
        let bounds = BoundingBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(BoxHelper::new(bounds, Color::YELLOW).segments().len(), 12);
    }

    #[test]
    fn test_camera_helper_lines() {
        let camera = PerspectiveCamera::new(45.0, 1.0, 1.0, 20.0);
        let helper = CameraHelper::new(&camera);
        assert_eq!(helper.segments().len(), 12 + 4 + 1);
    }

    #[test]
    fn test_polar_grid_segments() {
        let polar = PolarGridHelper::new(10.0, 4, 2, 8);
        assert_eq!(polar.segments().len(), 4 + 2 * 8);
    }
}
