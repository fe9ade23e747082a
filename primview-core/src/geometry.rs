/// Geometry primitives shared by the scene graph and the renderer
use nalgebra::{Matrix4, Point3, Vector3};

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    pub fn from_parts(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Build a triangle whose vertices all carry the face normal
    pub fn flat(a: Point3<f32>, b: Point3<f32>, c: Point3<f32>) -> Self {
        let normal = face_normal(&a, &b, &c).unwrap_or_else(Vector3::zeros);
        Self::new(
            Vertex::from_parts(a, normal),
            Vertex::from_parts(b, normal),
            Vertex::from_parts(c, normal),
        )
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = &self.vertices;
        face_normal(&v0.position, &v1.position, &v2.position).unwrap_or_else(Vector3::zeros)
    }

    pub fn positions(&self) -> [Point3<f32>; 3] {
        [
            self.vertices[0].position,
            self.vertices[1].position,
            self.vertices[2].position,
        ]
    }

    /// True when the triangle has (near) zero area
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.positions();
        (b - a).cross(&(c - a)).norm_squared() < 1e-12
    }
}

/// Unit normal of the triangle `a, b, c` (counter-clockwise front face)
pub fn face_normal(a: &Point3<f32>, b: &Point3<f32>, c: &Point3<f32>) -> Option<Vector3<f32>> {
    (b - a).cross(&(c - a)).try_normalize(1e-12)
}

/// A triangle soup describing a renderable surface
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub triangles: Vec<Triangle>,
}

impl Geometry {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    /// Add a triangle, dropping it if it has no area
    pub fn add_triangle(&mut self, triangle: Triangle) {
        if !triangle.is_degenerate() {
            self.triangles.push(triangle);
        }
    }

    /// Add the quad `a, b, c, d` (counter-clockwise) as two triangles
    pub fn add_quad(&mut self, a: Vertex, b: Vertex, c: Vertex, d: Vertex) {
        self.add_triangle(Triangle::new(a, b, c));
        self.add_triangle(Triangle::new(a, c, d));
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Axis-aligned bounds of all vertices, `None` for an empty geometry
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(
            self.triangles
                .iter()
                .flat_map(|t| t.vertices.iter().map(|v| v.position)),
        )
    }

    /// Translate so the bounding box is centred on the origin
    pub fn center(&mut self) {
        if let Some(bounds) = self.bounding_box() {
            let offset = bounds.center().coords;
            for triangle in &mut self.triangles {
                for vertex in &mut triangle.vertices {
                    vertex.position -= offset;
                }
            }
        }
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl BoundingBox {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    pub fn from_points<I: IntoIterator<Item = Point3<f32>>>(points: I) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Self::new(first, first);
        for point in points {
            bounds.expand(&point);
        }
        Some(bounds)
    }

    pub fn expand(&mut self, point: &Point3<f32>) {
        self.min = self.min.inf(point);
        self.max = self.max.sup(point);
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox::new(self.min.inf(&other.min), self.max.sup(&other.max))
    }

    pub fn center(&self) -> Point3<f32> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// The eight corners, bottom face first
    pub fn corners(&self) -> [Point3<f32>; 8] {
        let (a, b) = (self.min, self.max);
        [
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, a.y, a.z),
            Point3::new(b.x, a.y, b.z),
            Point3::new(a.x, a.y, b.z),
            Point3::new(a.x, b.y, a.z),
            Point3::new(b.x, b.y, a.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(a.x, b.y, b.z),
        ]
    }

    /// Bounds of this box after applying `matrix` to its corners
    pub fn transformed(&self, matrix: &Matrix4<f32>) -> BoundingBox {
        let corners = self.corners().map(|c| matrix.transform_point(&c));
        let mut bounds = BoundingBox::new(corners[0], corners[0]);
        for corner in &corners[1..] {
            bounds.expand(corner);
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degenerate_triangles_are_dropped() {
        let mut geometry = Geometry::new();
        let p = Point3::new(1.0, 1.0, 1.0);
        geometry.add_triangle(Triangle::flat(p, p, Point3::origin()));
        assert!(geometry.is_empty());

        geometry.add_triangle(Triangle::flat(
            Point3::origin(),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ));
        assert_eq!(geometry.triangle_count(), 1);
        let normal = geometry.triangles[0].calculate_normal();
        assert!((normal - Vector3::z()).norm() < 1e-6);
    }

    #[test]
    fn test_bounding_box_and_center() {
        let mut geometry = Geometry::new();
        geometry.add_triangle(Triangle::flat(
            Point3::new(2.0, 2.0, 0.0),
            Point3::new(4.0, 2.0, 0.0),
            Point3::new(4.0, 6.0, 0.0),
        ));
        let bounds = geometry.bounding_box().unwrap();
        assert_eq!(bounds.min, Point3::new(2.0, 2.0, 0.0));
        assert_eq!(bounds.max, Point3::new(4.0, 6.0, 0.0));

        geometry.center();
        let centered = geometry.bounding_box().unwrap();
        assert!((centered.center() - Point3::origin()).norm() < 1e-6);
    }

    #[test]
    fn test_transformed_bounds() {
        let bounds = BoundingBox::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let moved = bounds.transformed(&Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0)));
        assert_eq!(moved.min, Point3::new(4.0, -1.0, -1.0));
        assert_eq!(moved.max, Point3::new(6.0, 1.0, 1.0));
    }
}
