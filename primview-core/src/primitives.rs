//! Geometry factories for the primitives shown in the demo gallery.
//!
//! Parameters mirror the usual `(radius, segments, ...)` signatures of
//! web 3D libraries so demo code reads the same. Every factory returns a
//! triangle soup with counter-clockwise, outward-facing triangles.

use std::f32::consts::{PI, TAU};

use nalgebra::{Point2, Point3, Rotation3, Unit, Vector3};

use crate::geometry::{Geometry, Triangle, Vertex};

/// Build a surface from a `(columns + 1) x (rows + 1)` grid of vertices,
/// emitting the quad `(i, j) (i+1, j) (i+1, j+1) (i, j+1)` for every cell
fn grid_surface<F>(columns: u32, rows: u32, vertex: F) -> Geometry
where
    F: Fn(u32, u32) -> Vertex,
{
    let stride = columns as usize + 1;
    let vertices: Vec<Vertex> = (0..=rows)
        .flat_map(|j| (0..=columns).map(move |i| (i, j)))
        .map(|(i, j)| vertex(i, j))
        .collect();

    let mut geometry = Geometry::with_capacity(2 * columns as usize * rows as usize);
    for j in 0..rows as usize {
        for i in 0..columns as usize {
            let a = vertices[j * stride + i];
            let b = vertices[j * stride + i + 1];
            let c = vertices[(j + 1) * stride + i + 1];
            let d = vertices[(j + 1) * stride + i];
            geometry.add_quad(a, b, c, d);
        }
    }
    geometry
}

/// Flat rectangle in the XY plane facing +Z
pub fn plane(width: f32, height: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let (ws, hs) = (width_segments.max(1), height_segments.max(1));
    grid_surface(ws, hs, |i, j| {
        Vertex::new(
            -width / 2.0 + width * i as f32 / ws as f32,
            -height / 2.0 + height * j as f32 / hs as f32,
            0.0,
            0.0,
            0.0,
            1.0,
        )
    })
}

/// Axis-aligned box centred on the origin
pub fn box_geometry(width: f32, height: f32, depth: f32) -> Geometry {
    let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);
    // (face centre, half-extent along u, half-extent along v); u x v points outward
    let faces = [
        (Vector3::new(hw, 0.0, 0.0), Vector3::new(0.0, 0.0, -hd), Vector3::new(0.0, hh, 0.0)),
        (Vector3::new(-hw, 0.0, 0.0), Vector3::new(0.0, 0.0, hd), Vector3::new(0.0, hh, 0.0)),
        (Vector3::new(0.0, hh, 0.0), Vector3::new(hw, 0.0, 0.0), Vector3::new(0.0, 0.0, -hd)),
        (Vector3::new(0.0, -hh, 0.0), Vector3::new(hw, 0.0, 0.0), Vector3::new(0.0, 0.0, hd)),
        (Vector3::new(0.0, 0.0, hd), Vector3::new(hw, 0.0, 0.0), Vector3::new(0.0, hh, 0.0)),
        (Vector3::new(0.0, 0.0, -hd), Vector3::new(-hw, 0.0, 0.0), Vector3::new(0.0, hh, 0.0)),
    ];

    let mut geometry = Geometry::with_capacity(12);
    for (center, u, v) in faces {
        let normal = u.cross(&v).try_normalize(1e-12).unwrap_or_else(Vector3::zeros);
        let corner = |su: f32, sv: f32| Vertex::from_parts(Point3::from(center + u * su + v * sv), normal);
        geometry.add_quad(
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
        );
    }
    geometry
}

/// Flat-faced polyhedron with vertices pushed out to `radius`.
/// `indices` lists triangles; winding is corrected to face outward.
fn polyhedron(vertices: &[[f32; 3]], indices: &[usize], radius: f32) -> Geometry {
    let points: Vec<Point3<f32>> = vertices
        .iter()
        .map(|v| Point3::from(Vector3::new(v[0], v[1], v[2]).normalize() * radius))
        .collect();

    let mut geometry = Geometry::with_capacity(indices.len() / 3);
    for face in indices.chunks_exact(3) {
        let (a, mut b, mut c) = (points[face[0]], points[face[1]], points[face[2]]);
        let centroid = (a.coords + b.coords + c.coords) / 3.0;
        if (b - a).cross(&(c - a)).dot(&centroid) < 0.0 {
            std::mem::swap(&mut b, &mut c);
        }
        geometry.add_triangle(Triangle::flat(a, b, c));
    }
    geometry
}

pub fn tetrahedron(radius: f32) -> Geometry {
    const VERTICES: [[f32; 3]; 4] = [
        [1.0, 1.0, 1.0],
        [-1.0, -1.0, 1.0],
        [-1.0, 1.0, -1.0],
        [1.0, -1.0, -1.0],
    ];
    const INDICES: [usize; 12] = [2, 1, 0, 0, 3, 2, 1, 3, 0, 2, 3, 1];
    polyhedron(&VERTICES, &INDICES, radius)
}

pub fn octahedron(radius: f32) -> Geometry {
    const VERTICES: [[f32; 3]; 6] = [
        [1.0, 0.0, 0.0],
        [-1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
    ];
    const INDICES: [usize; 24] = [
        0, 2, 4, 0, 4, 3, 0, 3, 5, 0, 5, 2, 1, 2, 5, 1, 5, 3, 1, 3, 4, 1, 4, 2,
    ];
    polyhedron(&VERTICES, &INDICES, radius)
}

pub fn icosahedron(radius: f32) -> Geometry {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let vertices = [
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    const INDICES: [usize; 60] = [
        0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6,
        7, 1, 8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6,
        7, 9, 8, 1,
    ];
    polyhedron(&vertices, &INDICES, radius)
}

pub fn dodecahedron(radius: f32) -> Geometry {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let r = 1.0 / t;
    let vertices = [
        [-1.0, -1.0, -1.0],
        [-1.0, -1.0, 1.0],
        [-1.0, 1.0, -1.0],
        [-1.0, 1.0, 1.0],
        [1.0, -1.0, -1.0],
        [1.0, -1.0, 1.0],
        [1.0, 1.0, -1.0],
        [1.0, 1.0, 1.0],
        [0.0, -r, -t],
        [0.0, -r, t],
        [0.0, r, -t],
        [0.0, r, t],
        [-r, -t, 0.0],
        [-r, t, 0.0],
        [r, -t, 0.0],
        [r, t, 0.0],
        [-t, 0.0, -r],
        [t, 0.0, -r],
        [-t, 0.0, r],
        [t, 0.0, r],
    ];
    const INDICES: [usize; 108] = [
        3, 11, 7, 3, 7, 15, 3, 15, 13, 7, 19, 17, 7, 17, 6, 7, 6, 15, 17, 4, 8, 17, 8, 10, 17,
        10, 6, 8, 0, 16, 8, 16, 2, 8, 2, 10, 0, 12, 1, 0, 1, 18, 0, 18, 16, 6, 10, 2, 6, 2, 13,
        6, 13, 15, 2, 16, 18, 2, 18, 3, 2, 3, 13, 18, 1, 9, 18, 9, 11, 18, 11, 3, 4, 14, 12, 4,
        12, 0, 4, 0, 8, 11, 9, 5, 11, 5, 19, 11, 19, 7, 19, 5, 14, 19, 14, 4, 19, 4, 17, 1, 12,
        14, 1, 14, 5, 1, 5, 9,
    ];
    polyhedron(&vertices, &INDICES, radius)
}

/// UV sphere; triangles collapsing at the poles are dropped
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Geometry {
    let (ws, hs) = (width_segments.max(3), height_segments.max(2));
    grid_surface(ws, hs, |i, j| {
        let phi = i as f32 / ws as f32 * TAU;
        let theta = PI - j as f32 / hs as f32 * PI;
        let normal = Vector3::new(
            -phi.cos() * theta.sin(),
            theta.cos(),
            phi.sin() * theta.sin(),
        );
        Vertex::from_parts(Point3::from(normal * radius), normal)
    })
}

/// Filled disc in the XY plane facing +Z
pub fn circle(radius: f32, segments: u32) -> Geometry {
    let segments = segments.max(3);
    let center = Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 1.0);
    let rim = |i: u32| {
        let angle = i as f32 / segments as f32 * TAU;
        Vertex::new(radius * angle.cos(), radius * angle.sin(), 0.0, 0.0, 0.0, 1.0)
    };
    let mut geometry = Geometry::with_capacity(segments as usize);
    for i in 0..segments {
        geometry.add_triangle(Triangle::new(center, rim(i), rim(i + 1)));
    }
    geometry
}

/// Flat annulus in the XY plane facing +Z
pub fn ring(inner_radius: f32, outer_radius: f32, theta_segments: u32) -> Geometry {
    let segments = theta_segments.max(3);
    grid_surface(1, segments, |i, j| {
        let radius = if i == 0 { inner_radius } else { outer_radius };
        let angle = j as f32 / segments as f32 * TAU;
        Vertex::new(radius * angle.cos(), radius * angle.sin(), 0.0, 0.0, 0.0, 1.0)
    })
}

/// Cylinder along Y; either radius may be zero for a cone
pub fn cylinder(
    radius_top: f32,
    radius_bottom: f32,
    height: f32,
    radial_segments: u32,
    open_ended: bool,
) -> Geometry {
    let segments = radial_segments.max(3);
    let half = height / 2.0;
    let slope = if height.abs() > f32::EPSILON {
        (radius_bottom - radius_top) / height
    } else {
        0.0
    };

    let mut geometry = grid_surface(segments, 1, |i, j| {
        let angle = i as f32 / segments as f32 * TAU;
        let (y, radius) = if j == 0 {
            (-half, radius_bottom)
        } else {
            (half, radius_top)
        };
        let normal = Vector3::new(angle.sin(), slope, angle.cos()).normalize();
        Vertex::from_parts(Point3::new(radius * angle.sin(), y, radius * angle.cos()), normal)
    });

    if !open_ended {
        let cap_point = |radius: f32, y: f32, i: u32| {
            let angle = i as f32 / segments as f32 * TAU;
            Point3::new(radius * angle.sin(), y, radius * angle.cos())
        };
        for i in 0..segments {
            if radius_top > 0.0 {
                let center = Point3::new(0.0, half, 0.0);
                geometry.add_triangle(Triangle::flat(
                    center,
                    cap_point(radius_top, half, i),
                    cap_point(radius_top, half, i + 1),
                ));
            }
            if radius_bottom > 0.0 {
                let center = Point3::new(0.0, -half, 0.0);
                geometry.add_triangle(Triangle::flat(
                    center,
                    cap_point(radius_bottom, -half, i + 1),
                    cap_point(radius_bottom, -half, i),
                ));
            }
        }
    }
    geometry
}

pub fn cone(radius: f32, height: f32, radial_segments: u32) -> Geometry {
    cylinder(0.0, radius, height, radial_segments, false)
}

/// Torus in the XY plane around the Z axis
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> Geometry {
    let (radial, tubular) = (radial_segments.max(2), tubular_segments.max(3));
    grid_surface(tubular, radial, |i, j| {
        let u = i as f32 / tubular as f32 * TAU;
        let v = j as f32 / radial as f32 * TAU;
        let center = Point3::new(radius * u.cos(), radius * u.sin(), 0.0);
        let position = Point3::new(
            (radius + tube * v.cos()) * u.cos(),
            (radius + tube * v.cos()) * u.sin(),
            tube * v.sin(),
        );
        let normal = (position - center).try_normalize(1e-12).unwrap_or_else(Vector3::z);
        Vertex::from_parts(position, normal)
    })
}

fn torus_knot_curve(u: f32, p: f32, q: f32, radius: f32) -> Point3<f32> {
    let cs = (q / p * u).cos();
    Point3::new(
        radius * (2.0 + cs) * 0.5 * u.cos(),
        radius * (2.0 + cs) * 0.5 * u.sin(),
        radius * (q / p * u).sin() * 0.5,
    )
}

/// Tube swept along a `(p, q)` torus knot
pub fn torus_knot(
    radius: f32,
    tube_radius: f32,
    tubular_segments: u32,
    radial_segments: u32,
    p: u32,
    q: u32,
) -> Geometry {
    let (p, q) = (p.max(1) as f32, q as f32);
    tube(
        |t| torus_knot_curve(t * p * TAU, p, q, radius),
        tubular_segments.max(3),
        tube_radius,
        radial_segments,
        true,
    )
}

/// Sweep a circle of `radius` along `path(t)` for `t` in `0..=1`.
///
/// The cross-section follows parallel-transported frames. On a `closed`
/// path the remaining twist is spread over the length so the ends meet.
pub fn tube<F>(
    path: F,
    tubular_segments: u32,
    radius: f32,
    radial_segments: u32,
    closed: bool,
) -> Geometry
where
    F: Fn(f32) -> Point3<f32>,
{
    let (tubular, radial) = (tubular_segments.max(1), radial_segments.max(3));
    let frames = sweep_frames(&path, tubular, closed);
    grid_surface(tubular, radial, |i, j| {
        let i = if closed && i == tubular { 0 } else { i };
        let (normal, binormal) = frames[i as usize];
        let v = j as f32 / radial as f32 * TAU;
        let offset = normal * -v.cos() + binormal * v.sin();
        Vertex::from_parts(path(i as f32 / tubular as f32) + offset * radius, offset)
    })
}

/// Unit tangent of `path` at `t`, by central difference
fn path_tangent<F>(path: &F, t: f32) -> Vector3<f32>
where
    F: Fn(f32) -> Point3<f32>,
{
    const DELTA: f32 = 1e-3;
    let (before, after) = ((t - DELTA).max(0.0), (t + DELTA).min(1.0));
    (path(after) - path(before))
        .try_normalize(1e-12)
        .unwrap_or_else(Vector3::x)
}

/// `(normal, binormal)` pairs at `tubular + 1` evenly spaced points
fn sweep_frames<F>(path: &F, tubular: u32, closed: bool) -> Vec<(Vector3<f32>, Vector3<f32>)>
where
    F: Fn(f32) -> Point3<f32>,
{
    let tangents: Vec<Vector3<f32>> = (0..=tubular)
        .map(|i| path_tangent(path, i as f32 / tubular as f32))
        .collect();

    // Seed with the axis the first tangent is least aligned with
    let first = tangents[0];
    let seed = [Vector3::x(), Vector3::y(), Vector3::z()]
        .into_iter()
        .min_by(|a, b| first.dot(a).abs().total_cmp(&first.dot(b).abs()))
        .unwrap_or_else(Vector3::z);
    let side = first.cross(&seed).try_normalize(1e-12).unwrap_or_else(Vector3::y);

    let mut normals = Vec::with_capacity(tangents.len());
    normals.push(first.cross(&side));
    for pair in tangents.windows(2) {
        let previous = normals[normals.len() - 1];
        let normal = match Unit::try_new(pair[0].cross(&pair[1]), 1e-9) {
            Some(axis) => {
                let angle = pair[0].dot(&pair[1]).clamp(-1.0, 1.0).acos();
                Rotation3::from_axis_angle(&axis, angle) * previous
            }
            None => previous,
        };
        normals.push(normal);
    }

    if closed {
        let last = normals[tubular as usize];
        let mut step = normals[0].dot(&last).clamp(-1.0, 1.0).acos() / tubular as f32;
        if first.dot(&normals[0].cross(&last)) > 0.0 {
            step = -step;
        }
        for (i, normal) in normals.iter_mut().enumerate().skip(1) {
            let axis = Unit::new_normalize(tangents[i]);
            *normal = Rotation3::from_axis_angle(&axis, step * i as f32) * *normal;
        }
    }

    tangents
        .iter()
        .zip(normals)
        .map(|(tangent, normal)| {
            let normal = (normal - tangent * tangent.dot(&normal))
                .try_normalize(1e-12)
                .unwrap_or(normal);
            (normal, tangent.cross(&normal))
        })
        .collect()
}

/// Revolve a profile of `(x, y)` points around the Y axis
pub fn lathe(points: &[Point2<f32>], segments: u32) -> Geometry {
    if points.len() < 2 {
        return Geometry::new();
    }
    let segments = segments.max(3);
    let rows = points.len() as u32 - 1;
    grid_surface(segments, rows, |i, j| {
        let phi = i as f32 / segments as f32 * TAU;
        let point = points[j as usize];
        let normal = Vector3::new(phi.sin(), 0.0, phi.cos());
        Vertex::from_parts(
            Point3::new(point.x * phi.sin(), point.y, point.x * phi.cos()),
            normal,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every face normal points away from the origin
    fn assert_outward(geometry: &Geometry) {
        for triangle in &geometry.triangles {
            let [a, b, c] = triangle.positions();
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            assert!(
                triangle.calculate_normal().dot(&centroid) > 0.0,
                "inward face at {:?}",
                centroid
            );
        }
    }

    #[test]
    fn test_triangle_counts() {
        assert_eq!(plane(10.0, 10.0, 1, 1).triangle_count(), 2);
        assert_eq!(plane(10.0, 10.0, 3, 2).triangle_count(), 12);
        assert_eq!(box_geometry(1.0, 2.0, 3.0).triangle_count(), 12);
        assert_eq!(tetrahedron(1.0).triangle_count(), 4);
        assert_eq!(octahedron(1.0).triangle_count(), 8);
        assert_eq!(icosahedron(1.0).triangle_count(), 20);
        assert_eq!(dodecahedron(1.0).triangle_count(), 36);
        assert_eq!(circle(1.0, 8).triangle_count(), 8);
        assert_eq!(ring(1.0, 2.0, 8).triangle_count(), 16);
    }

    #[test]
    fn test_sphere_drops_pole_triangles() {
        // 8 x 4 grid = 64 triangles, minus one collapsed triangle per cell at each pole
        assert_eq!(sphere(1.0, 8, 4).triangle_count(), 64 - 16);
    }

    #[test]
    fn test_cone_and_cylinder() {
        // side quads + bottom cap, apex triangles collapse
        assert_eq!(cone(1.0, 2.0, 8).triangle_count(), 8 + 8);
        assert_eq!(cylinder(1.0, 1.0, 2.0, 8, false).triangle_count(), 16 + 16);
        assert_eq!(cylinder(1.0, 1.0, 2.0, 8, true).triangle_count(), 16);
    }

    #[test]
    fn test_closed_solids_face_outward() {
        assert_outward(&box_geometry(2.0, 4.0, 6.0));
        assert_outward(&tetrahedron(3.0));
        assert_outward(&octahedron(3.0));
        assert_outward(&icosahedron(3.0));
        assert_outward(&dodecahedron(3.0));
        assert_outward(&sphere(5.0, 12, 8));
        assert_outward(&cylinder(2.0, 2.0, 4.0, 12, false));
    }

    #[test]
    fn test_polyhedra_lie_on_sphere() {
        for geometry in [icosahedron(7.0), dodecahedron(7.0)] {
            for triangle in &geometry.triangles {
                for vertex in &triangle.vertices {
                    assert!((vertex.position.coords.norm() - 7.0).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_box_bounds() {
        let bounds = box_geometry(2.0, 4.0, 6.0).bounding_box().unwrap();
        assert_eq!(bounds.min, Point3::new(-1.0, -2.0, -3.0));
        assert_eq!(bounds.max, Point3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_torus_extent() {
        let bounds = torus(10.0, 3.0, 8, 16).bounding_box().unwrap();
        assert!((bounds.max.x - 13.0).abs() < 1e-4);
        assert!((bounds.max.z - 3.0).abs() < 0.5);
    }

    #[test]
    fn test_torus_knot_is_finite() {
        let geometry = torus_knot(10.0, 3.0, 64, 8, 2, 3);
        assert!(!geometry.is_empty());
        assert!(geometry
            .triangles
            .iter()
            .flat_map(|t| t.vertices.iter())
            .all(|v| v.position.iter().all(|c| c.is_finite())));
    }

    /// Every face winds the same way as the normals stored on its vertices
    fn assert_matches_vertex_normals(geometry: &Geometry) {
        for triangle in &geometry.triangles {
            let stored: Vector3<f32> = triangle.vertices.iter().map(|v| v.normal).sum();
            assert!(triangle.calculate_normal().dot(&stored) > 0.0);
        }
    }

    fn helix(t: f32) -> Point3<f32> {
        let angle = t * 2.0 * TAU;
        Point3::new(10.0 * angle.cos(), t * 30.0, 10.0 * angle.sin())
    }

    #[test]
    fn test_tube_triangle_count() {
        assert_eq!(tube(helix, 64, 2.0, 8, false).triangle_count(), 64 * 8 * 2);
        assert_eq!(torus_knot(10.0, 3.0, 64, 8, 2, 3).triangle_count(), 64 * 8 * 2);
    }

    #[test]
    fn test_straight_tube_faces_outward() {
        let geometry = tube(|t| Point3::new(t * 20.0, 0.0, 0.0), 4, 2.0, 12, false);
        for triangle in &geometry.triangles {
            let [a, b, c] = triangle.positions();
            let centroid = (a.coords + b.coords + c.coords) / 3.0;
            let radial = Vector3::new(0.0, centroid.y, centroid.z);
            assert!(triangle.calculate_normal().dot(&radial) > 0.0);
        }
        for triangle in &geometry.triangles {
            for vertex in &triangle.vertices {
                let distance = Vector3::new(0.0, vertex.position.y, vertex.position.z).norm();
                assert!((distance - 2.0).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_swept_tubes_keep_consistent_winding() {
        assert_matches_vertex_normals(&tube(helix, 64, 2.0, 8, false));
        assert_matches_vertex_normals(&torus_knot(10.0, 1.0, 128, 8, 2, 3));
    }

    #[test]
    fn test_lathe() {
        let profile = [Point2::new(1.0, 0.0), Point2::new(2.0, 1.0), Point2::new(1.0, 2.0)];
        assert_eq!(lathe(&profile, 6).triangle_count(), 6 * 2 * 2);
        assert!(lathe(&profile[..1], 6).is_empty());
    }
}
