/// Sharp-edge extraction for outlining geometry
use std::collections::HashMap;

use nalgebra::{Point3, Vector3};

use crate::color::Color;
use crate::geometry::{face_normal, Geometry};
use crate::object::{LineMaterial, Object3D};

/// Faces meeting at less than this angle are treated as one surface
pub const DEFAULT_THRESHOLD_DEGREES: f32 = 1.0;

/// Vertices closer than this are merged when matching edges
const PRECISION: f32 = 1e-4;

type PositionKey = (i64, i64, i64);

fn position_key(point: &Point3<f32>) -> PositionKey {
    let scale = 1.0 / PRECISION;
    (
        (point.x * scale).round() as i64,
        (point.y * scale).round() as i64,
        (point.z * scale).round() as i64,
    )
}

struct PendingEdge {
    start: Point3<f32>,
    end: Point3<f32>,
    normal: Vector3<f32>,
}

/// Segments along the boundary of `geometry` and along creases sharper
/// than `threshold_degrees`.
///
/// Edges are matched by vertex position, so triangle soups without shared
/// vertices work. Output order is deterministic: creases in the order they
/// are closed, then open edges in the order they were first seen.
pub fn edges_geometry(geometry: &Geometry, threshold_degrees: f32) -> Vec<[Point3<f32>; 2]> {
    let threshold_dot = threshold_degrees.to_radians().cos();
    let mut pending: Vec<Option<PendingEdge>> = Vec::new();
    let mut open: HashMap<(PositionKey, PositionKey), usize> = HashMap::new();
    let mut segments = Vec::new();

    for triangle in &geometry.triangles {
        let positions = triangle.positions();
        let keys = positions.map(|p| position_key(&p));
        if keys[0] == keys[1] || keys[1] == keys[2] || keys[2] == keys[0] {
            continue;
        }
        let Some(normal) = face_normal(&positions[0], &positions[1], &positions[2]) else {
            continue;
        };

        for i in 0..3 {
            let j = (i + 1) % 3;
            let edge_key = if keys[i] <= keys[j] {
                (keys[i], keys[j])
            } else {
                (keys[j], keys[i])
            };

            match open.remove(&edge_key) {
                Some(index) => {
                    if let Some(edge) = pending[index].take() {
                        if edge.normal.dot(&normal) <= threshold_dot {
                            segments.push([edge.start, edge.end]);
                        }
                    }
                }
                None => {
                    open.insert(edge_key, pending.len());
                    pending.push(Some(PendingEdge {
                        start: positions[i],
                        end: positions[j],
                        normal,
                    }));
                }
            }
        }
    }

    segments.extend(pending.into_iter().flatten().map(|edge| [edge.start, edge.end]));
    segments
}

/// Outline `geometry` with white line segments along its sharp edges
pub fn create_edges(geometry: &Geometry) -> Object3D {
    let segments = edges_geometry(geometry, DEFAULT_THRESHOLD_DEGREES);
    Object3D::lines(segments, LineMaterial::new(Color::WHITE))
}
