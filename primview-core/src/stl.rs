/// STL loading for user-supplied demo geometry (binary and ASCII)
use std::path::Path;

use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::tag,
    character::complete::{multispace0, multispace1, not_line_ending},
    multi::many0,
    number::complete::float,
    sequence::preceded,
    IResult,
};
use thiserror::Error;
use tracing::debug;

use crate::geometry::{face_normal, Geometry, Triangle, Vertex};

const HEADER_LEN: usize = 80;
const FACET_LEN: usize = 50;

#[derive(Debug, Error, PartialEq)]
pub enum StlError {
    #[error("file too small to be a valid STL ({0} bytes)")]
    TooSmall(usize),
    #[error("expected {expected} facets but data ends after {found}")]
    Truncated { expected: usize, found: usize },
    #[error("malformed ASCII STL: {0}")]
    Ascii(String),
}

fn read_f32(data: &[u8], offset: usize) -> f32 {
    f32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_vector(data: &[u8], offset: usize) -> (f32, f32, f32) {
    (
        read_f32(data, offset),
        read_f32(data, offset + 4),
        read_f32(data, offset + 8),
    )
}

/// Build a triangle, replacing a missing stored normal with the face normal
fn facet(normal: (f32, f32, f32), corners: [(f32, f32, f32); 3]) -> Triangle {
    let positions = corners.map(|(x, y, z)| Point3::new(x, y, z));
    let stored = Vector3::new(normal.0, normal.1, normal.2);
    let normal = if stored.norm_squared() > 1e-12 {
        stored.normalize()
    } else {
        face_normal(&positions[0], &positions[1], &positions[2]).unwrap_or(stored)
    };
    let [a, b, c] = positions.map(|p| Vertex::from_parts(p, normal));
    Triangle::new(a, b, c)
}

/// Parse a binary STL file
pub fn parse_binary_stl(data: &[u8]) -> Result<Geometry, StlError> {
    if data.len() < HEADER_LEN + 4 {
        return Err(StlError::TooSmall(data.len()));
    }

    // Skip 80-byte header, then a little-endian facet count
    let body = &data[HEADER_LEN..];
    let expected = u32::from_le_bytes([body[0], body[1], body[2], body[3]]) as usize;
    let facets = &body[4..];

    let found = facets.len() / FACET_LEN;
    if found < expected {
        return Err(StlError::Truncated { expected, found });
    }

    let mut geometry = Geometry::with_capacity(expected);
    for chunk in facets.chunks_exact(FACET_LEN).take(expected) {
        let normal = read_vector(chunk, 0);
        let corners = [
            read_vector(chunk, 12),
            read_vector(chunk, 24),
            read_vector(chunk, 36),
        ];
        // Trailing two bytes are the unused attribute count
        geometry.add_triangle(facet(normal, corners));
    }

    Ok(geometry)
}

/// Parse an ASCII STL file
pub fn parse_ascii_stl(input: &str) -> Result<Geometry, StlError> {
    match parse_ascii_stl_impl(input) {
        Ok((_, geometry)) => Ok(geometry),
        Err(e) => Err(StlError::Ascii(e.to_string())),
    }
}

fn parse_ascii_stl_impl(input: &str) -> IResult<&str, Geometry> {
    let (input, _) = preceded(multispace0, tag("solid"))(input)?;
    let (input, _) = not_line_ending(input)?; // Optional name
    let (input, triangles) = many0(parse_facet)(input)?;
    let (input, _) = preceded(multispace0, tag("endsolid"))(input)?;

    let mut geometry = Geometry::with_capacity(triangles.len());
    for triangle in triangles {
        geometry.add_triangle(triangle);
    }

    Ok((input, geometry))
}

fn parse_facet(input: &str) -> IResult<&str, Triangle> {
    let (input, _) = preceded(multispace0, tag("facet"))(input)?;
    let (input, _) = preceded(multispace1, tag("normal"))(input)?;
    let (input, normal) = parse_vector3(input)?;
    let (input, _) = preceded(multispace0, tag("outer"))(input)?;
    let (input, _) = preceded(multispace1, tag("loop"))(input)?;
    let (input, v1) = parse_vertex(input)?;
    let (input, v2) = parse_vertex(input)?;
    let (input, v3) = parse_vertex(input)?;
    let (input, _) = preceded(multispace0, tag("endloop"))(input)?;
    let (input, _) = preceded(multispace0, tag("endfacet"))(input)?;

    Ok((input, facet(normal, [v1, v2, v3])))
}

fn parse_vertex(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = preceded(multispace0, tag("vertex"))(input)?;
    parse_vector3(input)
}

fn parse_vector3(input: &str) -> IResult<&str, (f32, f32, f32)> {
    let (input, _) = multispace0(input)?;
    let (input, x) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, y) = float(input)?;
    let (input, _) = multispace1(input)?;
    let (input, z) = float(input)?;
    Ok((input, (x, y, z)))
}

/// Detect and parse STL file (binary or ASCII)
pub fn parse_stl(data: &[u8]) -> Result<Geometry, StlError> {
    // Binary files may also start with "solid", so fall back on failure
    if data.starts_with(b"solid") {
        if let Ok(text) = std::str::from_utf8(data) {
            if let Ok(geometry) = parse_ascii_stl(text) {
                return Ok(geometry);
            }
        }
    }

    parse_binary_stl(data)
}

/// Read and parse an STL file from disk
pub fn load_stl(path: &Path) -> crate::error::Result<Geometry> {
    let data = std::fs::read(path)?;
    let geometry = parse_stl(&data)?;
    debug!(
        path = %path.display(),
        triangles = geometry.triangle_count(),
        "STL file loaded"
    );
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::io::Write;

    const ASCII_TRIANGLE: &str = "solid demo part
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid demo part
";

    fn binary_stl(triangles: &[[f32; 12]]) -> Vec<u8> {
        let mut data = vec![0u8; HEADER_LEN];
        data.extend_from_slice(&(triangles.len() as u32).to_le_bytes());
        for triangle in triangles {
            for value in triangle {
                data.extend_from_slice(&value.to_le_bytes());
            }
            data.extend_from_slice(&[0, 0]);
        }
        data
    }

    #[test]
    fn test_parse_binary_header() {
        let geometry = parse_binary_stl(&binary_stl(&[])).unwrap();
        assert!(geometry.is_empty());
    }

    #[test]
    fn test_parse_binary_facet_without_normal() {
        let data = binary_stl(&[[
            0.0, 0.0, 0.0, // normal left empty
            0.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 2.0, 0.0,
        ]]);
        let geometry = parse_stl(&data).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
        assert_eq!(geometry.triangles[0].vertices[0].normal, Vector3::z());
    }

    #[test]
    fn test_binary_errors() {
        assert_eq!(parse_binary_stl(&[0u8; 10]), Err(StlError::TooSmall(10)));

        let mut data = binary_stl(&[[0.0; 12]]);
        data[HEADER_LEN..HEADER_LEN + 4].copy_from_slice(&3u32.to_le_bytes());
        assert_eq!(
            parse_binary_stl(&data),
            Err(StlError::Truncated {
                expected: 3,
                found: 1
            })
        );
    }

    #[test]
    fn test_parse_ascii_with_name() {
        let geometry = parse_stl(ASCII_TRIANGLE.as_bytes()).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
        let bounds = geometry.bounding_box().unwrap();
        assert_eq!(bounds.max, Point3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_malformed_ascii() {
        assert!(matches!(
            parse_ascii_stl("solid x\n facet normal 0 0\nendsolid"),
            Err(StlError::Ascii(_))
        ));
    }

    #[test]
    fn test_load_stl_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(ASCII_TRIANGLE.as_bytes()).unwrap();
        let geometry = load_stl(file.path()).unwrap();
        assert_eq!(geometry.triangle_count(), 1);
    }

    #[test]
    fn test_load_stl_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_stl(&dir.path().join("missing.stl")),
            Err(Error::Io(_))
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 10]).unwrap();
        assert!(matches!(
            load_stl(file.path()),
            Err(Error::Stl(StlError::TooSmall(10)))
        ));
    }
}
