//! ASCII PLY I/O
//!
//! Vertex properties are located by name, so `x y z`, optional `nx ny nz`
//! and optional `red green blue` may appear in any order. Colors are stored
//! as 8-bit values on disk and as `[0, 1]` floats in memory.

use pnp_core::{Error, PointCloud, Result};
use nalgebra::{Point3, Vector3};
use std::io::{BufRead, Write};

fn property_index(names: &[String], name: &str) -> Option<usize> {
    names.iter().position(|n| n == name)
}

/// Read an ASCII PLY vertex list.
pub fn read_ply<R: BufRead>(reader: R) -> Result<PointCloud> {
    let mut lines = reader.lines();

    let magic = lines
        .next()
        .ok_or_else(|| Error::Parse("Empty PLY stream".to_string()))??;
    if magic.trim() != "ply" {
        return Err(Error::Parse("Missing 'ply' magic line".to_string()));
    }

    let mut format = String::new();
    let mut num_vertices = 0usize;
    let mut in_vertex_element = false;
    let mut properties: Vec<String> = Vec::new();

    loop {
        let line = lines
            .next()
            .ok_or_else(|| Error::Parse("Unexpected EOF in header".to_string()))??;
        let parts: Vec<&str> = line.split_whitespace().collect();

        match parts.as_slice() {
            ["format", f, ..] => format = f.to_string(),
            ["element", "vertex", n] => {
                num_vertices = n
                    .parse()
                    .map_err(|_| Error::Parse(format!("Invalid vertex count '{}'", n)))?;
                in_vertex_element = true;
            }
            ["element", ..] => in_vertex_element = false,
            ["property", .., name] if in_vertex_element => properties.push(name.to_string()),
            ["end_header"] => break,
            _ => {}
        }
    }

    if format != "ascii" {
        return Err(Error::UnsupportedFormat(format!(
            "PLY format '{}' not supported, only ASCII",
            format
        )));
    }

    let xyz = match (
        property_index(&properties, "x"),
        property_index(&properties, "y"),
        property_index(&properties, "z"),
    ) {
        (Some(x), Some(y), Some(z)) => [x, y, z],
        _ => return Err(Error::Parse("PLY vertex lacks x/y/z".to_string())),
    };
    let normal_idx = match (
        property_index(&properties, "nx"),
        property_index(&properties, "ny"),
        property_index(&properties, "nz"),
    ) {
        (Some(x), Some(y), Some(z)) => Some([x, y, z]),
        _ => None,
    };
    let color_idx = match (
        property_index(&properties, "red"),
        property_index(&properties, "green"),
        property_index(&properties, "blue"),
    ) {
        (Some(r), Some(g), Some(b)) => Some([r, g, b]),
        _ => None,
    };

    let capacity = crate::reserve_rows(num_vertices);
    let mut points = Vec::with_capacity(capacity);
    let mut normals = normal_idx.map(|_| Vec::with_capacity(capacity));
    let mut colors = color_idx.map(|_| Vec::with_capacity(capacity));

    for row in 0..num_vertices {
        let line = lines
            .next()
            .ok_or_else(|| Error::Parse(format!("Unexpected EOF at vertex {}", row)))??;
        let values = line
            .split_whitespace()
            .map(|s| {
                s.parse::<f32>()
                    .map_err(|_| Error::Parse(format!("Invalid number '{}' at vertex {}", s, row)))
            })
            .collect::<Result<Vec<_>>>()?;

        if values.len() < properties.len() {
            return Err(Error::Parse(format!(
                "Vertex {} has {} values, expected {}",
                row,
                values.len(),
                properties.len()
            )));
        }

        points.push(Point3::new(values[xyz[0]], values[xyz[1]], values[xyz[2]]));
        if let (Some(idx), Some(out)) = (normal_idx, normals.as_mut()) {
            out.push(Vector3::new(values[idx[0]], values[idx[1]], values[idx[2]]));
        }
        if let (Some(idx), Some(out)) = (color_idx, colors.as_mut()) {
            out.push(Point3::new(
                values[idx[0]] / 255.0,
                values[idx[1]] / 255.0,
                values[idx[2]] / 255.0,
            ));
        }
    }

    Ok(PointCloud {
        points,
        colors,
        normals,
    })
}

fn to_u8(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Write a cloud as ASCII PLY.
pub fn write_ply<W: Write>(writer: &mut W, cloud: &PointCloud) -> Result<()> {
    writeln!(writer, "ply")?;
    writeln!(writer, "format ascii 1.0")?;
    writeln!(writer, "element vertex {}", cloud.len())?;
    for axis in ["x", "y", "z"] {
        writeln!(writer, "property float {}", axis)?;
    }
    if cloud.normals.is_some() {
        for axis in ["nx", "ny", "nz"] {
            writeln!(writer, "property float {}", axis)?;
        }
    }
    if cloud.colors.is_some() {
        for channel in ["red", "green", "blue"] {
            writeln!(writer, "property uchar {}", channel)?;
        }
    }
    writeln!(writer, "end_header")?;

    for (i, p) in cloud.points.iter().enumerate() {
        write!(writer, "{} {} {}", p.x, p.y, p.z)?;
        if let Some(n) = cloud.normals.as_ref().and_then(|n| n.get(i)) {
            write!(writer, " {} {} {}", n.x, n.y, n.z)?;
        }
        if let Some(c) = cloud.colors.as_ref().and_then(|c| c.get(i)) {
            write!(writer, " {} {} {}", to_u8(c.x), to_u8(c.y), to_u8(c.z))?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_reads_reordered_properties() {
        let text = "ply\nformat ascii 1.0\ncomment capture\nelement vertex 2\n\
property uchar red\nproperty uchar green\nproperty uchar blue\n\
property float x\nproperty float y\nproperty float z\nend_header\n\
255 0 0 0.1 0.2 0.7\n0 0 255 0.3 0.4 0.9\n";
        let cloud = read_ply(Cursor::new(text)).unwrap();
        assert_eq!(cloud.points, vec![Point3::new(0.1, 0.2, 0.7), Point3::new(0.3, 0.4, 0.9)]);
        let colors = cloud.colors.unwrap();
        assert_eq!(colors[0], Point3::new(1.0, 0.0, 0.0));
        assert_eq!(colors[1], Point3::new(0.0, 0.0, 1.0));
        assert!(cloud.normals.is_none());
    }

    #[test]
    fn test_binary_rejected() {
        let text = "ply\nformat binary_little_endian 1.0\nelement vertex 0\nend_header\n";
        assert!(matches!(
            read_ply(Cursor::new(text)),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_short_row_is_error() {
        let text = "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\n\
property float y\nproperty float z\nend_header\n1.0 2.0\n";
        assert!(matches!(read_ply(Cursor::new(text)), Err(Error::Parse(_))));
    }

    #[test]
    fn test_huge_vertex_count_is_parse_error() {
        let text = "ply\nformat ascii 1.0\nelement vertex 18446744073709551615\n\
property float x\nproperty float y\nproperty float z\nend_header\n1 2 3\n";
        assert!(matches!(read_ply(Cursor::new(text)), Err(Error::Parse(_))));
    }

    #[test]
    fn test_write_then_read_colors() {
        let cloud = PointCloud::new(vec![Point3::new(0.5, -0.1, 0.8)])
            .with_colors(vec![Point3::new(1.0, 0.5, 0.0)])
            .unwrap();
        let mut buf = Vec::new();
        write_ply(&mut buf, &cloud).unwrap();

        let back = read_ply(Cursor::new(buf)).unwrap();
        assert_eq!(back.points, cloud.points);
        let c = back.colors.unwrap()[0];
        assert!((c.y - 128.0 / 255.0).abs() < 1e-6);
    }
}
