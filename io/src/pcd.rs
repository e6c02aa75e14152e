//! ASCII PCD I/O
//!
//! PCL stores color as a single `rgb` field whose 32 bits hold `0x00RRGGBB`.
//! With `TYPE F` those bits are reinterpreted as a float, which is what ROS
//! sensor clouds carry; with `TYPE U` or `I` the field is a plain integer.

use pnp_core::{Error, PointCloud, Result};
use nalgebra::{Point3, Vector3};
use std::io::{BufRead, Write};

/// PCD payload encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PcdData {
    Ascii,
    Binary,
    BinaryCompressed,
}

/// Pack a `[0, 1]` RGB triple into `0x00RRGGBB`.
pub fn pack_rgb(color: &Point3<f32>) -> u32 {
    let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    (q(color.x) << 16) | (q(color.y) << 8) | q(color.z)
}

pub fn unpack_rgb(packed: u32) -> Point3<f32> {
    Point3::new(
        ((packed >> 16) & 0xFF) as f32 / 255.0,
        ((packed >> 8) & 0xFF) as f32 / 255.0,
        (packed & 0xFF) as f32 / 255.0,
    )
}

#[derive(Debug, Default)]
struct Header {
    fields: Vec<String>,
    types: Vec<char>,
    counts: Vec<usize>,
    width: usize,
    height: usize,
    points: Option<usize>,
    data: Option<PcdData>,
}

impl Header {
    fn column(&self, name: &str) -> Option<usize> {
        let field = self.fields.iter().position(|f| f == name)?;
        if self.counts.is_empty() {
            Some(field)
        } else {
            Some(self.counts.iter().take(field).sum())
        }
    }

    fn field_type(&self, name: &str) -> Option<char> {
        let field = self.fields.iter().position(|f| f == name)?;
        self.types.get(field).copied()
    }

    fn columns(&self) -> usize {
        if self.counts.is_empty() {
            self.fields.len()
        } else {
            self.counts.iter().sum()
        }
    }
}

fn parse_header<I>(lines: &mut I) -> Result<Header>
where
    I: Iterator<Item = std::io::Result<String>>,
{
    let mut header = Header {
        height: 1,
        ..Header::default()
    };

    while header.data.is_none() {
        let line = lines
            .next()
            .ok_or_else(|| Error::Parse("Unexpected EOF in PCD header".to_string()))??;
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some((&key, rest)) = parts.split_first() else {
            continue;
        };
        let number = |s: Option<&&str>| -> Result<usize> {
            s.and_then(|v| v.parse().ok())
                .ok_or_else(|| Error::Parse(format!("Invalid {} line", key)))
        };

        match key {
            k if k.starts_with('#') => {}
            "FIELDS" => header.fields = rest.iter().map(|s| s.to_string()).collect(),
            "TYPE" => header.types = rest.iter().filter_map(|s| s.chars().next()).collect(),
            "COUNT" => {
                header.counts = rest
                    .iter()
                    .map(|s| s.parse().map_err(|_| Error::Parse(format!("Invalid COUNT '{}'", s))))
                    .collect::<Result<_>>()?
            }
            "WIDTH" => header.width = number(rest.first())?,
            "HEIGHT" => header.height = number(rest.first())?,
            "POINTS" => header.points = Some(number(rest.first())?),
            "DATA" => {
                header.data = Some(match rest.first().copied() {
                    Some("ascii") => PcdData::Ascii,
                    Some("binary") => PcdData::Binary,
                    Some("binary_compressed") => PcdData::BinaryCompressed,
                    other => {
                        return Err(Error::Parse(format!("Unknown DATA type {:?}", other)));
                    }
                })
            }
            // VERSION, SIZE and VIEWPOINT do not affect ASCII decoding.
            _ => {}
        }
    }

    Ok(header)
}

fn decode_rgb(raw: &str, field_type: Option<char>) -> Result<Point3<f32>> {
    let bad = || Error::Parse(format!("Invalid rgb value '{}'", raw));
    let packed = match field_type {
        Some('U') | Some('I') => raw.parse::<u32>().map_err(|_| bad())?,
        _ => raw.parse::<f32>().map_err(|_| bad())?.to_bits(),
    };
    Ok(unpack_rgb(packed))
}

/// Read an ASCII PCD stream.
pub fn read_pcd<R: BufRead>(reader: R) -> Result<PointCloud> {
    let mut lines = reader.lines();
    let header = parse_header(&mut lines)?;

    match header.data {
        Some(PcdData::Ascii) => {}
        other => {
            return Err(Error::UnsupportedFormat(format!(
                "PCD data {:?} not supported, only ascii",
                other
            )))
        }
    }

    let xyz = match (header.column("x"), header.column("y"), header.column("z")) {
        (Some(x), Some(y), Some(z)) => [x, y, z],
        _ => return Err(Error::Parse("PCD fields lack x/y/z".to_string())),
    };
    let normal_cols = match (
        header.column("normal_x"),
        header.column("normal_y"),
        header.column("normal_z"),
    ) {
        (Some(x), Some(y), Some(z)) => Some([x, y, z]),
        _ => None,
    };
    let rgb_name = ["rgb", "rgba"]
        .into_iter()
        .find(|n| header.fields.iter().any(|f| f == n));
    let rgb_col = rgb_name.and_then(|n| header.column(n));
    let rgb_type = rgb_name.and_then(|n| header.field_type(n));

    let expected = match header.points {
        Some(n) => n,
        None => header.width.checked_mul(header.height).ok_or_else(|| {
            Error::Parse(format!(
                "PCD size {} x {} overflows",
                header.width, header.height
            ))
        })?,
    };
    let columns = header.columns();

    let capacity = crate::reserve_rows(expected);
    let mut points = Vec::with_capacity(capacity);
    let mut normals = normal_cols.map(|_| Vec::with_capacity(capacity));
    let mut colors = rgb_col.map(|_| Vec::with_capacity(capacity));

    for line in lines {
        if points.len() == expected {
            break;
        }
        let line = line?;
        let raw: Vec<&str> = line.split_whitespace().collect();
        if raw.is_empty() {
            continue;
        }
        if raw.len() < columns {
            return Err(Error::Parse(format!(
                "PCD row {} has {} values, expected {}",
                points.len(),
                raw.len(),
                columns
            )));
        }

        let num = |i: usize| -> Result<f32> {
            raw[i]
                .parse()
                .map_err(|_| Error::Parse(format!("Invalid number '{}'", raw[i])))
        };

        points.push(Point3::new(num(xyz[0])?, num(xyz[1])?, num(xyz[2])?));
        if let (Some(c), Some(out)) = (normal_cols, normals.as_mut()) {
            out.push(Vector3::new(num(c[0])?, num(c[1])?, num(c[2])?));
        }
        if let (Some(c), Some(out)) = (rgb_col, colors.as_mut()) {
            out.push(decode_rgb(raw[c], rgb_type)?);
        }
    }

    if points.len() != expected {
        return Err(Error::Parse(format!(
            "PCD declares {} points but holds {}",
            expected,
            points.len()
        )));
    }

    Ok(PointCloud {
        points,
        colors,
        normals,
    })
}

/// Write a cloud as ASCII PCD v0.7 with an unsigned packed `rgb` field.
pub fn write_pcd<W: Write>(writer: &mut W, cloud: &PointCloud) -> Result<()> {
    let mut fields = vec!["x", "y", "z"];
    let mut types = vec!["F", "F", "F"];
    if cloud.normals.is_some() {
        fields.extend(["normal_x", "normal_y", "normal_z"]);
        types.extend(["F", "F", "F"]);
    }
    if cloud.colors.is_some() {
        fields.push("rgb");
        types.push("U");
    }

    writeln!(writer, "# .PCD v0.7 - Point Cloud Data file format")?;
    writeln!(writer, "VERSION 0.7")?;
    writeln!(writer, "FIELDS {}", fields.join(" "))?;
    writeln!(writer, "SIZE {}", vec!["4"; fields.len()].join(" "))?;
    writeln!(writer, "TYPE {}", types.join(" "))?;
    writeln!(writer, "COUNT {}", vec!["1"; fields.len()].join(" "))?;
    writeln!(writer, "WIDTH {}", cloud.len())?;
    writeln!(writer, "HEIGHT 1")?;
    writeln!(writer, "VIEWPOINT 0 0 0 1 0 0 0")?;
    writeln!(writer, "POINTS {}", cloud.len())?;
    writeln!(writer, "DATA ascii")?;

    for (i, p) in cloud.points.iter().enumerate() {
        write!(writer, "{} {} {}", p.x, p.y, p.z)?;
        if let Some(n) = cloud.normals.as_ref().and_then(|n| n.get(i)) {
            write!(writer, " {} {} {}", n.x, n.y, n.z)?;
        }
        if let Some(c) = cloud.colors.as_ref().and_then(|c| c.get(i)) {
            write!(writer, " {}", pack_rgb(c))?;
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
    fn test_float_packed_rgb() {
        let packed = 0x00FF_8000u32;
        let text = format!(
            "VERSION 0.7\nFIELDS x y z rgb\nSIZE 4 4 4 4\nTYPE F F F F\nCOUNT 1 1 1 1\n\
WIDTH 1\nHEIGHT 1\nPOINTS 1\nDATA ascii\n0.5 0 0.75 {:e}\n",
            f32::from_bits(packed)
        );
        let cloud = read_pcd(Cursor::new(text)).unwrap();
        let c = cloud.colors.unwrap()[0];
        assert_eq!(c, unpack_rgb(packed));
        assert_eq!(c.x, 1.0);
        assert_eq!(c.z, 0.0);
    }

    #[test]
    fn test_count_mismatch() {
        let text = "FIELDS x y z\nWIDTH 3\nHEIGHT 1\nDATA ascii\n0 0 0\n1 1 1\n";
        assert!(matches!(read_pcd(Cursor::new(text)), Err(Error::Parse(_))));
    }

    #[test]
    fn test_huge_declared_count_is_parse_error() {
        let text = "FIELDS x y z\nPOINTS 18446744073709551615\nDATA ascii\n0 0 0\n1 1 1\n";
        assert!(matches!(read_pcd(Cursor::new(text)), Err(Error::Parse(_))));
    }

    #[test]
    fn test_overflowing_size_is_parse_error() {
        let text = "FIELDS x y z\nWIDTH 4294967296\nHEIGHT 4294967296\nDATA ascii\n0 0 0\n";
        assert!(matches!(read_pcd(Cursor::new(text)), Err(Error::Parse(_))));
    }

    #[test]
    fn test_binary_rejected() {
        let text = "FIELDS x y z\nPOINTS 0\nDATA binary\n";
        assert!(matches!(
            read_pcd(Cursor::new(text)),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_write_read_normals_and_colors() {
        let cloud = PointCloud::new(vec![Point3::new(0.1, 0.2, 0.9), Point3::new(0.0, 0.0, 1.0)])
            .with_normals(vec![nalgebra::Vector3::z(), nalgebra::Vector3::x()])
            .unwrap()
            .with_colors(vec![Point3::new(0.0, 1.0, 0.0), Point3::new(1.0, 1.0, 1.0)])
            .unwrap();

        let mut buf = Vec::new();
        write_pcd(&mut buf, &cloud).unwrap();
        let back = read_pcd(Cursor::new(buf)).unwrap();

        assert_eq!(back, cloud);
    }

    #[test]
    fn test_pack_unpack() {
        assert_eq!(pack_rgb(&Point3::new(1.0, 0.0, 1.0)), 0x00FF_00FF);
        assert_eq!(unpack_rgb(0x0000_FF00), Point3::new(0.0, 1.0, 0.0));
    }
}
