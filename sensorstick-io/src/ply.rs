//! PLY format support for colored samples

use crate::{PointCloudReader, PointCloudWriter};
use sensorstick_core::{ColoredPoint3f, ColoredPointCloud3f, Error, Point3f, PointCloud, Result};
use std::path::Path;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use ply_rs::{
    parser::Parser,
    writer::Writer,
    ply::{Property, PropertyDef, PropertyType, ScalarType, ElementDef, Ply, Addable, DefaultElement, Encoding},
};

pub struct PlyReader;
pub struct PlyWriter;

impl PointCloudReader for PlyReader {
    fn read_point_cloud<P: AsRef<Path>>(path: P) -> Result<ColoredPointCloud3f> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let mut points = Vec::new();

        if let Some(vertex_element) = ply.payload.get("vertex") {
            for vertex in vertex_element {
                let x = extract_property_value(vertex, "x")?;
                let y = extract_property_value(vertex, "y")?;
                let z = extract_property_value(vertex, "z")?;

                // Uncolored files read back as white
                let color = [
                    extract_color_value(vertex, "red").unwrap_or(255),
                    extract_color_value(vertex, "green").unwrap_or(255),
                    extract_color_value(vertex, "blue").unwrap_or(255),
                ];

                points.push(ColoredPoint3f::new(Point3f::new(x, y, z), color));
            }
        }

        Ok(PointCloud::from_points(points))
    }
}

impl PointCloudWriter for PlyWriter {
    fn write_point_cloud<P: AsRef<Path>>(cloud: &ColoredPointCloud3f, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();
        ply.header.encoding = Encoding::BinaryLittleEndian;

        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = cloud.len();
        for key in ["x", "y", "z"] {
            vertex_element.properties.add(PropertyDef::new(
                key.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        }
        for key in ["red", "green", "blue"] {
            vertex_element.properties.add(PropertyDef::new(
                key.to_string(),
                PropertyType::Scalar(ScalarType::UChar),
            ));
        }

        ply.header.elements.add(vertex_element);

        let vertices: Vec<DefaultElement> = cloud
            .iter()
            .map(|point| {
                let mut vertex = DefaultElement::new();
                vertex.insert("x".to_string(), Property::Float(point.position.x));
                vertex.insert("y".to_string(), Property::Float(point.position.y));
                vertex.insert("z".to_string(), Property::Float(point.position.z));
                vertex.insert("red".to_string(), Property::UChar(point.color[0]));
                vertex.insert("green".to_string(), Property::UChar(point.color[1]));
                vertex.insert("blue".to_string(), Property::UChar(point.color[2]));
                vertex
            })
            .collect();
        ply.payload.insert("vertex".to_string(), vertices);

        let writer_instance = Writer::new();
        writer_instance.write_ply(&mut writer, &mut ply)?;

        Ok(())
    }
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        _ => Err(Error::InvalidData(
            format!("Property '{}' not found or invalid type", name)
        )),
    }
}

fn extract_color_value(element: &DefaultElement, name: &str) -> Option<u8> {
    match element.get(name) {
        Some(Property::UChar(val)) => Some(*val),
        Some(Property::Float(val)) => Some((val.clamp(0.0, 1.0) * 255.0).round() as u8),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_colored_ply_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.ply");

        let cloud = ColoredPointCloud3f::from_points(vec![
            ColoredPoint3f::new(Point3f::new(0.0, 0.5, 1.0), [255, 0, 0]),
            ColoredPoint3f::new(Point3f::new(-0.25, 0.0, 0.75), [0, 128, 255]),
        ]);

        PlyWriter::write_point_cloud(&cloud, &path).unwrap();
        let loaded = PlyReader::read_point_cloud(&path).unwrap();

        assert_eq!(loaded.len(), 2);
        for (original, loaded) in cloud.iter().zip(loaded.iter()) {
            assert_relative_eq!(original.position, loaded.position);
            assert_eq!(original.color, loaded.color);
        }
    }

    #[test]
    fn test_ascii_ply_without_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.ply");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nproperty float y\nproperty float z\nend_header\n1 2 3\n",
        )
        .unwrap();

        let loaded = crate::read_point_cloud(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].color, [255, 255, 255]);
        assert_relative_eq!(loaded[0].position.z, 3.0);
    }

    #[test]
    fn test_missing_file() {
        assert!(PlyReader::read_point_cloud("/nonexistent/sample.ply").is_err());
    }
}
