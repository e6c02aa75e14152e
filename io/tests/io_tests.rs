use nalgebra::Point3;
use pnp_core::PointCloud;
use pnp_io::*;

fn sample() -> PointCloud {
    PointCloud::new(vec![
        Point3::new(0.45, -0.12, 0.71),
        Point3::new(0.52, 0.03, 0.69),
        Point3::new(0.61, 0.2, 0.8),
    ])
    .with_colors(vec![
        Point3::new(1.0, 0.0, 0.0),
        Point3::new(0.0, 1.0, 0.0),
        Point3::new(0.0, 0.0, 1.0),
    ])
    .unwrap()
}

#[test]
fn test_files_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    for name in ["frame.ply", "frame.pcd", "FRAME.PCD"] {
        let path = dir.path().join(name);
        write_cloud(&path, &sample()).unwrap();
        assert_eq!(read_cloud(&path).unwrap(), sample());
    }
}

#[test]
fn test_unknown_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frame.xyz");
    assert!(matches!(
        write_cloud(&path, &sample()),
        Err(Error::UnsupportedFormat(_))
    ));
    assert!(matches!(read_cloud(&path), Err(Error::UnsupportedFormat(_))));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        read_cloud(dir.path().join("absent.pcd")),
        Err(Error::Io(_))
    ));
}
