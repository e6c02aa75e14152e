use nalgebra::{Point3, Vector3};
use pnp_core::point_cloud::PointCloud;
use pnp_core::Cluster;

#[test]
fn test_point_cloud_result_handling() {
    let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
    let cloud = PointCloud::new(points);

    let colors = vec![Point3::new(1.0, 0.0, 0.0), Point3::new(0.0, 1.0, 0.0)];
    assert!(cloud.clone().with_colors(colors).is_ok());

    let bad_colors = vec![Point3::new(1.0, 0.0, 0.0)];
    let cloud_bad_colors = cloud.clone().with_colors(bad_colors);
    assert!(cloud_bad_colors.unwrap_err().to_string().contains("Color count"));

    let normals = vec![Vector3::new(0.0, 0.0, 1.0), Vector3::new(0.0, 0.0, 1.0)];
    assert!(cloud.clone().with_normals(normals).is_ok());

    let bad_normals = vec![Vector3::new(0.0, 0.0, 1.0)];
    let cloud_bad_normals = cloud.with_normals(bad_normals);
    assert!(cloud_bad_normals.unwrap_err().to_string().contains("Normal count"));
}

#[test]
fn test_cluster_centroid_matches_mean() {
    let points: Vec<Point3<f32>> = (0..37)
        .map(|i| {
            let t = i as f32 * 0.013;
            Point3::new(0.4 + t.sin() * 0.05, -0.1 + t, 0.75 + t.cos() * 0.02)
        })
        .collect();
    let cloud = PointCloud::new(points.clone());
    let cluster = Cluster::new((5..30).collect());

    let centroid = cluster.extract(&cloud).unwrap().centroid().unwrap();

    let n = 25.0f64;
    let (mut sx, mut sy, mut sz) = (0.0f64, 0.0f64, 0.0f64);
    for p in &points[5..30] {
        sx += p.x as f64;
        sy += p.y as f64;
        sz += p.z as f64;
    }
    assert!((centroid.x as f64 - sx / n).abs() < 1e-6);
    assert!((centroid.y as f64 - sy / n).abs() < 1e-6);
    assert!((centroid.z as f64 - sz / n).abs() < 1e-6);
}
