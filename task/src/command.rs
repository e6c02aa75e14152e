use nalgebra::Point3;

/// One resolved pick-and-place request.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub scene_id: u32,
    pub arm_name: String,
    pub object_name: String,
    pub pick_pose: Point3<f32>,
    pub place_pose: Point3<f32>,
}
