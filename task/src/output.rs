//! Command list persistence.
//!
//! One YAML file per scene, `output_<scene>.yaml`, with a single top-level
//! `object_list` key holding the commands in order.

use crate::command::Command;
use crate::{Result, TaskError};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Receives the final command list of a cycle.
pub trait CommandSink {
    fn write(&mut self, scene_id: u32, commands: &[Command]) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Orientation {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Position,
    pub orientation: Orientation,
}

impl From<Point3<f32>> for Pose {
    fn from(p: Point3<f32>) -> Self {
        Self {
            position: Position {
                x: p.x,
                y: p.y,
                z: p.z,
            },
            orientation: Orientation::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub test_scene_num: u32,
    pub arm_name: String,
    pub object_name: String,
    pub pick_pose: Pose,
    pub place_pose: Pose,
}

impl From<&Command> for CommandRecord {
    fn from(c: &Command) -> Self {
        Self {
            test_scene_num: c.scene_id,
            arm_name: c.arm_name.clone(),
            object_name: c.object_name.clone(),
            pick_pose: c.pick_pose.into(),
            place_pose: c.place_pose.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFile {
    pub object_list: Vec<CommandRecord>,
}

pub fn output_file_name(scene_id: u32) -> String {
    format!("output_{}.yaml", scene_id)
}

/// Writes `output_<scene>.yaml` files into a directory.
#[derive(Debug, Clone)]
pub struct YamlCommandWriter {
    dir: PathBuf,
}

impl YamlCommandWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, scene_id: u32) -> PathBuf {
        self.dir.join(output_file_name(scene_id))
    }
}

impl CommandSink for YamlCommandWriter {
    fn write(&mut self, scene_id: u32, commands: &[Command]) -> Result<()> {
        let path = self.path_for(scene_id);
        let doc = OutputFile {
            object_list: commands.iter().map(CommandRecord::from).collect(),
        };

        write_document(File::create(&path)?, &path, &doc)?;

        tracing::info!("YAML file saved: {}", path.display());
        Ok(())
    }
}

/// Serialize `doc` and flush the buffer. Flush errors are reported.
fn write_document<W: Write>(inner: W, path: &Path, doc: &OutputFile) -> Result<()> {
    let failed = |reason: String| TaskError::Output {
        path: path.to_path_buf(),
        reason,
    };
    let mut writer = BufWriter::new(inner);
    serde_yaml::to_writer(&mut writer, doc).map_err(|e| failed(e.to_string()))?;
    writer.flush().map_err(|e| failed(e.to_string()))
}

/// Keeps every written list in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub written: Vec<(u32, Vec<Command>)>,
}

impl CommandSink for MemorySink {
    fn write(&mut self, scene_id: u32, commands: &[Command]) -> Result<()> {
        self.written.push((scene_id, commands.to_vec()));
        Ok(())
    }
}

/// Read back a file written by [`YamlCommandWriter`].
pub fn read_output_file<P: AsRef<Path>>(path: P) -> Result<OutputFile> {
    let text = std::fs::read_to_string(path.as_ref())?;
    serde_yaml::from_str(&text).map_err(|source| TaskError::Yaml {
        path: path.as_ref().to_path_buf(),
        source,
    })
}
