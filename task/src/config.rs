//! Pick list and dropbox configuration.
//!
//! Files use the parameter-server layout:
//!
//! ```yaml
//! object_list:
//!   - name: biscuits
//!     group: green
//! dropbox:
//!   - name: left
//!     group: red
//!     position: [0, 0.71, 0.605]
//! ```
//!
//! Both keys may live in the same file or in separate ones.

use crate::{Result, TaskError};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PickListItem {
    pub name: String,
    pub group: String,
}

impl PickListItem {
    pub fn new(name: &str, group: &str) -> Self {
        Self {
            name: name.to_string(),
            group: group.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropBox {
    pub group: String,
    #[serde(rename = "name")]
    pub arm_name: String,
    pub position: [f32; 3],
}

impl DropBox {
    pub fn new(group: &str, arm_name: &str, position: [f32; 3]) -> Self {
        Self {
            group: group.to_string(),
            arm_name: arm_name.to_string(),
            position,
        }
    }

    pub fn place_pose(&self) -> Point3<f32> {
        Point3::from(self.position)
    }
}

/// Dropboxes keyed by their unique group.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropBoxTable {
    boxes: HashMap<String, DropBox>,
}

impl DropBoxTable {
    /// Fails on a repeated group key.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = DropBox>,
    {
        let mut boxes = HashMap::new();
        for dropbox in entries {
            if boxes.contains_key(&dropbox.group) {
                return Err(TaskError::DuplicateGroup(dropbox.group));
            }
            boxes.insert(dropbox.group.clone(), dropbox);
        }
        Ok(Self { boxes })
    }

    pub fn get(&self, group: &str) -> Option<&DropBox> {
        self.boxes.get(group)
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}

#[derive(Debug, Default, Deserialize)]
struct ParamFile {
    #[serde(default)]
    object_list: Option<Vec<PickListItem>>,
    #[serde(default)]
    dropbox: Option<Vec<DropBox>>,
}

fn read_params(path: &Path) -> Result<ParamFile> {
    let text = fs::read_to_string(path)?;
    serde_yaml::from_str(&text).map_err(|source| TaskError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse the `object_list` key of a YAML document. Order is preserved.
pub fn parse_pick_list(yaml: &str) -> std::result::Result<Vec<PickListItem>, serde_yaml::Error> {
    let params: ParamFile = serde_yaml::from_str(yaml)?;
    Ok(params.object_list.unwrap_or_default())
}

/// Parse the `dropbox` key of a YAML document.
pub fn parse_dropboxes(yaml: &str) -> std::result::Result<Vec<DropBox>, serde_yaml::Error> {
    let params: ParamFile = serde_yaml::from_str(yaml)?;
    Ok(params.dropbox.unwrap_or_default())
}

pub fn load_pick_list<P: AsRef<Path>>(path: P) -> Result<Vec<PickListItem>> {
    let items = read_params(path.as_ref())?.object_list.unwrap_or_default();
    tracing::debug!("pick list from {}: {} items", path.as_ref().display(), items.len());
    Ok(items)
}

pub fn load_dropboxes<P: AsRef<Path>>(path: P) -> Result<DropBoxTable> {
    DropBoxTable::from_entries(read_params(path.as_ref())?.dropbox.unwrap_or_default())
}
