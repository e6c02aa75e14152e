use crate::{Result, TaskError};

/// Maps pick-list length to the scene it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneTable {
    entries: Vec<(usize, u32)>,
}

impl Default for SceneTable {
    fn default() -> Self {
        Self {
            entries: vec![(3, 1), (5, 2), (8, 3)],
        }
    }
}

impl SceneTable {
    pub fn new(entries: Vec<(usize, u32)>) -> Self {
        Self { entries }
    }

    pub fn scene_for(&self, pick_list_len: usize) -> Result<u32> {
        self.entries
            .iter()
            .find(|(len, _)| *len == pick_list_len)
            .map(|(_, scene)| *scene)
            .ok_or(TaskError::UnknownScene(pick_list_len))
    }
}
