//! Pick-list resolution.
//!
//! Walks the pick list in order, matches each item against the cycle's
//! detections by label (first match wins), derives poses and arm, optionally
//! drives the actuator, and hands the resulting list to a [`CommandSink`].

use crate::actuation::{ActuationOutcome, PickPlaceService};
use crate::command::Command;
use crate::config::{DropBoxTable, PickListItem};
use crate::output::CommandSink;
use crate::scene::SceneTable;
use crate::{Result, TaskError};
use pnp_objdetect::DetectedObject;
use std::time::Duration;

/// Non-fatal condition recorded while resolving.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolveWarning {
    /// No detection carries this item's label.
    NotDetected { item: String },
    /// A detection matched but its cloud has no points to take a centroid of.
    EmptyDetection { item: String },
}

/// What one call to [`TaskResolver::resolve`] produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub scene_id: u32,
    pub commands: Vec<Command>,
    pub warnings: Vec<ResolveWarning>,
    /// One entry per command when an actuator was supplied, aligned by index.
    pub actuation: Vec<ActuationOutcome>,
}

impl Resolution {
    pub fn is_complete(&self, pick_list_len: usize) -> bool {
        self.commands.len() == pick_list_len
    }
}

#[derive(Debug, Clone)]
pub struct TaskResolver {
    scenes: SceneTable,
    actuation_timeout: Duration,
}

impl Default for TaskResolver {
    fn default() -> Self {
        Self::new(SceneTable::default(), Duration::from_secs(30))
    }
}

impl TaskResolver {
    pub fn new(scenes: SceneTable, actuation_timeout: Duration) -> Self {
        Self {
            scenes,
            actuation_timeout,
        }
    }

    pub fn scenes(&self) -> &SceneTable {
        &self.scenes
    }

    /// Resolve `pick_list` against `detections`.
    ///
    /// Configuration errors (unknown pick-list length, a detected item whose
    /// group has no dropbox) abort before anything is actuated or written.
    /// Items that were not detected never need a dropbox. Missing
    /// detections and actuation failures are recorded in the returned
    /// [`Resolution`] and never remove a command.
    pub fn resolve(
        &self,
        pick_list: &[PickListItem],
        dropboxes: &DropBoxTable,
        detections: &[DetectedObject],
        actuator: Option<&dyn PickPlaceService>,
        sink: &mut dyn CommandSink,
    ) -> Result<Resolution> {
        let scene_id = match self.scenes.scene_for(pick_list.len()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("{}", e);
                return Err(e);
            }
        };

        let mut warnings = Vec::new();
        let mut matched = Vec::with_capacity(pick_list.len());

        for item in pick_list {
            let Some(found) = detections.iter().find(|d| d.label() == item.name) else {
                tracing::warn!("Object '{}' was not detected in this cycle", item.name);
                warnings.push(ResolveWarning::NotDetected {
                    item: item.name.clone(),
                });
                continue;
            };

            let Some(pick_pose) = found.centroid() else {
                tracing::warn!("Detection for '{}' has no points", item.name);
                warnings.push(ResolveWarning::EmptyDetection {
                    item: item.name.clone(),
                });
                continue;
            };

            let Some(dropbox) = dropboxes.get(&item.group) else {
                return Err(TaskError::MissingDropbox {
                    item: item.name.clone(),
                    group: item.group.clone(),
                });
            };

            matched.push(Command {
                scene_id,
                arm_name: dropbox.arm_name.clone(),
                object_name: item.name.clone(),
                pick_pose,
                place_pose: dropbox.place_pose(),
            });
        }

        let mut commands = Vec::with_capacity(matched.len());
        let mut actuation = Vec::new();

        for command in matched {
            let name = &command.object_name;
            if let Some(service) = actuator {
                let outcome = ActuationOutcome::from_response(
                    service.pick_place(&command, self.actuation_timeout),
                );
                match &outcome {
                    ActuationOutcome::Succeeded => {
                        tracing::info!("pick_place succeeded for '{}'", name)
                    }
                    ActuationOutcome::Rejected => {
                        tracing::warn!("pick_place reported failure for '{}'", name)
                    }
                    ActuationOutcome::Failed(e) => {
                        tracing::warn!("pick_place call for '{}' failed: {}", name, e)
                    }
                }
                actuation.push(outcome);
            }

            commands.push(command);
        }

        sink.write(scene_id, &commands)?;

        tracing::debug!(
            "Resolved {}/{} pick-list items for scene {}",
            commands.len(),
            pick_list.len(),
            scene_id
        );

        Ok(Resolution {
            scene_id,
            commands,
            warnings,
            actuation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DropBox;
    use crate::output::MemorySink;
    use nalgebra::Point3;
    use pnp_core::PointCloud;

    fn object_at(label: &str, p: Point3<f32>) -> DetectedObject {
        DetectedObject::new(label, PointCloud::new(vec![p]))
    }

    fn three_items() -> Vec<PickListItem> {
        vec![
            PickListItem::new("biscuits", "green"),
            PickListItem::new("soap", "green"),
            PickListItem::new("soap2", "red"),
        ]
    }

    fn boxes() -> DropBoxTable {
        DropBoxTable::from_entries(vec![
            DropBox::new("red", "left", [0.0, 0.71, 0.605]),
            DropBox::new("green", "right", [0.0, -0.71, 0.605]),
        ])
        .unwrap()
    }

    #[test]
    fn test_missing_dropbox_is_rejected_before_writing() {
        let list = vec![
            PickListItem::new("a", "red"),
            PickListItem::new("b", "blue"),
            PickListItem::new("c", "red"),
        ];
        let detections = vec![
            object_at("a", Point3::new(1.0, 0.0, 0.0)),
            object_at("b", Point3::new(2.0, 0.0, 0.0)),
        ];
        let mut sink = MemorySink::default();
        let err = TaskResolver::default()
            .resolve(&list, &boxes(), &detections, None, &mut sink)
            .unwrap_err();
        assert!(matches!(err, TaskError::MissingDropbox { ref group, .. } if group == "blue"));
        assert!(sink.written.is_empty());
    }

    #[test]
    fn test_undetected_item_needs_no_dropbox() {
        let list = vec![
            PickListItem::new("a", "red"),
            PickListItem::new("b", "blue"),
            PickListItem::new("c", "red"),
        ];
        let detections = vec![object_at("a", Point3::new(1.0, 0.0, 0.0))];
        let mut sink = MemorySink::default();
        let res = TaskResolver::default()
            .resolve(&list, &boxes(), &detections, None, &mut sink)
            .unwrap();

        assert_eq!(res.commands.len(), 1);
        assert_eq!(res.commands[0].object_name, "a");
        assert!(res.warnings.contains(&ResolveWarning::NotDetected { item: "b".into() }));
        assert_eq!(sink.written.len(), 1);
    }

    #[test]
    fn test_first_match_wins() {
        let detections = vec![
            object_at("soap", Point3::new(1.0, 0.0, 0.0)),
            object_at("soap", Point3::new(2.0, 0.0, 0.0)),
        ];
        let mut sink = MemorySink::default();
        let res = TaskResolver::default()
            .resolve(&three_items(), &boxes(), &detections, None, &mut sink)
            .unwrap();

        assert_eq!(res.scene_id, 1);
        assert_eq!(res.commands.len(), 1);
        assert_eq!(res.commands[0].pick_pose, Point3::new(1.0, 0.0, 0.0));
        assert_eq!(res.warnings.len(), 2);
        assert!(res.actuation.is_empty());
    }
}
