use crate::config::PipelineConfig;
use crate::publish::{DetectionSummary, NullSink, PerceptionOutput, PerceptionSink};
use crate::slot::FrameSlot;
use crate::Result;
use pnp_core::PointCloud;
use pnp_features::{FeatureExtractor, NormalEstimator};
use pnp_objdetect::{
    Classifier, ClusterClassifier, ColorPalette, DetectError, DetectedObject, LabelMarker,
    ObjectRegistry,
};
use pnp_point_cloud::{ClusterExtractor, PlaneSegmenter, Preprocessor};
use pnp_task::{
    CommandSink, DropBoxTable, PickListItem, PickPlaceService, Resolution, SceneTable,
    TaskResolver,
};
use rayon::prelude::*;
use std::fmt;
use std::sync::Arc;

/// Stage the pipeline is currently executing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CycleState {
    #[default]
    Idle,
    Filtering,
    Segmenting,
    Clustering,
    Classifying,
    Publishing,
    Resolving,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Pick list and dropbox table the mover phase resolves against.
#[derive(Debug, Clone)]
pub struct TaskSetup {
    pub pick_list: Vec<PickListItem>,
    pub dropboxes: DropBoxTable,
}

/// Outcome of one successful cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub sequence: u64,
    /// Labels in cluster-extraction order.
    pub detected: Vec<String>,
    /// `None` when nothing was detected and the mover phase was skipped.
    pub resolution: Option<Resolution>,
}

/// One perception cycle per frame, from raw cloud to written command list.
pub struct PerceptionPipeline {
    preprocessor: Preprocessor,
    segmenter: PlaneSegmenter,
    extractor: ClusterExtractor,
    classifier: ClusterClassifier,
    registry: ObjectRegistry,
    resolver: TaskResolver,
    task: TaskSetup,
    actuator: Option<Arc<dyn PickPlaceService>>,
    commands: Box<dyn CommandSink + Send>,
    publisher: Box<dyn PerceptionSink>,
    marker_z_offset: f32,
    state: CycleState,
    sequence: u64,
}

impl PerceptionPipeline {
    pub fn new(
        config: &PipelineConfig,
        classifier: Arc<dyn Classifier>,
        normals: Arc<dyn NormalEstimator>,
        task: TaskSetup,
        commands: Box<dyn CommandSink + Send>,
    ) -> Self {
        Self {
            preprocessor: Preprocessor::new(config.preprocess.clone()),
            segmenter: PlaneSegmenter::new(config.plane.clone()),
            extractor: ClusterExtractor::new(config.cluster.clone()),
            classifier: ClusterClassifier::new(
                FeatureExtractor::new(config.features.clone()),
                normals,
                classifier,
            ),
            registry: ObjectRegistry::with_palette(ColorPalette::with_seed(config.palette_seed)),
            resolver: TaskResolver::new(SceneTable::default(), config.actuation_timeout()),
            task,
            actuator: None,
            commands,
            publisher: Box::new(NullSink),
            marker_z_offset: config.marker_z_offset,
            state: CycleState::Idle,
            sequence: 0,
        }
    }

    pub fn with_actuator(mut self, actuator: Arc<dyn PickPlaceService>) -> Self {
        self.actuator = Some(actuator);
        self
    }

    pub fn with_publisher(mut self, publisher: Box<dyn PerceptionSink>) -> Self {
        self.publisher = publisher;
        self
    }

    pub fn with_scenes(mut self, scenes: SceneTable, actuation_timeout: std::time::Duration) -> Self {
        self.resolver = TaskResolver::new(scenes, actuation_timeout);
        self
    }

    pub fn state(&self) -> CycleState {
        self.state
    }

    /// Detections of the most recent cycle.
    pub fn registry(&self) -> &ObjectRegistry {
        &self.registry
    }

    /// Number of cycles started so far.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    fn enter(&mut self, state: CycleState) {
        tracing::trace!("cycle {}: {} -> {}", self.sequence, self.state, state);
        self.state = state;
    }

    /// Run every stage on `raw`. The pipeline is back to [`CycleState::Idle`]
    /// afterwards, whether or not the cycle succeeded.
    pub fn run_cycle(&mut self, raw: &PointCloud) -> Result<CycleReport> {
        self.sequence += 1;
        let result = self.run_stages(raw);
        if let Err(e) = &result {
            tracing::warn!("Cycle {} aborted in {}: {}", self.sequence, self.state, e);
        }
        self.enter(CycleState::Idle);
        result
    }

    fn run_stages(&mut self, raw: &PointCloud) -> Result<CycleReport> {
        self.registry.begin_cycle();

        self.enter(CycleState::Filtering);
        let filtered = self.preprocessor.run(raw);

        self.enter(CycleState::Segmenting);
        let split = self.segmenter.segment(&filtered)?;
        let table = split.table(&filtered)?;
        let objects = split.objects(&filtered)?;

        self.enter(CycleState::Clustering);
        let clusters = self.extractor.extract(&objects);
        let clustered = self.registry.colorize_clusters(&objects, &clusters)?;

        self.enter(CycleState::Classifying);
        let clouds = clusters
            .iter()
            .map(|c| c.extract(&objects))
            .collect::<pnp_core::Result<Vec<_>>>()?;
        let classifier = &self.classifier;
        let labels = clouds
            .par_iter()
            .map(|cloud| classifier.classify(cloud))
            .collect::<std::result::Result<Vec<_>, DetectError>>()?;

        let mut markers = Vec::with_capacity(labels.len());
        let mut detected = Vec::with_capacity(labels.len());
        for (id, (label, cloud)) in labels.iter().zip(clouds).enumerate() {
            if let Some(anchor) = cloud.points.first() {
                markers.push(LabelMarker::above(id, label, anchor, self.marker_z_offset));
            }
            let object = DetectedObject::new(label.clone(), cloud);
            detected.push(DetectionSummary {
                label: label.clone(),
                points: object.cloud().len(),
                centroid: object.centroid(),
            });
            self.registry.push(object);
        }
        tracing::info!("Detected {} objects: {:?}", labels.len(), labels);

        self.enter(CycleState::Publishing);
        let output = PerceptionOutput {
            sequence: self.sequence,
            objects,
            table,
            clustered,
            markers,
            detected,
        };
        if let Err(e) = self.publisher.publish(&output) {
            tracing::warn!("Publishing cycle {} failed: {}", self.sequence, e);
        }

        let resolution = if self.registry.is_empty() {
            tracing::info!("No objects detected, skipping pick list");
            None
        } else {
            self.enter(CycleState::Resolving);
            let resolution = self.resolver.resolve(
                &self.task.pick_list,
                &self.task.dropboxes,
                self.registry.objects(),
                self.actuator.as_deref(),
                self.commands.as_mut(),
            )?;
            Some(resolution)
        };

        Ok(CycleReport {
            sequence: self.sequence,
            detected: labels,
            resolution,
        })
    }

    /// Run a cycle for every frame taken from `slot` until it is closed.
    ///
    /// Failed cycles are logged and skipped. Returns the number of cycles run.
    pub fn serve(&mut self, slot: &FrameSlot) -> u64 {
        let mut cycles = 0;
        let mut failures = 0;
        while let Some(frame) = slot.take() {
            if self.run_cycle(&frame).is_err() {
                failures += 1;
            }
            cycles += 1;
        }
        tracing::info!(
            "Frame slot closed after {} cycles ({} failed)",
            cycles,
            failures
        );
        cycles
    }
}
