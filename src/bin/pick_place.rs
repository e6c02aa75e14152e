//! Run perception cycles over recorded frames and write pick-and-place commands.
//!
//! ```text
//! pick_place --model model.json --pick-list pick_list_2.yaml \
//!            --dropbox dropbox.yaml --cloud frame_0.pcd --cloud frame_1.pcd
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use pnp_features::PcaNormalEstimator;
use pnp_objdetect::LinearModel;
use pnp_runtime::{PerceptionPipeline, PipelineConfig, PlyPublisher, TaskSetup};
use pnp_task::{DryRunActuator, OfflineActuator, PickPlaceService, YamlCommandWriter};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ActuatorKind {
    /// Log each command and report success.
    DryRun,
    /// Report every call as unavailable.
    Offline,
    /// Do not call the actuator at all.
    None,
}

#[derive(Debug, Parser)]
#[command(name = "pick_place", version, about)]
struct Args {
    /// Input frames (.ply or .pcd), processed in order.
    #[arg(long = "cloud", required = true)]
    clouds: Vec<PathBuf>,

    /// YAML file with an `object_list` pick list.
    #[arg(long)]
    pick_list: PathBuf,

    /// YAML file with the `dropbox` table. Defaults to the pick-list file.
    #[arg(long)]
    dropbox: Option<PathBuf>,

    /// JSON model artifact.
    #[arg(long)]
    model: PathBuf,

    /// Pipeline parameters. Built-in defaults when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory receiving `output_<scene>.yaml`.
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Directory receiving per-cycle PLY clouds and markers.
    #[arg(long)]
    publish_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ActuatorKind::DryRun)]
    actuator: ActuatorKind,

    /// Worker threads for the CPU stages.
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    rust_pick_place::init_thread_pool(args.threads).context("initializing thread pool")?;

    let config = match &args.config {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };

    let model = LinearModel::from_file(&args.model)
        .with_context(|| format!("loading model {}", args.model.display()))?;
    if model.dimension() != config.features.feature_len() {
        bail!(
            "model expects {} features but the pipeline produces {}",
            model.dimension(),
            config.features.feature_len()
        );
    }

    let pick_list = pnp_task::load_pick_list(&args.pick_list)?;
    let dropboxes = pnp_task::load_dropboxes(args.dropbox.as_ref().unwrap_or(&args.pick_list))?;
    tracing::info!(
        "{} pick-list items, {} dropboxes",
        pick_list.len(),
        dropboxes.len()
    );

    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("creating {}", args.output_dir.display()))?;

    let normals = PcaNormalEstimator {
        k: config.normals_k,
        ..PcaNormalEstimator::default()
    };
    let mut pipeline = PerceptionPipeline::new(
        &config,
        Arc::new(model),
        Arc::new(normals),
        TaskSetup {
            pick_list,
            dropboxes,
        },
        Box::new(YamlCommandWriter::new(&args.output_dir)),
    );

    let actuator: Option<Arc<dyn PickPlaceService>> = match args.actuator {
        ActuatorKind::DryRun => Some(Arc::new(DryRunActuator)),
        ActuatorKind::Offline => Some(Arc::new(OfflineActuator)),
        ActuatorKind::None => None,
    };
    if let Some(actuator) = actuator {
        pipeline = pipeline.with_actuator(actuator);
    }

    if let Some(dir) = &args.publish_dir {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        pipeline = pipeline.with_publisher(Box::new(PlyPublisher::new(dir)));
    }

    let mut failed = 0;
    for path in &args.clouds {
        let frame = match pnp_io::read_cloud(path) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!("Skipping {}: {}", path.display(), e);
                failed += 1;
                continue;
            }
        };

        match pipeline.run_cycle(&frame) {
            Ok(report) => {
                if let Some(res) = report.resolution {
                    tracing::info!(
                        "Frame {}: scene {}, {} commands, {} warnings",
                        path.display(),
                        res.scene_id,
                        res.commands.len(),
                        res.warnings.len()
                    );
                }
            }
            Err(e) if e.is_configuration() => {
                return Err(e).context("pick list configuration");
            }
            Err(_) => failed += 1,
        }
    }

    tracing::info!(
        "Processed {} frames, {} failed",
        args.clouds.len(),
        failed
    );
    Ok(())
}
