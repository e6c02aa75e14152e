pub use pnp_core as core;
pub use pnp_features as features;
pub use pnp_io as io;
pub use pnp_objdetect as objdetect;
pub use pnp_point_cloud as point_cloud;
pub use pnp_runtime as runtime;
pub use pnp_task as task;

/// Initialize the global Rayon pool used by the filters and classifier.
///
/// Call once at startup, before the first cycle. Priority order:
/// 1. explicit `num_threads`
/// 2. `PNP_CPU_THREADS` env var
/// 3. Rayon default
pub fn init_thread_pool(num_threads: Option<usize>) -> Result<(), rayon::ThreadPoolBuildError> {
    let threads = num_threads.or_else(|| {
        std::env::var("PNP_CPU_THREADS")
            .ok()
            .and_then(|v| v.parse().ok())
    });
    let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("pnp-cpu-{}", i));
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build_global()
}
