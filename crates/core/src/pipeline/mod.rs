pub mod analysis_logger;
pub mod analysis_pipeline;
pub mod eviction_scheduler;
