pub mod insights;
pub mod intent;
pub mod pipeline;
pub mod state;

pub use insights::parse_numbered_insights;
pub use intent::QueryIntent;
pub use pipeline::SurveillancePipeline;
pub use state::PipelineState;
