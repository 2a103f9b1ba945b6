pub mod cloud_connection;
pub mod generic_pipeline;
pub mod pipeline_step;

pub use cloud_connection::{CloudConnectionContext, ConnectToCloudStep};
pub use generic_pipeline::Pipeline;
pub use pipeline_step::{PipelineStep, StepAction};
