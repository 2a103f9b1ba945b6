pub mod cache_invalidation;
pub mod deploy;
pub mod error;
pub mod pipeline;
pub mod session;

pub use deploy::report::DeployReport;
pub use deploy::service::DeployService;
pub use error::Error;
pub use session::DeploySession;
