pub mod deployment_result;
pub mod generated_files;
pub mod structured_request;
pub mod validation_report;

pub use deployment_result::{DeploymentResult, DeploymentStatus};
pub use generated_files::GeneratedFileSet;
pub use structured_request::{ImagePlacement, StructuredRequest};
pub use validation_report::{FileChange, ValidationReport};
