pub mod markup;
pub mod reader;
pub mod writer;

pub use writer::{validated_folder_for, ArtifactStore};
