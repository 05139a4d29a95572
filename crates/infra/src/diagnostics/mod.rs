//! Operator-facing debugging artifacts

pub mod fs;

pub use fs::FsArtifactSink;
