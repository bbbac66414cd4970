//! Release building: install, build, and stage an immutable release.
//!
//! The builder runs the configured install and build steps inside the synced
//! source tree, validates the expected output directory, then copies it into
//! a uniquely named release directory. Copying (not moving) preserves the
//! source tree so build caches survive across publishes.

mod builder;
mod config;
mod error;

pub use builder::ReleaseBuilder;
pub use config::BuildConfig;
pub use error::{BuildError, BuildStep};
