pub mod builder;
pub mod command;
pub mod config;
pub mod orchestrator;
pub mod release;
pub mod source;
pub mod status;
pub mod testing;

pub use builder::{BuildConfig, BuildError, ReleaseBuilder};
pub use command::{CommandError, CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use orchestrator::{DeployError, DeployOrchestrator};
pub use release::{is_release_id, Release, ReleaseError, ReleaseManager, SweepSummary};
pub use source::{GitSync, SourceConfig, SourceError, SourceSync};
pub use status::{DeployState, FsStatusStore, StatusError, StatusRecord, StatusStore};
