pub mod fixture_config;

pub use fixture_config::{CleanupConfig, FixtureConfig, LoggingConfig, WorkflowConfig};
