pub mod classifier_config;
#[cfg(feature = "cli")]
pub mod cli;
pub mod profile;

#[cfg(feature = "cli")]
pub use cli::{ClassifierCliConfig, RemapCliConfig};
pub use classifier_config::ClassifierConfig;
pub use profile::RemapProfile;
