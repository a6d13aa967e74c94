pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{ClassifierCliConfig, RemapCliConfig};

pub use adapters::LocalStorage;
pub use config::{ClassifierConfig, RemapProfile};
pub use core::{
    classifier::{OutputFormat, YamlNodeClassifier},
    etl::{EtlEngine, RunSummary},
    pipeline::LdifRemapPipeline,
};
pub use utils::error::{Result, SimpError};
