pub mod classifier;
pub mod etl;
pub mod ldif;
pub mod pipeline;
pub mod remap;

pub use crate::domain::model::{Dataset, LdifEntry, TransformResult};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
