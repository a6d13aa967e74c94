use crate::domain::model::{Dataset, TransformResult};
use crate::utils::error::Result;

pub trait Storage {
    fn exists(&self, path: &str) -> bool;
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    /// Explicit base DN; `None` means it is discovered from the input.
    fn base_dn(&self) -> Option<&str>;
}

pub trait Pipeline {
    fn extract(&self) -> Result<Dataset>;
    fn transform(&self, data: Dataset) -> Result<TransformResult>;
    fn load(&self, result: &TransformResult) -> Result<String>;
}
