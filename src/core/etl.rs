use crate::core::Pipeline;
use crate::utils::error::Result;

/// What a finished run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub output_path: String,
    pub base_dn: String,
    pub entries_read: usize,
    pub users: usize,
    pub groups: usize,
    pub skipped: usize,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Runs extract, transform and load in order, stopping at the first error.
    /// Nothing is written unless the transform step succeeded.
    pub fn run(&self) -> Result<RunSummary> {
        tracing::info!("Extracting entries");
        let raw_data = self.pipeline.extract()?;
        let entries_read = raw_data.len();
        tracing::info!("Read {} entries", entries_read);

        tracing::info!("Transforming entries");
        let result = self.pipeline.transform(raw_data)?;

        tracing::info!("Loading {} entries", result.dataset.len());
        let output_path = self.pipeline.load(&result)?;
        tracing::info!("FINISHED output is in {}", output_path);

        Ok(RunSummary {
            output_path,
            base_dn: result.base_dn,
            entries_read,
            users: result.users,
            groups: result.groups,
            skipped: result.skipped,
        })
    }
}
