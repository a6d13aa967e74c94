use crate::config::profile::RemapProfile;
use crate::core::{ldif, remap};
use crate::core::{ConfigProvider, Dataset, Pipeline, Storage, TransformResult};
use crate::utils::error::{Result, SimpError};

/// Reads a `slapcat` dump, converts users and groups for 389-DS and writes
/// the result as LDIF.
pub struct LdifRemapPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    profile: RemapProfile,
}

impl<S: Storage, C: ConfigProvider> LdifRemapPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self::with_profile(storage, config, RemapProfile::default())
    }

    pub fn with_profile(storage: S, config: C, profile: RemapProfile) -> Self {
        Self {
            storage,
            config,
            profile,
        }
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for LdifRemapPipeline<S, C> {
    fn extract(&self) -> Result<Dataset> {
        let input = self.config.input_path();
        if !self.storage.exists(input) {
            return Err(SimpError::InputNotFound {
                path: input.to_string(),
            });
        }

        tracing::debug!("Reading LDIF from: {}", input);
        let bytes = self.storage.read_file(input)?;
        let text = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            SimpError::LdifParseError {
                line: valid.iter().filter(|b| **b == b'\n').count() + 1,
                message: "input is not UTF-8 text".to_string(),
            }
        })?;

        ldif::parse(&text)
    }

    fn transform(&self, data: Dataset) -> Result<TransformResult> {
        let base_dn = remap::resolve_base_dn(&data, self.config.base_dn())?;
        tracing::debug!("Using base DN: {}", base_dn);
        remap::convert_dataset(&data, &base_dn, &self.profile)
    }

    fn load(&self, result: &TransformResult) -> Result<String> {
        let output = self.config.output_path();
        let text = ldif::to_ldif(&result.dataset);

        tracing::debug!(
            "Writing {} entries ({} bytes) to {}",
            result.dataset.len(),
            text.len(),
            output
        );
        self.storage.write_file(output, text.as_bytes())?;

        Ok(output.to_string())
    }
}
