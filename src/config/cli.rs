use crate::config::classifier_config::DEFAULT_CONFIG_PATH;
use crate::core::classifier::OutputFormat;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, SimpError};
use crate::utils::validation::{validate_non_empty_string, validate_path, Validate};
use clap::Parser;

const REMAP_HELP: &str = "\
EXAMPLES:
  # To use the default locations for input and output files
  openldap-to-389ds -b 'dc=my,dc=domain'

  # To specify the location of the input and output files
  openldap-to-389ds -b 'dc=my,dc=domain' -i /tmp/myslapcat_file.ldif -o /tmp/myds389.ldif";

/// Converts user and group data from a SIMP OpenLDAP server into an LDIF
/// that can be imported into a SIMP 389-DS server with the same base DN.
#[derive(Debug, Clone, Parser)]
#[command(name = "openldap-to-389ds")]
#[command(after_help = REMAP_HELP)]
pub struct RemapCliConfig {
    /// Base DN of the LDAP server. When absent, it is determined from the input file
    #[arg(short = 'b', long = "basedn")]
    pub base_dn: Option<String>,

    /// Input LDIF file containing the slapcat dump of the OpenLDAP server
    #[arg(short, long = "input", default_value = "simp_openldap.ldif")]
    pub input_path: String,

    /// Generated LDIF file for import into 389-DS
    #[arg(short, long = "output", default_value = "simp_389ds.ldif")]
    pub output_path: String,

    /// TOML file overriding the conversion profile
    #[arg(short, long)]
    pub profile: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl ConfigProvider for RemapCliConfig {
    fn input_path(&self) -> &str {
        self.input_path.trim()
    }

    fn output_path(&self) -> &str {
        self.output_path.trim()
    }

    fn base_dn(&self) -> Option<&str> {
        self.base_dn.as_deref().map(str::trim)
    }
}

impl Validate for RemapCliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("input", &self.input_path)?;
        validate_path("output", &self.output_path)?;
        if let Some(profile) = &self.profile {
            validate_path("profile", profile)?;
        }

        if let Some(base_dn) = &self.base_dn {
            validate_non_empty_string("basedn", base_dn)?;
            if !base_dn.contains('=') {
                return Err(SimpError::InvalidConfigValueError {
                    field: "basedn".to_string(),
                    value: base_dn.clone(),
                    reason: "expected a DN such as 'dc=my,dc=domain'".to_string(),
                });
            }
        }

        if self.input_path() == self.output_path() {
            return Err(SimpError::ConfigValidationError {
                field: "output".to_string(),
                message: "output file would overwrite the input file".to_string(),
            });
        }

        Ok(())
    }
}

/// Puppet external node classifier: prints the environment for a host.
#[derive(Debug, Clone, Parser)]
#[command(name = "set-environment")]
pub struct ClassifierCliConfig {
    /// FQDN of the node; any further arguments are ignored
    #[arg(num_args = 0..)]
    pub hostnames: Vec<String>,

    /// YAML file with the hostname rules
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Print a Puppet ENC document instead of the bare environment name
    #[arg(long)]
    pub enc: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl ClassifierCliConfig {
    pub fn output_format(&self) -> OutputFormat {
        if self.enc {
            OutputFormat::Enc
        } else {
            OutputFormat::Name
        }
    }
}
