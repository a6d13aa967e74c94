use crate::utils::error::{Result, SimpError};
use crate::utils::validation::{
    validate_non_empty_string, validate_rdn_value, validate_string_list, Validate,
};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("static env var pattern"));

/// 389-DS rejects these; a profile can only add to the list.
const REQUIRED_DENIED_ATTRIBUTES: [&str; 7] = [
    "entrycsn",
    "entryuuid",
    "memberuid",
    "pwdaccountlockedtime",
    "pwdchangedtime",
    "pwdfailuretime",
    "sshpublickey",
];

const REQUIRED_GROUP_CLASSES: [&str; 3] = ["groupOfNames", "nsMemberOf", "posixGroup"];

const REQUIRED_USER_CLASSES: [&str; 1] = ["nsAccount"];

/// Everything the OpenLDAP to 389-DS conversion treats as a constant.
///
/// `RemapProfile::default()` reproduces the layout SIMP uses; a TOML file can
/// override individual fields. The deny list and the added object classes
/// read from a file extend the defaults instead of replacing them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RemapProfile {
    /// Attributes 389-DS rejects; removed from every converted entry.
    pub denied_attributes: Vec<String>,
    pub containers: ContainerConfig,
    pub groups: GroupConfig,
    pub users: UserConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ContainerConfig {
    pub old_group_ou: String,
    pub new_group_ou: String,
    pub people_ou: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GroupConfig {
    pub object_classes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UserConfig {
    pub object_classes: Vec<String>,
    /// Added on top of `object_classes` for `inetOrgPerson` entries.
    pub person_object_classes: Vec<String>,
    pub removed_object_classes: Vec<String>,
    pub ssh_key_sentinel: String,
}

impl Default for RemapProfile {
    fn default() -> Self {
        Self {
            denied_attributes: strings(&REQUIRED_DENIED_ATTRIBUTES),
            containers: ContainerConfig::default(),
            groups: GroupConfig::default(),
            users: UserConfig::default(),
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            old_group_ou: "Group".to_string(),
            new_group_ou: "Groups".to_string(),
            people_ou: "People".to_string(),
        }
    }
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            object_classes: strings(&REQUIRED_GROUP_CLASSES),
        }
    }
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            object_classes: strings(&REQUIRED_USER_CLASSES),
            person_object_classes: strings(&["nsPerson", "nsOrgPerson"]),
            removed_object_classes: strings(&["ldapPublicKey"]),
            ssh_key_sentinel: "<no ssh key>".to_string(),
        }
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn contains_ignore_case(values: &[String], wanted: &str) -> bool {
    values.iter().any(|v| v.eq_ignore_ascii_case(wanted))
}

/// `required` first, then the configured values it does not already hold.
fn merge_required(required: &[&str], configured: Vec<String>) -> Vec<String> {
    let mut merged = strings(required);
    for value in configured {
        if !contains_ignore_case(&merged, &value) {
            merged.push(value);
        }
    }
    merged
}

fn require_all(field: &str, values: &[String], required: &[&str]) -> Result<()> {
    match required.iter().find(|r| !contains_ignore_case(values, r)) {
        Some(missing) => Err(SimpError::ConfigValidationError {
            field: field.to_string(),
            message: format!("'{}' cannot be removed", missing),
        }),
        None => Ok(()),
    }
}

impl RemapProfile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SimpError::ReadError {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            SimpError::ConfigParseError { message, .. } => SimpError::ConfigParseError {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        let mut profile: Self =
            toml::from_str(&processed_content).map_err(|e| SimpError::ConfigParseError {
                path: "<profile>".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;

        profile.denied_attributes = merge_required(
            &REQUIRED_DENIED_ATTRIBUTES,
            std::mem::take(&mut profile.denied_attributes),
        );
        profile.groups.object_classes = merge_required(
            &REQUIRED_GROUP_CLASSES,
            std::mem::take(&mut profile.groups.object_classes),
        );
        profile.users.object_classes = merge_required(
            &REQUIRED_USER_CLASSES,
            std::mem::take(&mut profile.users.object_classes),
        );
        Ok(profile)
    }

    /// Replaces `${VAR}` with the environment value, leaving unset variables untouched.
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn is_denied(&self, attribute: &str) -> bool {
        self.denied_attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case(attribute))
    }

    pub fn old_group_dn(&self, base_dn: &str) -> String {
        format!("ou={},{}", self.containers.old_group_ou, base_dn)
    }

    pub fn new_group_dn(&self, base_dn: &str) -> String {
        format!("ou={},{}", self.containers.new_group_ou, base_dn)
    }

    pub fn people_dn(&self, base_dn: &str) -> String {
        format!("ou={},{}", self.containers.people_ou, base_dn)
    }
}

impl Validate for RemapProfile {
    fn validate(&self) -> Result<()> {
        validate_string_list("denied_attributes", &self.denied_attributes)?;
        require_all(
            "denied_attributes",
            &self.denied_attributes,
            &REQUIRED_DENIED_ATTRIBUTES,
        )?;

        validate_rdn_value("containers.old_group_ou", &self.containers.old_group_ou)?;
        validate_rdn_value("containers.new_group_ou", &self.containers.new_group_ou)?;
        validate_rdn_value("containers.people_ou", &self.containers.people_ou)?;
        if self
            .containers
            .people_ou
            .eq_ignore_ascii_case(&self.containers.old_group_ou)
        {
            return Err(SimpError::ConfigValidationError {
                field: "containers.people_ou".to_string(),
                message: "users and groups cannot share an organizational unit".to_string(),
            });
        }

        validate_string_list("groups.object_classes", &self.groups.object_classes)?;
        require_all(
            "groups.object_classes",
            &self.groups.object_classes,
            &REQUIRED_GROUP_CLASSES,
        )?;
        validate_string_list("users.object_classes", &self.users.object_classes)?;
        require_all(
            "users.object_classes",
            &self.users.object_classes,
            &REQUIRED_USER_CLASSES,
        )?;
        validate_string_list(
            "users.person_object_classes",
            &self.users.person_object_classes,
        )?;
        validate_string_list(
            "users.removed_object_classes",
            &self.users.removed_object_classes,
        )?;
        validate_non_empty_string("users.ssh_key_sentinel", &self.users.ssh_key_sentinel)?;

        Ok(())
    }
}
