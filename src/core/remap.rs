//! OpenLDAP to 389-DS entry conversion.
//!
//! Groups move from `ou=Group` to `ou=Groups` and gain the object classes
//! `dsidm` expects, with `memberUid` rewritten into `member` DNs. Users gain
//! the 389-DS account classes, their SSH keys move to `nsSshPublicKey` and a
//! password lockout becomes `nsAccountLock`. Everything else is dropped.

use crate::config::profile::RemapProfile;
use crate::domain::model::{Attributes, Dataset, LdifEntry, TransformResult};
use crate::utils::error::{Result, SimpError};

/// 389-DS requires `displayName` on entries of this class.
const NS_PERSON: &str = "nsPerson";
const INET_ORG_PERSON: &str = "inetOrgPerson";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Group,
    User,
    Other,
}

/// Drops blank values and repeated values from every attribute.
///
/// Attributes left without values are kept so their presence can still be
/// tested.
pub fn filter_values(attrs: &mut Attributes) {
    for (_, values) in attrs.iter_mut() {
        let mut seen: Vec<String> = Vec::with_capacity(values.len());
        for value in values.drain(..) {
            if !value.trim().is_empty() && !seen.contains(&value) {
                seen.push(value);
            }
        }
        *values = seen;
    }
}

fn merge_object_classes(classes: &mut Vec<String>, extra: &[String]) {
    for class in extra {
        if !classes.iter().any(|c| c.eq_ignore_ascii_case(class)) {
            classes.push(class.clone());
        }
    }
}

fn has_class(classes: &[String], class: &str) -> bool {
    classes.iter().any(|c| c.eq_ignore_ascii_case(class))
}

fn drop_denied(attrs: &mut Attributes, profile: &RemapProfile) {
    attrs.retain(|name, values| !profile.is_denied(name) && !values.is_empty());
}

pub fn convert_group(attrs: &Attributes, new_group_dn: &str, profile: &RemapProfile) -> Attributes {
    let mut converted = attrs.clone();
    filter_values(&mut converted);

    let mut classes = converted.remove("objectclass").unwrap_or_default();
    merge_object_classes(&mut classes, &profile.groups.object_classes);
    converted.insert("objectclass", classes);

    if let Some(uids) = converted.get("memberuid") {
        let members = uids
            .iter()
            .map(|uid| format!("uid={},{}", uid, new_group_dn))
            .collect();
        converted.insert("member", members);
    }

    drop_denied(&mut converted, profile);
    converted
}

pub fn convert_user(attrs: &Attributes, profile: &RemapProfile) -> Attributes {
    let mut converted = attrs.clone();
    filter_values(&mut converted);

    let mut classes = converted.remove("objectclass").unwrap_or_default();
    merge_object_classes(&mut classes, &profile.users.object_classes);
    if has_class(&classes, INET_ORG_PERSON) {
        merge_object_classes(&mut classes, &profile.users.person_object_classes);
    }
    classes.retain(|c| !has_class(&profile.users.removed_object_classes, c));
    let wants_display_name = has_class(&classes, NS_PERSON);
    converted.insert("objectclass", classes);

    if let Some(keys) = converted.get("sshpublickey") {
        let keys = if keys.is_empty() {
            vec![profile.users.ssh_key_sentinel.clone()]
        } else {
            keys.to_vec()
        };
        converted.insert("nssshpublickey", keys);
    }

    if converted.contains("pwdaccountlockedtime") {
        converted.insert("nsaccountlock", vec!["true".to_string()]);
    }

    if wants_display_name {
        let first = |name: &str| {
            converted
                .get(name)
                .and_then(|v| v.first())
                .cloned()
                .unwrap_or_default()
        };
        let display_name = [first("givenname"), first("sn")]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !display_name.is_empty() {
            converted.insert("displayname", vec![display_name]);
        }
    }

    drop_denied(&mut converted, profile);
    converted
}

/// Returns the part of `dn` in front of `,<suffix>`, comma included.
/// Comparison ignores ASCII case.
fn strip_dn_suffix<'a>(dn: &'a str, suffix: &str) -> Option<&'a str> {
    let start = dn.len().checked_sub(suffix.len())?;
    if start == 0 {
        return None;
    }
    let bytes = dn.as_bytes();
    if bytes[start - 1] == b',' && bytes[start..].eq_ignore_ascii_case(suffix.as_bytes()) {
        Some(&dn[..start])
    } else {
        None
    }
}

pub fn classify_entry(entry: &LdifEntry, base_dn: &str, profile: &RemapProfile) -> EntryKind {
    if entry.has_object_class("organizationalUnit") {
        return EntryKind::Other;
    }
    if strip_dn_suffix(&entry.dn, &profile.old_group_dn(base_dn)).is_some() {
        EntryKind::Group
    } else if strip_dn_suffix(&entry.dn, &profile.people_dn(base_dn)).is_some() {
        EntryKind::User
    } else {
        EntryKind::Other
    }
}

/// Uses `explicit` when given, otherwise the first entry that is a `domain`.
///
/// Only `structuralObjectClass` is consulted when the export carries it
/// (`slapcat` output); plain `ldapsearch` exports fall back to `objectClass`.
pub fn resolve_base_dn(dataset: &Dataset, explicit: Option<&str>) -> Result<String> {
    if let Some(base_dn) = explicit.map(str::trim).filter(|dn| !dn.is_empty()) {
        return Ok(base_dn.to_string());
    }

    let attribute = if dataset
        .iter()
        .any(|e| e.attributes.contains("structuralobjectclass"))
    {
        "structuralobjectclass"
    } else {
        "objectclass"
    };

    let base_dn = dataset
        .iter()
        .find(|e| {
            e.attributes
                .get(attribute)
                .is_some_and(|classes| has_class(classes, "domain"))
        })
        .map(|e| e.dn.clone())
        .ok_or(SimpError::BaseDnNotFound)?;

    tracing::debug!("Discovered base DN '{}' from {}", base_dn, attribute);
    Ok(base_dn)
}

/// Converts every user and group below `base_dn`; fails when there are none.
pub fn convert_dataset(
    dataset: &Dataset,
    base_dn: &str,
    profile: &RemapProfile,
) -> Result<TransformResult> {
    let old_group_dn = profile.old_group_dn(base_dn);
    let new_group_dn = profile.new_group_dn(base_dn);

    let mut converted = Dataset::new();
    let (mut users, mut groups, mut skipped) = (0, 0, 0);

    for entry in dataset {
        match classify_entry(entry, base_dn, profile) {
            EntryKind::Group => {
                let prefix = strip_dn_suffix(&entry.dn, &old_group_dn).unwrap_or_default();
                let dn = format!("{}{}", prefix, new_group_dn);
                tracing::debug!("Group {} -> {}", entry.dn, dn);
                converted.insert(LdifEntry::new(
                    dn,
                    convert_group(&entry.attributes, &new_group_dn, profile),
                ));
                groups += 1;
            }
            EntryKind::User => {
                tracing::debug!("User {}", entry.dn);
                converted.insert(LdifEntry::new(
                    entry.dn.clone(),
                    convert_user(&entry.attributes, profile),
                ));
                users += 1;
            }
            EntryKind::Other => {
                tracing::trace!("Skipping {}", entry.dn);
                skipped += 1;
            }
        }
    }

    if converted.is_empty() {
        return Err(SimpError::NoMatchingEntries {
            base_dn: base_dn.to_string(),
        });
    }

    tracing::info!(
        "Converted {} users and {} groups, skipped {} entries",
        users,
        groups,
        skipped
    );

    Ok(TransformResult {
        dataset: converted,
        base_dn: base_dn.to_string(),
        users,
        groups,
        skipped,
    })
}
