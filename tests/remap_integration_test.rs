use anyhow::Result;
use simp_utils::core::ldif;
use simp_utils::{EtlEngine, LdifRemapPipeline, LocalStorage, RemapCliConfig, RemapProfile, SimpError};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const OPENLDAP_LDIF: &str = include_str!("files/simp_openldap.ldif");
const EXPECTED_389DS_LDIF: &str = include_str!("files/simp_389ds.ldif");

const DENIED: [&str; 7] = [
    "entryuuid",
    "entrycsn",
    "pwdchangedtime",
    "pwdfailuretime",
    "memberuid",
    "sshpublickey",
    "pwdaccountlockedtime",
];

fn cli_config(input: &Path, output: &Path, base_dn: Option<&str>) -> RemapCliConfig {
    RemapCliConfig {
        base_dn: base_dn.map(str::to_string),
        input_path: input.to_str().unwrap().to_string(),
        output_path: output.to_str().unwrap().to_string(),
        profile: None,
        verbose: false,
    }
}

fn run_engine(input: &Path, output: &Path, base_dn: Option<&str>) -> simp_utils::Result<simp_utils::RunSummary> {
    let pipeline = LdifRemapPipeline::new(LocalStorage::default(), cli_config(input, output, base_dn));
    EtlEngine::new(pipeline).run()
}

#[test]
fn test_end_to_end_conversion_with_discovered_base_dn() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("simp_openldap.ldif");
    let output = temp_dir.path().join("simp_389ds.ldif");
    std::fs::write(&input, OPENLDAP_LDIF)?;

    let summary = run_engine(&input, &output, None)?;

    assert_eq!(summary.base_dn, "dc=test,dc=org");
    assert_eq!(summary.entries_read, 10);
    assert_eq!(summary.users, 2);
    assert_eq!(summary.groups, 3);
    assert_eq!(summary.skipped, 5);
    assert_eq!(std::fs::read_to_string(&output)?, EXPECTED_389DS_LDIF);
    Ok(())
}

#[test]
fn test_explicit_base_dn_gives_same_output() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("myinput.ldif");
    let output = temp_dir.path().join("myoutput.ldif");
    std::fs::write(&input, OPENLDAP_LDIF)?;

    run_engine(&input, &output, Some("dc=test,dc=org"))?;

    assert_eq!(std::fs::read_to_string(&output)?, EXPECTED_389DS_LDIF);
    Ok(())
}

#[test]
fn test_output_never_contains_denied_or_foreign_entries() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("in.ldif");
    let output = temp_dir.path().join("out.ldif");
    std::fs::write(&input, OPENLDAP_LDIF)?;

    run_engine(&input, &output, None)?;
    let converted = ldif::parse(&std::fs::read_to_string(&output)?)?;

    for entry in &converted {
        let dn = entry.dn.to_ascii_lowercase();
        assert!(
            dn.ends_with(",ou=groups,dc=test,dc=org") || dn.ends_with(",ou=people,dc=test,dc=org"),
            "unexpected entry {}",
            entry.dn
        );
        for denied in DENIED {
            assert!(!entry.attributes.contains(denied), "{} kept {}", entry.dn, denied);
        }
    }
    assert!(converted.get("cn=hostAuth,ou=Hosts,dc=test,dc=org").is_none());
    Ok(())
}

#[test]
fn test_every_member_uid_becomes_a_member_dn() -> Result<()> {
    let source = ldif::parse(OPENLDAP_LDIF)?;
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("in.ldif");
    let output = temp_dir.path().join("out.ldif");
    std::fs::write(&input, OPENLDAP_LDIF)?;

    run_engine(&input, &output, None)?;
    let converted = ldif::parse(&std::fs::read_to_string(&output)?)?;

    for group in ["administrators", "users"] {
        let old = source
            .get(&format!("cn={},ou=Group,dc=test,dc=org", group))
            .unwrap();
        let mut uids: Vec<&String> = Vec::new();
        for uid in old.attributes.get("memberuid").unwrap() {
            if !uid.trim().is_empty() && !uids.contains(&uid) {
                uids.push(uid);
            }
        }

        let new = converted
            .get(&format!("cn={},ou=Groups,dc=test,dc=org", group))
            .unwrap();
        let members = new.attributes.get("member").unwrap();
        assert_eq!(members.len(), uids.len());
        for (member, uid) in members.iter().zip(uids) {
            assert_eq!(member, &format!("uid={},ou=Groups,dc=test,dc=org", uid));
        }
    }
    Ok(())
}

#[test]
fn test_missing_domain_entry_needs_explicit_base_dn() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("missing_domain.ldif");
    let output = temp_dir.path().join("out.ldif");
    let without_domain: String = OPENLDAP_LDIF
        .split("\n\n")
        .filter(|block| !block.contains("structuralObjectClass: domain"))
        .collect::<Vec<_>>()
        .join("\n\n");
    std::fs::write(&input, without_domain)?;

    assert!(matches!(
        run_engine(&input, &output, None),
        Err(SimpError::BaseDnNotFound)
    ));
    assert!(!output.exists());

    run_engine(&input, &output, Some("dc=test,dc=org"))?;
    assert!(output.exists());
    Ok(())
}

#[test]
fn test_wrong_base_dn_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("in.ldif");
    let output = temp_dir.path().join("out.ldif");
    std::fs::write(&input, OPENLDAP_LDIF)?;

    let result = run_engine(&input, &output, Some("dc=some,dc=other,dc=org"));

    assert!(matches!(result, Err(SimpError::NoMatchingEntries { .. })));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_malformed_input_writes_nothing() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("malformed.ldif");
    let output = temp_dir.path().join("out.ldif");
    std::fs::write(&input, "dn: dc=test,dc=org\nobjectClass: domain\nthis line is not LDIF\n")?;

    let result = run_engine(&input, &output, Some("dc=test,dc=org"));

    assert!(matches!(result, Err(SimpError::LdifParseError { line: 3, .. })));
    assert!(!output.exists());
    Ok(())
}

#[test]
fn test_unwritable_output_location() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("in.ldif");
    let output = temp_dir.path().join("does/not/exist/dir/out.ldif");
    std::fs::write(&input, OPENLDAP_LDIF)?;

    let result = run_engine(&input, &output, None);

    assert!(matches!(result, Err(SimpError::WriteError { .. })));
    assert!(!temp_dir.path().join("does").exists());
    Ok(())
}

#[test]
fn test_profile_changes_containers_but_keeps_required_rules() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("in.ldif");
    let output = temp_dir.path().join("out.ldif");
    std::fs::write(&input, OPENLDAP_LDIF)?;

    let profile = RemapProfile::from_toml_str(
        "denied_attributes = [\"entryuuid\", \"structuralobjectclass\"]\n\n[groups]\nobject_classes = []\n\n[containers]\nnew_group_ou = \"Teams\"\n",
    )?;
    let pipeline = LdifRemapPipeline::with_profile(
        LocalStorage::default(),
        cli_config(&input, &output, None),
        profile,
    );
    EtlEngine::new(pipeline).run()?;

    let converted = ldif::parse(&std::fs::read_to_string(&output)?)?;
    let users = converted
        .get("cn=users,ou=Teams,dc=test,dc=org")
        .unwrap();
    assert!(users
        .attributes
        .get("member")
        .unwrap()
        .contains(&"uid=user1,ou=Teams,dc=test,dc=org".to_string()));
    assert!(!users.attributes.contains("structuralobjectclass"));
    assert_eq!(
        users.attributes.get("objectclass").unwrap(),
        ["posixGroup", "top", "groupOfNames", "nsMemberOf"]
    );

    for entry in &converted {
        for denied in DENIED {
            assert!(!entry.attributes.contains(denied), "{} kept {}", entry.dn, denied);
        }
    }
    Ok(())
}

fn converter() -> Command {
    Command::new(env!("CARGO_BIN_EXE_openldap-to-389ds"))
}

#[test]
fn test_binary_uses_default_paths_and_prints_summary() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("simp_openldap.ldif"), OPENLDAP_LDIF)?;

    let result = converter().current_dir(temp_dir.path()).output()?;

    assert!(result.status.success(), "stderr: {}", String::from_utf8_lossy(&result.stderr));
    assert_eq!(
        String::from_utf8(result.stdout)?,
        "Input File:  simp_openldap.ldif\nOutput File: simp_389ds.ldif\nBase DN:     dc=test,dc=org\n"
    );
    assert_eq!(
        std::fs::read_to_string(temp_dir.path().join("simp_389ds.ldif"))?,
        EXPECTED_389DS_LDIF
    );
    Ok(())
}

#[test]
fn test_binary_failures_exit_with_one() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let input = temp_dir.path().join("in.ldif");
    std::fs::write(&input, OPENLDAP_LDIF)?;
    let input = input.to_str().unwrap();

    let cases: Vec<Vec<&str>> = vec![
        vec!["-i", "/oops/simp_openldap.ldif", "-o", "oops_simp_389ds.ldif", "-b", "dc=test,dc=org"],
        vec!["-i", input, "-o", "/does/not/exist/dir/simp_389ds.ldif"],
        vec!["-i", input, "-o", "other.ldif", "-b", "dc=some,dc=other,dc=org"],
    ];

    for args in cases {
        let result = converter().current_dir(temp_dir.path()).args(&args).output()?;
        assert_eq!(result.status.code(), Some(1), "args: {:?}", args);
        assert!(String::from_utf8(result.stderr)?.contains("ERROR: "));
    }
    assert!(!temp_dir.path().join("oops_simp_389ds.ldif").exists());
    assert!(!temp_dir.path().join("other.ldif").exists());
    Ok(())
}

#[test]
fn test_binary_help() -> Result<()> {
    let result = converter().arg("-h").output()?;

    assert!(result.status.success());
    let help = String::from_utf8(result.stdout)?;
    assert!(help.contains("--basedn"));
    assert!(help.contains("EXAMPLES:"));
    Ok(())
}
