//! End-to-end metadata validation and editing

use modsync::commands::metadata::{self, SetValues};
use serial_test::serial;
use tempfile::TempDir;

use crate::helpers::valid_mods_toml;

#[test]
#[serial]
fn validate_exports_all_fields_to_output_file() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("mods.toml"), valid_mods_toml()).unwrap();

    let output_file = root.path().join("github_output");
    std::env::set_var("GITHUB_OUTPUT", &output_file);

    metadata::validate(Some(root.path().to_path_buf()), true).unwrap();

    let content = std::fs::read_to_string(&output_file).unwrap();
    assert_eq!(
        content,
        "modrinth_id=AANobbMI\n\
         curseforge_id=238222\n\
         loader=forge\n\
         mc_version=1.20.1\n\
         modrinth_slug=sodium\n\
         curseforge_slug=sodium\n"
    );

    std::env::remove_var("GITHUB_OUTPUT");
}

#[test]
#[serial]
fn validate_without_export_needs_no_output_file() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("mods.toml"), valid_mods_toml()).unwrap();
    std::env::remove_var("GITHUB_OUTPUT");

    metadata::validate(Some(root.path().to_path_buf()), false).unwrap();
}

#[test]
#[serial]
fn validate_with_export_fails_when_sink_is_unset() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("mods.toml"), valid_mods_toml()).unwrap();
    std::env::remove_var("GITHUB_OUTPUT");

    let err = metadata::validate(Some(root.path().to_path_buf()), true).unwrap_err();
    assert!(format!("{err:#}").contains("GITHUB_OUTPUT"));
}

#[test]
fn validate_reports_every_missing_key() {
    let root = TempDir::new().unwrap();
    std::fs::write(
        root.path().join("mods.toml"),
        "[mc-publish]\nmodrinth = \"AANobbMI\"\nloader = \"forge\"\nmc_version = \"1.20.1\"\nmodrinth_slug = \"sodium\"\n",
    )
    .unwrap();

    let err = metadata::validate(Some(root.path().to_path_buf()), false).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("[mc-publish].curseforge"));
    assert!(message.contains("[mc-publish].curseforge_slug"));
}

#[test]
fn validate_rejects_duplicate_tables() {
    let root = TempDir::new().unwrap();
    std::fs::write(
        root.path().join("mods.toml"),
        "[mc-publish]\nmodrinth = \"a\"\n\n[mc-publish]\nmodrinth = \"b\"\n",
    )
    .unwrap();

    let err = metadata::validate(Some(root.path().to_path_buf()), false).unwrap_err();
    assert!(format!("{err:#}").contains("expected exactly one"));
}

#[test]
fn validate_rejects_multiple_mods_toml_files() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("mods.toml"), valid_mods_toml()).unwrap();
    let nested = root.path().join("subproject");
    std::fs::create_dir_all(&nested).unwrap();
    std::fs::write(nested.join("mods.toml"), valid_mods_toml()).unwrap();

    let err = metadata::validate(Some(root.path().to_path_buf()), false).unwrap_err();
    assert!(format!("{err:#}").contains("Multiple mods.toml"));
}

#[test]
fn validate_ignores_build_output_copies() {
    let root = TempDir::new().unwrap();
    std::fs::write(root.path().join("mods.toml"), valid_mods_toml()).unwrap();
    let build = root.path().join("build").join("resources");
    std::fs::create_dir_all(&build).unwrap();
    std::fs::write(build.join("mods.toml"), valid_mods_toml()).unwrap();

    metadata::validate(Some(root.path().to_path_buf()), false).unwrap();
}

#[test]
fn set_appends_table_and_preserves_other_content() {
    let root = TempDir::new().unwrap();
    let file = root.path().join("mods.toml");
    std::fs::write(&file, "[mod]\nname = \"Test Mod\"  # display name\n").unwrap();

    let values = SetValues {
        modrinth: Some("AANobbMI".to_string()),
        loader: Some("forge".to_string()),
        ..Default::default()
    };
    metadata::set(Some(file.clone()), &values).unwrap();

    let content = std::fs::read_to_string(&file).unwrap();
    assert_eq!(
        content,
        "[mod]\nname = \"Test Mod\"  # display name\n\n[mc-publish]\nmodrinth = \"AANobbMI\"\nloader = \"forge\"\n"
    );
}

#[test]
fn set_is_idempotent_on_disk() {
    let root = TempDir::new().unwrap();
    let file = root.path().join("mods.toml");
    std::fs::write(&file, valid_mods_toml()).unwrap();

    let values = SetValues {
        mc_version: Some("1.21".to_string()),
        ..Default::default()
    };
    metadata::set(Some(file.clone()), &values).unwrap();
    let first = std::fs::read_to_string(&file).unwrap();

    metadata::set(Some(file.clone()), &values).unwrap();
    let second = std::fs::read_to_string(&file).unwrap();

    assert_eq!(first, second);
    assert!(first.contains("mc_version = \"1.21\"\n"));
    // Everything outside the table survived byte-for-byte.
    assert!(first.contains("# Project metadata\n"));
    assert!(first.contains("name = \"Test Mod\"  # display name\n"));
}

#[test]
fn set_updates_value_in_place() {
    let root = TempDir::new().unwrap();
    let file = root.path().join("mods.toml");
    std::fs::write(&file, valid_mods_toml()).unwrap();

    let values = SetValues {
        modrinth: Some("newid".to_string()),
        ..Default::default()
    };
    metadata::set(Some(file.clone()), &values).unwrap();

    let content = std::fs::read_to_string(&file).unwrap();
    let expected = valid_mods_toml().replace("modrinth = \"AANobbMI\"", "modrinth = \"newid\"");
    assert_eq!(content, expected);
}

#[test]
fn set_with_no_values_is_an_error() {
    let root = TempDir::new().unwrap();
    let file = root.path().join("mods.toml");
    std::fs::write(&file, valid_mods_toml()).unwrap();

    assert!(metadata::set(Some(file), &SetValues::default()).is_err());
}
