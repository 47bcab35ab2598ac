//! Packwiz index queries

use std::fs;
use std::path::Path;

/// Check whether the pack already carries a descriptor for `slug`.
///
/// Packwiz writes one `<name>.pw.toml` per mod under `mods/`, each recording
/// the project slug as `slug = "<slug>"`. A missing mods directory or an
/// unreadable descriptor simply means the mod is not present.
pub fn mod_exists_in_pack(slug: &str, pack_dir: &Path) -> bool {
    let mods_dir = pack_dir.join("mods");
    let Ok(entries) = fs::read_dir(&mods_dir) else {
        return false;
    };

    let needle = format!("slug = \"{slug}\"");
    for entry in entries.flatten() {
        let path = entry.path();
        let is_descriptor = path
            .file_name()
            .map(|name| name.to_string_lossy().ends_with(".pw.toml"))
            .unwrap_or(false);
        if !is_descriptor {
            continue;
        }
        if let Ok(content) = fs::read_to_string(&path) {
            if content.contains(&needle) {
                return true;
            }
        }
    }
    false
}
