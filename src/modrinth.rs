//! Modrinth version-visibility queries
//!
//! After a release is published it can take a while before the new version
//! is visible through the Modrinth API. The sync loop polls this endpoint
//! between attempts so it doesn't burn packwiz invocations on a version
//! that is known not to exist upstream yet.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;

const API_BASE: &str = "https://api.modrinth.com/v2";

const HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
const HTTP_REQUEST_TIMEOUT_SECS: u64 = 10;

/// One version record from the project versions endpoint. Only the version
/// number matters here; everything else is ignored.
#[derive(Debug, Deserialize)]
struct VersionRecord {
    #[serde(default)]
    version_number: String,
}

/// Create an HTTP client with timeout configuration.
/// Prevents indefinite hangs on slow or unresponsive servers.
pub fn create_http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(HTTP_REQUEST_TIMEOUT_SECS))
        .user_agent("modsync")
        .build()
        .context("Failed to create HTTP client")
}

/// Check whether `version` is visible on Modrinth for the slug, filtered by
/// loader and game version. A version counts as visible when any record's
/// version number contains it as a substring.
///
/// Errors mean "unknown", not "absent" — the caller must not treat a failed
/// query as a negative signal.
pub fn version_visible(
    client: &Client,
    slug: &str,
    version: &str,
    mc_version: &str,
    loader: &str,
) -> Result<bool> {
    let url = format!("{API_BASE}/project/{slug}/version");
    let response = client
        .get(&url)
        .query(&[
            ("loaders", format!("[\"{loader}\"]")),
            ("game_versions", format!("[\"{mc_version}\"]")),
        ])
        .send()
        .with_context(|| format!("Failed to query Modrinth versions for {slug}"))?;

    if !response.status().is_success() {
        bail!(
            "Modrinth API returned HTTP {} for {slug}",
            response.status().as_u16()
        );
    }

    let records: Vec<VersionRecord> = response
        .json()
        .with_context(|| format!("Failed to decode Modrinth versions for {slug}"))?;

    Ok(records
        .iter()
        .any(|record| record.version_number.contains(version)))
}
