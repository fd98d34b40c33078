//! Advisory update check against the publishing server
//!
//! `GET {base}/check` answers `{"version": "x.y.z"}`. Nothing is downloaded
//! here; a newer version only lets the caller start the external updater.

use std::path::Path;
use std::process::{Child, Command};
use std::time::Duration;

use serde::Deserialize;

use crate::domain::DomainError;

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

/// Dotted numeric comparison. Missing components count as 0, so `1.2` equals
/// `1.2.0`. Any non-numeric component makes the comparison false.
pub fn version_is_greater(candidate: &str, current: &str) -> bool {
    fn parts(v: &str) -> Option<Vec<u64>> {
        v.trim().split('.').map(|p| p.parse().ok()).collect()
    }

    let (Some(mut a), Some(mut b)) = (parts(candidate), parts(current)) else {
        return false;
    };

    let len = a.len().max(b.len());
    a.resize(len, 0);
    b.resize(len, 0);
    a > b
}

/// Ask the update server for its latest version and return it when newer
/// than `current`.
pub async fn check_for_update(
    client: &reqwest::Client,
    base_url: &str,
    current: &str,
) -> Result<Option<String>, DomainError> {
    let url = format!("{}/check", base_url.trim_end_matches('/'));

    let resp = client
        .get(&url)
        .timeout(Duration::from_secs(5))
        .send()
        .await
        .map_err(|e| DomainError::External(format!("Failed to reach update server: {}", e)))?;

    if !resp.status().is_success() {
        return Err(DomainError::External(format!(
            "Update server returned status: {}",
            resp.status()
        )));
    }

    let body: VersionResponse = resp
        .json()
        .await
        .map_err(|e| DomainError::External(format!("Failed to parse update response: {}", e)))?;

    if version_is_greater(&body.version, current) {
        tracing::info!("Update available: {} (running {})", body.version, current);
        Ok(Some(body.version))
    } else {
        tracing::debug!("Up to date ({} >= {})", current, body.version);
        Ok(None)
    }
}

/// Start the updater executable with the target version as argument
pub fn launch_updater(updater: &Path, version: &str) -> Result<Child, DomainError> {
    if !updater.is_file() {
        return Err(DomainError::External(format!(
            "Updater not found at {}",
            updater.display()
        )));
    }

    let child = Command::new(updater).arg(version).spawn()?;
    tracing::info!("Started updater {} for version {}", updater.display(), version);
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compares_numerically_not_lexically() {
        assert!(version_is_greater("1.2.10", "1.2.9"));
        assert!(!version_is_greater("1.2.9", "1.2.10"));
        assert!(version_is_greater("2.0", "1.9.9"));
    }

    #[test]
    fn missing_components_are_zero() {
        assert!(!version_is_greater("1.2", "1.2.0"));
        assert!(!version_is_greater("1.2.0", "1.2"));
        assert!(version_is_greater("1.2.1", "1.2"));
    }

    #[test]
    fn garbage_is_never_greater() {
        assert!(!version_is_greater("1.x", "1.0"));
        assert!(!version_is_greater("2.0", "dev"));
        assert!(!version_is_greater("", "1.0"));
    }
}
