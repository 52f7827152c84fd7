//! Version parsing for bundle compatibility and Python version pins

use crate::error::{Result, ScaffoldError};
use semver::Version;

/// Compare the CLI version against the version the template bundle was built for.
/// Returns a warning message if the CLI is older than the bundle expects.
pub fn check_compatibility(
    cli_version: &str,
    bundle_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli_ver = parse_version(cli_version).ok()?;
    let bundle_ver = parse_version(bundle_version).ok()?;

    (cli_ver < bundle_ver).then(|| {
        format!(
            "Warning: These templates were built for CLI version {} or newer.\n\
             You are running version {}.\n\
             Consider updating: {}",
            bundle_ver, cli_ver, upgrade_command
        )
    })
}

/// Parse version string, tolerating a leading 'v'
pub fn parse_version(version_str: &str) -> std::result::Result<Version, semver::Error> {
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned)
}

/// Check that a `.python-version` pin is an exact `major.minor.patch` release
pub fn parse_python_pin(pin: &str) -> Result<Version> {
    let version = Version::parse(pin).map_err(|e| ScaffoldError::Manifest {
        message: format!("invalid Python version pin '{}': {}", pin, e),
    })?;
    if !version.pre.is_empty() || !version.build.is_empty() {
        return Err(ScaffoldError::Manifest {
            message: format!("Python version pin '{}' must be a final release", pin),
        });
    }
    Ok(version)
}
