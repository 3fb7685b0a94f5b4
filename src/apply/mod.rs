use crate::error::{Error, Result};
use crate::host::{Host, Profile};
use crate::matcher::{self, ConfigSnapshot, SettingsDiff};

/// Look up a profile by its file name.
pub fn resolve(host: &impl Host, name: &str) -> Result<Profile> {
    host.list_profiles()?
        .into_iter()
        .find(|p| p.name == name)
        .ok_or_else(|| Error::ProfileNotFound(name.to_string()))
}

/// Apply the named profile through the host's privileged helper.
pub fn apply(host: &mut impl Host, name: &str) -> Result<Profile> {
    let profile = resolve(&*host, name)?;
    tracing::debug!("resolved {} to {}", name, profile.path.display());
    host.apply_profile(&profile.path)?;
    Ok(profile)
}

/// Compare the named profile against the live configuration.
pub fn diff(host: &impl Host, name: &str) -> Result<SettingsDiff> {
    let profile = resolve(host, name)?;
    let live = ConfigSnapshot::from_text(&host.query_live_status()?);
    let stored = ConfigSnapshot::from_text(&host.read_file(&profile.path)?);
    Ok(matcher::diff(&live, &stored))
}
