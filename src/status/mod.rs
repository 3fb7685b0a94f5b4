use crate::error::Result;
use crate::host::{Host, Profile};
use crate::matcher::{self, ConfigSnapshot};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One listed profile and whether it is the active one.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileEntry {
    pub name: String,
    pub path: PathBuf,
    pub active: bool,
}

/// Profiles found in the profile directory and which one TLP is running.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileReport {
    pub timestamp: String,
    pub profile_dir: PathBuf,
    pub profiles: Vec<ProfileEntry>,
    pub active: Option<String>,
    /// Set when the live configuration could not be read.
    pub live_status_error: Option<String>,
}

impl ProfileReport {
    pub fn active_profile(&self) -> Option<&ProfileEntry> {
        self.profiles.iter().find(|p| p.active)
    }
}

/// Index of the first candidate whose settings equal the live configuration.
///
/// Candidates are consumed lazily in order; evaluation stops at the first
/// match, so identical profiles resolve to the earliest one. A `None`
/// candidate (unreadable profile) never matches.
pub fn select_active<I>(live: &ConfigSnapshot, candidates: I) -> Option<usize>
where
    I: IntoIterator<Item = Option<ConfigSnapshot>>,
{
    candidates
        .into_iter()
        .position(|candidate| candidate.is_some_and(|c| matcher::matches(live, &c)))
}

fn load_snapshot(host: &impl Host, profile: &Profile) -> Option<ConfigSnapshot> {
    match host.read_file(&profile.path) {
        Ok(text) => Some(ConfigSnapshot::from_text(&text)),
        Err(e) => {
            tracing::warn!("skipping profile {}: {}", profile.name, e);
            None
        }
    }
}

/// Find the active profile among `profiles`, reading them one at a time.
pub fn find_active(host: &impl Host, live: &ConfigSnapshot, profiles: &[Profile]) -> Option<usize> {
    select_active(live, profiles.iter().map(|p| load_snapshot(host, p)))
}

/// Build the profile report.
///
/// An empty profile directory short-circuits before the status command runs.
/// A failing status command is recorded in the report rather than returned.
pub fn report(host: &impl Host, profile_dir: &Path) -> Result<ProfileReport> {
    let profiles = host.list_profiles()?;

    let mut report = ProfileReport {
        timestamp: chrono::Utc::now().to_rfc3339(),
        profile_dir: profile_dir.to_path_buf(),
        profiles: profiles
            .iter()
            .map(|p| ProfileEntry {
                name: p.name.clone(),
                path: p.path.clone(),
                active: false,
            })
            .collect(),
        active: None,
        live_status_error: None,
    };

    if profiles.is_empty() {
        return Ok(report);
    }

    let live = match host.query_live_status() {
        Ok(text) => ConfigSnapshot::from_text(&text),
        Err(e) => {
            tracing::warn!("cannot determine active profile: {}", e);
            report.live_status_error = Some(e.to_string());
            return Ok(report);
        }
    };

    if let Some(index) = find_active(host, &live, &profiles) {
        tracing::debug!("active profile: {}", profiles[index].name);
        report.profiles[index].active = true;
        report.active = Some(profiles[index].name.clone());
    }

    Ok(report)
}
