use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level tlpswitch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub profiles: ProfilesConfig,
    pub tlp: TlpConfig,
    pub apply: ApplyConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilesConfig {
    /// Directory holding the profile files. Defaults to `~/.tlp`.
    pub dir: Option<PathBuf>,
    /// Create the directory when it does not exist yet.
    pub create_missing: bool,
}

impl Default for ProfilesConfig {
    fn default() -> Self {
        Self {
            dir: None,
            create_missing: true,
        }
    }
}

impl ProfilesConfig {
    /// Resolve the profile directory, falling back to `~/.tlp`.
    pub fn resolved_dir(&self) -> PathBuf {
        match &self.dir {
            Some(dir) => dir.clone(),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/"))
                .join(DEFAULT_PROFILE_DIR),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TlpConfig {
    /// Command printing the live configuration, program first.
    pub status_command: Vec<String>,
}

impl Default for TlpConfig {
    fn default() -> Self {
        Self {
            status_command: vec!["tlp-stat".to_string(), "-c".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyConfig {
    /// Privilege elevation prefix. Skipped when already running as root.
    pub elevate: Vec<String>,
    /// Interpreter for the update script.
    pub shell: PathBuf,
    /// Helper that installs a profile as the system TLP configuration.
    pub script: PathBuf,
}

impl Default for ApplyConfig {
    fn default() -> Self {
        Self {
            elevate: vec!["/usr/bin/pkexec".to_string()],
            shell: PathBuf::from("/bin/bash"),
            script: PathBuf::from("/usr/share/tlpswitch/tlp_update.sh"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Send a desktop notification after a profile is applied.
    pub enabled: bool,
}

const DEFAULT_PROFILE_DIR: &str = ".tlp";
const SYSTEM_CONFIG: &str = "/etc/tlpswitch/config.toml";

/// Load the system config file if it exists.
fn load_system() -> Option<toml::Value> {
    let content = std::fs::read_to_string(SYSTEM_CONFIG).ok()?;
    parse_value(Path::new(SYSTEM_CONFIG), &content)
}

/// Load the user config file (~/.config/tlpswitch/config.toml) if it exists.
fn load_user() -> Option<toml::Value> {
    let path = dirs::config_dir()?.join("tlpswitch").join("config.toml");
    let content = std::fs::read_to_string(&path).ok()?;
    parse_value(&path, &content)
}

fn parse_value(path: &Path, content: &str) -> Option<toml::Value> {
    match toml::from_str(content) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("ignoring unparsable config at {}: {}", path.display(), e);
            None
        }
    }
}

/// Recursively merge two TOML values. Tables are merged key-by-key;
/// all other types in `overlay` replace `base`.
fn merge_values(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_values(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load config from a specific path, ignoring system/user files.
fn load_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("failed to parse config at {}: {}", path.display(), e);
            Config::default()
        }),
        Err(e) => {
            tracing::warn!("failed to read config at {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Load the merged config: system defaults, then user overrides.
/// If `override_path` is provided, use only that file instead.
pub fn load(override_path: Option<&Path>) -> Config {
    if let Some(path) = override_path {
        return load_from_path(path);
    }

    let merged = match (load_system(), load_user()) {
        (Some(s), Some(u)) => Some(merge_values(s, u)),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    };

    match merged {
        Some(value) => value.try_into().unwrap_or_else(|e| {
            tracing::warn!("failed to deserialize config: {}", e);
            Config::default()
        }),
        None => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.profiles.dir.is_none());
        assert!(config.profiles.create_missing);
        assert_eq!(config.tlp.status_command, vec!["tlp-stat", "-c"]);
        assert_eq!(config.apply.elevate, vec!["/usr/bin/pkexec"]);
        assert_eq!(config.apply.shell, PathBuf::from("/bin/bash"));
        assert!(!config.notifications.enabled);
    }

    #[test]
    fn test_resolved_dir() {
        let config = ProfilesConfig {
            dir: Some(PathBuf::from("/srv/profiles")),
            create_missing: false,
        };
        assert_eq!(config.resolved_dir(), PathBuf::from("/srv/profiles"));

        let default = ProfilesConfig::default().resolved_dir();
        assert!(default.ends_with(".tlp"));
    }

    #[test]
    fn test_merge_values_tables() {
        let base: toml::Value = toml::from_str(
            r#"
            [tlp]
            status_command = ["tlp-stat", "-c"]
            [apply]
            shell = "/bin/bash"
            script = "/usr/share/tlpswitch/tlp_update.sh"
        "#,
        )
        .unwrap();

        let overlay: toml::Value = toml::from_str(
            r#"
            [apply]
            script = "/home/me/bin/tlp_update.sh"
        "#,
        )
        .unwrap();

        let merged = merge_values(base, overlay);
        let table = merged.as_table().unwrap();

        let apply = table["apply"].as_table().unwrap();
        assert_eq!(apply["script"].as_str(), Some("/home/me/bin/tlp_update.sh"));
        assert_eq!(apply["shell"].as_str(), Some("/bin/bash"));
        assert!(table["tlp"].as_table().is_some());
    }

    #[test]
    fn test_merge_values_overlay_replaces_scalar() {
        let base: toml::Value = toml::from_str("value = 1").unwrap();
        let overlay: toml::Value = toml::from_str("value = 2").unwrap();
        let merged = merge_values(base, overlay);
        assert_eq!(merged["value"].as_integer(), Some(2));
    }

    #[test]
    fn test_deserialize_partial_config() {
        let config: Config = toml::from_str(
            r#"
            [profiles]
            dir = "/opt/tlp-profiles"
        "#,
        )
        .unwrap();
        assert_eq!(config.profiles.dir, Some(PathBuf::from("/opt/tlp-profiles")));
        assert!(config.profiles.create_missing);
        assert_eq!(config.tlp.status_command, vec!["tlp-stat", "-c"]);
    }

    #[test]
    fn test_deserialize_full_config() {
        let config: Config = toml::from_str(
            r#"
            [profiles]
            dir = "/opt/tlp-profiles"
            create_missing = false

            [tlp]
            status_command = ["sudo", "tlp-stat", "-c"]

            [apply]
            elevate = []
            shell = "/bin/sh"
            script = "/usr/local/bin/tlp_update.sh"

            [notifications]
            enabled = true
        "#,
        )
        .unwrap();
        assert!(!config.profiles.create_missing);
        assert_eq!(config.tlp.status_command.len(), 3);
        assert!(config.apply.elevate.is_empty());
        assert_eq!(config.apply.shell, PathBuf::from("/bin/sh"));
        assert!(config.notifications.enabled);
    }

    #[test]
    fn test_load_from_nonexistent_path() {
        let config = load_from_path(Path::new("/nonexistent/config.toml"));
        assert!(config.profiles.create_missing);
    }

    #[test]
    fn test_load_from_path_invalid_toml() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[profiles\ndir = 3").unwrap();
        let config = load(Some(path.as_path()));
        assert!(config.profiles.dir.is_none());
    }

    #[test]
    fn test_load_override_path() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.toml");
        std::fs::write(&path, "[notifications]\nenabled = true\n").unwrap();
        let config = load(Some(path.as_path()));
        assert!(config.notifications.enabled);
    }
}
