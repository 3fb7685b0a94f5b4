use crate::config::Config;
use crate::error::{Error, Result};
use serde::Serialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// pkexec: the authentication dialog was dismissed.
const PKEXEC_DISMISSED: i32 = 126;
/// pkexec: the user is not authorized.
const PKEXEC_NOT_AUTHORIZED: i32 = 127;

/// A stored profile file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub name: String,
    pub path: PathBuf,
}

/// Everything tlpswitch needs from the outside world.
/// `SystemHost` talks to the real system; tests substitute their own.
pub trait Host {
    /// Profiles in listing order.
    fn list_profiles(&self) -> Result<Vec<Profile>>;
    fn read_file(&self, path: &Path) -> Result<String>;
    /// Raw output of the TLP status command.
    fn query_live_status(&self) -> Result<String>;
    /// Install `path` as the system TLP configuration.
    fn apply_profile(&mut self, path: &Path) -> Result<()>;
}

/// Host backed by the filesystem, `tlp-stat` and the privileged update script.
#[derive(Debug, Clone)]
pub struct SystemHost {
    profile_dir: PathBuf,
    create_missing: bool,
    status_command: Vec<String>,
    elevate: Vec<String>,
    shell: PathBuf,
    script: PathBuf,
}

impl SystemHost {
    pub fn from_config(config: &Config) -> Self {
        Self {
            profile_dir: config.profiles.resolved_dir(),
            create_missing: config.profiles.create_missing,
            status_command: config.tlp.status_command.clone(),
            elevate: config.apply.elevate.clone(),
            shell: config.apply.shell.clone(),
            script: config.apply.script.clone(),
        }
    }

    pub fn profile_dir(&self) -> &Path {
        &self.profile_dir
    }

    /// Full argv used to apply `path`. The elevation prefix is left out for root.
    fn apply_argv(&self, path: &Path, is_root: bool) -> Vec<OsString> {
        let mut argv: Vec<OsString> = Vec::new();
        if !is_root {
            argv.extend(self.elevate.iter().map(OsString::from));
        }
        argv.push(self.shell.clone().into_os_string());
        argv.push(self.script.clone().into_os_string());
        argv.push(path.as_os_str().to_owned());
        argv
    }
}

/// Render an argv for messages.
fn display_argv<S: AsRef<std::ffi::OsStr>>(argv: &[S]) -> String {
    argv.iter()
        .map(|a| a.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn command_for<S: AsRef<std::ffi::OsStr>>(argv: &[S]) -> Result<Command> {
    let (program, args) = argv.split_first().ok_or_else(|| Error::CommandSpawn {
        command: String::new(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command"),
    })?;
    let mut cmd = Command::new(program);
    cmd.args(args);
    Ok(cmd)
}

fn describe_status(status: &ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("exit code {}", code),
        None => "a signal".to_string(),
    }
}

/// Map the exit status of the apply command to a result.
fn check_apply_status(command: String, status: &ExitStatus, elevated: bool) -> Result<()> {
    if status.success() {
        return Ok(());
    }
    match status.code() {
        Some(PKEXEC_DISMISSED | PKEXEC_NOT_AUTHORIZED) if elevated => {
            Err(Error::AuthorizationDeclined { command })
        }
        _ => Err(Error::CommandFailed {
            command,
            status: describe_status(status),
        }),
    }
}

impl Host for SystemHost {
    fn list_profiles(&self) -> Result<Vec<Profile>> {
        let dir = &self.profile_dir;
        match std::fs::metadata(dir) {
            Ok(meta) if !meta.is_dir() => {
                return Err(Error::ProfileDir {
                    path: dir.clone(),
                    detail: "not a directory".to_string(),
                });
            }
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.create_missing {
                    std::fs::create_dir_all(dir).map_err(|e| Error::ProfileDir {
                        path: dir.clone(),
                        detail: format!("cannot create: {}", e),
                    })?;
                    tracing::info!("created profile directory {}", dir.display());
                } else {
                    tracing::debug!("profile directory {} does not exist", dir.display());
                }
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(Error::ProfileDir {
                    path: dir.clone(),
                    detail: e.to_string(),
                });
            }
        }

        let entries = std::fs::read_dir(dir).map_err(|e| Error::Read {
            path: dir.clone(),
            source: e,
        })?;

        let mut profiles = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Read {
                path: dir.clone(),
                source: e,
            })?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::debug!("skipping non UTF-8 entry {:?}", entry.file_name());
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let path = entry.path();
            // Follows symlinks, so linked profiles are listed too.
            if !path.is_file() {
                tracing::debug!("skipping {}: not a regular file", path.display());
                continue;
            }
            profiles.push(Profile { name, path });
        }
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    fn read_file(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn query_live_status(&self) -> Result<String> {
        let command = display_argv(&self.status_command);
        tracing::debug!("querying live configuration: {}", command);

        let output = command_for(&self.status_command)?
            .output()
            .map_err(|e| Error::CommandSpawn {
                command: command.clone(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(Error::CommandFailed {
                command,
                status: describe_status(&output.status),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    fn apply_profile(&mut self, path: &Path) -> Result<()> {
        let is_root = nix::unistd::geteuid().is_root();
        let argv = self.apply_argv(path, is_root);
        let elevated = !is_root && !self.elevate.is_empty();
        let command = display_argv(&argv);
        tracing::info!("applying profile: {}", command);

        let status = command_for(&argv)?
            .status()
            .map_err(|e| Error::CommandSpawn {
                command: command.clone(),
                source: e,
            })?;

        check_apply_status(command, &status, elevated)
    }
}
