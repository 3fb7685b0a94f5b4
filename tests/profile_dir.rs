use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use tlpswitch::config::Config;
use tlpswitch::error::Error;
use tlpswitch::host::{Host, SystemHost};

const AC_PROFILE: &str = "\
# Plugged in
TLP_ENABLE=1
CPU_SCALING_GOVERNOR_ON_AC=\"performance\"
CPU_BOOST_ON_AC=1
";

const BATTERY_PROFILE: &str = "\
# Unplugged
TLP_ENABLE=1
CPU_SCALING_GOVERNOR_ON_AC=\"powersave\"
CPU_BOOST_ON_AC=0
";

/// Profiles plus a fake `tlp-stat -c` (a text file read by `cat`) and a fake
/// update script that rewrites that file in `tlp-stat` format.
struct Fixture {
    _tmp: TempDir,
    profile_dir: PathBuf,
    status_file: PathBuf,
    config: Config,
}

fn tlp_stat_output(profile: &str) -> String {
    let mut out = String::from("--- TLP 1.6.1 --------------------------------------------\n\n");
    out.push_str("+++ Configured Settings:\n");
    out.push_str("defaults.conf L0004: TLP_DEFAULT_MODE=\"AC\"\n");
    for (i, line) in profile.lines().filter(|l| !l.starts_with('#')).enumerate() {
        out.push_str(&format!("/etc/tlp.conf L{:04}: {}\n", i + 20, line));
    }
    out
}

fn create_fixture(live: &str) -> Fixture {
    let tmp = TempDir::new().unwrap();
    let profile_dir = tmp.path().join(".tlp");
    fs::create_dir_all(&profile_dir).unwrap();
    fs::write(profile_dir.join("ac"), AC_PROFILE).unwrap();
    fs::write(profile_dir.join("battery"), BATTERY_PROFILE).unwrap();

    let status_file = tmp.path().join("tlp-stat.txt");
    fs::write(&status_file, tlp_stat_output(live)).unwrap();

    let script = tmp.path().join("tlp_update.sh");
    fs::write(
        &script,
        format!(
            "{{ echo '+++ Configured Settings:'; grep -v '^#' \"$1\" | sed 's|^|/etc/tlp.conf L0001: |'; }} > '{}'\n",
            status_file.display()
        ),
    )
    .unwrap();

    let mut config = Config::default();
    config.profiles.dir = Some(profile_dir.clone());
    config.tlp.status_command = vec!["cat".to_string(), status_file.display().to_string()];
    config.apply.elevate = Vec::new();
    config.apply.shell = PathBuf::from("/bin/sh");
    config.apply.script = script;

    Fixture {
        _tmp: tmp,
        profile_dir,
        status_file,
        config,
    }
}

fn active(fx: &Fixture) -> Option<String> {
    let host = SystemHost::from_config(&fx.config);
    tlpswitch::status::report(&host, &fx.profile_dir)
        .unwrap()
        .active
}

#[test]
fn test_report_detects_active_profile() {
    let fx = create_fixture(AC_PROFILE);
    let host = SystemHost::from_config(&fx.config);

    let report = tlpswitch::status::report(&host, host.profile_dir()).unwrap();
    let names: Vec<&str> = report.profiles.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["ac", "battery"]);
    assert_eq!(report.active.as_deref(), Some("ac"));
    assert_eq!(report.profile_dir, fx.profile_dir);
}

#[test]
fn test_report_no_match() {
    let fx = create_fixture("TLP_ENABLE=0\n");
    assert_eq!(active(&fx), None);
}

#[test]
fn test_identical_profiles_first_wins() {
    let fx = create_fixture(AC_PROFILE);
    fs::write(fx.profile_dir.join("aa-copy"), AC_PROFILE).unwrap();
    assert_eq!(active(&fx).as_deref(), Some("aa-copy"));
}

#[test]
fn test_apply_switches_active_profile() {
    let fx = create_fixture(AC_PROFILE);
    assert_eq!(active(&fx).as_deref(), Some("ac"));

    let mut host = SystemHost::from_config(&fx.config);
    let profile = tlpswitch::apply::apply(&mut host, "battery").unwrap();
    assert_eq!(profile.path, fx.profile_dir.join("battery"));

    let status = fs::read_to_string(&fx.status_file).unwrap();
    assert!(status.contains("/etc/tlp.conf L0001: CPU_BOOST_ON_AC=0"));
    assert_eq!(active(&fx).as_deref(), Some("battery"));
    assert!(tlpswitch::apply::diff(&host, "battery").unwrap().is_empty());
}

#[test]
fn test_diff_lists_changed_settings() {
    let fx = create_fixture(AC_PROFILE);
    let host = SystemHost::from_config(&fx.config);

    let diff = tlpswitch::apply::diff(&host, "battery").unwrap();
    let live: Vec<&str> = diff.only_live.iter().map(|s| s.as_str()).collect();
    let stored: Vec<&str> = diff.only_profile.iter().map(|s| s.as_str()).collect();
    assert_eq!(
        live,
        vec!["CPU_BOOST_ON_AC=1", "CPU_SCALING_GOVERNOR_ON_AC=performance"]
    );
    assert_eq!(
        stored,
        vec!["CPU_BOOST_ON_AC=0", "CPU_SCALING_GOVERNOR_ON_AC=powersave"]
    );
}

#[test]
fn test_empty_profile_dir_is_created_and_reported() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join(".tlp");
    let mut config = Config::default();
    config.profiles.dir = Some(dir.clone());
    config.tlp.status_command = vec!["/nonexistent/tlp-stat".to_string()];

    let host = SystemHost::from_config(&config);
    let report = tlpswitch::status::report(&host, &dir).unwrap();
    assert!(report.profiles.is_empty());
    assert!(report.live_status_error.is_none());
    assert!(dir.is_dir());
}

#[test]
fn test_missing_status_command_reports_error() {
    let mut fx = create_fixture(AC_PROFILE);
    fx.config.tlp.status_command = vec!["/nonexistent/tlp-stat".to_string(), "-c".to_string()];

    let host = SystemHost::from_config(&fx.config);
    let report = tlpswitch::status::report(&host, &fx.profile_dir).unwrap();
    assert_eq!(report.profiles.len(), 2);
    assert!(report.active.is_none());
    assert!(report.live_status_error.is_some());
}

#[test]
fn test_apply_unknown_profile_runs_nothing() {
    let fx = create_fixture(AC_PROFILE);
    let before = fs::read_to_string(&fx.status_file).unwrap();

    let mut host = SystemHost::from_config(&fx.config);
    let err = tlpswitch::apply::apply(&mut host, "turbo").unwrap_err();
    assert!(matches!(err, Error::ProfileNotFound(_)));
    assert_eq!(fs::read_to_string(&fx.status_file).unwrap(), before);
}

#[test]
fn test_read_file_through_host() {
    let fx = create_fixture(AC_PROFILE);
    let host = SystemHost::from_config(&fx.config);
    let text = host.read_file(&fx.profile_dir.join("ac")).unwrap();
    assert_eq!(text, AC_PROFILE);
}
