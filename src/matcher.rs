//! Profile matching.
//!
//! Both the live `tlp-stat -c` output and a stored profile file are reduced
//! to a sorted list of `KEY=VALUE` settings before comparison. Everything the
//! status tool adds for presentation (section headers, `defaults.conf`
//! entries, `LNNNN: ` parameter tags, quoting) is dropped so that a profile
//! written by hand compares equal to the configuration TLP reports.

use serde::Serialize;
use std::fmt;

/// Classification of a single raw configuration line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A `KEY=VALUE` assignment, possibly tagged and quoted.
    Setting,
    /// `# ...`
    Comment,
    /// A value TLP reports as coming from its built-in `defaults.conf`.
    DefaultMarker,
    /// A line starting with `-` or `+` (status headers and diff markers).
    DiffMarker,
    /// Empty or whitespace only.
    Blank,
}

impl LineKind {
    pub fn classify(line: &str) -> Self {
        if line.starts_with("defaults.conf") {
            LineKind::DefaultMarker
        } else if line.starts_with('-') || line.starts_with('+') {
            LineKind::DiffMarker
        } else if line.trim().is_empty() {
            LineKind::Blank
        } else if line.starts_with('#') {
            LineKind::Comment
        } else {
            LineKind::Setting
        }
    }
}

/// A setting line with tag, quotes and surrounding whitespace removed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NormalizedSetting(String);

impl NormalizedSetting {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered raw lines of either the live configuration or a profile file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    lines: Vec<String>,
}

impl ConfigSnapshot {
    /// Split text into lines. Trailing `\r` is dropped with the newline.
    pub fn from_text(text: &str) -> Self {
        text.lines().collect()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ConfigSnapshot {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Remove a `tlp-stat` parameter tag such as `/etc/tlp.conf L0023: `.
///
/// Everything up to and including the last `L` + four digits + `: ` is cut.
/// Lines without a tag are returned unchanged.
pub fn strip_parameter_tag(line: &str) -> &str {
    let bytes = line.as_bytes();
    let mut cut = None;
    for (start, _) in line.match_indices('L') {
        let tag = &bytes[start..];
        if tag.len() >= 7 && tag[1..5].iter().all(u8::is_ascii_digit) && &tag[5..7] == b": " {
            cut = Some(start + 7);
        }
    }
    match cut {
        Some(end) => &line[end..],
        None => line,
    }
}

/// Normalize one raw line. Returns `None` for lines that never take part
/// in a comparison.
pub fn normalize_line(line: &str) -> Option<NormalizedSetting> {
    if LineKind::classify(line) != LineKind::Setting {
        return None;
    }
    let untagged = strip_parameter_tag(line);
    let unquoted = untagged.replace('"', "");
    Some(NormalizedSetting(unquoted.trim().to_string()))
}

/// Reduce a snapshot to its sorted settings. Duplicates are kept.
pub fn normalize(snapshot: &ConfigSnapshot) -> Vec<NormalizedSetting> {
    let mut settings: Vec<NormalizedSetting> = snapshot
        .lines()
        .iter()
        .filter_map(|line| normalize_line(line))
        .collect();
    settings.sort();
    settings
}

/// True when `profile` holds exactly the settings of `live`.
pub fn matches(live: &ConfigSnapshot, profile: &ConfigSnapshot) -> bool {
    let live = normalize(live);
    let profile = normalize(profile);

    if live.len() != profile.len() {
        return false;
    }

    live.iter().zip(&profile).all(|(a, b)| a == b)
}

/// Settings present on one side but not the other.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SettingsDiff {
    pub only_live: Vec<NormalizedSetting>,
    pub only_profile: Vec<NormalizedSetting>,
}

impl SettingsDiff {
    pub fn is_empty(&self) -> bool {
        self.only_live.is_empty() && self.only_profile.is_empty()
    }
}

/// Multiset difference of the normalized live configuration and a profile.
pub fn diff(live: &ConfigSnapshot, profile: &ConfigSnapshot) -> SettingsDiff {
    let live = normalize(live);
    let profile = normalize(profile);

    let mut result = SettingsDiff::default();
    let (mut i, mut j) = (0, 0);
    while i < live.len() && j < profile.len() {
        match live[i].cmp(&profile[j]) {
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => {
                result.only_live.push(live[i].clone());
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                result.only_profile.push(profile[j].clone());
                j += 1;
            }
        }
    }
    result.only_live.extend_from_slice(&live[i..]);
    result.only_profile.extend_from_slice(&profile[j..]);
    result
}
