use crate::matcher::SettingsDiff;
use crate::status::ProfileReport;
use colored::Colorize;

const ACTIVE_MARK: &str = "●";

pub fn print_profiles(report: &ProfileReport) {
    let dir = report.profile_dir.display().to_string();

    if report.profiles.is_empty() {
        println!("  {} No profiles in {}", "Note:".yellow(), dir);
        return;
    }

    let title = "TLP Profile";
    let inner_w = report
        .profiles
        .iter()
        .map(|p| p.name.chars().count() + 4)
        .chain([dir.chars().count(), title.len() + 2])
        .max()
        .unwrap_or(40);

    let fill = inner_w.saturating_sub(1 + title.len());
    println!("╭─ {} {}╮", title.bold(), "─".repeat(fill));
    println!(
        "│ {}{} │",
        dir.dimmed(),
        " ".repeat(inner_w.saturating_sub(dir.chars().count()))
    );
    println!("├{}┤", "─".repeat(inner_w + 2));

    for entry in &report.profiles {
        let pad = " ".repeat(inner_w.saturating_sub(entry.name.chars().count() + 2));
        if entry.active {
            println!("│ {} {}{} │", ACTIVE_MARK.green(), entry.name.green().bold(), pad);
        } else {
            println!("│   {}{} │", entry.name, pad);
        }
    }

    println!("╰{}╯", "─".repeat(inner_w + 2));

    if let Some(err) = &report.live_status_error {
        println!(
            "  {} could not read live TLP configuration: {}",
            "Warning:".yellow(),
            err
        );
    }
}

pub fn print_active(report: &ProfileReport) {
    if report.profiles.is_empty() {
        println!(
            "  {} No profiles in {}",
            "Note:".yellow(),
            report.profile_dir.display()
        );
        return;
    }

    match (&report.active, &report.live_status_error) {
        (Some(name), _) => println!("  {} {}", "Active profile:".bold(), name.green()),
        (None, Some(err)) => println!(
            "  {} could not read live TLP configuration: {}",
            "Warning:".yellow(),
            err
        ),
        (None, None) => println!(
            "  {} The live TLP configuration matches none of the {} profiles.",
            "Note:".yellow(),
            report.profiles.len()
        ),
    }
}

pub fn print_diff(name: &str, diff: &SettingsDiff) {
    if diff.is_empty() {
        println!("  {} matches the live configuration.", name.green().bold());
        return;
    }

    let title = format!("Differences ({})", name);
    let divider_w: usize = 64;
    let fill = divider_w.saturating_sub(2 + title.chars().count());
    println!("── {} {}", title.bold(), "─".repeat(fill));

    for setting in &diff.only_live {
        println!("  {} {}", "live   ".red().bold(), setting);
    }
    for setting in &diff.only_profile {
        println!("  {} {}", "profile".green().bold(), setting);
    }

    println!("{}", "─".repeat(divider_w));
    println!(
        "  {} only live, {} only in profile",
        diff.only_live.len(),
        diff.only_profile.len()
    );
}

pub fn print_json<T: serde::Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
