use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tlpswitch::cli::{Cli, Command};
use tlpswitch::config::Config;
use tlpswitch::host::SystemHost;

fn main() -> Result<()> {
    let cli = Cli::parse();
    tlpswitch::logging::init(cli.verbose);

    let mut config = tlpswitch::config::load(cli.config.as_deref());
    if let Some(dir) = cli.profile_dir {
        config.profiles.dir = Some(dir);
    }

    match cli.command {
        Command::List => cmd_list(&config, cli.json)?,
        Command::Status => cmd_status(&config, cli.json)?,
        Command::Apply { name } => cmd_apply(&config, &name, cli.json)?,
        Command::Diff { name } => cmd_diff(&config, &name, cli.json)?,
        Command::Completions { shell } => tlpswitch::cli::print_completions(shell),
    }

    Ok(())
}

fn cmd_list(config: &Config, json: bool) -> Result<()> {
    let host = SystemHost::from_config(config);
    let report = tlpswitch::status::report(&host, host.profile_dir())?;

    if json {
        tlpswitch::output::print_json(&report)?;
    } else {
        tlpswitch::output::print_profiles(&report);
    }
    Ok(())
}

fn cmd_status(config: &Config, json: bool) -> Result<()> {
    let host = SystemHost::from_config(config);
    let report = tlpswitch::status::report(&host, host.profile_dir())?;

    if json {
        tlpswitch::output::print_json(&serde_json::json!({
            "timestamp": report.timestamp,
            "profile_dir": report.profile_dir,
            "active": report.active,
            "live_status_error": report.live_status_error,
        }))?;
    } else {
        tlpswitch::output::print_active(&report);
    }
    Ok(())
}

fn cmd_apply(config: &Config, name: &str, json: bool) -> Result<()> {
    let mut host = SystemHost::from_config(config);
    let profile = tlpswitch::apply::apply(&mut host, name)?;

    // The helper restarts TLP synchronously, so the new state is readable now.
    let report = tlpswitch::status::report(&host, host.profile_dir())?;
    let confirmed = report.active.as_deref() == Some(profile.name.as_str());
    if !confirmed {
        tracing::warn!(
            "{} applied but the live configuration does not match it",
            profile.name
        );
    }

    if config.notifications.enabled {
        tlpswitch::notify::send("TLP profile applied", &profile.name)?;
    }

    if json {
        tlpswitch::output::print_json(&serde_json::json!({
            "applied": profile.name,
            "path": profile.path,
            "confirmed": confirmed,
        }))?;
        return Ok(());
    }

    println!("  {} {}", "Applied profile:".bold(), profile.name.green());
    if !confirmed {
        println!(
            "  {} The live TLP configuration does not match it yet. Run {} to compare.",
            "Note:".yellow(),
            format!("tlpswitch diff {}", profile.name).cyan()
        );
    }
    Ok(())
}

fn cmd_diff(config: &Config, name: &str, json: bool) -> Result<()> {
    let host = SystemHost::from_config(config);
    let diff = tlpswitch::apply::diff(&host, name)?;

    if json {
        tlpswitch::output::print_json(&diff)?;
    } else {
        tlpswitch::output::print_diff(name, &diff);
    }
    Ok(())
}
