use anyhow::Result;

/// Send a desktop notification through `notify-send`.
/// A missing binary or a session without a notification daemon is not an error.
pub fn send(title: &str, body: &str) -> Result<()> {
    let status = std::process::Command::new("notify-send")
        .args(["--app-name=tlpswitch", "--icon=applications-science-symbolic", title, body])
        .status();

    match status {
        Ok(s) if !s.success() => tracing::debug!("notify-send exited with {}", s),
        Err(e) => tracing::debug!("notify-send unavailable: {}", e),
        Ok(_) => {}
    }

    Ok(())
}
