//! Best-effort operator notifications.
//!
//! [`DesktopNotifier`] sends every message through two independent channels:
//!
//! 1. Terminal escape sequences on stdout (OSC 9, then kitty's OSC 99)
//! 2. The OS notification centre through an external helper
//!    (`osascript` on macOS, `notify-send` elsewhere)
//!
//! A failure in one channel never affects the other, and nothing is ever
//! reported back to the caller.

use std::io::Write;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::{Duration, timeout};
use tracing::debug;

/// Upper bound on how long the OS helper may take.
pub const NATIVE_NOTIFY_TIMEOUT_SECS: u64 = 5;

/// Sink for human-readable alerts.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver an alert. Never fails from the caller's point of view.
    async fn notify(&self, title: &str, body: &str);
}

/// Notifier writing to the terminal and the desktop.
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    terminal: bool,
    native: bool,
    native_timeout: Duration,
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self {
            terminal: true,
            native: true,
            native_timeout: Duration::from_secs(NATIVE_NOTIFY_TIMEOUT_SECS),
        }
    }
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the terminal escape-sequence channel.
    pub fn with_terminal(mut self, enabled: bool) -> Self {
        self.terminal = enabled;
        self
    }

    /// Enable or disable the OS notification channel.
    pub fn with_native(mut self, enabled: bool) -> Self {
        self.native = enabled;
        self
    }

    fn send_terminal(&self, title: &str, body: &str) -> std::io::Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(terminal_sequence(title, body).as_bytes())?;
        stdout.flush()
    }

    async fn send_native(&self, title: &str, body: &str) -> std::io::Result<()> {
        let (program, args) = native_command(title, body);
        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .output();

        match timeout(self.native_timeout, child).await {
            Ok(result) => result.map(|_| ()),
            Err(_) => Err(std::io::Error::new(
                std::io::ErrorKind::TimedOut,
                format!("{} did not finish in {:?}", program, self.native_timeout),
            )),
        }
    }
}

#[async_trait]
impl Notifier for DesktopNotifier {
    async fn notify(&self, title: &str, body: &str) {
        if self.terminal
            && let Err(e) = self.send_terminal(title, body)
        {
            debug!(error = %e, "terminal notification failed");
        }

        if self.native
            && let Err(e) = self.send_native(title, body).await
        {
            debug!(error = %e, "native notification failed");
        }
    }
}

/// Strip control characters that would terminate an escape sequence early.
fn sanitize(text: &str) -> String {
    text.chars().filter(|c| !c.is_control()).collect()
}

/// OSC 9 (`title: body`) followed by kitty's OSC 99 (`body`).
pub fn terminal_sequence(title: &str, body: &str) -> String {
    let title = sanitize(title);
    let body = sanitize(body);
    format!("\x1b]9;{title}: {body}\x07\x1b]99;i=1:d=0;{body}\x1b\\")
}

/// Quote a string for an AppleScript string literal.
fn applescript_quote(text: &str) -> String {
    format!("\"{}\"", text.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Program and arguments for the platform's notification helper.
pub fn native_command(title: &str, body: &str) -> (&'static str, Vec<String>) {
    if cfg!(target_os = "macos") {
        let script = format!(
            "display notification {} with title {}",
            applescript_quote(body),
            applescript_quote(title)
        );
        ("osascript", vec!["-e".to_string(), script])
    } else {
        (
            "notify-send",
            vec![
                "--app-name".to_string(),
                "pdack".to_string(),
                title.to_string(),
                body.to_string(),
            ],
        )
    }
}
