//! Opening results with the operating system's default handler

use std::process::{Command, Stdio};

/// Actions [`SystemOpener`] knows how to run
pub const OPEN_ACTIONS: &[&str] = &["", "open", "open_file", "open_folder"];

/// Runs an item's action against its target and reports success
pub trait Opener {
    /// Returns `true` only when the action demonstrably succeeded
    fn run_action(&self, action: &str, target: &str) -> bool;
}

/// Opener backed by `open`, `start`, or `xdg-open`/`gio open`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl SystemOpener {
    /// Open a file or folder with the default application
    pub fn open_path(&self, path: &str) -> bool {
        if path.is_empty() {
            return false;
        }

        let candidates: Vec<Vec<&str>> = if cfg!(target_os = "windows") {
            vec![vec!["cmd", "/C", "start", "", path]]
        } else if cfg!(target_os = "macos") {
            vec![vec!["open", path]]
        } else {
            vec![vec!["xdg-open", path], vec!["gio", "open", path]]
        };

        candidates.iter().any(|argv| run_quietly(argv))
    }
}

impl Opener for SystemOpener {
    fn run_action(&self, action: &str, target: &str) -> bool {
        if OPEN_ACTIONS.contains(&action) {
            self.open_path(target)
        } else {
            tracing::warn!("Unsupported action '{}' for {}", action, target);
            false
        }
    }
}

/// Run a command and report whether it exited successfully
fn run_quietly(argv: &[&str]) -> bool {
    let Some((program, args)) = argv.split_first() else {
        return false;
    };
    match Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
    {
        Ok(status) => status.success(),
        Err(e) => {
            tracing::debug!("Could not run {}: {}", program, e);
            false
        }
    }
}
