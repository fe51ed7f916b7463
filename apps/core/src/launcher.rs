use thiserror::Error;

use crate::classify::{is_uri, is_web_uri};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("shell execute failed for '{uri}' (code={code})")]
    ShellExecute { uri: String, code: isize },
    #[error("failed to spawn default handler: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Hands a URI to whatever the OS associates with its scheme.
pub trait Launcher {
    fn launch(&self, uri: &str) -> Result<(), LaunchError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    Launched,
    Rejected,
}

/// Launches `uri` only if it parses and carries an http(s) prefix. A rejected
/// URI never reaches the launcher.
pub fn open_uri(uri: &str, launcher: &dyn Launcher) -> Result<GateOutcome, LaunchError> {
    if !is_uri(uri) || !is_web_uri(uri) {
        tracing::info!(uri, "rejecting non-web uri");
        return Ok(GateOutcome::Rejected);
    }

    launcher.launch(uri)?;
    tracing::info!(uri, "launch requested");
    Ok(GateOutcome::Launched)
}

/// Shell-execute semantics: the registered protocol handler is started and not
/// waited on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellLauncher;

impl Launcher for ShellLauncher {
    #[cfg(target_os = "windows")]
    fn launch(&self, uri: &str) -> Result<(), LaunchError> {
        use windows_sys::Win32::UI::Shell::ShellExecuteW;
        use windows_sys::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;

        let operation = to_wide("open");
        let target_wide = to_wide(uri);
        let result = unsafe {
            ShellExecuteW(
                std::ptr::null_mut(),
                operation.as_ptr(),
                target_wide.as_ptr(),
                std::ptr::null(),
                std::ptr::null(),
                SW_SHOWNORMAL,
            )
        } as isize;

        // Values above 32 signal success.
        if result <= 32 {
            return Err(LaunchError::ShellExecute {
                uri: uri.to_string(),
                code: result,
            });
        }
        Ok(())
    }

    #[cfg(not(target_os = "windows"))]
    fn launch(&self, uri: &str) -> Result<(), LaunchError> {
        open::that_detached(uri)?;
        Ok(())
    }
}

#[cfg(target_os = "windows")]
fn to_wide(value: &str) -> Vec<u16> {
    value.encode_utf16().chain(std::iter::once(0)).collect()
}

