#![cfg_attr(all(target_os = "windows", not(debug_assertions)), windows_subsystem = "windows")]

use edge_deflector_core::config::default_provider;
use edge_deflector_core::launcher::ShellLauncher;
use edge_deflector_core::{logging, runtime};

fn main() {
    if let Some(filter) = logging::filter_from_env() {
        if let Err(error) = logging::init(&filter) {
            eprintln!("[edge-deflector] logging disabled: {error}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = runtime::parse_cli_args(&args);
    let provider = default_provider();

    match runtime::run_with(invocation, provider.as_ref(), &ShellLauncher) {
        Ok(outcome) => std::process::exit(outcome.exit_code()),
        Err(error) => {
            tracing::error!(%error, "launch failed");
            eprintln!("[edge-deflector] {error}");
            std::process::exit(2);
        }
    }
}
