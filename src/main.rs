//! llamastrap CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use llamastrap::cli::{Cli, CommandDispatcher};
use llamastrap::detection::OsRelease;
use llamastrap::shell::{is_ci, SystemRunner};
use llamastrap::ui::{create_ui, OutputMode};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for logging.
///
/// Log level is controlled by:
/// 1. `--debug` flag sets level to DEBUG
/// 2. `RUST_LOG` environment variable (if set)
/// 3. Default is INFO
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("llamastrap=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("llamastrap=info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    tracing::debug!("llamastrap starting with args: {:?}", cli);
    match OsRelease::load() {
        Some(os) => tracing::debug!("Host: {}", os.describe()),
        None => tracing::debug!("No /etc/os-release, host OS unknown"),
    }

    let output_mode = OutputMode::from_flags(cli.verbose, cli.quiet);

    if cli.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    let mut ui = create_ui(!is_ci(), output_mode);
    let dispatcher = CommandDispatcher::new(Box::new(SystemRunner::new()));

    match dispatcher.dispatch(&cli, ui.as_mut()) {
        Ok(result) => ExitCode::from(result.exit_code as u8),
        Err(e) => {
            ui.error(&format!("Error: {}", e));
            if let Some(hint) = e.hint() {
                ui.show_hint(&hint);
            }
            ExitCode::from(1)
        }
    }
}
