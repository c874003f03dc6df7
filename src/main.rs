//! Superface CLI entry point
//!
//! Parses arguments, sets up logging, runs the selected command and exits
//! with the code it reports:
//! - `install` - Install profiles and providers into super.json
//! - `check` - Check installed profiles, maps and providers for compatibility

use clap::Parser;
use superface_cli::cli::Cli;
use superface_cli::core::user_friendly_error;
use tracing_subscriber::EnvFilter;

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    let config = cli.build_config();
    init_logging(&config.log_level);

    // SAFETY: no other thread exists yet; the runtime is started below.
    unsafe { config.apply_to_env() };

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            user_friendly_error(e.into()).display();
            std::process::exit(1);
        }
    };

    let code = match runtime.block_on(cli.execute()) {
        Ok(code) => code,
        Err(e) => {
            // Convert to user-friendly error with context and suggestions
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            error_ctx.exit_code()
        }
    };

    drop(runtime);
    std::process::exit(code);
}
