use std::env;
use std::process;

use log::{error, info};
use scss_code_native::logging;
use scss_code_native::scss::server::start_scss_language_server;

/// Name to show in usage text; argv may be empty
fn program_name(args: &[String]) -> &str {
    args.first().map_or("scss_code_native", String::as_str)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().skip(1).any(|arg| arg == "--help" || arg == "-h") {
        // Use eprintln for usage info since stdout belongs to the LSP transport
        eprintln!(
            "Usage: {} [--stdio]",
            program_name(&args)
        );
        eprintln!("  Starts the SCSS Language Server on stdin/stdout.");
        eprintln!("  Set SCSS_CODE_LOG=debug for verbose logs.");
        process::exit(0);
    }

    if let Err(e) = logging::init_logger() {
        eprintln!("Failed to initialize logger: {}", e);
        process::exit(1);
    }

    info!("SCSS Code Native starting");
    info!("Command line arguments: {:?}", args);

    if let Err(e) = start_scss_language_server().await {
        error!("SCSS Language Server error: {:?}", e);
        process::exit(1);
    }

    info!("SCSS Code Native shutting down");
}
