//! rangelog main entrypoint.

use rangelog::run;
use tracing_subscriber::EnvFilter;

/// Environment variable controlling diagnostic output (`RANGELOG_LOG=debug`).
const LOG_ENV: &str = "RANGELOG_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
