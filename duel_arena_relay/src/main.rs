// CLI entry point for the Duel Arena relay.
//
// Usage:
//   relay [OPTIONS]
//     --port <PORT>       Listen port (default: 3000)
//     --bind <ADDR>       Bind address (default: 127.0.0.1)
//     --config <PATH>     Battle config JSON (default: two stock dragons)
//
// Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;

use duel_arena_battle::BattleConfig;
use duel_arena_relay::server::{RelayConfig, start_relay};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = parse_args();

    let (handle, addr) = match start_relay(config) {
        Ok(result) => result,
        Err(e) => {
            tracing::error!(error = %e, "failed to start relay");
            std::process::exit(1);
        }
    };

    println!("Relay listening on {addr}");
    println!("Press Ctrl+C to stop.");

    // The relay thread runs until the process is killed.
    handle.wait();
}

/// Parse command-line arguments into a `RelayConfig`. Uses simple
/// `std::env::args()` matching — no clap dependency.
fn parse_args() -> RelayConfig {
    let mut config = RelayConfig::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--port" => {
                i += 1;
                config.port = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--port requires a valid port number");
                    std::process::exit(1);
                });
            }
            "--bind" => {
                i += 1;
                config.bind_addr = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--bind requires an address");
                    std::process::exit(1);
                });
            }
            "--config" => {
                i += 1;
                let Some(path) = args.get(i).map(PathBuf::from) else {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                };
                config.battle = BattleConfig::load(&path).unwrap_or_else(|e| {
                    eprintln!("Failed to load {}: {e}", path.display());
                    std::process::exit(1);
                });
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    config
}

fn print_usage() {
    println!("Usage: relay [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --port <PORT>       Listen port (default: 3000)");
    println!("  --bind <ADDR>       Bind address (default: 127.0.0.1)");
    println!("  --config <PATH>     Battle config JSON (default: two stock dragons)");
    println!("  --help, -h          Show this help");
}
