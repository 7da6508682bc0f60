use clap::Parser;
use form_autofill::cli::commands::{cmd_fill, cmd_scan};
use form_autofill::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // Resolve shared settings: CLI > config file > defaults
    let endpoint = cli
        .endpoint
        .as_deref()
        .unwrap_or(&config.backend.endpoint);
    let bridge_script = cli
        .bridge_script
        .as_deref()
        .unwrap_or(&config.bridge.script);

    match cli.command {
        Commands::Fill {
            url,
            mode,
            max_events,
            trace,
        } => {
            let mode_name = if mode == "auto" { &config.observe.mode } else { &mode };
            let clean = cmd_fill(
                &url,
                mode_name,
                max_events,
                trace.as_deref(),
                cli.verbose,
                endpoint,
                config.backend.timeout_ms,
                config.backend.max_retries,
                config.observe.grace_period_ms,
                bridge_script,
            )?;
            if !clean {
                std::process::exit(1);
            }
        }
        Commands::Scan {
            url,
            mode,
            max_events,
        } => {
            let mode_name = if mode == "auto" { &config.observe.mode } else { &mode };
            cmd_scan(
                &url,
                mode_name,
                max_events,
                cli.verbose,
                config.observe.grace_period_ms,
                bridge_script,
            )?;
        }
    }

    Ok(())
}
