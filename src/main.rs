use clap::Parser;
use probekit::{cli, config, errors};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // Initialize logging
    let log_level = match (cli.quiet, cli.verbose) {
        (true, 0) => "warn",
        (_, 0) => "info",
        (_, 1) => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(!cli.no_color)
        .with_writer(std::io::stderr)
        .init();

    if cli.no_color {
        console::set_colors_enabled(false);
    }

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        git_hash = option_env!("GIT_HASH").unwrap_or("unknown"),
        built = option_env!("BUILD_TIMESTAMP").unwrap_or("unknown"),
        "probekit starting"
    );

    let global = cli::GlobalOptions {
        config: cli.config.as_ref().map(std::path::PathBuf::from),
        quiet: cli.quiet,
    };

    let result = match cli.command {
        cli::Commands::Brute(args) => cli::brute::handle_brute(args, &global).await,
        cli::Commands::Dirs(args) => cli::dirs::handle_dirs(args, &global).await,
        cli::Commands::Params(args) => cli::params::handle_params(args, &global).await,
        cli::Commands::Inject(args) => cli::inject::handle_inject(args, &global).await,
        cli::Commands::Validate(args) => handle_validate(args).await,
    };

    match result {
        Ok(()) => {}
        Err(e) => {
            eprintln!("Error: {}", e);
            let exit_code = match &e {
                errors::ProbeKitError::Config(_) => 2,
                errors::ProbeKitError::InvalidTarget(_) => 5,
                _ => 1,
            };
            std::process::exit(exit_code);
        }
    }
}

async fn handle_validate(args: cli::commands::ValidateArgs) -> Result<(), errors::ProbeKitError> {
    let path = std::path::PathBuf::from(&args.path);
    let _config = config::parse_config(&path).await?;
    println!("Configuration is valid: {}", args.path);
    Ok(())
}
