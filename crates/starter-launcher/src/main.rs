// Entry point for the `sim-starter` command-line front end.

use clap::Parser;
use starter_common::constants;
use starter_common::host_context::HostContext;
use std::sync::Arc;

use starter_launcher::command_settings::CommandSettings;
use starter_launcher::launcher::Launcher;

fn main() {
    let settings = CommandSettings::parse();

    // Build the async runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build Tokio runtime");

    let exit_code = runtime.block_on(async move { run(settings).await });

    std::process::exit(exit_code);
}

async fn run(settings: CommandSettings) -> i32 {
    // Diagnostics go to stderr so they never mix with command output.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Sim Starter starting.");
    tracing::info!(
        "  Version = {}",
        starter_sdk::build_constants::StarterPackage::VERSION
    );
    tracing::info!(
        "  Commit  = {}",
        starter_sdk::build_constants::Source::COMMIT_HASH
    );
    tracing::info!(
        "  Platform = {} / {}",
        constants::CURRENT_PLATFORM,
        constants::CURRENT_ARCHITECTURE
    );

    let host_context = HostContext::new("Launcher");
    let launcher = Launcher::new(Arc::clone(&host_context));
    let print = |line: &str| println!("{line}");

    match launcher.execute_command(&settings, &print).await {
        Ok(exit_code) => {
            tracing::info!("Sim Starter exiting with code {}", exit_code);
            exit_code
        }
        Err(e) => {
            tracing::error!("Sim Starter failed with error: {:?}", e);
            eprintln!("Error: {e:#}");
            constants::return_code::TERMINATED_ERROR
        }
    }
}
