//! ventdir CLI - directory API server and data jobs
//!
//! - `serve`: HTTP API and sitemaps
//! - `import`: SerpAPI Google Maps search to import CSVs
//! - `migrate-images` / `migrate-photos`: move listing images to Cloudflare Images
//! - `image-metadata`: tag Cloudflare images with their site
//! - `check`: database and Cloudflare connectivity
//! - `config`: inspect or create the config file

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

mod commands;
mod tracing_setup;
mod ui;

#[derive(Parser, Debug)]
#[command(
    name = "ventdir",
    author,
    version,
    about = "Directory API server and data import tooling",
    long_about = "Serve the directory API and sitemaps, import listings from SerpAPI, \
                  and migrate listing images to Cloudflare Images."
)]
struct Cli {
    /// Suppress progress spinners and bars
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Debug logging (RUST_LOG still wins when set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP
    #[cfg(feature = "telemetry")]
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Fetch listings from SerpAPI Google Maps and write import CSVs
    Import(ventdir_etl::ImportArgs),
    /// Upload Google-hosted listing images to Cloudflare Images
    MigrateImages(ventdir_etl::MigrateImagesArgs),
    /// Upload SerpAPI photo galleries to Cloudflare Images
    MigratePhotos(ventdir_etl::MigratePhotosArgs),
    /// Set the `site` metadata tag on Cloudflare images
    ImageMetadata(ventdir_etl::ImageMetadataArgs),
    /// Connectivity diagnostics
    Check(commands::check::CheckArgs),
    /// Inspect or create the config file
    Config(commands::config::ConfigArgs),
    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)] // PowerShell is a proper noun, not a suffix
enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let tracing_config = tracing_setup::TracingConfig {
        debug: cli.debug,
        #[cfg(feature = "telemetry")]
        otel: cli.otel,
        ..Default::default()
    };
    tracing_setup::init(&tracing_config).ok();
    ui::init_quiet_mode(cli.quiet);

    let result = run(cli.command).await;
    tracing_setup::shutdown_otel();
    result
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Import(args) => commands::run_import(args).await,
        Commands::MigrateImages(args) => commands::run_migrate_images(args).await,
        Commands::MigratePhotos(args) => commands::run_migrate_photos(args).await,
        Commands::ImageMetadata(args) => commands::run_image_metadata(args).await,
        Commands::Check(args) => commands::run_check(args).await,
        Commands::Config(args) => commands::run_config(args),
        Commands::Completions(args) => run_completions(args),
    }
}

fn run_completions(args: CompletionsArgs) -> Result<()> {
    use clap::CommandFactory;
    use clap_complete::{generate, Shell as CompletionShell};
    use std::io;

    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();

    let shell = match args.shell {
        Shell::Bash => CompletionShell::Bash,
        Shell::Zsh => CompletionShell::Zsh,
        Shell::Fish => CompletionShell::Fish,
        Shell::PowerShell => CompletionShell::PowerShell,
        Shell::Elvish => CompletionShell::Elvish,
    };

    generate(shell, &mut cmd, bin_name, &mut io::stdout());

    Ok(())
}
