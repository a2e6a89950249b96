//! CLI entry point for cosmic-press

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cosmic-press")]
#[command(version)]
#[command(about = "Static site builder for the Cosmic Insights blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    /// Defaults to `build` when omitted
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the static site
    #[command(alias = "b")]
    Build,

    /// Build, then serve the output with the JSON API
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// Remove the output directory
    Clean,

    /// List site information
    List {
        /// Type of content to list (article, tag)
        #[arg(default_value = "article")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "cosmic_press=debug,info"
    } else {
        "cosmic_press=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command.unwrap_or(Commands::Build) {
        Commands::Build => {
            let site = cosmic_press::Site::new(&base_dir)?;
            tracing::info!("Building site from {:?}", site.base_dir);
            site.build()?;
            println!(
                "Static site built successfully in {}",
                site.public_dir.display()
            );
        }

        Commands::Serve { port, ip } => {
            let site = cosmic_press::Site::new(&base_dir)?;

            // Build first
            tracing::info!("Building site from {:?}", site.base_dir);
            site.build()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            cosmic_press::server::start(&site, &ip, port).await?;
        }

        Commands::Clean => {
            let site = cosmic_press::Site::new(&base_dir)?;
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            let site = cosmic_press::Site::new(&base_dir)?;
            cosmic_press::commands::list::run(&site, &r#type)?;
        }

        Commands::Version => {
            println!("cosmic-press version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
