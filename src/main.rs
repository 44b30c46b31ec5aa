//! CLI entry point for newsdesk

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use newsdesk::Newsdesk;

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(version)]
#[command(about = "News pages rendered from the Sanity content API", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Pre-render the news pages
    #[command(alias = "g")]
    Generate,

    /// Serve the news pages and the studio
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,
    },

    /// Clean the public folder
    Clean,

    /// List site information
    List {
        /// Type of content to list (post, category, route)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            init_logging(cli.debug, None);
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            newsdesk::commands::init::init_site(&target_dir)?;
            println!("Initialized site in {:?}", target_dir);
        }

        Commands::Version => {
            println!("newsdesk version {}", env!("CARGO_PKG_VERSION"));
        }

        command => {
            let desk = Newsdesk::new(&base_dir)?;
            init_logging(cli.debug, desk.config.log_filter.as_deref());
            run(&desk, command).await?;
        }
    }

    Ok(())
}

/// Commands that operate on an existing site
async fn run(desk: &Newsdesk, command: Commands) -> Result<()> {
    match command {
        Commands::Generate => {
            tracing::info!("Generating static files...");
            desk.generate().await?;
            println!("Generated successfully!");
        }

        Commands::Server { port, ip, open } => {
            tracing::info!("Starting server at http://{}:{}", ip, port);
            newsdesk::server::start(desk, &ip, port, open).await?;
        }

        Commands::Clean => {
            tracing::info!("Cleaning public folder...");
            desk.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List { r#type } => {
            newsdesk::commands::list::run(desk, &r#type).await?;
        }

        Commands::Init { .. } | Commands::Version => {}
    }

    Ok(())
}

/// Initialize logging; `RUST_LOG` wins over the configured filter
fn init_logging(debug: bool, extra: Option<&str>) {
    let mut directives = if debug {
        "newsdesk=debug,info".to_string()
    } else {
        "newsdesk=info".to_string()
    };
    if let Some(extra) = extra.filter(|e| !e.trim().is_empty()) {
        directives.push(',');
        directives.push_str(extra.trim());
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
