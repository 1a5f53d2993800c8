mod commands;
mod server;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agentsite")]
#[command(version, about = "Sitemap, SEO checklist and API relays for an agents marketplace site", long_about = None)]
struct Cli {
    /// Path to site.toml
    #[arg(short, long, global = true, default_value = "site.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Write a starter site.toml
    Init {
        /// Directory to create site.toml in
        path: PathBuf,

        /// Public origin of the site
        #[arg(long)]
        origin: Option<String>,

        /// Display name of the site
        #[arg(long)]
        name: Option<String>,
    },

    /// Validate site configuration
    Validate,

    /// Serve sitemap, robots.txt and the API relays
    Serve {
        /// Port to serve on
        #[arg(short, long, default_value = "8787")]
        port: u16,
    },

    /// Generate sitemap.xml
    Sitemap {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run the SEO checklist against a live site
    SeoCheck {
        /// Origin to check (defaults to site.origin)
        url: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the table of contents of a markdown article
    Toc {
        /// Markdown file
        file: PathBuf,

        /// Print the rendered article with heading anchors instead
        #[arg(long)]
        html: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Command::Init { path, origin, name } => {
            commands::init::run(path, origin.as_deref(), name.as_deref())
        }
        Command::Validate => commands::validate::run(&cli.config),
        Command::Serve { port } => commands::serve::run(&cli.config, port).await,
        Command::Sitemap { output } => commands::sitemap::run(&cli.config, output).await,
        Command::SeoCheck { url, json } => {
            commands::seo_check::run(&cli.config, url.as_deref(), json).await
        }
        Command::Toc { file, html } => commands::toc::run(&file, html),
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "agentsite", &mut io::stdout());
            Ok(())
        }
    }
}

/// Logs go to stderr so generated documents on stdout stay clean
fn init_tracing() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("AGENTSITE_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
