//! Album CLI - command-line interface for the portfolio album proxy.
//!
//! This CLI provides an `album` command for serving the AI proxy, asking
//! questions about albums, captioning images and browsing the catalog.

mod client;
mod commands;
mod config;
mod render;

use std::path::PathBuf;

use album_core::gallery::MediaType;
use clap::{CommandFactory, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{CommandContext, albums, ask, caption, health, providers, search, serve, thumb};

/// Album CLI - ask the album from a terminal
#[derive(Parser, Debug)]
#[command(
    name = "album",
    author,
    version,
    about = "Album - portfolio gallery and AI proxy",
    long_about = "Serve the album AI proxy, ask questions about albums and caption their images.\nReads ~/.album/config.toml and ./.albumrc for defaults."
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    /// Server base URL (overrides ALBUM_API_BASE)
    #[arg(long, global = true)]
    api_base: Option<String>,

    /// Album catalog JSON file (defaults to the builtin albums)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the AI proxy server
    Serve {
        /// Interface to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PORT)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Ask a question about an album
    ///
    /// Routes the question to a topic, asks for clarification when it is too
    /// short to tell, and prints the rendered answer.
    Ask {
        /// The question
        #[arg(required = true)]
        question: Vec<String>,

        /// Album to use as context
        #[arg(long)]
        album: Option<String>,

        /// Pin the topic (AAVSS, Sri_Lanka_Dataset)
        #[arg(long)]
        topic: Option<String>,

        /// Print the answer as HTML
        #[arg(long)]
        html: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Caption an image, or every image of an album
    Caption {
        /// Image URL
        #[arg(required_unless_present = "album")]
        image_url: Option<String>,

        /// Caption all images of this album and store its AI tags
        #[arg(long, conflicts_with = "image_url")]
        album: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search albums by title, description and tags
    Search {
        /// Search term
        term: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List albums
    Albums {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Thumbnail URL for a media URL
    Thumb {
        /// Media URL
        url: String,

        /// Media type (image, video, youtube); guessed when omitted
        #[arg(long = "type", value_parser = parse_media_type)]
        media_type: Option<MediaType>,

        /// Thumbnail used when none can be derived
        #[arg(long, default_value = "")]
        fallback: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show configured providers and their order
    Providers {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that the server is up
    Health,
}

fn parse_media_type(value: &str) -> Result<MediaType, String> {
    match value.trim().to_lowercase().as_str() {
        "image" => Ok(MediaType::Image),
        "video" => Ok(MediaType::Video),
        "youtube" => Ok(MediaType::Youtube),
        other => Err(format!("unknown media type '{other}' (image, video, youtube)")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let cli_config = config::load_config();

    // Initialize tracing
    let level = match args.log_level.as_deref().or(cli_config.log_level.as_deref()).unwrap_or("warn") {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // If no command provided, show help
    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let ctx = CommandContext {
        api_base: config::api_base(&cli_config, args.api_base.as_deref()),
        config: cli_config,
        catalog_path: args.catalog,
    };
    let json_default = ctx.config.json;

    match command {
        Command::Serve { host, port } => serve::execute(host, port).await?,
        Command::Ask { question, album, topic, html, json } => {
            let output = ask::AskOutput { html, json: json || json_default };
            ask::execute(&ctx, &question.join(" "), album, topic, output).await?;
        }
        Command::Caption { image_url, album, json } => {
            caption::execute(&ctx, image_url, album, json || json_default).await?;
        }
        Command::Search { term, json } => search::execute(&ctx, &term, json || json_default)?,
        Command::Albums { json } => albums::execute(&ctx, json || json_default)?,
        Command::Thumb { url, media_type, fallback, json } => {
            thumb::execute(&url, media_type, &fallback, json || json_default)?;
        }
        Command::Providers { json } => providers::execute(json || json_default)?,
        Command::Health => health::execute(&ctx).await?,
    }

    Ok(())
}
