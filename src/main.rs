use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use playlist_dl::{
    Config, Event, MediaFormat, MessageLevel, OutputArtifact, OutputMode, PlaylistDownloader,
    SessionController, SessionReport,
};
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Define CLI arguments
#[derive(Parser)]
#[command(
    version,
    about = "Download a whole video playlist with yt-dlp",
    long_about = "Download every video of a playlist in one go.\n\
                  \n\
                  `download` saves the playlist into a folder named after it (local mode)\n\
                  or as a single zip archive (hosted mode). `serve` exposes the same\n\
                  pipeline over HTTP: POST a playlist URL, receive the zip."
)]
struct CliArgs {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true, help = "Enable detailed debug logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download one playlist
    Download(DownloadArgs),
    /// Run the REST API (always hosted mode)
    Serve {
        /// Address to bind, overrides the configured one
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
}

#[derive(Args)]
struct DownloadArgs {
    /// Playlist URL (https://www.youtube.com/playlist?list=...)
    url: String,

    /// Directory that receives the playlist folder or archive
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output mode: local or hosted
    #[arg(short, long)]
    mode: Option<OutputMode>,

    /// Media format: video or audio (default depends on the mode)
    #[arg(short, long)]
    format: Option<MediaFormat>,

    /// Raw yt-dlp format selector, overrides --format
    #[arg(long)]
    format_selector: Option<String>,

    /// Path to the yt-dlp executable
    #[arg(long)]
    ytdlp: Option<PathBuf>,
}

fn main() {
    match bootstrap() {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            // Log the full error for debugging
            error!(error = ?e, "Application failed");
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn bootstrap() -> playlist_dl::Result<bool> {
    let args = CliArgs::parse();

    // The download bar owns the terminal; keep logs quiet unless asked
    let default_level = match (&args.command, args.verbose) {
        (_, true) => "playlist_dl=debug",
        (Command::Serve { .. }, false) => "playlist_dl=info,tower_http=info",
        (Command::Download(_), false) => "playlist_dl=warn",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match args.command {
        Command::Download(download) => run_download(config, download).await,
        Command::Serve { bind } => {
            config.download.mode = OutputMode::Hosted;
            if let Some(bind) = bind {
                config.api.bind_address = bind;
            }
            let downloader = Arc::new(PlaylistDownloader::new(config).await?);
            playlist_dl::run_with_shutdown(downloader).await?;
            Ok(true)
        }
    }
}

async fn run_download(mut config: Config, args: DownloadArgs) -> playlist_dl::Result<bool> {
    if let Some(dir) = args.output_dir {
        config.download.download_dir = dir;
    }
    if let Some(mode) = args.mode {
        config.download.mode = mode;
    }
    if args.format.is_some() {
        config.download.format = args.format;
    }
    if args.format_selector.is_some() {
        config.download.format_selector = args.format_selector;
    }
    if let Some(path) = args.ytdlp {
        config.engine.ytdlp_path = Some(path);
    }

    let downloader = Arc::new(PlaylistDownloader::new(config).await?);
    info!(
        engine = %downloader.capabilities().engine.name,
        mode = ?downloader.get_config().download.mode,
        "Starting playlist download"
    );

    let bar = ProgressBar::new_spinner();
    bar.enable_steady_tick(Duration::from_millis(120));
    let renderer = tokio::spawn(render_events(downloader.subscribe(), bar.clone()));

    let session = SessionController::new(downloader.clone());
    let report = session.submit(&args.url).await;

    renderer.abort();
    bar.finish_and_clear();

    print_report(&report);

    if let Some(OutputArtifact::Archive(archive)) = &report.artifact {
        let target = downloader.get_config().download.download_dir.join(&archive.filename);
        tokio::fs::write(&target, &archive.bytes).await?;
        println!("Archive written to {}", target.display());
    }

    Ok(report.is_success())
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} {msg}\n[{elapsed_precise}] [{bar:40.green/white}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// Mirror run events onto the terminal bar until the run ends
async fn render_events(mut events: Receiver<Event>, bar: ProgressBar) {
    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(_)) => continue,
            Err(RecvError::Closed) => break,
        };

        match event {
            Event::Validating { .. } => bar.set_message("Validating URL..."),
            Event::FetchingMetadata { .. } => bar.set_message("Fetching playlist information..."),
            Event::MetadataFetched { title, total, .. } => {
                bar.set_style(bar_style());
                bar.set_length(total as u64);
                bar.set_message(title);
            }
            Event::Progress {
                completed, status, ..
            } => {
                bar.set_position(completed as u64);
                bar.set_message(status);
            }
            Event::Packaging { archive, .. } => bar.set_message(format!("Packaging {archive}...")),
            Event::Succeeded { .. } | Event::Failed { .. } => break,
        }
    }
}

fn print_report(report: &SessionReport) {
    for message in &report.messages {
        match message.level {
            MessageLevel::Info | MessageLevel::Success => println!("{}", message.text),
            MessageLevel::Warning | MessageLevel::Error => eprintln!("{}", message.text),
        }
    }
}
