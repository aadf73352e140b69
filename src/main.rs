use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{error, info};
use url::Url;

use product_studio::logging::init_logging;
use product_studio::types::{ImageUpload, UploadForm, DEFAULT_PLATFORM};
use product_studio::{ConsoleView, StudioClient, StudioConfig, StudioError, WorkflowController};

#[derive(Parser)]
#[command(name = "product-studio", version, about = "Generate listing metadata, visuals and a slideshow for a product photo")]
struct Cli {
    /// Backend base URL (overrides STUDIO_BACKEND_URL)
    #[arg(long, global = true)]
    backend: Option<Url>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the backend is up
    Health {
        /// Keep polling for up to this many seconds
        #[arg(long, value_name = "SECS")]
        wait: Option<u64>,
    },
    /// Upload an image and run the workflow
    Run(RunArgs),
}

#[derive(Args)]
struct RunArgs {
    /// Product photo to upload
    #[arg(long)]
    image: PathBuf,

    #[arg(long)]
    category: Option<String>,

    #[arg(long, default_value = DEFAULT_PLATFORM)]
    platform: String,

    /// Last step to run
    #[arg(long, value_enum, default_value_t = Step::Video)]
    until: Step,

    /// Save generated visuals and video here
    #[arg(long, value_name = "DIR")]
    download_dir: Option<PathBuf>,

    /// Copy the metadata JSON to the clipboard
    #[arg(long)]
    copy_metadata: bool,

    /// Show visual N (1-based) in the preview after generation
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    open: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
enum Step {
    Metadata,
    Visuals,
    Video,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        // Gate errors were already shown by the view
        Err(e) if e.is_blocked() => ExitCode::FAILURE,
        Err(e) => {
            error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), StudioError> {
    let mut config = StudioConfig::from_env()?;
    if let Some(backend) = cli.backend {
        config.backend_url = backend;
    }

    let client = StudioClient::from_config(&config)?;
    info!("Using backend {}", client.base_url());

    match cli.command {
        Command::Health { wait } => check_health(&client, wait).await,
        Command::Run(args) => run_workflow(client, &config, args).await,
    }
}

async fn check_health(client: &StudioClient, wait: Option<u64>) -> Result<(), StudioError> {
    if let Some(secs) = wait {
        client.wait_until_healthy(Duration::from_secs(secs)).await?;
    }
    let health = client.health().await?;
    println!("{}: {}", client.base_url(), health.status);
    Ok(())
}

async fn run_workflow(client: StudioClient, config: &StudioConfig, args: RunArgs) -> Result<(), StudioError> {
    let image = ImageUpload::from_path(&args.image).await?;
    let mut form = UploadForm::new(image).with_platform(args.platform);
    if let Some(category) = args.category {
        form = form.with_category(category);
    }

    let view = ConsoleView::new(std::io::stdout(), client.base_url().clone())
        .with_terminal(std::io::stdout().is_terminal());
    let downloader = client.clone();
    let mut controller = WorkflowController::with_config(client, view, config);

    controller.submit_upload(form).await?;
    if args.copy_metadata {
        controller.copy_metadata();
    }

    if args.until >= Step::Visuals {
        controller.generate_visuals().await?;
        if let Some(n) = args.open {
            controller.open_visual((n - 1) as usize);
        }
    }

    if args.until >= Step::Video {
        controller.generate_video().await?;
    }

    if let Some(dir) = args.download_dir {
        let state = controller.state();
        save_outputs(&downloader, state.visuals(), state.video_url(), &dir).await?;
    }

    info!(stage = ?controller.state().stage(), "workflow finished");
    Ok(())
}

async fn save_outputs(
    client: &StudioClient,
    visuals: &[String],
    video_url: Option<&str>,
    dir: &Path,
) -> Result<(), StudioError> {
    let visuals_dir = dir.join("visuals");
    for visual in visuals {
        let saved = client.download(visual, &visuals_dir).await?;
        println!("Saved {}", saved.display());
    }
    if let Some(video_url) = video_url {
        let saved = client.download(video_url, dir).await?;
        println!("Saved {}", saved.display());
    }
    Ok(())
}
