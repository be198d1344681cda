//! Imagegen Command-Line Interface
//!
//! Runs the backend server, or drives the client-side workflow from a
//! terminal: generate (optionally by dictation), share, browse and search
//! the feed, manage recent creations, and edit the config file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use imagegen::models::settings::{AppConfig, SettingsUpdate};
use imagegen::services::{
    CreateSession, DeviceSaver, FileSaver, GenerationController, GenerationSettings,
    LineRecognizer, ListingView, RecentCreations, SearchController, UiEvent, UiNotifier,
    VoiceCapture,
};
use imagegen::state::AppState;
use imagegen::storage::ConfigService;
use imagegen_core::remote::{GenerationService, ImageStore};
use imagegen_remote::{build_http_client, HttpImageStore, OpenAIImageService};

/// Imagegen - prompt to image, shared with the community
#[derive(Parser, Debug)]
#[command(name = "imagegen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of ~/.imagegen/config.json
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the backend server
    Serve,
    /// Generate images from a prompt
    Generate {
        /// Prompt text (omit with --voice)
        prompt: Option<String>,

        /// Your name, shown on shared posts
        #[arg(short, long)]
        name: Option<String>,

        /// Share the generated batch with the community
        #[arg(short, long)]
        share: bool,

        /// Dictate the prompt: one line read from stdin
        #[arg(long)]
        voice: bool,
    },
    /// Search the community feed by name or prompt
    Search {
        /// Substring to look for; omit to list everything
        query: Option<String>,
    },
    /// List recent creations
    Recent,
    /// Delete every recent creation with this image URL
    Delete { url: String },
    /// Save an image to disk
    Save {
        url: String,

        /// Target directory (defaults to the configured download directory)
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
    /// Show the configuration, or change the given settings
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// Images requested per generation (1-10)
    #[arg(long)]
    count: Option<u32>,

    /// Image size, e.g. 1024x1024
    #[arg(long)]
    size: Option<String>,

    /// Search debounce window in milliseconds
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Start prompt edits from the current prompt
    #[arg(long)]
    prefill_on_edit: Option<bool>,

    /// Default directory for saved images
    #[arg(long)]
    download_dir: Option<String>,

    /// Base URL of the image/post backend
    #[arg(long)]
    server_url: Option<String>,

    /// Image generation endpoint
    #[arg(long)]
    endpoint: Option<String>,

    /// Credential for the generation endpoint, stored in the config file
    #[arg(long)]
    credential: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl From<ConfigArgs> for SettingsUpdate {
    fn from(args: ConfigArgs) -> Self {
        Self {
            generation_count: args.count,
            image_size: args.size,
            search_debounce_ms: args.debounce_ms,
            prefill_on_edit: args.prefill_on_edit,
            download_dir: args.download_dir,
            server_base_url: args.server_url,
            service_endpoint: args.endpoint,
            credential: args.credential,
            request_timeout_secs: args.timeout_secs,
            ..Self::default()
        }
    }
}

/// Remote collaborators built from the configuration
struct Clients {
    generator: Arc<dyn GenerationService>,
    store: Arc<dyn ImageStore>,
    saver: Arc<dyn DeviceSaver>,
}

impl Clients {
    fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let http = build_http_client(Some(Duration::from_secs(config.request_timeout_secs)))?;
        let generator = OpenAIImageService::new(&config.service, http.clone());
        let store = HttpImageStore::new(&config.service, http.clone())?;
        let saver = FileSaver::from_config(http, config.download_dir.as_deref())?;
        Ok(Self {
            generator: Arc::new(generator),
            store: Arc::new(store),
            saver: Arc::new(saver),
        })
    }

    fn recent(&self) -> RecentCreations {
        RecentCreations::new(self.store.clone(), self.saver.clone())
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let service = match path {
        Some(path) => {
            let mut service = ConfigService::open(path)?;
            service.apply_overrides(|key| std::env::var(key).ok());
            service
        }
        None => ConfigService::new()?,
    };
    let config = service.get_config_clone();
    config.validate().map_err(anyhow::Error::msg)?;
    Ok(config)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Cancel `token` on Ctrl-C
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupted");
            token.cancel();
        }
    });
}

fn notifier() -> (UiNotifier, mpsc::UnboundedReceiver<UiEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (UiNotifier::new(tx), rx)
}

fn print_events(events: &mut mpsc::UnboundedReceiver<UiEvent>) {
    while let Ok(event) = events.try_recv() {
        match event {
            UiEvent::Alert(message) => eprintln!("! {}", message),
            UiEvent::NavigateHome => eprintln!("-> back to the feed"),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let Cli {
        command,
        config: config_path,
    } = Cli::parse();
    let config = || load_config(config_path.clone());

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    match command {
        Commands::Serve => serve(&config()?, cancel).await,
        Commands::Generate {
            prompt,
            name,
            share,
            voice,
        } => generate(&config()?, prompt, name, share, voice, &cancel).await,
        Commands::Search { query } => search(&config()?, query, &cancel).await,
        Commands::Recent => recent(&config()?, &cancel).await,
        Commands::Delete { url } => delete(&config()?, &url, &cancel).await,
        Commands::Save { url, dir } => save(&config()?, &url, dir).await,
        Commands::Config(args) => configure(config_path.clone(), args),
    }
}

/// Edits go to the file as written; environment overrides are not applied
fn configure(path: Option<PathBuf>, args: ConfigArgs) -> anyhow::Result<()> {
    let mut service = match path {
        Some(path) => ConfigService::open(path)?,
        None => ConfigService::open_default()?,
    };

    let update = SettingsUpdate::from(args);
    let config = if update.is_empty() {
        service.get_config_clone()
    } else {
        let config = service.update_config(update)?;
        eprintln!("updated {}", service.path().display());
        config
    };

    println!("{}", serde_json::to_string_pretty(&config)?);
    let credential = if config.service.credential.is_some() {
        "set"
    } else {
        "not set"
    };
    println!("credential: {}", credential);
    Ok(())
}

async fn serve(config: &AppConfig, cancel: CancellationToken) -> anyhow::Result<()> {
    let state = AppState::new();
    state.initialize(config).await?;

    let listener = tokio::net::TcpListener::bind(&config.bind_address)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_address))?;
    imagegen::serve(listener, state, cancel).await?;
    Ok(())
}

async fn generate(
    config: &AppConfig,
    prompt: Option<String>,
    name: Option<String>,
    share: bool,
    voice: bool,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let clients = Clients::from_config(config)?;
    let (notifier, mut events) = notifier();

    let controller = GenerationController::new(
        clients.generator.clone(),
        clients.store.clone(),
        clients.recent(),
        GenerationSettings::from(config),
    )
    .with_notifier(notifier);
    let capture = if voice {
        VoiceCapture::new(Arc::new(LineRecognizer::stdin()))
    } else {
        VoiceCapture::unavailable()
    };

    let mut session = CreateSession::new(controller, capture, config.prefill_on_edit);
    if let Some(name) = name {
        session.set_name(name);
    }

    if voice {
        eprintln!("Listening... say your prompt and press Enter");
        if session.dictate(cancel).await.is_none() {
            anyhow::bail!("no prompt was dictated");
        }
    } else if let Some(prompt) = prompt {
        let editor = session.editor_mut();
        editor.begin_edit();
        editor.set_draft(prompt);
        editor.blur();
    }

    let result = session.generate(cancel).await;
    print_events(&mut events);
    let batch = result?;
    for image in &batch {
        let status = if image.persisted { "saved  " } else { "unsaved" };
        println!("{}  {}", status, image.url);
    }

    if share {
        let result = session.share(cancel).await;
        print_events(&mut events);
        let report = result?;
        println!(
            "shared {} of {} images",
            report.published.len(),
            report.published.len() + report.failures.len()
        );
    }
    Ok(())
}

async fn search(
    config: &AppConfig,
    query: Option<String>,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let clients = Clients::from_config(config)?;
    let (notifier, mut events) = notifier();

    let mut search = SearchController::new(
        clients.store.clone(),
        Duration::from_millis(config.search_debounce_ms),
    )
    .with_notifier(notifier);

    let viewer = search.viewer();
    let progress = tokio::spawn(async move {
        let mut loading = viewer.loading_watch();
        if loading.wait_for(|loading| *loading).await.is_ok() {
            print_view(viewer.view());
        }
    });
    let loaded = search.load_all(cancel).await;
    progress.abort();
    print_events(&mut events);
    loaded?;

    if let Some(query) = query {
        println!("Showing results for {}:", query);
        search.search_now(query);
    }

    print_view(search.view());
    Ok(())
}

fn print_view(view: ListingView) {
    match view {
        ListingView::Loading => eprintln!("Loading..."),
        ListingView::Cards(posts) => {
            for post in posts {
                println!(
                    "{:<16}  {}  {}",
                    post.name.as_deref().unwrap_or("-"),
                    post.prompt,
                    post.url
                );
            }
        }
        ListingView::NoResults { label } | ListingView::Empty { label } => println!("{}", label),
    }
}

async fn recent(config: &AppConfig, cancel: &CancellationToken) -> anyhow::Result<()> {
    let clients = Clients::from_config(config)?;
    let mut recent = clients.recent();
    recent.hydrate(cancel).await?;

    if recent.is_empty() {
        println!("No recent creations");
    }
    for image in recent.items() {
        let when = image
            .created_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("{}  {}  {}", when, image.prompt, image.url);
    }
    Ok(())
}

async fn delete(config: &AppConfig, url: &str, cancel: &CancellationToken) -> anyhow::Result<()> {
    let clients = Clients::from_config(config)?;
    let mut recent = clients.recent();
    recent.hydrate(cancel).await?;

    let removed = recent.delete(url, cancel).await?;
    println!("deleted {} ({} local records)", url, removed);
    Ok(())
}

async fn save(config: &AppConfig, url: &str, dir: Option<PathBuf>) -> anyhow::Result<()> {
    let clients = Clients::from_config(config)?;
    let recent = clients.recent();

    let filename = match dir {
        Some(dir) => recent.download(url, &dir).await,
        None => recent.save(url).await,
    };
    println!("{}", filename);
    Ok(())
}
