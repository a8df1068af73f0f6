use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use std::{
    env,
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};

use core_admin::commands::{
    self, ChannelKind, CommandError, CommandResult, Context, ProcessAction, SessionView,
};
use core_admin::models::ProcessCommand;
use core_admin::services::{
    init_logger, parse_level, prune_logs, CoreClient, FileCredentialStore, FnSessionListener,
    ProcessFilter, Session, SettingsManager, SortBy, SortOrder, StatusFilter,
};

/// Command-line administration for a datarhei Core
#[derive(Parser, Debug)]
#[command(name = "core-admin", version, about, long_about = None)]
struct Cli {
    /// Core API base URL including the /api prefix
    #[arg(long, global = true, env = "CORE_ADMIN_URL")]
    url: Option<String>,

    /// Directory holding settings, session and logs
    #[arg(long, global = true, env = "CORE_ADMIN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "CORE_ADMIN_TIMEOUT_SECS")]
    timeout: Option<u64>,

    /// Log debug output
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Log in and store the credentials for later commands
    Login {
        username: String,
        /// Read from stdin when omitted
        #[arg(long, env = "CORE_ADMIN_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        /// Exchange the credentials for a JWT instead of using basic auth
        #[arg(long)]
        jwt: bool,
    },
    /// Forget the stored credentials
    Logout,
    /// Show the stored session and whether the Core accepts it
    Status,
    /// Core version and uptime
    Info,
    /// List processes
    Processes {
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, default_value = "name")]
        sort: SortBy,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Inspect or control one process
    Process {
        action: ProcessActionArg,
        id: String,
    },
    /// Build a stream from a draft JSON file and submit it
    Create {
        draft: PathBuf,
        /// Show the ffmpeg arguments and descriptor without submitting
        #[arg(long)]
        dry_run: bool,
    },
    /// Core metrics
    Metrics {
        /// Raw Prometheus exposition text
        #[arg(long)]
        prometheus: bool,
    },
    /// Viewer sessions
    Sessions {
        #[arg(long, conflicts_with = "summary")]
        active: bool,
        #[arg(long)]
        summary: bool,
        /// Restrict to a collector, e.g. hls or rtmp
        #[arg(long = "collector")]
        collectors: Vec<String>,
    },
    /// Core filesystems
    Fs {
        #[command(subcommand)]
        action: FsAction,
    },
    /// RTMP or SRT channels
    Channels {
        kind: ChannelKindArg,
        id: Option<String>,
    },
    /// Capture devices known to the Core
    Devices,
    /// Probe a media URL
    Probe {
        url: String,
        /// Extra ffmpeg input options
        #[arg(long = "option", allow_hyphen_values = true)]
        options: Vec<String>,
    },
    /// Player widgets
    Widget {
        #[command(subcommand)]
        action: WidgetAction,
    },
    /// Core key/value metadata
    Metadata {
        #[command(subcommand)]
        action: MetadataAction,
    },
    /// Live dashboard until Ctrl+C
    Watch {
        /// Refresh once and exit
        #[arg(long)]
        once: bool,
    },
    /// Platforms, codec presets, resolutions and licences
    Catalog,
    /// Show this client's recent log lines
    Logs {
        #[arg(long, default_value_t = 50)]
        lines: usize,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ProcessActionArg {
    Get,
    State,
    Report,
    Probe,
    Config,
    Metadata,
    Log,
    Delete,
    Start,
    Stop,
    Restart,
    Reload,
}

impl From<ProcessActionArg> for ProcessAction {
    fn from(arg: ProcessActionArg) -> Self {
        match arg {
            ProcessActionArg::Get => ProcessAction::Get,
            ProcessActionArg::State => ProcessAction::State,
            ProcessActionArg::Report => ProcessAction::Report,
            ProcessActionArg::Probe => ProcessAction::Probe,
            ProcessActionArg::Config => ProcessAction::Config,
            ProcessActionArg::Metadata => ProcessAction::Metadata,
            ProcessActionArg::Log => ProcessAction::Log,
            ProcessActionArg::Delete => ProcessAction::Delete,
            ProcessActionArg::Start => ProcessAction::Command(ProcessCommand::Start),
            ProcessActionArg::Stop => ProcessAction::Command(ProcessCommand::Stop),
            ProcessActionArg::Restart => ProcessAction::Command(ProcessCommand::Restart),
            ProcessActionArg::Reload => ProcessAction::Command(ProcessCommand::Reload),
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ChannelKindArg {
    Rtmp,
    Srt,
}

#[derive(Subcommand, Debug)]
enum FsAction {
    /// List filesystems, or the files of one
    List {
        name: Option<String>,
        #[arg(default_value = "/")]
        path: String,
    },
    /// Download a file
    Get {
        name: String,
        path: String,
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Upload a local file
    Put {
        name: String,
        path: String,
        file: PathBuf,
    },
    /// Delete a file
    Rm { name: String, path: String },
    /// Size, type and modification time of a file
    Info { name: String, path: String },
}

#[derive(Subcommand, Debug)]
enum WidgetAction {
    List,
    Get { process_id: String },
    Delete { process_id: String },
}

#[derive(Subcommand, Debug)]
enum MetadataAction {
    List,
    Get { key: String },
    /// Store a JSON value, or a plain string when it is not JSON
    Set { key: String, data: String },
    Delete { key: String },
}

fn default_data_dir() -> PathBuf {
    dirs_next::data_dir()
        .map(|dir| dir.join("core-admin"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

fn read_password() -> Result<String, CommandError> {
    eprint!("Password: ");
    io::stderr()
        .flush()
        .map_err(|e| CommandError::Input(format!("Failed to show password prompt: {e}")))?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| CommandError::Input(format!("Failed to read password: {e}")))?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

async fn run(ctx: &Context, command: Commands) -> CommandResult {
    match command {
        Commands::Login { username, password, jwt } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            commands::login(ctx, &username, &password, jwt).await
        }
        Commands::Logout => commands::logout(ctx),
        Commands::Status => commands::status(ctx).await,
        Commands::Info => commands::info(ctx).await,
        Commands::Processes { search, status, sort, desc, json } => {
            let filter = ProcessFilter {
                search,
                status,
                sort_by: sort,
                order: if desc { SortOrder::Desc } else { SortOrder::Asc },
            };
            commands::list_processes(ctx, &filter, json).await
        }
        Commands::Process { action, id } => commands::process_action(ctx, action.into(), &id).await,
        Commands::Create { draft, dry_run } => commands::create_stream(ctx, &draft, dry_run).await,
        Commands::Metrics { prometheus } => commands::metrics(ctx, prometheus).await,
        Commands::Sessions { active, summary, collectors } => {
            let view = if summary {
                SessionView::Summary
            } else if active {
                SessionView::Active
            } else {
                SessionView::All
            };
            commands::sessions(ctx, view, &collectors).await
        }
        Commands::Fs { action } => match action {
            FsAction::List { name, path } => commands::fs_list(ctx, name.as_deref(), &path).await,
            FsAction::Get { name, path, out } => {
                commands::fs_get(ctx, &name, &path, out.as_deref()).await
            }
            FsAction::Put { name, path, file } => commands::fs_put(ctx, &name, &path, &file).await,
            FsAction::Rm { name, path } => commands::fs_rm(ctx, &name, &path).await,
            FsAction::Info { name, path } => commands::fs_info(ctx, &name, &path).await,
        },
        Commands::Channels { kind, id } => {
            let kind = match kind {
                ChannelKindArg::Rtmp => ChannelKind::Rtmp,
                ChannelKindArg::Srt => ChannelKind::Srt,
            };
            commands::channels(ctx, kind, id.as_deref()).await
        }
        Commands::Devices => commands::devices(ctx).await,
        Commands::Probe { url, options } => commands::probe(ctx, &url, &options).await,
        Commands::Widget { action } => match action {
            WidgetAction::List => commands::widget_list(ctx).await,
            WidgetAction::Get { process_id } => commands::widget_get(ctx, &process_id).await,
            WidgetAction::Delete { process_id } => commands::widget_delete(ctx, &process_id).await,
        },
        Commands::Metadata { action } => match action {
            MetadataAction::List => commands::metadata_list(ctx).await,
            MetadataAction::Get { key } => commands::metadata_get(ctx, &key).await,
            MetadataAction::Set { key, data } => commands::metadata_set(ctx, &key, &data).await,
            MetadataAction::Delete { key } => commands::metadata_delete(ctx, &key).await,
        },
        Commands::Watch { once } => commands::watch(ctx, once).await,
        Commands::Catalog => commands::catalog(ctx.client.registry()),
        Commands::Logs { lines } => commands::logs(&ctx.log_dir, lines),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration from environment; flags win over env vars
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    let log_dir = env::var("CORE_ADMIN_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| data_dir.join("logs"));
    std::fs::create_dir_all(&data_dir)?;
    std::fs::create_dir_all(&log_dir)?;

    let level = env::var("CORE_ADMIN_LOG_LEVEL")
        .ok()
        .and_then(|value| parse_level(&value))
        .unwrap_or(if cli.verbose { LevelFilter::Debug } else { LevelFilter::Info });
    init_logger(&log_dir, level)?;

    let settings_manager = SettingsManager::new(data_dir.clone());
    let mut settings = match settings_manager.load() {
        Ok(settings) => settings,
        Err(e) => {
            log::warn!("Using default settings: {e}");
            Default::default()
        }
    };
    if let Some(url) = cli.url.clone() {
        settings.base_url = url;
    }
    if let Some(timeout) = cli.timeout {
        settings.request_timeout_secs = timeout;
    }

    match prune_logs(&log_dir, settings.log_retention_days) {
        Ok(0) => {}
        Ok(removed) => log::info!("Pruned {removed} old log file(s)"),
        Err(e) => log::warn!("Log pruning failed: {e}"),
    }

    log::debug!("Data dir: {}, Core: {}", data_dir.display(), settings.base_url);

    let listener = FnSessionListener(|login_route: &str| {
        log::info!("Session cleared; login required ({login_route})");
        eprintln!("Your session has expired or was rejected. Run `core-admin login` to sign in again.");
    });
    let session = Session::new(
        Arc::new(FileCredentialStore::new(data_dir.clone())),
        Arc::new(listener),
    );

    let client = match CoreClient::new(&settings, session) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    };

    let ctx = Context { client, settings, log_dir };

    match run(&ctx, cli.command).await {
        Ok(output) => {
            if let Some(text) = output.render() {
                println!("{text}");
            }
            Ok(())
        }
        Err(e) => {
            log::info!("Command failed: {e}");
            eprintln!("{}", e.user_message());
            std::process::exit(1);
        }
    }
}
