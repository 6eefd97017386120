//! component-picker CLI
//!
//! Opens a page in Chrome/Chromium and lets you pick React components with the hotkey, resolves
//! single coordinates, and manages the persisted picker settings.

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use component_picker::bridge::BridgeMessage;
use component_picker::picker::preview_text;
use component_picker::settings::FileSettingsStore;
use component_picker::{BrowserSession, ConnectionOptions, LaunchOptions, PickerRuntime, SettingsRelay};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "component-picker")]
#[command(version)]
#[command(about = "Pick React components on a live page and copy where they are defined", long_about = None)]
struct Cli {
    /// Settings file (default: platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    settings_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a page and pick components interactively (hold the hotkey, click to copy)
    Pick {
        /// Page to open; the current tab is used when omitted
        url: Option<String>,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Resolve the component under one viewport coordinate and print it as JSON
    Resolve {
        /// Page to open
        url: String,

        #[arg(long)]
        x: f64,

        #[arg(long)]
        y: f64,

        /// Extra time to let the page render before resolving, in milliseconds
        #[arg(long, default_value = "500")]
        wait_ms: u64,

        #[command(flatten)]
        browser: BrowserArgs,
    },

    /// Show or change picker settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Args)]
struct BrowserArgs {
    /// Launch the browser without a window
    #[arg(long)]
    headless: bool,

    /// Path to custom browser executable
    #[arg(long, value_name = "PATH")]
    executable_path: Option<PathBuf>,

    /// WebSocket endpoint URL of an already running browser
    #[arg(long, value_name = "URL")]
    ws_endpoint: Option<String>,

    /// Persistent browser profile directory
    #[arg(long, value_name = "DIR")]
    user_data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings as JSON
    Show,

    /// Change one or more settings
    Set {
        #[arg(long)]
        hotkey: Option<String>,

        /// Include ancestor lines in the copied text
        #[arg(long)]
        parent_chain: Option<bool>,

        /// Number of ancestors shown
        #[arg(long)]
        depth: Option<u32>,

        /// Include the page URL in the copied text
        #[arg(long)]
        page_url: Option<bool>,
    },

    /// Permit the picker on a hostname
    Allow { hostname: String },

    /// Stop permitting the picker on a hostname
    Disallow { hostname: String },

    /// Print a sample of the copied text for the current settings
    Preview,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let store = match cli.settings_file {
        Some(path) => FileSettingsStore::new(path),
        None => FileSettingsStore::at_default_path()?,
    };
    let relay = Arc::new(SettingsRelay::new(Arc::new(store)));
    relay.seed_defaults()?;

    match cli.command {
        Command::Pick { url, browser } => pick(relay, url, browser).await,
        Command::Resolve { url, x, y, wait_ms, browser } => resolve(&url, x, y, wait_ms, browser),
        Command::Settings { action } => settings(&relay, action),
    }
}

fn open_browser(args: &BrowserArgs, default_headless: bool) -> Result<BrowserSession> {
    if let Some(ws_url) = &args.ws_endpoint {
        log::info!("Connecting to browser at {}", ws_url);
        return Ok(BrowserSession::connect(ConnectionOptions::new(ws_url.clone()))?);
    }

    let mut options = LaunchOptions::new().headless(args.headless || default_headless);
    if let Some(path) = &args.executable_path {
        options = options.chrome_path(path.clone());
    }
    if let Some(dir) = &args.user_data_dir {
        options = options.user_data_dir(dir.clone());
    }
    Ok(BrowserSession::launch(options)?)
}

async fn pick(relay: Arc<SettingsRelay>, url: Option<String>, args: BrowserArgs) -> Result<()> {
    let session = open_browser(&args, false)?;
    if let Some(url) = &url {
        session.navigate(url)?;
        session.wait_for_navigation()?;
    }

    let tab = session.tab()?;
    let hostname = session.hostname().unwrap_or_default();
    let settings = relay.current();
    if !component_picker::picker::is_allowed_site(&hostname, &settings) {
        log::warn!(
            "'{}' is not in the allow-list; run `component-picker settings allow {}` to enable the picker there",
            hostname,
            hostname
        );
    }

    let runtime = PickerRuntime::new(tab, relay).start()?;
    eprintln!("Hold {} and hover to inspect, click to copy, Escape to cancel. Ctrl+C to quit.", settings.hotkey);

    tokio::signal::ctrl_c().await.context("Failed to listen for Ctrl+C")?;
    runtime.shutdown().await;
    Ok(())
}

fn resolve(url: &str, x: f64, y: f64, wait_ms: u64, args: BrowserArgs) -> Result<()> {
    let session = open_browser(&args, true)?;
    session.navigate(url)?;
    session.wait_for_navigation()?;
    std::thread::sleep(std::time::Duration::from_millis(wait_ms));

    let result = session.resolve_at(x, y)?;
    println!("{}", serde_json::to_string_pretty(&BridgeMessage::Result(result))?);
    Ok(())
}

fn settings(relay: &SettingsRelay, action: SettingsAction) -> Result<()> {
    let mut settings = relay.current();

    match action {
        SettingsAction::Show => {
            println!("{}", serde_json::to_string_pretty(&settings)?);
            return Ok(());
        }
        SettingsAction::Preview => {
            println!("{}", preview_text(&settings));
            return Ok(());
        }
        SettingsAction::Set { hotkey, parent_chain, depth, page_url } => {
            if hotkey.is_none() && parent_chain.is_none() && depth.is_none() && page_url.is_none() {
                bail!("Nothing to change; pass at least one of --hotkey, --parent-chain, --depth, --page-url");
            }
            if let Some(hotkey) = hotkey {
                settings.hotkey = hotkey;
            }
            if let Some(include) = parent_chain {
                settings.include_parent_chain = include;
            }
            if let Some(depth) = depth {
                settings.parent_chain_depth = depth;
            }
            if let Some(include) = page_url {
                settings.include_page_url = include;
            }
        }
        SettingsAction::Allow { hostname } => {
            if !settings.set_site_enabled(&hostname, true) {
                println!("'{}' is already permitted", hostname);
                return Ok(());
            }
        }
        SettingsAction::Disallow { hostname } => {
            if !settings.set_site_enabled(&hostname, false) {
                println!("'{}' is not in the allow-list", hostname);
                return Ok(());
            }
        }
    }

    relay.publish(settings.clone())?;
    log::info!("Settings saved");
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}
