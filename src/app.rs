use std::{collections::HashMap, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Parser;
use log::{debug, error, info, warn, LevelFilter};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    config::Config,
    dom::ReadyState,
    elements::LayoutKind,
    events::{EventBus, HostEvent},
    host::LoggingHost,
    html::HtmlDocument,
    preferences::{ConfigStore, ConfigValue, FormEntry, PreferenceBridge, TomlStore},
    session::Session,
    webapp::YoutubeMusic,
};

#[derive(Debug, Parser)]
#[command(version, about)]
pub struct Cli {
    #[arg(help = "HTML snapshot of the player page to mirror. It is re-read whenever it changes.")]
    pub page: PathBuf,

    #[arg(
        short,
        long,
        help = "The path to the config file. The default is `config.toml`."
    )]
    pub config: Option<String>,

    #[arg(
        short,
        long,
        help = "Selector layout of the page (`legacy` or `current`). This overrides the value from the config file."
    )]
    pub layout: Option<LayoutKind>,

    #[arg(
        short,
        long,
        help = "Delay between two poll cycles in milliseconds. This overrides the value from the config file."
    )]
    pub interval_ms: Option<u64>,

    #[arg(
        short,
        long,
        help = "The path to the preferences file. This overrides the value from the config file."
    )]
    pub preferences: Option<PathBuf>,

    #[arg(long, help = "Print the preferences form as JSON and exit.")]
    pub preferences_form: bool,
}

/// One line of JSON typed into the console, standing in for a host notification.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "m")]
enum ConsoleCommand {
    #[serde(rename = "action")]
    Action {
        name: String,
        #[serde(default)]
        param: Option<f64>,
    },

    #[serde(rename = "rate")]
    Rate { rating: f64 },

    #[serde(rename = "set")]
    Set { key: String, value: ConfigValue },

    #[serde(rename = "ready")]
    Ready { state: ReadyState },
}

#[derive(Debug, Serialize)]
struct PreferencesForm {
    values: HashMap<String, ConfigValue>,
    entries: Vec<FormEntry>,
}

pub async fn start() -> anyhow::Result<()> {
    pretty_env_logger::formatted_builder()
        .filter_level(LevelFilter::Info)
        .parse_env("YTM_BRIDGE_LOG")
        .init();

    let cli = Cli::parse();
    let config = Config::from_cli_args(&cli)?;

    let store = Arc::new(match &config.preferences {
        Some(path) => TomlStore::open(path).await?,
        None => TomlStore::in_memory(),
    });
    let mut app = YoutubeMusic::new(
        config.layout.layout(),
        config.rating,
        PreferenceBridge::new(Arc::clone(&store)),
    );
    app.load_preferences().await;

    if cli.preferences_form {
        let mut form = PreferencesForm {
            values: HashMap::new(),
            entries: Vec::new(),
        };
        app.append_preferences(&mut form.values, &mut form.entries);
        let json =
            serde_json::to_string_pretty(&form).context("Failed to serialize preferences form")?;
        println!("{json}");
        return Ok(());
    }

    let document = HtmlDocument::from_path(&cli.page)?;
    info!(
        "Mirroring {} with the {} layout every {}ms",
        cli.page.display(),
        config.layout,
        config.poll_interval().as_millis()
    );

    let bus = EventBus::new();
    tokio::spawn(read_console(bus.clone(), Arc::clone(&store)));

    let mut session = Session::new(
        document,
        LoggingHost::new(),
        app,
        bus,
        config.poll_interval(),
    );
    session.run().await;

    Ok(())
}

async fn read_console(bus: EventBus, store: Arc<TomlStore>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Console input closed");
                return;
            }
            Err(err) => {
                error!("Failed to read console input: {err:?}");
                return;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ConsoleCommand>(&line) {
            Ok(command) => handle_console_command(command, &bus, store.as_ref()).await,
            Err(err) => warn!("Ignoring malformed console command {line:?}: {err}"),
        }
    }
}

async fn handle_console_command(command: ConsoleCommand, bus: &EventBus, store: &impl ConfigStore) {
    let event = match command {
        ConsoleCommand::Action { name, param } => HostEvent::ActionActivated { name, param },
        ConsoleCommand::Rate { rating } => HostEvent::RatingSet(rating),
        ConsoleCommand::Ready { state } => HostEvent::ReadyStateChanged(state),
        ConsoleCommand::Set { key, value } => {
            if let Err(err) = store.set_value(&key, value).await {
                error!("Failed to store preference {key}: {err:?}");
                return;
            }
            HostEvent::ConfigChanged(key)
        }
    };
    if bus.emit(event.clone()) == 0 {
        debug!("Nobody is listening for {event:?} yet");
    }
}
