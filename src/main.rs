use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossterm::event::{self, Event, KeyEventKind};
use log::{error, info, LevelFilter};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

mod settings_ui;
mod ui;
mod utils;

use crate::{
    settings_ui::SettingsUI,
    ui::{ChatUI, Palette, UiEvent},
};
use whispr::profile::ProfileStore;
use whispr::storage::{self, LocalStore};
use whispr::{ChatSession, Setting, Settings, SimulatedReceipts, StatusUpdate};

/// Seconds a notice stays on screen.
const NOTICE_TIMEOUT_SECS: i64 = 5;

/// Command line arguments for Whispr
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Whispr: a terminal messenger.",
    long_about = "Whispr is a terminal messenger with a contact list, a conversation view and a settings screen.\n\n\
    Settings can be preset with --set key=value, for example --set theme=dark --set fontSize=large."
)]
struct Args {
    /// Directory for local storage and the default log file
    #[arg(long, value_name = "PATH", env = "WHISPR_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log file, defaults to whispr.log inside the data directory
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Log verbosity (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: LevelFilter,

    /// Override a setting at startup, may be repeated
    #[arg(long = "set", value_name = "KEY=VALUE")]
    set: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Chat,
    Settings,
}

fn initial_settings(overrides: &[String]) -> Result<Settings> {
    let mut settings = Settings::default();
    for entry in overrides {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("expected KEY=VALUE, got '{}'", entry))?;
        let setting = Setting::parse(key.trim(), value.trim())
            .with_context(|| format!("invalid --set '{}'", entry))?;
        settings.update(setting);
    }
    Ok(settings)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let data_dir = storage::data_dir(args.data_dir.as_deref())?;
    let log_file_path = args
        .log_file
        .clone()
        .unwrap_or_else(|| data_dir.join("whispr.log"));
    utils::setup_logging(&log_file_path, args.log_level)?;

    info!("Whispr starting up");
    info!("System information: {} {}", std::env::consts::OS, std::env::consts::ARCH);
    info!("Logging to file: {}", log_file_path.display());
    info!("Data directory: {}", data_dir.display());

    let settings = initial_settings(&args.set)?;
    let profile = ProfileStore::load(LocalStore::open(&data_dir)?).shared();
    let (receipts, mut status_rx) = SimulatedReceipts::new();

    let mut chat_ui = ChatUI::new(ChatSession::seeded(), receipts, profile.clone());
    let mut settings_ui = SettingsUI::new(settings, profile);

    let mut terminal = ui::setup_terminal()?;
    let result = run_main_loop(&mut chat_ui, &mut settings_ui, &mut terminal, &mut status_rx).await;
    if let Err(e) = &result {
        error!("Main loop failed: {:#}", e);
    }

    ui::restore_terminal(terminal)?;
    info!("Whispr shut down");
    result
}

/// Run the main event loop
async fn run_main_loop(
    chat_ui: &mut ChatUI,
    settings_ui: &mut SettingsUI,
    terminal: &mut ui::Terminal<ui::CrosstermBackend<io::Stdout>>,
    status_rx: &mut UnboundedReceiver<StatusUpdate>,
) -> Result<()> {
    let mut screen = Screen::Chat;

    loop {
        let palette = Palette::for_theme(settings_ui.settings().theme);
        match screen {
            Screen::Chat => terminal.draw(|f| chat_ui.draw(f, &palette))?,
            Screen::Settings => terminal.draw(|f| settings_ui.draw(f, &palette))?,
        };

        chat_ui.clean_notices(NOTICE_TIMEOUT_SECS);
        settings_ui.clean_notices(NOTICE_TIMEOUT_SECS);

        while let Ok(update) = status_rx.try_recv() {
            chat_ui.apply_status(update);
        }

        if event::poll(Duration::from_millis(10))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                let ui_event = match screen {
                    Screen::Chat => chat_ui.handle_key(key),
                    Screen::Settings => settings_ui.handle_key(key),
                };
                match ui_event {
                    Some(UiEvent::Quit) => break,
                    Some(UiEvent::OpenSettings) => screen = Screen::Settings,
                    Some(UiEvent::CloseSettings) => screen = Screen::Chat,
                    Some(UiEvent::ToggleTheme) => settings_ui.toggle_theme(),
                    None => {}
                }
            }
        }

        // Give the receipt timers a chance to run.
        tokio::task::yield_now().await;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use whispr::settings::{FontSize, Theme};

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["whispr"]).unwrap();
        assert_eq!(args.log_level, LevelFilter::Info);
        assert!(args.set.is_empty());
        assert!(args.log_file.is_none());
    }

    #[test]
    fn test_set_overrides_apply_in_order() {
        let args = Args::try_parse_from([
            "whispr",
            "--set",
            "theme=dark",
            "--set",
            "fontSize=large",
            "--set",
            "theme=light",
        ])
        .unwrap();

        let settings = initial_settings(&args.set).unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert_eq!(settings.font_size, FontSize::Large);
        assert_eq!(settings.name, "John Doe");
    }

    #[test]
    fn test_malformed_override_is_rejected() {
        assert!(initial_settings(&["theme".to_string()]).is_err());
        assert!(initial_settings(&["theme=purple".to_string()]).is_err());
        assert!(initial_settings(&["colour=red".to_string()]).is_err());
    }
}
