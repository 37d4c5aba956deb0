//! Terminal UI for toiletkaart that shows which public toilets match the filters
//! and are open at a chosen day and time.

mod app;
mod input;
mod ui;

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
    time::Duration as StdDuration,
};

use anyhow::{Context, Result};
use chrono::{Datelike, Local, Weekday};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event as CEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use reqwest::Client;
use toiletkaart_core::{
    MunicipalityId, MunicipalityMeta, TimeOfDay, parse_day, plugin::PluginRegistry,
    service::ToiletService,
};
use toiletkaart_provider_geojson::{self as geojson, DatasetSource};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::app::{App, DEFAULT_SLIDER};
use crate::input::Action;

#[derive(Parser, Debug)]
#[command(name = "toiletkaart")]
#[command(about = "Browse public toilets and see which are open at a given time")]
struct Args {
    /// GeoJSON dataset, either a file path or an http(s) URL
    #[arg(long, env = "TOILETKAART_DATA")]
    data: String,

    /// Display name of the municipality
    #[arg(long, env = "TOILETKAART_NAME", default_value = "Groningen")]
    name: String,

    /// Day to start on (mon..sun), defaults to today
    #[arg(long, value_parser = parse_day)]
    day: Option<Weekday>,

    /// Time to start on (HH:MM), defaults to 08:20
    #[arg(long)]
    time: Option<TimeOfDay>,

    /// Write logs to this file; RUST_LOG sets the level
    #[arg(long, env = "TOILETKAART_LOG")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref())?;

    // HTTP + service setup
    let client = Client::builder().user_agent("toiletkaart/0.1").build()?;

    let meta = MunicipalityMeta {
        id: MunicipalityId(slug(&args.name)),
        name: args.name.clone(),
    };
    let municipality = meta.id.clone();
    let source = DatasetSource::from_location(&args.data);
    let registry = Arc::new(PluginRegistry::new(vec![geojson::plugin(
        client, meta, source,
    )]));
    let service = ToiletService::new(registry);

    // Facilities are loaded once and kept for the session
    let facilities = service
        .load_facilities(&municipality)
        .await
        .with_context(|| format!("Failed to load facilities from {}", args.data))?;

    let day = args.day.unwrap_or_else(|| Local::now().weekday());
    let time = match args.time {
        Some(time) => time,
        None => TimeOfDay::from_slider(DEFAULT_SLIDER)?,
    };
    info!(day = %day, time = %time, "starting UI");

    // App state
    let app = App::new(args.name, facilities, day, time);

    // Terminal init
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let res = run(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    res
}

fn run(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, &app))?;

        // Poll for input (small timeout to keep CPU low)
        if event::poll(StdDuration::from_millis(100))?
            && let CEvent::Key(key) = event::read()?
        {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match input::handle_key_event(key, &mut app) {
                Action::Quit => break,
                Action::None => {}
                Action::Reclassify => app.refresh(),
            }
        }
    }

    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    // The terminal belongs to the UI, so logs only go to a file when asked for.
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;

    let filter = EnvFilter::builder()
        .with_default_directive(tracing::level_filters::LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .init();
    Ok(())
}

fn slug(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}
