use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pothole_adapters::thingspeak::ThingSpeakClient;
use pothole_pipeline::{collect, Scheduler, SystemClock};
use pothole_tui::{
    events,
    export::write_snapshot,
    settings::{Overrides, Settings},
    ui, App, Theme, View,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use tokio::runtime::Runtime;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pothole-watch")]
#[command(about = "Terminal dashboard for pothole impact telemetry")]
#[command(version)]
struct Args {
    /// Path to a TOML config file (defaults to ./pothole.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// ThingSpeak channel id
    #[arg(long)]
    channel: Option<String>,

    /// Poll interval (e.g., "60s", "5m")
    #[arg(short, long)]
    interval: Option<String>,

    /// Number of records requested per poll (1-8000)
    #[arg(long)]
    results: Option<u32>,

    /// Run without the terminal UI, logging each snapshot
    #[arg(long, conflicts_with = "export")]
    headless: bool,

    /// Fetch once, write the snapshot to a JSON file and exit
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Write logs to this file while the terminal UI is running
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = Overrides {
        channel_id: args.channel.clone(),
        interval: args.interval.clone(),
        results: args.results,
    };
    let settings = Settings::load(args.config.as_deref(), &overrides)?;

    let interactive = !args.headless && args.export.is_none();
    init_tracing(interactive, args.log_file.as_deref())?;

    let runtime = Runtime::new().context("Failed to start async runtime")?;
    let feed = settings.feed_client()?;
    info!(feed = %feed.feeds_url(), results = settings.feed.results, "feed configured");

    // Handle export mode (non-interactive)
    if let Some(export_path) = args.export {
        return runtime.block_on(export_once(&feed, &export_path));
    }

    let scheduler = Scheduler::builder(feed)
        .interval(settings.poll_interval)
        .build();

    if args.headless {
        return runtime.block_on(run_headless(scheduler));
    }

    // The TUI runs on the main thread while the runtime drives polling
    let _guard = runtime.enter();
    scheduler.start();
    let result = run_tui(scheduler.clone(), runtime.handle().clone());
    scheduler.stop();
    result
}

/// Install the global subscriber.
///
/// The terminal UI owns stdout and stderr, so while it runs logs go to
/// `log_file` or nowhere.
fn init_tracing(interactive: bool, log_file: Option<&Path>) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if !interactive {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(());
    }

    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("Failed to open log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
    }
    Ok(())
}

/// Fetch once and write the resulting snapshot.
async fn export_once(feed: &ThingSpeakClient, path: &Path) -> Result<()> {
    let snapshot = collect(feed, &SystemClock)
        .await
        .context("Failed to fetch feed")?;
    write_snapshot(&snapshot, path)?;
    println!(
        "Exported {} events to {} (schema {})",
        snapshot.len(),
        path.display(),
        snapshot.version
    );
    Ok(())
}

/// Poll on schedule and log a summary of every snapshot until Ctrl-C.
async fn run_headless(scheduler: Scheduler) -> Result<()> {
    let mut snapshots = scheduler.subscribe();
    scheduler.start();
    info!(
        feed = scheduler.feed_description(),
        interval = ?scheduler.interval(),
        "polling started"
    );

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    warn!("snapshot channel closed");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                let kpis = &snapshot.kpis;
                info!(
                    total = kpis.total,
                    last_24h = kpis.last_24h,
                    avg_magnitude = kpis.avg_magnitude,
                    "snapshot published"
                );
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, stopping");
                break;
            }
        }
    }

    scheduler.stop();
    Ok(())
}

/// Run the TUI against a started scheduler
fn run_tui(scheduler: Scheduler, runtime: tokio::runtime::Handle) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup panic hook to restore terminal
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(panic);
    }));

    let mut app = App::new(scheduler, runtime, Theme::auto_detect());

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    // Minimum terminal size for usable display
    const MIN_WIDTH: u16 = 70;
    const MIN_HEIGHT: u16 = 16;
    const TAB_ROW: u16 = 1;

    while app.running {
        app.reload_data();

        terminal.draw(|frame| {
            let area = frame.area();

            if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
                let msg = format!(
                    "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
                    area.width, area.height, MIN_WIDTH, MIN_HEIGHT
                );
                let paragraph = ratatui::widgets::Paragraph::new(msg)
                    .alignment(ratatui::layout::Alignment::Center)
                    .style(ratatui::style::Style::default().fg(app.theme.loading));
                let top = (area.height / 2).saturating_sub(2);
                let centered = ratatui::layout::Rect::new(0, top, area.width, 5.min(area.height));
                frame.render_widget(paragraph, centered);
                return;
            }

            let chunks = Layout::vertical([
                Constraint::Length(1), // Header bar
                Constraint::Length(1), // Tabs
                Constraint::Min(10),   // Content
                Constraint::Length(1), // Status bar
            ])
            .split(area);

            ui::common::render_header(frame, app, chunks[0]);
            ui::common::render_tabs(frame, app, chunks[1]);

            match app.current_view {
                View::Dashboard => ui::dashboard::render(frame, app, chunks[2]),
                View::Map => ui::map::render(frame, app, chunks[2]),
                View::Charts => ui::charts::render(frame, app, chunks[2]),
                View::Logs => ui::logs::render(frame, app, chunks[2]),
            }

            ui::common::render_status_bar(frame, app, chunks[3]);

            if app.detail_event.is_some() {
                ui::detail::render_overlay(frame, app, area);
            }

            if app.show_help {
                ui::common::render_help(frame, app, area);
            }
        })?;

        // Poll for events with a short timeout
        if let Some(event) = events::poll_event(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => events::handle_key_event(app, key),
                Event::Mouse(mouse) => events::handle_mouse_event(app, mouse, TAB_ROW),
                Event::Resize(_, _) => {
                    // Terminal will redraw on next iteration
                }
                _ => {}
            }
        }
    }

    Ok(())
}
