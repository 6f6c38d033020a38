//! sectionspy: A terminal document viewer with a scroll-spy section sidebar.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sectionspy::{
    app_state::AppState,
    config::Config,
    document::{self, Document},
    error::SpyError,
    formats::{markdown::MarkdownFormat, Format},
    page::TerminalPage,
    ui,
};
use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sectionspy")]
#[command(about = "Scroll through documents with a section sidebar that follows along", long_about = None)]
struct Args {
    /// Files or directories to view
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// File extensions to match
    #[arg(long, short = 'e', value_name = "EXT")]
    ext: Vec<String>,

    /// Configuration file (defaults to ./sectionspy.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Write debug logs to this file
    #[arg(long, value_name = "FILE")]
    log: Option<PathBuf>,

    /// Animation frame period in milliseconds
    #[arg(long, value_name = "MS")]
    frame_ms: Option<u64>,
}

fn main() -> ExitCode {
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), SpyError> {
    if let Some(path) = &args.log {
        init_logging(path)?;
    }

    let mut cfg = Config::load(args.config.as_deref())?;

    // Override config with command line args
    if !args.ext.is_empty() {
        cfg.file_extensions = args.ext;
    }
    if cfg.file_extensions.is_empty() {
        cfg.file_extensions = vec![MarkdownFormat.file_extension().to_string()];
    }
    if let Some(ms) = args.frame_ms {
        cfg.frame_ms = ms.max(1);
    }

    let paths = if args.paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        args.paths
    };
    let files = document::find_documents(paths, &cfg.file_extensions)?;
    if files.is_empty() {
        eprintln!("No matching files found");
        return Ok(());
    }

    let catalog: Vec<Document> = files
        .iter()
        .zip(document::view_ids(&files))
        .filter_map(|(path, view)| match Document::load(view, path, &MarkdownFormat) {
            Ok(doc) => Some(doc),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping document");
                None
            }
        })
        .collect();

    let Some(page) = TerminalPage::new(
        catalog,
        cfg.row_height,
        cfg.scroll_easing,
        Duration::from_millis(cfg.load_delay_ms),
        Instant::now(),
    ) else {
        eprintln!("No sections found in documents");
        return Ok(());
    };
    tracing::info!(views = page.catalog().len(), "Starting viewer");

    let app = AppState::new(page, cfg.spy(), cfg.scroll_step);
    run_tui(app, Duration::from_millis(cfg.frame_ms))
}

fn init_logging(path: &Path) -> Result<(), SpyError> {
    let log_file = File::create(path).map_err(|source| SpyError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sectionspy=debug")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
}

fn run_tui(mut app: AppState, frame: Duration) -> Result<(), SpyError> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, frame);

    restore_terminal();
    terminal.show_cursor()?;
    result?;

    let snapshot = serde_json::to_string_pretty(&app.spy.snapshot()).map_err(io::Error::other)?;
    println!("{snapshot}");
    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    frame: Duration,
) -> io::Result<()> {
    let mut next_frame = Instant::now() + frame;
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        let timeout = next_frame.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Up | KeyCode::Char('k') => app.scroll(-1),
                    KeyCode::Down | KeyCode::Char('j') => app.scroll(1),
                    KeyCode::PageUp => app.scroll_rows(-page_rows(app)),
                    KeyCode::PageDown => app.scroll_rows(page_rows(app)),
                    KeyCode::Home => app.scroll_to_edge(false),
                    KeyCode::End => app.scroll_to_edge(true),
                    KeyCode::BackTab => app.select_prev(),
                    KeyCode::Tab => app.select_next(),
                    KeyCode::Enter => {
                        app.navigate_selected();
                    }
                    KeyCode::Char(c @ '1'..='9') => {
                        if let Some(n) = c.to_digit(10).and_then(|n| usize::try_from(n).ok()) {
                            app.navigate_to_nth(n);
                        }
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => app.scroll(-1),
                    MouseEventKind::ScrollDown => app.scroll(1),
                    _ => {}
                },
                _ => {}
            }
        }

        let now = Instant::now();
        if now >= next_frame {
            app.tick(now);
            next_frame = now + frame;
        }
    }
}

fn page_rows(app: &AppState) -> isize {
    isize::try_from(app.page.viewport_rows().saturating_sub(1).max(1)).unwrap_or(1)
}
