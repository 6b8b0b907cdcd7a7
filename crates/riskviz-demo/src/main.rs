#![forbid(unsafe_code)]

//! riskviz demo binary entry point.

use std::io::{self, Stdout};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use riskviz::{FramePump, VisualizerConfig};
use riskviz_demo::cli::Opts;
use riskviz_demo::render;
use riskviz_demo::showcase::Showcase;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn main() -> ExitCode {
    let opts = Opts::parse();
    init_tracing();
    match run(&opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Runtime error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    // Logs go to stderr so they never interleave with the drawn screen.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

/// Raw mode plus alternate screen, undone on drop.
struct TerminalGuard {
    stdout: Stdout,
}

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        Ok(Self { stdout })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

enum Action {
    Quit,
    StopAll,
    Reinitialize,
    None,
}

fn action_for(key: event::KeyEvent) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
        KeyCode::Char('s') => Action::StopAll,
        KeyCode::Char('r') => Action::Reinitialize,
        _ => Action::None,
    }
}

fn run(opts: &Opts) -> riskviz::Result<()> {
    let parse = VisualizerConfig::from_env_with_diagnostics();
    for err in &parse.errors {
        tracing::warn!(
            field = err.field,
            value = %err.value,
            message = %err.message,
            "config value ignored"
        );
    }

    let mut showcase = Showcase::new(
        parse.config,
        opts.animate,
        Duration::from_millis(opts.drift_ms),
    );
    let frame = Duration::from_millis(opts.frame_ms);
    let deadline = (opts.duration_ms > 0).then(|| Duration::from_millis(opts.duration_ms));

    let mut guard = TerminalGuard::enter()?;
    let mut pump = FramePump::new();
    let started = Instant::now();

    loop {
        pump.pump(showcase.queue());
        showcase.tick();
        render::draw(&mut guard.stdout, &showcase)?;

        if deadline.is_some_and(|d| started.elapsed() >= d) {
            break;
        }
        if event::poll(frame)?
            && let Event::Key(key) = event::read()?
        {
            match action_for(key) {
                Action::Quit => break,
                Action::StopAll => {
                    let stopped = showcase.stop_all();
                    tracing::info!(stopped, "animations stopped");
                }
                Action::Reinitialize => {
                    showcase.reinitialize();
                }
                Action::None => {}
            }
        }
    }

    tracing::info!(
        elapsed_ms = started.elapsed().as_millis() as u64,
        drifts = showcase.drifts(),
        "demo finished"
    );
    Ok(())
}
