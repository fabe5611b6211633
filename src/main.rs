use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::mpsc::RecvTimeoutError,
    time::Duration,
};

use keydrill::{
    corpus::Tier,
    engine::{SessionConfig, Status},
    runtime::{CrosstermEventSource, UiEvent, UiEventSource},
    ui::{App, Screen},
};

/// How long the draw loop waits for input before refreshing the screen.
const INPUT_POLL_MS: u64 = 100;

/// terminal typing speed trainer
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing speed trainer: timed sessions over tiered word lists, with live WPM, accuracy, and progress, and a performance rating when the clock runs out."
)]
pub struct Cli {
    /// difficulty tier to draw practice words from
    #[clap(short = 't', long, value_enum, default_value_t = Tier::Easy)]
    tier: Tier,

    /// session length in seconds (120 or 180)
    #[clap(short = 'd', long, default_value_t = 120)]
    duration_secs: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let cli = Cli::parse();

    // Reject unsupported durations before touching the terminal
    let config = match SessionConfig::new(cli.tier, cli.duration_secs) {
        Ok(config) => config,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::InvalidValue, err).exit();
        }
    };

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config);
    app.start()?;

    let (events, ticker) = CrosstermEventSource::new(Duration::from_secs(1));
    let result = run(&mut terminal, &mut app, &events);
    ticker.stop();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &CrosstermEventSource,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        match events.recv_timeout(Duration::from_millis(INPUT_POLL_MS)) {
            Ok(UiEvent::Tick) => app.on_tick(),
            Ok(UiEvent::Resize) => {}
            Ok(UiEvent::Key(key)) => match key.code {
                KeyCode::Esc => {
                    if app.status() == Status::Active {
                        app.abort();
                    }
                    break;
                }
                KeyCode::Backspace => {
                    if app.screen == Screen::Typing {
                        app.backspace();
                    }
                }
                KeyCode::Char(c) => {
                    if key.modifiers.contains(KeyModifiers::CONTROL) && c == 'c' {
                        if app.status() == Status::Active {
                            app.abort();
                        }
                        break;
                    }

                    match app.screen {
                        Screen::Typing => app.type_char(c),
                        Screen::Results => {
                            if c == 'r' {
                                app.start()?;
                            }
                        }
                    }
                }
                _ => {}
            },
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
