use std::sync::mpsc::{self, Receiver};

use log::debug;
use rand::rngs::StdRng;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::engine::{Engine, EngineError, EngineEvent, SessionConfig, SessionResult, Status};
use crate::score::ScoreSnapshot;

const HORIZONTAL_MARGIN: u16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Typing,
    Results,
}

/// View state for the TUI: owns the engine, mirrors the input widget's
/// contents, and folds engine events into what gets drawn. All game logic
/// stays on the other side of the event channel.
pub struct App {
    engine: Engine,
    events: Receiver<EngineEvent>,
    pub target: String,
    pub typed: String,
    pub snapshot: ScoreSnapshot,
    pub remaining_secs: u32,
    pub result: Option<SessionResult>,
    pub screen: Screen,
}

impl App {
    pub fn new(config: SessionConfig) -> Self {
        let (tx, rx) = mpsc::channel();
        Self::build(Engine::new(tx), rx, config)
    }

    /// App over a seeded engine, for deterministic target text in tests.
    pub fn with_rng(config: SessionConfig, rng: StdRng) -> Self {
        let (tx, rx) = mpsc::channel();
        Self::build(Engine::with_rng(tx, rng), rx, config)
    }

    fn build(mut engine: Engine, events: Receiver<EngineEvent>, config: SessionConfig) -> Self {
        // A fresh engine is Idle, so configuring cannot be rejected.
        engine.configure(config).ok();
        Self {
            remaining_secs: config.duration_secs,
            engine,
            events,
            target: String::new(),
            typed: String::new(),
            snapshot: ScoreSnapshot::default(),
            result: None,
            screen: Screen::Typing,
        }
    }

    pub fn start(&mut self) -> Result<(), EngineError> {
        self.engine.start()?;
        self.sync();
        Ok(())
    }

    pub fn status(&self) -> Status {
        self.engine.status()
    }

    /// Append one character to the input widget and resubmit the prefix.
    pub fn type_char(&mut self, c: char) {
        self.typed.push(c);
        let typed = self.typed.clone();
        if let Err(err) = self.engine.submit_input(&typed) {
            debug!("keystroke ignored: {err}");
            self.typed.pop();
        }
        self.sync();
    }

    /// Remove the last character and resubmit the shortened prefix.
    pub fn backspace(&mut self) {
        if self.typed.pop().is_none() {
            return;
        }
        let typed = self.typed.clone();
        if let Err(err) = self.engine.submit_input(&typed) {
            debug!("backspace ignored: {err}");
        }
        self.sync();
    }

    pub fn on_tick(&mut self) {
        self.engine.on_tick();
        self.sync();
    }

    /// Abandon the running attempt, e.g. when the user quits mid-session.
    pub fn abort(&mut self) {
        if let Err(err) = self.engine.stop() {
            debug!("abort ignored: {err}");
        }
        self.sync();
    }

    fn sync(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::Started { target } => {
                self.target = target;
                self.typed.clear();
                self.snapshot = ScoreSnapshot::default();
                self.remaining_secs = self.engine.config().duration_secs;
                self.result = None;
                self.screen = Screen::Typing;
            }
            EngineEvent::Progress(snapshot) => self.snapshot = snapshot,
            EngineEvent::Tick { remaining_secs } => self.remaining_secs = remaining_secs,
            EngineEvent::Finished(result) => {
                self.snapshot.wpm = result.wpm;
                self.snapshot.accuracy = result.accuracy;
                self.result = Some(result);
                self.screen = Screen::Results;
            }
        }
    }
}

/// Seconds rendered as m:ss for the countdown readout.
fn format_remaining(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);
        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);
        let underlined_dim_bold_style = Style::default()
            .patch(dim_bold_style)
            .add_modifier(Modifier::UNDERLINED);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        match self.screen {
            Screen::Typing => {
                let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
                let mut prompt_occupied_lines =
                    ((self.target.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16;

                if self.target.width() <= max_chars_per_line as usize {
                    prompt_occupied_lines = 1;
                }

                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints(
                        [
                            Constraint::Length(
                                ((area.height as f64 - prompt_occupied_lines as f64) / 2.0) as u16,
                            ),
                            Constraint::Length(1),
                            Constraint::Length(1),
                            Constraint::Length(prompt_occupied_lines),
                            Constraint::Length(
                                ((area.height as f64 - prompt_occupied_lines as f64) / 2.0) as u16,
                            ),
                        ]
                        .as_ref(),
                    )
                    .split(area);

                let timer = Paragraph::new(Span::styled(
                    format_remaining(self.remaining_secs),
                    dim_bold_style,
                ))
                .alignment(Alignment::Center);
                timer.render(chunks[1], buf);

                let stats = Paragraph::new(Span::styled(
                    format!(
                        "{} wpm   {}% acc   {}%",
                        self.snapshot.wpm, self.snapshot.accuracy, self.snapshot.progress
                    ),
                    italic_style,
                ))
                .alignment(Alignment::Center);
                stats.render(chunks[2], buf);

                let target_chars: Vec<char> = self.target.chars().collect();
                let typed_chars: Vec<char> = self.typed.chars().collect();
                let cursor = typed_chars.len().min(target_chars.len());

                let mut spans = typed_chars
                    .iter()
                    .zip(target_chars.iter())
                    .map(|(&got, &expected)| {
                        if got == expected {
                            Span::styled(expected.to_string(), green_bold_style)
                        } else {
                            Span::styled(
                                match got {
                                    ' ' => "·".to_owned(),
                                    c => c.to_string(),
                                },
                                red_bold_style,
                            )
                        }
                    })
                    .collect::<Vec<Span>>();

                if cursor < target_chars.len() {
                    spans.push(Span::styled(
                        target_chars[cursor].to_string(),
                        underlined_dim_bold_style,
                    ));
                    let rest: String = target_chars[cursor + 1..].iter().collect();
                    spans.push(Span::styled(rest, dim_bold_style));
                }

                let prompt = Paragraph::new(Line::from(spans))
                    .alignment(if prompt_occupied_lines == 1 {
                        Alignment::Center
                    } else {
                        Alignment::Left
                    })
                    .wrap(Wrap { trim: true });
                prompt.render(chunks[3], buf);
            }
            Screen::Results => {
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .horizontal_margin(HORIZONTAL_MARGIN)
                    .constraints(
                        [
                            Constraint::Min(1),
                            Constraint::Length(1),
                            Constraint::Length(1),
                            Constraint::Length(1),
                            Constraint::Length(1),
                            Constraint::Min(1),
                        ]
                        .as_ref(),
                    )
                    .split(area);

                if let Some(result) = &self.result {
                    let heading = Paragraph::new(Span::styled(
                        format!("{} - {}", result.rating, result.rating.message()),
                        bold_style,
                    ))
                    .alignment(Alignment::Center);
                    heading.render(chunks[1], buf);

                    let stats = Paragraph::new(Span::styled(
                        format!(
                            "{} wpm   {}% acc   {:.1}s   {}",
                            result.wpm, result.accuracy, result.elapsed_secs, result.tier
                        ),
                        bold_style,
                    ))
                    .alignment(Alignment::Center);
                    stats.render(chunks[2], buf);
                }

                let legend = Paragraph::new(Span::styled("(r)etry / (esc)ape", italic_style))
                    .alignment(Alignment::Center);
                legend.render(chunks[4], buf);
            }
        }
    }
}
