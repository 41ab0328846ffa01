//! Interactive terminal dashboard: the event loop around [`Dashboard`].

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use crossterm::{
    cursor,
    event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::{io::Write, time::Duration};
use tokio::{
    sync::mpsc,
    time::{self, Instant},
};

use weather_core::{
    Action, Dashboard, Effect, EffectRunner, NoticeBoard, NotificationSink,
    clock::{ClockTask, TICK_PERIOD},
    dashboard::Key,
};

use crate::render::render_dashboard;

const KEY_POLL: Duration = Duration::from_millis(100);

pub struct DashboardApp<W: Write> {
    dashboard: Dashboard,
    notices: NoticeBoard,
    runner: EffectRunner,
    actions: mpsc::UnboundedReceiver<Action>,
    out: W,
    tty: bool,
}

impl<W: Write> DashboardApp<W> {
    pub fn new(
        dashboard: Dashboard,
        runner: EffectRunner,
        actions: mpsc::UnboundedReceiver<Action>,
        out: W,
        tty: bool,
    ) -> Self {
        Self { dashboard, notices: NoticeBoard::new(), runner, actions, out, tty }
    }

    /// Feeds one action through the state machine. Returns false once the
    /// user asked to leave.
    pub fn apply(&mut self, action: Action) -> bool {
        let mut keep_running = true;

        for effect in self.dashboard.update(action) {
            match self.runner.dispatch(effect) {
                Some(Effect::Notify(notice)) => self.notices.notify(notice),
                Some(Effect::Exit) => keep_running = false,
                Some(_) | None => {}
            }
        }

        keep_running
    }

    /// Repaints the whole frame. The search text lives in the dashboard state,
    /// so it is redrawn along with everything else.
    pub fn draw(&mut self) -> Result<()> {
        let frame = render_dashboard(&self.dashboard, self.notices.live(), &Local, self.tty);

        if self.tty {
            queue!(self.out, cursor::MoveTo(0, 0), terminal::Clear(ClearType::All))?;
            // Raw mode: a bare newline does not return the cursor to column 0.
            write!(self.out, "{}", frame.replace('\n', "\r\n"))?;
        } else {
            write!(self.out, "{frame}")?;
        }
        self.out.flush().context("Failed to write to terminal")?;
        Ok(())
    }

    /// Runs until the user quits or the key source closes. The clock task is
    /// torn down on return.
    pub async fn run(mut self, mut keys: mpsc::UnboundedReceiver<KeyEvent>) -> Result<()> {
        let (_clock, mut ticks) = ClockTask::spawn(TICK_PERIOD);

        self.apply(Action::Mount);
        self.draw()?;

        loop {
            let expiry = self.notices.next_expiry();

            let event = tokio::select! {
                key = keys.recv() => Event::Key(key),
                Some(action) = self.actions.recv() => Event::Action(action),
                Some(now) = ticks.recv() => Event::Action(Action::Tick(now)),
                _ = time::sleep_until(expiry.unwrap_or_else(Instant::now)), if expiry.is_some() => {
                    Event::NoticeExpired
                }
            };

            match event {
                Event::Key(None) => {
                    tracing::debug!("key source closed, leaving dashboard");
                    return Ok(());
                }
                Event::Key(Some(key)) => {
                    for action in key_actions(key, self.dashboard.input()) {
                        if !self.apply(action) {
                            return Ok(());
                        }
                    }
                }
                Event::Action(action) => {
                    self.apply(action);
                }
                Event::NoticeExpired => {}
            }

            self.notices.prune(Instant::now());
            self.draw()?;
        }
    }
}

enum Event {
    Key(Option<KeyEvent>),
    Action(Action),
    NoticeExpired,
}

/// Maps one key press onto dashboard actions. Printable keys and Backspace
/// edit `input`, the text currently in the search box.
pub fn key_actions(key: KeyEvent, input: &str) -> Vec<Action> {
    if key.kind != KeyEventKind::Press {
        return Vec::new();
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Enter => vec![Action::KeyPressed(Key::Enter)],
        KeyCode::Esc => vec![Action::Quit],
        KeyCode::Char('c') if ctrl => vec![Action::Quit],
        KeyCode::Tab => vec![Action::ToggleTheme],
        KeyCode::Char('t') if ctrl => vec![Action::ToggleTheme],
        KeyCode::Char('u') if ctrl => vec![Action::InputChanged(String::new())],
        KeyCode::Backspace => {
            let mut text = input.to_string();
            text.pop();
            vec![Action::InputChanged(text)]
        }
        KeyCode::Char(c) if !ctrl => {
            let mut text = input.to_string();
            text.push(c);
            vec![Action::InputChanged(text)]
        }
        _ => vec![Action::KeyPressed(Key::Other)],
    }
}

/// Polls the terminal for key presses on a plain thread. The thread stops
/// once the receiver is dropped or the terminal stops answering.
pub fn spawn_key_events() -> mpsc::UnboundedReceiver<KeyEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::spawn(move || {
        while !tx.is_closed() {
            match event::poll(KEY_POLL) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(err) => {
                    tracing::debug!("terminal poll failed: {}", err);
                    break;
                }
            }

            match event::read() {
                Ok(TermEvent::Key(key)) => {
                    if tx.send(key).is_err() {
                        break;
                    }
                }
                // Resizes are picked up by the next repaint.
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!("terminal read failed: {}", err);
                    break;
                }
            }
        }
    });

    rx
}

/// Raw mode and the alternate screen, restored when dropped (including on
/// an early return with an error).
pub struct TerminalGuard(());

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        let guard = TerminalGuard(());
        execute!(std::io::stdout(), EnterAlternateScreen, cursor::Hide)
            .context("Failed to switch to the alternate screen")?;
        Ok(guard)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(std::io::stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

pub fn new_dashboard(light: bool) -> Dashboard {
    let dashboard = Dashboard::new(Utc::now());
    if light { dashboard.with_theme(weather_core::Theme::Light) } else { dashboard }
}
