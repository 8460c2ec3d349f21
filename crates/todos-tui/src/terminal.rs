//! Terminal ownership and the blocking event loop.

use std::io::{self, Stdout};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{debug, info};

use todos_store::TaskStore;

use crate::presenter::{Action, Presenter};
use crate::ui;

/// Raw mode, alternate screen and mouse capture, undone on drop.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn enter() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(e);
        }
        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), DisableMouseCapture, LeaveAlternateScreen);
                Err(e)
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        // Best effort: there is nowhere left to report a failure.
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Take over the terminal and run until the user quits.
///
/// The terminal is restored on every exit path, including errors and
/// panics that unwind through here.
pub fn run<S: TaskStore>(presenter: &mut Presenter<S>) -> io::Result<()> {
    let mut session = TerminalSession::enter()?;
    info!("terminal session started");
    let result = drive(&mut session.terminal, presenter, || event::read().map(Some));
    drop(session);
    info!(ok = result.is_ok(), "terminal session ended");
    result
}

/// Draw, wait for an event, apply it, repeat.
///
/// Mouse events are hit-tested against the frame just drawn.
/// `next_event` returning `Ok(None)` ends the loop as if the user quit.
pub fn drive<B, S, F>(terminal: &mut Terminal<B>, presenter: &mut Presenter<S>, mut next_event: F) -> io::Result<()>
where
    B: Backend,
    S: TaskStore,
    F: FnMut() -> io::Result<Option<Event>>,
{
    loop {
        let area = terminal.draw(|frame| ui::render(frame, presenter))?.area;

        match next_event()? {
            None => return Ok(()),
            Some(Event::Key(key)) => {
                if presenter.handle_key(key) == Action::Quit {
                    debug!("quit requested");
                    return Ok(());
                }
            }
            Some(Event::Mouse(mouse)) => {
                if let Some(target) = ui::target_at(presenter, area, mouse.column, mouse.row) {
                    presenter.handle_mouse(mouse.kind, target);
                }
            }
            // Resize needs nothing beyond the redraw at the top of the loop
            Some(Event::Resize(width, height)) => debug!(width, height, "terminal resized"),
            Some(_) => {}
        }
    }
}
