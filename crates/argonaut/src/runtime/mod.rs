//! The terminal event/render loop.
//!
//! One loop owns the message receiver, so exactly one dispatch runs at a
//! time; tasks, forwarders, and the reader thread only post messages.

use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use crossterm::event::Event;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::sync::mpsc;

use crate::app::message::Message;
use crate::app::{App, ExternalJob};
use crate::ui;

mod event;
pub mod mode;
mod terminal;

pub(crate) type TuiTerminal = Terminal<CrosstermBackend<io::Stdout>>;

const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the TUI loop until the user exits.
///
/// # Errors
/// Returns an error if terminal setup, rendering, or event processing
/// fails.
pub async fn run(app: &mut App, mut messages: mpsc::UnboundedReceiver<Message>) -> io::Result<()> {
    let _terminal_guard = terminal::TerminalGuard;
    let mut terminal = terminal::setup_terminal()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let _reader = event::spawn_event_reader(event_tx, Arc::clone(&shutdown));

    let mut tick = tokio::time::interval(TICK_INTERVAL);
    tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        if !app.rendering_paused {
            terminal.draw(|frame| ui::render(frame, app))?;
        }

        tokio::select! {
            biased;
            event = event_rx.recv() => {
                process_terminal_event(app, event);
                // Drain queued events so rapid key presses are processed
                // immediately instead of one-per-frame.
                while let Ok(event) = event_rx.try_recv() {
                    process_terminal_event(app, Some(event));
                }
            }
            message = messages.recv() => {
                if let Some(message) = message {
                    process_message(app, message);
                }
                while let Ok(message) = messages.try_recv() {
                    process_message(app, message);
                }
            }
            _ = tick.tick() => {
                if !app.rendering_paused {
                    app.dispatch(Message::Tick);
                }
            }
        }

        if let Some(job) = app.take_external_job() {
            run_external_job(app, &mut terminal, job).await?;
        }

        if app.should_quit {
            break;
        }
    }

    app.shutdown();
    shutdown.store(true, std::sync::atomic::Ordering::Relaxed);
    terminal.show_cursor()?;

    Ok(())
}

fn process_terminal_event(app: &mut App, event: Option<Event>) {
    if let Some(Event::Key(key)) = event {
        process_message(app, Message::Key(key));
    }
}

/// Routes one bus message: keys go to the active mode handler, everything
/// else to the dispatcher.
fn process_message(app: &mut App, message: Message) {
    match message {
        Message::Key(key) => mode::handle_key(app, key),
        other => app.dispatch(other),
    }
}

/// Hands the terminal to an external process and reports its exit.
///
/// Rendering is paused, the TTY released, the process awaited, and the
/// result posted back as `ExternalDone` (subject to the epoch gate).
async fn run_external_job(
    app: &mut App,
    tui: &mut TuiTerminal,
    job: ExternalJob,
) -> io::Result<()> {
    let ExternalJob {
        intent,
        command,
        epoch,
    } = job;

    app.dispatch(Message::PauseRendering);
    terminal::release(tui)?;

    let status = tokio::process::Command::new("sh")
        .arg("-c")
        .arg(&command)
        .status()
        .await;

    terminal::reclaim(tui)?;
    app.dispatch(Message::ResumeRendering);

    let (success, detail) = match status {
        Ok(status) if status.success() => (true, None),
        Ok(status) => (false, Some(format!("command exited with {status}"))),
        Err(error) => (false, Some(error.to_string())),
    };
    app.dispatch(Message::ExternalDone {
        epoch,
        intent,
        success,
        detail,
    });

    Ok(())
}

