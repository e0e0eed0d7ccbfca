use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind, MouseEvent};
use tokio::sync::mpsc;

pub enum InputEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
}

/// Blocking crossterm reader on its own thread, stopped through a shared flag.
pub struct InputReader {
    running: Arc<AtomicBool>,
    handle: Option<std::thread::JoinHandle<()>>,
}

impl InputReader {
    pub fn start() -> (Self, mpsc::UnboundedReceiver<InputEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let handle = std::thread::spawn(move || {
            while thread_running.load(Ordering::SeqCst) {
                if !event::poll(Duration::from_millis(100)).unwrap_or(false) {
                    continue;
                }
                let forwarded = match event::read() {
                    // only presses; Windows also reports release and repeat
                    Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                        tracing::trace!(?key, "key pressed");
                        tx.send(InputEvent::Key(key))
                    }
                    Ok(Event::Mouse(mouse)) => tx.send(InputEvent::Mouse(mouse)),
                    Ok(Event::Resize(_, _)) => tx.send(InputEvent::Resize),
                    Ok(_) => Ok(()),
                    Err(e) => {
                        tracing::warn!(error = %e, "terminal input read failed");
                        Ok(())
                    }
                };
                if forwarded.is_err() {
                    break;
                }
            }
        });
        (
            Self {
                running,
                handle: Some(handle),
            },
            rx,
        )
    }

    pub fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
