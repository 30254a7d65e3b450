use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};

pub enum AppEvent {
    /// A key press, stamped with when it was read.
    Key(KeyEvent, Instant),
    Tick(Instant),
    Resize,
}

/// Terminal input and clock ticks merged onto one channel.
///
/// A background thread polls the terminal for up to `tick_rate`; if nothing
/// arrives it sends a tick. Round timing never depends on tick regularity,
/// only on the instants carried by the events.
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    _tx: mpsc::Sender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            let mut last_tick = Instant::now();
            loop {
                let timeout = tick_rate.saturating_sub(last_tick.elapsed());
                if event::poll(timeout).unwrap_or(false) {
                    let sent = match event::read() {
                        Ok(Event::Key(key)) => tx.send(AppEvent::Key(key, Instant::now())),
                        Ok(Event::Resize(_, _)) => tx.send(AppEvent::Resize),
                        _ => Ok(()),
                    };
                    if sent.is_err() {
                        return;
                    }
                }
                if last_tick.elapsed() >= tick_rate {
                    last_tick = Instant::now();
                    if tx.send(AppEvent::Tick(last_tick)).is_err() {
                        return;
                    }
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<AppEvent> {
        Ok(self.rx.recv()?)
    }
}
