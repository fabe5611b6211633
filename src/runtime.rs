use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};
use log::debug;

/// Unified event type consumed by the app loop. Keyboard input and timer
/// ticks arrive through one channel, so signals aimed at the same session
/// are processed strictly one at a time.
#[derive(Clone, Debug)]
pub enum UiEvent {
    Key(KeyEvent),
    Resize,
    Tick,
}

/// Source of app events (keyboard, resize, ticks).
pub trait UiEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    fn recv_timeout(&self, timeout: Duration) -> Result<UiEvent, RecvTimeoutError>;
}

/// Handle to a repeating tick schedule. `stop` halts the ticker thread
/// before its next send; dropping the handle stops it too.
pub struct TickerHandle {
    stop: Arc<AtomicBool>,
}

impl TickerHandle {
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn a thread that sends `UiEvent::Tick` every `interval` until stopped
/// or the receiving side goes away.
pub fn spawn_ticker(tx: Sender<UiEvent>, interval: Duration) -> TickerHandle {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);

    thread::spawn(move || loop {
        thread::sleep(interval);
        if flag.load(Ordering::Relaxed) {
            debug!("ticker cancelled");
            break;
        }
        if tx.send(UiEvent::Tick).is_err() {
            break;
        }
    });

    TickerHandle { stop }
}

/// Production event source: a reader thread forwarding crossterm input plus
/// the tick schedule, multiplexed onto one channel.
pub struct CrosstermEventSource {
    rx: Receiver<UiEvent>,
}

impl CrosstermEventSource {
    pub fn new(tick_interval: Duration) -> (Self, TickerHandle) {
        let (tx, rx) = mpsc::channel();

        let input_tx = tx.clone();
        thread::spawn(move || loop {
            match event::read() {
                Ok(CtEvent::Key(key)) => {
                    if input_tx.send(UiEvent::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(CtEvent::Resize(_, _)) => {
                    if input_tx.send(UiEvent::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(_) => break,
            }
        });

        let ticker = spawn_ticker(tx, tick_interval);
        (Self { rx }, ticker)
    }
}

impl UiEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<UiEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Test event source fed from a plain channel.
pub struct TestEventSource {
    rx: Receiver<UiEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<UiEvent>) -> Self {
        Self { rx }
    }
}

impl UiEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<UiEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Advances the app one event at a time in headless runs: real events pass
/// through, and a quiet source yields `Tick` after `tick_timeout`, which
/// keeps countdown-driven flows moving without a wall-clock ticker thread.
pub struct Runner<E: UiEventSource> {
    source: E,
    tick_timeout: Duration,
}

impl<E: UiEventSource> Runner<E> {
    pub fn new(source: E, tick_timeout: Duration) -> Self {
        Self {
            source,
            tick_timeout,
        }
    }

    pub fn step(&self) -> UiEvent {
        match self.source.recv_timeout(self.tick_timeout) {
            Ok(event) => event,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => UiEvent::Tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(1));

        match runner.step() {
            UiEvent::Tick => {}
            other => panic!("expected Tick on timeout, got {other:?}"),
        }
    }

    #[test]
    fn test_step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(UiEvent::Resize).unwrap();
        let runner = Runner::new(TestEventSource::new(rx), Duration::from_millis(10));

        match runner.step() {
            UiEvent::Resize => {}
            other => panic!("expected Resize, got {other:?}"),
        }
    }

    #[test]
    fn test_ticker_sends_ticks() {
        let (tx, rx) = mpsc::channel();
        let _handle = spawn_ticker(tx, Duration::from_millis(5));

        let event = rx
            .recv_timeout(Duration::from_millis(500))
            .expect("ticker should produce an event");
        assert!(matches!(event, UiEvent::Tick));
    }

    #[test]
    fn test_ticker_stops_on_cancel() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_ticker(tx, Duration::from_millis(5));

        rx.recv_timeout(Duration::from_millis(500))
            .expect("ticker should be running");

        handle.stop();
        // One tick may already be in flight; after draining it, the stopped
        // ticker must stay silent.
        thread::sleep(Duration::from_millis(20));
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(30));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_ticker_stops_when_handle_dropped() {
        let (tx, rx) = mpsc::channel();
        let handle = spawn_ticker(tx, Duration::from_millis(5));
        drop(handle);

        thread::sleep(Duration::from_millis(20));
        while rx.try_recv().is_ok() {}
        thread::sleep(Duration::from_millis(30));
        assert!(rx.try_recv().is_err());
    }
}
