/// Polling daemon for configured water alert things.
///
/// This module implements the polling side of the service:
/// 1. Resolves every configured location into a client at startup
/// 2. Reports things with bad settings as configuration errors
/// 3. Runs one fixed-delay polling thread per resolved thing
/// 4. Shortens the delay after failures until the next success
///
/// The only shared mutable state is each poller's current `PollHandle`,
/// kept behind a mutex so start and stop never race.

use crate::client::{HttpPageSource, PageSource, WaterAlertClient};
use crate::config::ThingConfig;
use crate::model::WaterAlertError;
use crate::handler::{AlertHandler, PollSchedule, StatusDetail, StatusSink, ThingStatus};
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// Poll handle
// ---------------------------------------------------------------------------

/// Owned, cancellable handle to a running poll thread.
struct PollHandle {
    cancelled: Arc<AtomicBool>,
    wake: Sender<()>,
    thread: JoinHandle<()>,
}

impl PollHandle {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst) || self.thread.is_finished()
    }

    /// Stops the thread at its next wait. Joins unless called from the
    /// poll thread itself.
    fn cancel(self) {
        self.cancelled.store(true, Ordering::SeqCst);
        let _ = self.wake.send(());

        if self.thread.thread().id() != thread::current().id() {
            let _ = self.thread.join();
        }
    }
}

// ---------------------------------------------------------------------------
// Poller
// ---------------------------------------------------------------------------

/// Fixed-delay poller for one thing.
pub struct Poller<S: PageSource + 'static> {
    handler: Arc<AlertHandler<S>>,
    current: Mutex<Option<PollHandle>>,
}

impl<S: PageSource + 'static> Poller<S> {
    pub fn new(handler: AlertHandler<S>) -> Self {
        Self {
            handler: Arc::new(handler),
            current: Mutex::new(None),
        }
    }

    pub fn thing_id(&self) -> &str {
        self.handler.thing_id()
    }

    pub fn schedule(&self) -> PollSchedule {
        self.handler.schedule()
    }

    /// (Re)starts polling: first poll after `delay`, then as the handler's
    /// schedule dictates. Any running poll thread is stopped first.
    pub fn start(&self, delay: Duration) {
        let mut current = self.lock_current();

        if let Some(handle) = current.take() {
            handle.cancel();
        }
        *current = Some(self.spawn(delay));
    }

    /// Stops polling. Safe to call when not running.
    pub fn stop(&self) {
        if let Some(handle) = self.lock_current().take() {
            handle.cancel();
            info!(thing = %self.handler.thing_id(), "Polling stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.lock_current()
            .as_ref()
            .is_some_and(|handle| !handle.is_cancelled())
    }

    fn lock_current(&self) -> std::sync::MutexGuard<'_, Option<PollHandle>> {
        // A panicked poll thread cannot leave the handle half-written
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn spawn(&self, delay: Duration) -> PollHandle {
        let handler = Arc::clone(&self.handler);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let (wake, sleep) = mpsc::channel::<()>();

        let thread = thread::spawn(move || {
            let mut wait = delay;
            loop {
                match sleep.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => {}
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
                if flag.load(Ordering::SeqCst) {
                    break;
                }
                wait = handler.update();
            }
        });

        info!(
            thing = %self.handler.thing_id(),
            delay_secs = delay.as_secs(),
            "Polling scheduled"
        );

        PollHandle {
            cancelled,
            wake,
            thread,
        }
    }
}

impl<S: PageSource + 'static> Drop for Poller<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Daemon
// ---------------------------------------------------------------------------

/// Daemon state: the configured things and their pollers.
pub struct Daemon {
    things: Vec<ThingConfig>,
    sink: Arc<dyn StatusSink>,
    pollers: Vec<Poller<HttpPageSource>>,
    initialized: bool,
}

impl Daemon {
    pub fn new(things: Vec<ThingConfig>, sink: Arc<dyn StatusSink>) -> Self {
        Self {
            things,
            sink,
            pollers: Vec::new(),
            initialized: false,
        }
    }

    /// Builds a poller per thing. Things with a bad location or interval
    /// are marked offline with a configuration error and never polled;
    /// the rest are unaffected.
    pub fn initialize(&mut self) {
        self.pollers.clear();

        for thing in &self.things {
            match Self::client_for(thing) {
                Ok(client) => {
                    info!(
                        thing = %thing.id,
                        council = client.provider().council,
                        url = client.url(),
                        "Thing configured"
                    );
                    let schedule = PollSchedule::hours(thing.refresh_interval);
                    let handler = AlertHandler::new(&thing.id, client, Arc::clone(&self.sink), schedule);
                    self.pollers.push(Poller::new(handler));
                }
                Err(e) => {
                    warn!(thing = %thing.id, error = %e, "Thing not started");
                    let message = match e {
                        WaterAlertError::Configuration(msg) => msg,
                        other => other.to_string(),
                    };
                    self.sink.update_status(
                        &thing.id,
                        ThingStatus::offline(StatusDetail::ConfigurationError, message),
                    );
                }
            }
        }

        if self.pollers.is_empty() {
            warn!("No thing has a usable configuration, nothing will be polled");
        }
        self.initialized = true;
    }

    fn client_for(thing: &ThingConfig) -> Result<WaterAlertClient, WaterAlertError> {
        thing.validate()?;
        WaterAlertClient::new(&thing.location)
    }

    pub fn pollers(&self) -> &[Poller<HttpPageSource>] {
        &self.pollers
    }

    /// Starts every poller after its schedule's initial delay.
    pub fn start(&self) {
        for poller in &self.pollers {
            poller.start(poller.schedule().initial_delay);
        }
    }

    pub fn stop(&self) {
        for poller in &self.pollers {
            poller.stop();
        }
    }

    /// Starts polling and blocks the calling thread for good.
    pub fn run(&self) -> Result<(), Box<dyn Error>> {
        if !self.initialized {
            return Err("Daemon not initialized".into());
        }

        info!("Starting daemon loop, {} thing(s)", self.pollers.len());
        self.start();

        loop {
            thread::park();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::tests::{RecordingSink, ScriptedSource};
    use crate::model::{AlertLevel, WaterAlertError};
    use std::time::Instant;

    fn fast_schedule() -> PollSchedule {
        PollSchedule {
            initial_delay: Duration::ZERO,
            refresh_interval: Duration::from_secs(1),
            retry_interval: Duration::from_millis(20),
        }
    }

    fn poller(
        script: Vec<Result<String, WaterAlertError>>,
        sink: Arc<RecordingSink>,
        schedule: PollSchedule,
    ) -> Poller<ScriptedSource> {
        let client = WaterAlertClient::with_source(ScriptedSource::new(script), "watercare:city").unwrap();
        Poller::new(AlertHandler::new("test", client, sink, schedule))
    }

    fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn test_poller_publishes_after_start() {
        let sink = Arc::new(RecordingSink::default());
        let poller = poller(
            vec![Ok("<strong>Level Three restrictions</strong>".to_string())],
            sink.clone(),
            fast_schedule(),
        );

        poller.start(Duration::ZERO);
        assert!(poller.is_running());
        assert!(wait_for(|| !sink.levels.lock().unwrap().is_empty()));
        poller.stop();

        assert_eq!(sink.levels.lock().unwrap()[0].2, AlertLevel::THREE);
        assert!(!poller.is_running());
    }

    #[test]
    fn test_failures_retry_on_short_interval_then_recover() {
        let sink = Arc::new(RecordingSink::default());
        let timeout = || Err(WaterAlertError::Timeout("deadline".to_string()));
        let poller = poller(
            vec![timeout(), timeout(), Ok("<strong>Level One restrictions</strong>".to_string())],
            sink.clone(),
            fast_schedule(),
        );

        let started = Instant::now();
        poller.start(Duration::ZERO);
        assert!(wait_for(|| !sink.levels.lock().unwrap().is_empty()));
        poller.stop();

        // Two retries at 20ms each, well under a single refresh
        assert!(started.elapsed() < Duration::from_secs(1));
        let statuses = sink.statuses.lock().unwrap();
        assert!(statuses.len() >= 3);
        assert!(!statuses[0].1.is_online());
        assert!(!statuses[1].1.is_online());
        assert!(statuses[2].1.is_online());
    }

    #[test]
    fn test_restart_replaces_running_thread() {
        let sink = Arc::new(RecordingSink::default());
        let poller = poller(
            vec![Ok("<strong>Level Two restrictions</strong>".to_string())],
            sink.clone(),
            fast_schedule(),
        );

        poller.start(Duration::from_secs(60));
        poller.start(Duration::ZERO);
        assert!(wait_for(|| !sink.levels.lock().unwrap().is_empty()));
        poller.stop();
        assert!(!poller.is_running());
    }

    #[test]
    fn test_stop_before_first_poll_publishes_nothing() {
        let sink = Arc::new(RecordingSink::default());
        let poller = poller(
            vec![Ok("<strong>Level Two restrictions</strong>".to_string())],
            sink.clone(),
            fast_schedule(),
        );

        poller.start(Duration::from_secs(60));
        poller.stop();
        poller.stop();

        assert!(sink.statuses.lock().unwrap().is_empty());
    }

    fn thing(id: &str, location: &str) -> ThingConfig {
        ThingConfig {
            id: id.to_string(),
            location: location.to_string(),
            refresh_interval: 5,
        }
    }

    fn offline_message<'a>(statuses: &'a [(String, ThingStatus)], id: &str) -> Option<&'a str> {
        statuses.iter().find(|(thing, _)| thing == id).and_then(|(_, status)| match status {
            ThingStatus::Offline {
                detail: StatusDetail::ConfigurationError,
                message,
            } => Some(message.as_str()),
            _ => None,
        })
    }

    #[test]
    fn test_daemon_reports_bad_locations_as_configuration_errors() {
        let sink = Arc::new(RecordingSink::default());
        let mut daemon = Daemon::new(vec![thing("nowhere", "wellington:city")], sink.clone());

        daemon.initialize();
        assert!(daemon.pollers().is_empty());

        let statuses = sink.statuses.lock().unwrap();
        assert!(offline_message(&statuses, "nowhere").is_some());
    }

    #[test]
    fn test_missing_location_does_not_stop_other_things() {
        let sink = Arc::new(RecordingSink::default());
        let mut daemon = Daemon::new(vec![thing("good", "watercare:city"), thing("bad", "")], sink.clone());

        daemon.initialize();

        assert_eq!(daemon.pollers().len(), 1);
        assert_eq!(daemon.pollers()[0].thing_id(), "good");
        let statuses = sink.statuses.lock().unwrap();
        assert_eq!(offline_message(&statuses, "bad"), Some("No location configured"));
        assert!(offline_message(&statuses, "good").is_none());
    }

    #[test]
    fn test_out_of_range_interval_is_a_configuration_error() {
        let sink = Arc::new(RecordingSink::default());
        let mut huge = thing("huge", "watercare:city");
        huge.refresh_interval = u64::MAX;
        let mut daemon = Daemon::new(vec![huge], sink.clone());

        daemon.initialize();

        assert!(daemon.pollers().is_empty());
        assert!(offline_message(&sink.statuses.lock().unwrap(), "huge").is_some());
    }

    #[test]
    fn test_daemon_run_requires_initialization() {
        let daemon = Daemon::new(Vec::new(), Arc::new(RecordingSink::default()));
        assert!(daemon.run().is_err(), "should fail before initialization");
    }
}
