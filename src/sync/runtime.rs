//! Status Synchronizer task.
//!
//! One tokio task owns the [`SyncState`] and handles one message at a time:
//! timer ticks, network completions, push events and user commands. Network
//! calls run as spawned tasks that report back through a completion channel,
//! so a slow request never delays the countdown or push handling. Consumers
//! read [`SyncSnapshot`]s from a `watch` channel.

use crate::consts::cli_consts::{
    COMPLETION_QUEUE_SIZE, DASHBOARD_LOG_LIMIT,
    requests,
    sync::{MIN_POLL_INTERVAL_SECS, countdown_tick, error_ttl, feed_refresh, poll_interval},
};
use crate::events::{Event, EventSender, EventType, Source};
use crate::gateway::Gateway;
use crate::gateway::error::GatewayError;
use crate::gateway::types::{LogPage, LogQuery, Statistics, StatusUpdate};
use crate::logging::LogLevel;
use crate::network::ErrorHandler;
use crate::push::PushEvent;
use crate::sync::errors::Operation;
use crate::sync::state::{Effect, LoadState, PollTicket, SyncSnapshot, SyncState};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};

/// User-triggered requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Ask the backend for a new pairing attempt, then resynchronize.
    RefreshQr,
    /// Log the WhatsApp session out, then resynchronize.
    Disconnect,
    /// Poll immediately and reload statistics and recent logs.
    Poll,
}

#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub error_ttl: Duration,
    /// Statistics and recent log refresh period; `None` disables the feed.
    pub feed_refresh: Option<Duration>,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: poll_interval(),
            request_timeout: requests::timeout(),
            error_ttl: error_ttl(),
            feed_refresh: Some(feed_refresh()),
        }
    }
}

impl SyncSettings {
    /// Poll interval in seconds, raised to the supported minimum.
    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval = Duration::from_secs(secs.max(MIN_POLL_INTERVAL_SECS));
        self
    }

    pub fn without_feed(mut self) -> Self {
        self.feed_refresh = None;
        self
    }
}

enum Completion {
    Status {
        ticket: PollTicket,
        result: Result<StatusUpdate, GatewayError>,
    },
    Qr(Result<Option<String>, GatewayError>),
    Statistics(Result<Statistics, GatewayError>),
    Logs(Result<LogPage, GatewayError>),
    Action {
        command: Command,
        result: Result<(), GatewayError>,
    },
}

/// Consumer side of a running synchronizer.
#[derive(Clone)]
pub struct SyncHandle {
    snapshots: watch::Receiver<SyncSnapshot>,
    commands: mpsc::Sender<Command>,
}

impl SyncHandle {
    pub fn snapshot(&self) -> SyncSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.snapshots.clone()
    }

    /// Queues a command without waiting. Returns `false` if the queue is full or closed.
    pub fn request(&self, command: Command) -> bool {
        self.commands.try_send(command).is_ok()
    }

    pub async fn send(&self, command: Command) -> bool {
        self.commands.send(command).await.is_ok()
    }
}

/// Bounds a gateway call by `limit`, reporting expiry as [`GatewayError::Timeout`].
pub async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, GatewayError>>,
) -> Result<T, GatewayError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(GatewayError::Timeout))
}

pub struct StatusSynchronizer {
    gateway: Arc<dyn Gateway>,
    settings: SyncSettings,
    state: SyncState,
    snapshot_tx: watch::Sender<SyncSnapshot>,
    events: EventSender,
    error_handler: ErrorHandler,
    completion_tx: mpsc::Sender<Completion>,
    completion_rx: mpsc::Receiver<Completion>,
    commands_rx: mpsc::Receiver<Command>,
    polls_in_flight: usize,
}

impl StatusSynchronizer {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        settings: SyncSettings,
        event_sender: mpsc::Sender<Event>,
    ) -> (Self, SyncHandle) {
        let state = SyncState::new();
        let (snapshot_tx, snapshot_rx) = watch::channel(state.snapshot());
        let (commands_tx, commands_rx) = mpsc::channel(COMPLETION_QUEUE_SIZE);
        let (completion_tx, completion_rx) = mpsc::channel(COMPLETION_QUEUE_SIZE);
        let synchronizer = Self {
            gateway,
            settings,
            state,
            snapshot_tx,
            events: EventSender::new(event_sender),
            error_handler: ErrorHandler::new(),
            completion_tx,
            completion_rx,
            commands_rx,
            polls_in_flight: 0,
        };
        let handle = SyncHandle {
            snapshots: snapshot_rx,
            commands: commands_tx,
        };
        (synchronizer, handle)
    }

    /// Runs until shutdown. Polls and refreshes the feed once immediately.
    pub async fn run(
        mut self,
        mut push: mpsc::Receiver<PushEvent>,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let mut poll = tokio::time::interval(self.settings.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut countdown = tokio::time::interval(countdown_tick());
        countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let feed_enabled = self.settings.feed_refresh.is_some();
        let mut feed = tokio::time::interval(self.settings.feed_refresh.unwrap_or(feed_refresh()));
        feed.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut push_open = true;
        let mut commands_open = true;

        loop {
            tokio::select! {
                _ = shutdown.recv() => break,
                _ = poll.tick() => self.spawn_poll(false),
                _ = countdown.tick() => self.on_tick().await,
                _ = feed.tick(), if feed_enabled => self.spawn_feed(),
                event = push.recv(), if push_open => match event {
                    Some(event) => self.on_push(event).await,
                    None => push_open = false,
                },
                command = self.commands_rx.recv(), if commands_open => match command {
                    Some(command) => self.on_command(command),
                    None => commands_open = false,
                },
                Some(done) = self.completion_rx.recv() => self.on_completion(done).await,
            }
            self.publish();
        }
        log::debug!("status synchronizer stopped");
    }

    fn publish(&self) {
        let snapshot = self.state.snapshot();
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }

    fn spawn_completion<F>(&self, task: F)
    where
        F: Future<Output = Completion> + Send + 'static,
    {
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(task.await).await;
        });
    }

    /// Scheduled polls are skipped while one is outstanding; forced polls are not.
    fn spawn_poll(&mut self, forced: bool) {
        if !forced && self.polls_in_flight > 0 {
            log::debug!("poll still in flight, skipping tick");
            return;
        }
        let ticket = self.state.begin_poll();
        self.polls_in_flight += 1;
        let gateway = self.gateway.clone();
        let limit = self.settings.request_timeout;
        self.spawn_completion(async move {
            let result = bounded(limit, gateway.status()).await;
            Completion::Status { ticket, result }
        });
    }

    fn spawn_qr_fetch(&self) {
        let gateway = self.gateway.clone();
        let limit = self.settings.request_timeout;
        self.spawn_completion(async move { Completion::Qr(bounded(limit, gateway.qr_code()).await) });
    }

    fn spawn_feed(&self) {
        let gateway = self.gateway.clone();
        let limit = self.settings.request_timeout;
        self.spawn_completion(async move {
            Completion::Statistics(bounded(limit, gateway.statistics()).await)
        });

        let gateway = self.gateway.clone();
        self.spawn_completion(async move {
            let query = LogQuery::recent(DASHBOARD_LOG_LIMIT);
            Completion::Logs(bounded(limit, gateway.logs(&query)).await)
        });
    }

    fn spawn_action(&self, command: Command) {
        let gateway = self.gateway.clone();
        let limit = self.settings.request_timeout;
        self.spawn_completion(async move {
            let result = match command {
                Command::Disconnect => bounded(limit, gateway.disconnect()).await,
                Command::RefreshQr => bounded(limit, gateway.refresh_qr()).await,
                Command::Poll => Ok(()),
            };
            Completion::Action { command, result }
        });
    }

    fn run_effects(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchQr => self.spawn_qr_fetch(),
            }
        }
    }

    async fn on_tick(&mut self) {
        let effects = self.state.tick();
        if !effects.is_empty() {
            self.events
                .send_info(
                    Source::QrCode,
                    "QR code expired, fetching a new one",
                    EventType::Refresh,
                )
                .await;
        }
        self.run_effects(effects);
        self.state
            .expire_errors(Instant::now(), self.settings.error_ttl);
    }

    fn on_command(&mut self, command: Command) {
        match command {
            Command::Poll => {
                log::info!("user requested a resync");
                self.spawn_poll(true);
                self.spawn_feed();
            }
            Command::Disconnect | Command::RefreshQr => {
                log::info!("user requested {:?}", command);
                self.spawn_action(command);
            }
        }
    }

    async fn on_push(&mut self, event: PushEvent) {
        match event {
            PushEvent::Connected => {
                self.state.record_success(Operation::Socket);
                self.events
                    .send_info(Source::Push, "Push channel connected", EventType::Success)
                    .await;
            }
            PushEvent::Disconnected(reason) => {
                self.state
                    .record_failure(Operation::Socket, reason.clone(), Instant::now());
                self.events
                    .send_error(
                        Source::Push,
                        format!("Push channel lost: {}", reason),
                        LogLevel::Warn,
                    )
                    .await;
            }
            PushEvent::GaveUp(reason) => {
                let message = format!("Push channel unavailable: {}", reason);
                self.state
                    .record_failure(Operation::Socket, message.clone(), Instant::now());
                self.events
                    .send_error(Source::Push, message, LogLevel::Error)
                    .await;
            }
            PushEvent::WhatsappStatus(update) => {
                let was_connected = self.state.status().connected;
                let carried_qr = update.qrcode.is_some();
                let outcome = self.state.apply_push(update);
                if outcome.stale {
                    return;
                }
                if carried_qr && !self.state.status().connected {
                    self.events
                        .send_info(Source::Push, "New pairing QR code pushed", EventType::Refresh)
                        .await;
                }
                self.announce_connection(Source::Push, was_connected).await;
                self.run_effects(outcome.effects);
            }
            PushEvent::OtpLog(entry) => {
                let event_type = if entry.is_success() {
                    EventType::Success
                } else {
                    EventType::Notice
                };
                let message = format!("OTP to {}: {}", entry.phone, entry.status);
                self.state.push_log(entry);
                self.events
                    .send_info(Source::Feed, message, event_type)
                    .await;
            }
        }
    }

    async fn on_completion(&mut self, done: Completion) {
        match done {
            Completion::Status { ticket, result } => {
                self.polls_in_flight = self.polls_in_flight.saturating_sub(1);
                match result {
                    Ok(update) => {
                        let was_connected = self.state.status().connected;
                        let was_loaded = self.state.status().load_state == LoadState::Ok;
                        let outcome = self.state.apply_poll(ticket, update);
                        if outcome.stale {
                            return;
                        }
                        if !was_loaded {
                            self.events
                                .send_info(Source::Poller, "Status loaded", EventType::Success)
                                .await;
                        }
                        self.announce_connection(Source::Poller, was_connected).await;
                        self.run_effects(outcome.effects);
                    }
                    Err(e) => self.fail(Operation::Status, Source::Poller, &e).await,
                }
            }
            Completion::Qr(Ok(image)) => {
                if self.state.apply_qr(image) {
                    self.events
                        .send_info(
                            Source::QrCode,
                            "Pairing QR code ready, scan it with WhatsApp",
                            EventType::Waiting,
                        )
                        .await;
                }
            }
            Completion::Qr(Err(e)) => self.fail(Operation::Qr, Source::QrCode, &e).await,
            Completion::Statistics(Ok(statistics)) => {
                self.state.apply_statistics(statistics);
            }
            Completion::Statistics(Err(e)) => {
                self.fail(Operation::Statistik, Source::Feed, &e).await
            }
            Completion::Logs(Ok(page)) => {
                self.state.apply_recent_logs(page.data);
            }
            Completion::Logs(Err(e)) => self.fail(Operation::Logs, Source::Feed, &e).await,
            Completion::Action { command, result } => {
                let (operation, done_message) = match command {
                    Command::Disconnect => (Operation::Disconnect, "Disconnect requested"),
                    Command::RefreshQr => (Operation::Refresh, "New pairing attempt requested"),
                    Command::Poll => return,
                };
                match result {
                    Ok(()) => {
                        self.state.record_success(operation);
                        self.events
                            .send_info(Source::Action, done_message, EventType::Success)
                            .await;
                        self.spawn_poll(true);
                    }
                    Err(e) => self.fail(operation, Source::Action, &e).await,
                }
            }
        }
    }

    async fn announce_connection(&self, source: Source, was_connected: bool) {
        let status = self.state.status();
        if status.connected == was_connected {
            return;
        }
        if status.connected {
            let phone = status.phone_number.as_deref().unwrap_or("unknown number");
            self.events
                .send_info(
                    source,
                    format!("WhatsApp connected ({})", phone),
                    EventType::Success,
                )
                .await;
        } else {
            self.events
                .send_info(source, "WhatsApp disconnected", EventType::Notice)
                .await;
        }
    }

    async fn fail(&mut self, operation: Operation, source: Source, error: &GatewayError) {
        let message = self.error_handler.short_message(error);
        let level = self.error_handler.classify_error(error);
        log::warn!("{} failed: {}", operation, error);
        self.state
            .record_failure(operation, message.clone(), Instant::now());
        self.events
            .send_error(source, format!("{} failed: {}", operation, message), level)
            .await;
    }
}

/// Spawns a synchronizer and returns its handle with the task's join handle.
pub fn spawn(
    gateway: Arc<dyn Gateway>,
    settings: SyncSettings,
    event_sender: mpsc::Sender<Event>,
    push: mpsc::Receiver<PushEvent>,
    shutdown: broadcast::Receiver<()>,
) -> (SyncHandle, tokio::task::JoinHandle<()>) {
    let (synchronizer, handle) = StatusSynchronizer::new(gateway, settings, event_sender);
    let join = tokio::spawn(synchronizer.run(push, shutdown));
    (handle, join)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MockGateway;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    const QR_A: &str = "data:image/png;base64,QUFB";
    const QR_B: &str = "data:image/png;base64,QkJC";

    /// Long enough that only the initial poll happens on its own.
    fn quiet_settings() -> SyncSettings {
        SyncSettings {
            poll_interval: Duration::from_secs(3600),
            ..SyncSettings::default()
        }
        .without_feed()
    }

    struct Harness {
        handle: SyncHandle,
        push: mpsc::Sender<PushEvent>,
        shutdown: broadcast::Sender<()>,
        join: tokio::task::JoinHandle<()>,
        _events: mpsc::Receiver<Event>,
    }

    fn start(gateway: MockGateway, settings: SyncSettings) -> Harness {
        let (event_tx, event_rx) = mpsc::channel(100);
        let (push_tx, push_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let (handle, join) = spawn(Arc::new(gateway), settings, event_tx, push_rx, shutdown_rx);
        Harness {
            handle,
            push: push_tx,
            shutdown: shutdown_tx,
            join,
            _events: event_rx,
        }
    }

    impl Harness {
        async fn wait_for(&self, predicate: impl Fn(&SyncSnapshot) -> bool) -> SyncSnapshot {
            let mut rx = self.handle.subscribe();
            let wait = async {
                loop {
                    {
                        let snapshot = rx.borrow_and_update();
                        if predicate(&*snapshot) {
                            return (*snapshot).clone();
                        }
                    }
                    rx.changed().await.unwrap();
                }
            };
            tokio::time::timeout(Duration::from_secs(120), wait)
                .await
                .expect("snapshot condition never met")
        }

        async fn stop(self) {
            self.shutdown.send(()).unwrap();
            self.join.await.unwrap();
        }
    }

    fn waiting_for_scan() -> StatusUpdate {
        StatusUpdate::connected(false).with_qr_available(true)
    }

    #[tokio::test(start_paused = true)]
    async fn bounded_maps_expiry_to_timeout() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(11)).await;
            Ok::<_, GatewayError>(())
        };
        let result = bounded(requests::timeout(), slow).await;
        assert!(matches!(result, Err(GatewayError::Timeout)));
    }

    #[tokio::test(start_paused = true)]
    /// Initial poll plus QR fetch shows the code with a full window.
    async fn initial_poll_displays_qr() {
        let mut gateway = MockGateway::new();
        gateway.expect_status().returning(|| Ok(waiting_for_scan()));
        gateway
            .expect_qr_code()
            .returning(|| Ok(Some(QR_A.to_string())));

        let harness = start(gateway, quiet_settings());
        let snapshot = harness.wait_for(|s| s.qr.is_some()).await;
        let qr = snapshot.qr.unwrap();
        assert_eq!(qr.image_data_uri, QR_A);
        assert_eq!(qr.expires_in_seconds, 20);
        assert_eq!(snapshot.status.load_state, LoadState::Ok);
        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn push_connected_clears_displayed_qr() {
        let mut gateway = MockGateway::new();
        gateway.expect_status().returning(|| Ok(waiting_for_scan()));
        gateway
            .expect_qr_code()
            .returning(|| Ok(Some(QR_A.to_string())));

        let harness = start(gateway, quiet_settings());
        harness.wait_for(|s| s.qr.is_some()).await;

        harness
            .push
            .send(PushEvent::WhatsappStatus(
                StatusUpdate::connected(true).with_phone_number("628123456789"),
            ))
            .await
            .unwrap();
        let snapshot = harness.wait_for(|s| s.status.connected).await;
        assert!(snapshot.qr.is_none());
        assert_eq!(snapshot.status.phone_number.as_deref(), Some("628123456789"));
        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    /// The countdown running out fetches a new code exactly once.
    async fn countdown_expiry_fetches_new_qr() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let counter = fetches.clone();
        let mut gateway = MockGateway::new();
        gateway.expect_status().returning(|| Ok(waiting_for_scan()));
        gateway.expect_qr_code().returning(move || {
            let image = if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                QR_A
            } else {
                QR_B
            };
            Ok(Some(image.to_string()))
        });

        let harness = start(gateway, quiet_settings());
        harness.wait_for(|s| s.qr.is_some()).await;
        let snapshot = harness
            .wait_for(|s| s.qr.as_ref().is_some_and(|qr| qr.image_data_uri == QR_B))
            .await;
        assert_eq!(snapshot.qr.unwrap().expires_in_seconds, 20);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    /// A failed poll is reported per operation, keeps the status, and the next
    /// scheduled poll recovers.
    async fn failed_poll_keeps_status_and_recovers() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut gateway = MockGateway::new();
        gateway.expect_status().returning(move || {
            match counter.fetch_add(1, Ordering::SeqCst) {
                1 => Err(GatewayError::Timeout),
                _ => Ok(StatusUpdate::connected(true).with_phone_number("628123456789")),
            }
        });

        // Errors outlive the test so only a successful poll can clear them.
        let settings = SyncSettings {
            error_ttl: Duration::from_secs(600),
            ..SyncSettings::default()
        }
        .with_poll_interval_secs(5)
        .without_feed();
        let harness = start(gateway, settings);
        harness.wait_for(|s| s.status.connected).await;

        let failed = harness
            .wait_for(|s| s.error(Operation::Status).is_some())
            .await;
        assert_eq!(failed.error(Operation::Status), Some("Request timed out"));
        assert!(failed.status.connected);
        assert_eq!(failed.status.load_state, LoadState::Ok);

        let recovered = harness
            .wait_for(|s| s.error(Operation::Status).is_none())
            .await;
        assert!(recovered.status.connected);
        assert!(calls.load(Ordering::SeqCst) >= 3);
        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    /// Disconnect posts to the backend and the forced poll decides the outcome.
    async fn disconnect_resyncs_from_poll() {
        let disconnected = Arc::new(AtomicBool::new(false));
        let polled_state = disconnected.clone();
        let mut gateway = MockGateway::new();
        gateway.expect_status().returning(move || {
            if polled_state.load(Ordering::SeqCst) {
                Ok(waiting_for_scan())
            } else {
                Ok(StatusUpdate::connected(true).with_phone_number("628123456789"))
            }
        });
        let flag = disconnected.clone();
        gateway.expect_disconnect().times(1).returning(move || {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        gateway
            .expect_qr_code()
            .returning(|| Ok(Some(QR_A.to_string())));

        let harness = start(gateway, quiet_settings());
        harness.wait_for(|s| s.status.connected).await;

        assert!(harness.handle.send(Command::Disconnect).await);
        let snapshot = harness
            .wait_for(|s| !s.status.connected && s.qr.is_some())
            .await;
        assert!(snapshot.status.qr_available);
        assert_eq!(snapshot.status.phone_number, None);
        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn failed_action_sets_its_own_error() {
        let mut gateway = MockGateway::new();
        gateway
            .expect_status()
            .returning(|| Ok(StatusUpdate::connected(true)));
        gateway.expect_refresh_qr().times(1).returning(|| {
            Err(GatewayError::Http {
                status: 503,
                message: String::new(),
            })
        });

        let harness = start(gateway, quiet_settings());
        harness.wait_for(|s| s.status.connected).await;
        assert!(harness.handle.request(Command::RefreshQr));

        let snapshot = harness
            .wait_for(|s| s.error(Operation::Refresh).is_some())
            .await;
        assert!(snapshot.error(Operation::Status).is_none());
        assert!(snapshot.status.connected);

        // Errors expire on their own.
        let cleared = harness.wait_for(|s| s.errors.is_empty()).await;
        assert!(cleared.status.connected);
        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    /// A manual resync polls at once and reloads the feed even when the feed
    /// timer is off.
    async fn poll_command_resyncs_status_and_feed() {
        use crate::gateway::types::LogEntry;

        let polls = Arc::new(AtomicUsize::new(0));
        let counter = polls.clone();
        let mut gateway = MockGateway::new();
        gateway.expect_status().returning(move || {
            match counter.fetch_add(1, Ordering::SeqCst) {
                0 => Err(GatewayError::Timeout),
                _ => Ok(StatusUpdate::connected(true).with_phone_number("628123456789")),
            }
        });
        gateway.expect_statistics().times(1).returning(|| {
            Ok(Statistics {
                sent_today: 3,
                failed_today: 0,
                success_rate: 100.0,
            })
        });
        gateway.expect_logs().times(1).returning(|_| {
            Ok(LogPage {
                data: vec![LogEntry {
                    id: None,
                    phone: "628777".to_string(),
                    time: None,
                    status: "success".to_string(),
                    message: None,
                }],
                pagination: None,
            })
        });

        let settings = SyncSettings {
            error_ttl: Duration::from_secs(600),
            ..quiet_settings()
        };
        let harness = start(gateway, settings);
        let failed = harness
            .wait_for(|s| s.error(Operation::Status).is_some())
            .await;
        assert!(failed.statistics.is_none());

        assert!(harness.handle.request(Command::Poll));
        let snapshot = harness
            .wait_for(|s| s.status.connected && s.statistics.is_some() && !s.recent_logs.is_empty())
            .await;
        assert!(snapshot.error(Operation::Status).is_none());
        assert_eq!(snapshot.recent_logs[0].phone, "628777");
        assert_eq!(polls.load(Ordering::SeqCst), 2);
        harness.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn feed_and_pushed_logs_fill_recent_logs() {
        use crate::gateway::types::LogEntry;

        let entry = |phone: &str, status: &str| LogEntry {
            id: None,
            phone: phone.to_string(),
            time: None,
            status: status.to_string(),
            message: None,
        };
        let initial: Vec<LogEntry> = (1..=4)
            .map(|i| entry(&format!("62810{}", i), "success"))
            .collect();

        let mut gateway = MockGateway::new();
        gateway
            .expect_status()
            .returning(|| Ok(StatusUpdate::connected(true)));
        gateway.expect_statistics().returning(|| {
            Ok(Statistics {
                sent_today: 12,
                failed_today: 1,
                success_rate: 92.3,
            })
        });
        gateway
            .expect_logs()
            .returning(move |_| {
                Ok(LogPage {
                    data: initial.clone(),
                    pagination: None,
                })
            });

        let settings = SyncSettings {
            poll_interval: Duration::from_secs(3600),
            ..SyncSettings::default()
        };
        let harness = start(gateway, settings);
        let snapshot = harness
            .wait_for(|s| s.statistics.is_some() && !s.recent_logs.is_empty())
            .await;
        assert_eq!(snapshot.statistics.unwrap().sent_today, 12);

        harness
            .push
            .send(PushEvent::OtpLog(entry("628999", "failed")))
            .await
            .unwrap();
        let snapshot = harness
            .wait_for(|s| s.recent_logs.first().is_some_and(|e| e.phone == "628999"))
            .await;
        assert_eq!(snapshot.recent_logs.len(), DASHBOARD_LOG_LIMIT);
        assert_eq!(snapshot.recent_logs[1].phone, "628101");
        harness.stop().await;
    }
}
