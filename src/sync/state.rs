//! Reconciled view of the WhatsApp session.
//!
//! [`SyncState`] is a plain state machine: every input (poll result, push
//! message, QR fetch, countdown tick, failure) is applied synchronously and may
//! return [`Effect`]s the driver has to carry out. Nothing here performs I/O.

use crate::consts::cli_consts::{DASHBOARD_LOG_LIMIT, sync::QR_WINDOW_SECS};
use crate::gateway::types::{LogEntry, Statistics, StatusUpdate};
use crate::sync::countdown::QrCountdown;
use crate::sync::errors::{Operation, OperationErrors};
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum LoadState {
    #[default]
    Loading,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub phone_number: Option<String>,
    pub qr_available: bool,
    pub last_seen: Option<String>,
    pub load_state: LoadState,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrCode {
    /// `data:image/png;base64,...`
    pub image_data_uri: String,
    pub expires_in_seconds: u32,
}

/// Work the driver must start after applying an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    FetchQr,
}

/// Issued when a poll request starts; presented again with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTicket {
    poll_seq: u64,
    pushes_seen: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PollOutcome {
    /// The result was older than state already applied and was dropped.
    pub stale: bool,
    /// Something a consumer can observe changed.
    pub changed: bool,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PushOutcome {
    pub stale: bool,
    pub changed: bool,
    pub effects: Vec<Effect>,
}

/// Immutable copy of the state handed to renderers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SyncSnapshot {
    pub status: ConnectionStatus,
    /// Never set while connected.
    pub qr: Option<QrCode>,
    pub errors: Vec<(Operation, String)>,
    pub statistics: Option<Statistics>,
    pub recent_logs: Vec<LogEntry>,
    pub last_update: Option<DateTime<Local>>,
}

impl SyncSnapshot {
    pub fn error(&self, operation: Operation) -> Option<&str> {
        self.errors
            .iter()
            .find(|(op, _)| *op == operation)
            .map(|(_, msg)| msg.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct SyncState {
    status: ConnectionStatus,
    qr: Option<String>,
    countdown: QrCountdown,
    errors: OperationErrors,
    statistics: Option<Statistics>,
    recent_logs: VecDeque<LogEntry>,
    last_update: Option<DateTime<Local>>,
    last_stamp: Option<u64>,
    polls_issued: u64,
    last_poll_applied: u64,
    pushes_applied: u64,
    qr_fetch_pending: bool,
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncState {
    pub fn new() -> Self {
        Self {
            status: ConnectionStatus::default(),
            qr: None,
            countdown: QrCountdown::new(QR_WINDOW_SECS),
            errors: OperationErrors::default(),
            statistics: None,
            recent_logs: VecDeque::with_capacity(DASHBOARD_LOG_LIMIT),
            last_update: None,
            last_stamp: None,
            polls_issued: 0,
            last_poll_applied: 0,
            pushes_applied: 0,
            qr_fetch_pending: false,
        }
    }

    pub fn status(&self) -> &ConnectionStatus {
        &self.status
    }

    pub fn qr(&self) -> Option<QrCode> {
        if !self.shows_qr() {
            return None;
        }
        let image_data_uri = self.qr.clone()?;
        Some(QrCode {
            image_data_uri,
            expires_in_seconds: self.countdown.remaining().unwrap_or(0),
        })
    }

    pub fn countdown(&self) -> &QrCountdown {
        &self.countdown
    }

    pub fn errors(&self) -> &OperationErrors {
        &self.errors
    }

    pub fn snapshot(&self) -> SyncSnapshot {
        SyncSnapshot {
            status: self.status.clone(),
            qr: self.qr(),
            errors: self.errors.messages(),
            statistics: self.statistics.clone(),
            recent_logs: self.recent_logs.iter().cloned().collect(),
            last_update: self.last_update,
        }
    }

    /// Registers a poll request about to be sent.
    pub fn begin_poll(&mut self) -> PollTicket {
        self.polls_issued += 1;
        PollTicket {
            poll_seq: self.polls_issued,
            pushes_seen: self.pushes_applied,
        }
    }

    /// Server stamps win when both sides carry one. Otherwise a poll loses to any
    /// push applied after it was issued, and to any later poll already applied.
    fn is_stale(&self, stamp: Option<u64>, ticket: Option<PollTicket>) -> bool {
        if let (Some(stamp), Some(last)) = (stamp, self.last_stamp) {
            return stamp < last;
        }
        match ticket {
            Some(ticket) => {
                ticket.pushes_seen < self.pushes_applied
                    || ticket.poll_seq < self.last_poll_applied
            }
            None => false,
        }
    }

    fn record_stamp(&mut self, stamp: Option<u64>) {
        if let Some(stamp) = stamp {
            self.last_stamp = Some(self.last_stamp.map_or(stamp, |last| last.max(stamp)));
        }
    }

    /// A QR code is only shown while the gateway offers one and no session is paired.
    fn shows_qr(&self) -> bool {
        self.status.qr_available && !self.status.connected
    }

    /// Enforces the connected invariant and decides whether a QR must be fetched.
    fn settle_qr(&mut self) -> Vec<Effect> {
        if self.status.connected {
            self.qr = None;
            self.countdown.stop();
            return Vec::new();
        }
        if !self.status.qr_available {
            self.qr = None;
            self.countdown.stop();
            return Vec::new();
        }
        if self.qr.is_none() && !self.qr_fetch_pending {
            self.qr_fetch_pending = true;
            return vec![Effect::FetchQr];
        }
        Vec::new()
    }

    fn replace_qr(&mut self, image: String) {
        self.qr = Some(image);
        self.countdown.start();
    }

    /// Applies a polled status: the snapshot replaces the current status.
    pub fn apply_poll(&mut self, ticket: PollTicket, update: StatusUpdate) -> PollOutcome {
        self.errors.clear(Operation::Status);
        if self.is_stale(update.stamp, Some(ticket)) {
            log::debug!("dropping stale poll result #{}", ticket.poll_seq);
            return PollOutcome {
                stale: true,
                ..PollOutcome::default()
            };
        }
        self.last_poll_applied = self.last_poll_applied.max(ticket.poll_seq);
        self.record_stamp(update.stamp);

        let before = self.observable();
        self.status = ConnectionStatus {
            connected: update.connected.unwrap_or(false),
            phone_number: update.phone_number,
            qr_available: update.qr_available.unwrap_or(false) || update.qrcode.is_some(),
            last_seen: update.last_seen,
            load_state: LoadState::Ok,
        };
        if let Some(image) = update.qrcode {
            if !self.status.connected && self.qr.as_deref() != Some(image.as_str()) {
                self.replace_qr(image);
            }
        }
        let effects = self.settle_qr();
        let changed = self.finish_update(before);
        PollOutcome {
            stale: false,
            changed,
            effects,
        }
    }

    /// Applies a pushed status: present fields are merged into the current status.
    ///
    /// A pushed QR code always replaces the held one and restarts the countdown.
    pub fn apply_push(&mut self, update: StatusUpdate) -> PushOutcome {
        if self.is_stale(update.stamp, None) {
            log::debug!("dropping stale push (stamp {:?})", update.stamp);
            return PushOutcome {
                stale: true,
                ..PushOutcome::default()
            };
        }
        self.pushes_applied += 1;
        self.record_stamp(update.stamp);

        let before = self.observable();
        if let Some(connected) = update.connected {
            self.status.connected = connected;
        }
        if let Some(phone_number) = update.phone_number {
            self.status.phone_number = Some(phone_number);
        }
        if let Some(qr_available) = update.qr_available {
            self.status.qr_available = qr_available;
        }
        if let Some(last_seen) = update.last_seen {
            self.status.last_seen = Some(last_seen);
        }
        if let Some(image) = update.qrcode {
            if !self.status.connected {
                self.status.qr_available = true;
                self.replace_qr(image);
            }
        }
        self.status.load_state = LoadState::Ok;
        let effects = self.settle_qr();
        let changed = self.finish_update(before);
        PushOutcome {
            stale: false,
            changed,
            effects,
        }
    }

    /// Applies the result of a QR fetch. Returns whether the held QR changed.
    ///
    /// Refetching the same image leaves the countdown alone. A fetch that lands
    /// after the gateway withdrew the QR (or the session paired) is dropped.
    pub fn apply_qr(&mut self, image: Option<String>) -> bool {
        self.qr_fetch_pending = false;
        self.errors.clear(Operation::Qr);
        let Some(image) = image else {
            return false;
        };
        if !self.shows_qr() {
            log::debug!("dropping QR fetched while no QR is offered");
            return false;
        }
        if self.qr.as_deref() == Some(image.as_str()) {
            return false;
        }
        self.replace_qr(image);
        self.last_update = Some(Local::now());
        true
    }

    /// One second of the QR countdown. Ticks are ignored unless a QR code is held
    /// and still offered.
    pub fn tick(&mut self) -> Vec<Effect> {
        if self.qr.is_none() || !self.shows_qr() {
            return Vec::new();
        }
        if self.countdown.tick() {
            self.qr_fetch_pending = true;
            vec![Effect::FetchQr]
        } else {
            Vec::new()
        }
    }

    /// Records a failed operation. The current status is kept; only a status that
    /// never loaded moves to [`LoadState::Error`].
    pub fn record_failure(&mut self, operation: Operation, message: impl Into<String>, now: Instant) {
        self.errors.set(operation, message, now);
        match operation {
            Operation::Status if self.status.load_state == LoadState::Loading => {
                self.status.load_state = LoadState::Error;
            }
            Operation::Qr => self.qr_fetch_pending = false,
            _ => {}
        }
    }

    /// Clears the error of an operation that just succeeded.
    pub fn record_success(&mut self, operation: Operation) -> bool {
        self.errors.clear(operation)
    }

    pub fn expire_errors(&mut self, now: Instant, ttl: Duration) -> bool {
        self.errors.expire(now, ttl)
    }

    pub fn apply_statistics(&mut self, statistics: Statistics) -> bool {
        self.errors.clear(Operation::Statistik);
        let changed = self.statistics.as_ref() != Some(&statistics);
        self.statistics = Some(statistics);
        changed
    }

    /// Replaces the recent log feed with the newest entries first.
    pub fn apply_recent_logs(&mut self, entries: Vec<LogEntry>) -> bool {
        self.errors.clear(Operation::Logs);
        let entries: VecDeque<LogEntry> = entries.into_iter().take(DASHBOARD_LOG_LIMIT).collect();
        let changed = entries != self.recent_logs;
        self.recent_logs = entries;
        changed
    }

    /// Prepends a pushed log entry.
    pub fn push_log(&mut self, entry: LogEntry) {
        self.recent_logs.push_front(entry);
        self.recent_logs.truncate(DASHBOARD_LOG_LIMIT);
    }

    fn observable(&self) -> (ConnectionStatus, Option<String>) {
        (self.status.clone(), self.qr.clone())
    }

    fn finish_update(&mut self, before: (ConnectionStatus, Option<String>)) -> bool {
        let changed = before != self.observable();
        if changed {
            self.last_update = Some(Local::now());
        }
        changed
    }
}
