//! Dashboard state management

use crate::consts::cli_consts::MAX_ACTIVITY_LOGS;
use crate::environment::Environment;
use crate::events::Event as ActivityEvent;
use crate::sync::errors::OperationErrors;
use crate::sync::{Operation, SyncSnapshot};
use crate::ui::app::UIConfig;

use std::collections::VecDeque;
use std::time::Instant;

/// Everything the dashboard renders.
#[derive(Debug)]
pub struct DashboardState {
    /// Backend the console is attached to.
    pub environment: Environment,
    /// Display name of the logged-in admin.
    pub user_name: String,
    /// Used for computing uptime.
    pub start_time: Instant,
    /// Latest synchronizer snapshot.
    pub snapshot: SyncSnapshot,
    /// Queue of events waiting to be processed
    pub pending_events: VecDeque<ActivityEvent>,
    /// Activity logs for display
    pub activity_logs: VecDeque<ActivityEvent>,
    /// Failures of operations the dashboard runs itself (saving the QR image).
    pub local_errors: OperationErrors,
    pub with_background_color: bool,
    /// Animation tick counter
    pub tick: usize,
}

impl DashboardState {
    pub fn new(
        environment: Environment,
        start_time: Instant,
        snapshot: SyncSnapshot,
        ui_config: UIConfig,
    ) -> Self {
        Self {
            environment,
            user_name: ui_config.user_name,
            start_time,
            snapshot,
            pending_events: VecDeque::new(),
            activity_logs: VecDeque::new(),
            local_errors: OperationErrors::default(),
            with_background_color: ui_config.with_background_color,
            tick: 0,
        }
    }

    /// Add an event to activity logs with size limit
    pub fn add_to_activity_log(&mut self, event: ActivityEvent) {
        if self.activity_logs.len() >= MAX_ACTIVITY_LOGS {
            self.activity_logs.pop_front();
        }
        self.activity_logs.push_back(event);
    }

    /// Synchronizer errors followed by the dashboard's own.
    pub fn errors(&self) -> Vec<(Operation, String)> {
        let mut errors = self.snapshot.errors.clone();
        errors.extend(self.local_errors.messages());
        errors
    }

    /// Add an event to the processing queue
    pub fn add_event(&mut self, event: ActivityEvent) {
        self.pending_events.push_back(event);
    }
}
