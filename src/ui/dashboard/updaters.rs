//! Dashboard state update logic

use super::state::DashboardState;

use crate::consts::cli_consts::sync::error_ttl;
use crate::events::{Event as ActivityEvent, EventType, Source};
use crate::logging::LogLevel;
use crate::qr_image;
use crate::sync::{Operation, SyncSnapshot};

use std::path::Path;
use tokio::time::Instant;

impl DashboardState {
    /// Advance the animation, expire old errors and move queued events into the activity log.
    pub fn update(&mut self) {
        self.tick += 1;
        self.local_errors.expire(Instant::now(), error_ttl());
        while let Some(event) = self.pending_events.pop_front() {
            self.add_to_activity_log(event);
        }
    }

    pub fn set_snapshot(&mut self, snapshot: SyncSnapshot) {
        self.snapshot = snapshot;
    }

    /// Writes the pairing QR currently shown to `path` and logs the outcome.
    pub fn save_qr(&mut self, path: &Path) {
        let result = match &self.snapshot.qr {
            None => Err("No pairing QR to save".to_string()),
            Some(qr) => qr_image::save(&qr.image_data_uri, path).map_err(|e| {
                log::warn!("saving QR image to {} failed: {}", path.display(), e);
                e.to_string()
            }),
        };
        let event = match result {
            Ok(bytes) => {
                self.local_errors.clear(Operation::Download);
                ActivityEvent::info(
                    Source::QrCode,
                    format!("Saved QR image to {} ({} bytes)", path.display(), bytes),
                    EventType::Success,
                )
            }
            Err(message) => {
                self.local_errors
                    .set(Operation::Download, message.clone(), Instant::now());
                ActivityEvent::error(Source::QrCode, message, LogLevel::Warn)
            }
        };
        self.add_event(event);
    }

    /// Notes a key press that could not be queued because the synchronizer is busy or gone.
    pub fn note_dropped_request(&mut self, what: &str) {
        self.add_event(ActivityEvent::error(
            Source::Action,
            format!("{} not sent, try again", what),
            LogLevel::Warn,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::cli_consts::MAX_ACTIVITY_LOGS;
    use crate::environment::Environment;
    use crate::sync::QrCode;
    use crate::ui::app::UIConfig;
    use std::time::Instant;

    fn dashboard() -> DashboardState {
        DashboardState::new(
            Environment::Local,
            Instant::now(),
            SyncSnapshot::default(),
            UIConfig::new(false, "Admin".to_string()),
        )
    }

    #[test]
    fn update_drains_queue_into_bounded_log() {
        let mut state = dashboard();
        for i in 0..MAX_ACTIVITY_LOGS + 5 {
            state.add_event(ActivityEvent::info(
                Source::Poller,
                format!("poll {}", i),
                EventType::Refresh,
            ));
        }
        state.update();

        assert!(state.pending_events.is_empty());
        assert_eq!(state.activity_logs.len(), MAX_ACTIVITY_LOGS);
        assert_eq!(state.activity_logs.front().unwrap().msg, "poll 5");
        assert_eq!(state.tick, 1);
    }

    #[test]
    fn save_without_qr_logs_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qr.png");
        let mut state = dashboard();

        state.save_qr(&path);
        state.update();

        assert!(!path.exists());
        let event = state.activity_logs.back().unwrap();
        assert_eq!(event.event_type, EventType::Error);
        assert_eq!(event.log_level, LogLevel::Warn);
        assert_eq!(
            state.errors(),
            vec![(Operation::Download, "No pairing QR to save".to_string())]
        );
    }

    #[test]
    fn save_writes_current_qr() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qr.png");
        let mut state = dashboard();
        state.set_snapshot(SyncSnapshot {
            qr: Some(QrCode {
                image_data_uri: "data:image/png;base64,iVBORw0KGgo=".to_string(),
                expires_in_seconds: 20,
            }),
            ..SyncSnapshot::default()
        });

        state.save_qr(&path);
        state.update();

        assert_eq!(std::fs::read(&path).unwrap().len(), 8);
        assert!(state.errors().is_empty());
        assert_eq!(
            state.activity_logs.back().unwrap().event_type,
            EventType::Success
        );
    }
}
