//! Session setup and initialization

use crate::auth::SessionContext;
use crate::consts::cli_consts::{COMPLETION_QUEUE_SIZE, EVENT_QUEUE_SIZE};
use crate::environment::Environment;
use crate::events::Event;
use crate::gateway::Gateway;
use crate::push::PushChannel;
use crate::sync::{self, SyncHandle, SyncSettings};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Session data for both TUI and headless modes
pub struct SessionData {
    /// Snapshot and command access to the running synchronizer
    pub sync: SyncHandle,
    /// Activity events from the synchronizer
    pub event_receiver: mpsc::Receiver<Event>,
    /// Join handles for the synchronizer and push channel
    pub join_handles: Vec<JoinHandle<()>>,
    /// Shutdown sender to stop all background tasks
    pub shutdown_sender: broadcast::Sender<()>,
    /// Backend the session talks to
    pub environment: Environment,
    /// Logged-in admin
    pub session: SessionContext,
}

/// Starts the push channel and the status synchronizer for a logged-in admin.
///
/// The push channel feeds the synchronizer; both stop on the shared shutdown signal.
pub fn setup_session(
    gateway: Arc<dyn Gateway>,
    session: SessionContext,
    poll_interval_secs: u64,
) -> Result<SessionData, Box<dyn Error>> {
    let environment = gateway.environment().clone();
    let (shutdown_sender, _) = broadcast::channel(1);
    let (event_sender, event_receiver) = mpsc::channel(EVENT_QUEUE_SIZE);
    let (push_sender, push_receiver) = mpsc::channel(COMPLETION_QUEUE_SIZE);

    let push = PushChannel::new(&environment.socket_url(), push_sender)?;
    log::info!("push channel at {}", push.url());
    let push_handle = tokio::spawn(push.run(shutdown_sender.subscribe()));

    let settings = SyncSettings::default().with_poll_interval_secs(poll_interval_secs);
    let (sync, sync_handle) = sync::runtime::spawn(
        gateway,
        settings,
        event_sender,
        push_receiver,
        shutdown_sender.subscribe(),
    );

    Ok(SessionData {
        sync,
        event_receiver,
        join_handles: vec![sync_handle, push_handle],
        shutdown_sender,
        environment,
        session,
    })
}
