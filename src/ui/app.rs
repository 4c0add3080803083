//! Main application state and UI loop
//!
//! Owns the current screen, forwards key presses to the synchronizer and
//! feeds it activity events and snapshots.

use crate::environment::Environment;
use crate::events::Event as ActivityEvent;
use crate::qr_image;
use crate::sync::{Command, SyncHandle, SyncSnapshot};
use crate::ui::dashboard::{DashboardState, render_dashboard};
use crate::ui::splash::render_splash;
use crossterm::event::{self, Event, KeyCode};
use ratatui::{Frame, Terminal, backend::Backend};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, watch};

/// UI configuration data grouped by concern
#[derive(Debug, Clone)]
pub struct UIConfig {
    pub with_background_color: bool,
    /// Display name of the logged-in admin.
    pub user_name: String,
}

impl UIConfig {
    pub fn new(with_background_color: bool, user_name: String) -> Self {
        Self {
            with_background_color,
            user_name,
        }
    }
}

/// The different screens in the application.
#[derive(Debug)]
pub enum Screen {
    /// Splash screen shown at the start of the application.
    Splash,
    /// Live connection dashboard.
    Dashboard(Box<DashboardState>),
}

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Send(Command),
    SaveQr,
    Ignore,
}

pub fn key_action(code: KeyCode) -> KeyAction {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => KeyAction::Send(Command::RefreshQr),
        KeyCode::Char('d') | KeyCode::Char('D') => KeyAction::Send(Command::Disconnect),
        KeyCode::Char('s') | KeyCode::Char('S') => KeyAction::SaveQr,
        KeyCode::Char('p') | KeyCode::Char('P') | KeyCode::F(5) => KeyAction::Send(Command::Poll),
        _ => KeyAction::Ignore,
    }
}

/// Application state
pub struct App {
    start_time: Instant,
    environment: Environment,
    current_screen: Screen,
    sync: SyncHandle,
    snapshots: watch::Receiver<SyncSnapshot>,
    /// Receives activity events from the synchronizer.
    event_receiver: mpsc::Receiver<ActivityEvent>,
    /// Broadcasts shutdown signal to background tasks.
    shutdown_sender: broadcast::Sender<()>,
    ui_config: UIConfig,
}

impl App {
    pub fn new(
        environment: Environment,
        sync: SyncHandle,
        event_receiver: mpsc::Receiver<ActivityEvent>,
        shutdown_sender: broadcast::Sender<()>,
        ui_config: UIConfig,
    ) -> Self {
        let snapshots = sync.subscribe();
        Self {
            start_time: Instant::now(),
            environment,
            current_screen: Screen::Splash,
            sync,
            snapshots,
            event_receiver,
            shutdown_sender,
            ui_config,
        }
    }

    fn open_dashboard(&mut self) {
        let snapshot = self.snapshots.borrow_and_update().clone();
        self.current_screen = Screen::Dashboard(Box::new(DashboardState::new(
            self.environment.clone(),
            self.start_time,
            snapshot,
            self.ui_config.clone(),
        )));
    }

    fn handle_dashboard_key(&mut self, action: KeyAction) {
        let Screen::Dashboard(state) = &mut self.current_screen else {
            return;
        };
        match action {
            KeyAction::Send(command) => {
                if !self.sync.request(command) {
                    state.note_dropped_request(match command {
                        Command::RefreshQr => "Refresh QR",
                        Command::Disconnect => "Disconnect",
                        Command::Poll => "Retry",
                    });
                }
            }
            KeyAction::SaveQr => state.save_qr(&qr_image::default_file_name()),
            KeyAction::Quit | KeyAction::Ignore => {}
        }
    }
}

/// Runs the application UI in a loop, handling events and rendering the appropriate screen.
pub async fn run<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> std::io::Result<()> {
    let splash_start = Instant::now();
    let splash_duration = Duration::from_secs(2);

    loop {
        while let Ok(event) = app.event_receiver.try_recv() {
            if let Screen::Dashboard(state) = &mut app.current_screen {
                state.add_event(event);
            }
        }

        if let Screen::Dashboard(state) = &mut app.current_screen {
            if app.snapshots.has_changed().unwrap_or(false) {
                state.set_snapshot(app.snapshots.borrow_and_update().clone());
            }
            state.update();
        }
        terminal.draw(|f| render(f, &app.current_screen))?;

        if let Screen::Splash = app.current_screen {
            if splash_start.elapsed() >= splash_duration {
                app.open_dashboard();
                continue;
            }
        }

        // Poll for key events
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == event::KeyEventKind::Release {
                    continue;
                }

                let action = key_action(key.code);
                if action == KeyAction::Quit {
                    let _ = app.shutdown_sender.send(());
                    return Ok(());
                }

                match app.current_screen {
                    // Any other key skips the splash screen
                    Screen::Splash => app.open_dashboard(),
                    Screen::Dashboard(_) => app.handle_dashboard_key(action),
                }
            }
        }
    }
}

/// Renders the current screen based on the application state.
fn render(f: &mut Frame, screen: &Screen) {
    match screen {
        Screen::Splash => render_splash(f),
        Screen::Dashboard(state) => render_dashboard(f, state),
    }
}
