//! Headless mode execution

use super::{
    SessionData,
    messages::{
        print_session_exit_success, print_session_shutdown, print_session_starting, status_line,
    },
};
use std::error::Error;

/// Runs the console without a terminal UI
///
/// Prints activity events and every connection change until Ctrl+C.
pub async fn run_headless_mode(mut session: SessionData) -> Result<(), Box<dyn Error>> {
    print_session_starting(
        "headless",
        &session.session.user.email,
        &session.environment.api_url(),
    );

    // Trigger shutdown on Ctrl+C
    let shutdown_sender_clone = session.shutdown_sender.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_sender_clone.send(());
        }
    });

    let mut shutdown_receiver = session.shutdown_sender.subscribe();
    let mut snapshots = session.sync.subscribe();
    let mut last_line = status_line(&snapshots.borrow_and_update());
    println!("{}", last_line);

    loop {
        tokio::select! {
            Some(event) = session.event_receiver.recv() => {
                if event.should_display() {
                    println!("{}", event);
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = status_line(&snapshots.borrow_and_update());
                if line != last_line {
                    println!("{}", line);
                    last_line = line;
                }
            }
            _ = shutdown_receiver.recv() => {
                break;
            }
        }
    }

    let _ = session.shutdown_sender.send(());
    print_session_shutdown();
    for handle in session.join_handles {
        let _ = handle.await;
    }
    print_session_exit_success();

    Ok(())
}
