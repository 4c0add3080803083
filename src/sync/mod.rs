//! Status Synchronizer
//!
//! Keeps one view of the WhatsApp connection and the pairing QR code while
//! periodic polls and server pushes arrive independently.

pub mod countdown;
pub mod errors;
pub mod runtime;
pub mod state;

pub use errors::Operation;
pub use runtime::{Command, StatusSynchronizer, SyncHandle, SyncSettings};
pub use state::{ConnectionStatus, LoadState, QrCode, SyncSnapshot, SyncState};
