//! Socket.IO push channel.

pub mod channel;
pub mod packet;

pub use channel::{PushChannel, PushError, PushEvent};
