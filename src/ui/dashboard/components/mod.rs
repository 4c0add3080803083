//! Dashboard component modules

pub mod footer;
pub mod header;
pub mod info_panel;
pub mod logs;
pub mod otp_logs;
pub mod stats;
