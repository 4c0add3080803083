pub mod cli_consts {
    //! Console Configuration Constants
    //!
    //! This module contains all timing and sizing constants for the console,
    //! organized by functional area.

    // =============================================================================
    // QUEUE CONFIGURATION
    // =============================================================================

    /// The maximum number of events to keep in the activity logs.
    pub const MAX_ACTIVITY_LOGS: usize = 100;

    /// Maximum number of buffered events between the synchronizer and the UI.
    pub const EVENT_QUEUE_SIZE: usize = 100;

    /// Buffer size for network completions and push messages feeding the synchronizer.
    pub const COMPLETION_QUEUE_SIZE: usize = 32;

    /// Number of OTP log entries shown on the dashboard.
    pub const DASHBOARD_LOG_LIMIT: usize = 4;

    /// Number of login history entries shown on the account view.
    pub const LOGIN_HISTORY_LIMIT: usize = 5;

    /// Default page size for the `logs` command.
    pub const DEFAULT_LOG_PAGE_SIZE: u32 = 10;

    // =============================================================================
    // NETWORK CONFIGURATION
    // =============================================================================

    /// REST request timing
    pub mod requests {
        use std::time::Duration;

        /// Upper bound for any single REST call (connect + response)
        pub const TIMEOUT_SECS: u64 = 10;

        pub const fn timeout() -> Duration {
            Duration::from_secs(TIMEOUT_SECS)
        }
    }

    /// Status synchronizer timing
    pub mod sync {
        use std::time::Duration;

        /// Default status poll interval. Observed backends are polled every 3-5 seconds.
        pub const POLL_INTERVAL_SECS: u64 = 5;

        /// Smallest accepted poll interval.
        pub const MIN_POLL_INTERVAL_SECS: u64 = 3;

        /// Lifetime the console assumes for a pairing QR code.
        pub const QR_WINDOW_SECS: u32 = 20;

        /// How long a per-operation error stays visible.
        pub const ERROR_TTL_SECS: u64 = 5;

        /// Refresh period for statistics and recent OTP logs.
        pub const FEED_REFRESH_SECS: u64 = 30;

        pub const fn poll_interval() -> Duration {
            Duration::from_secs(POLL_INTERVAL_SECS)
        }

        pub const fn error_ttl() -> Duration {
            Duration::from_secs(ERROR_TTL_SECS)
        }

        pub const fn feed_refresh() -> Duration {
            Duration::from_secs(FEED_REFRESH_SECS)
        }

        pub const fn countdown_tick() -> Duration {
            Duration::from_secs(1)
        }
    }

    /// Push channel reconnect policy
    pub mod push {
        use std::time::Duration;

        /// Fixed delay between reconnect attempts (milliseconds)
        pub const RECONNECT_DELAY_MS: u64 = 2_000;

        /// Reconnect attempts before the push channel gives up
        pub const RECONNECT_ATTEMPTS: u32 = 5;

        /// Upper bound for the WebSocket handshake
        pub const CONNECT_TIMEOUT_SECS: u64 = 10;

        pub const fn reconnect_delay() -> Duration {
            Duration::from_millis(RECONNECT_DELAY_MS)
        }

        pub const fn connect_timeout() -> Duration {
            Duration::from_secs(CONNECT_TIMEOUT_SECS)
        }
    }
}
