//! Pairing QR countdown.

/// Seconds left before the held QR code is considered expired.
///
/// Stopped while no QR code is held. The counter never reaches zero from the
/// outside: the tick that exhausts it reports the expiry and restarts it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrCountdown {
    window: u32,
    remaining: Option<u32>,
}

impl QrCountdown {
    pub fn new(window: u32) -> Self {
        Self {
            window: window.max(1),
            remaining: None,
        }
    }

    /// Restarts the countdown at the full window.
    pub fn start(&mut self) {
        self.remaining = Some(self.window);
    }

    pub fn stop(&mut self) {
        self.remaining = None;
    }

    pub fn remaining(&self) -> Option<u32> {
        self.remaining
    }

    pub fn window(&self) -> u32 {
        self.window
    }

    pub fn is_running(&self) -> bool {
        self.remaining.is_some()
    }

    /// Advances one second. Returns `true` when the window elapsed, in which case
    /// the countdown has already restarted at the full window.
    pub fn tick(&mut self) -> bool {
        let Some(remaining) = self.remaining else {
            return false;
        };
        let next = remaining.saturating_sub(1);
        if next == 0 {
            self.remaining = Some(self.window);
            true
        } else {
            self.remaining = Some(next);
            false
        }
    }

    /// Share of the window already used, for gauges.
    pub fn elapsed_percent(&self) -> u16 {
        match self.remaining {
            Some(remaining) => {
                let used = self.window.saturating_sub(remaining);
                ((used as f64 / self.window as f64) * 100.0).round() as u16
            }
            None => 0,
        }
    }
}
