use std::time::Duration;

/// Shortest read window the setters accept.
pub const MIN_PONG_WAIT: Duration = Duration::from_secs(1);

/// Keepalive timers need a non-zero period even if `pong_wait` was set directly.
const MIN_PING_PERIOD: Duration = Duration::from_millis(1);

/// Per-connection limits and keepalive timing.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Outbound queue size per peer. A peer whose queue overflows is disconnected.
    pub queue_capacity: usize,
    /// How long a connection may go without a pong before the read side gives up.
    pub pong_wait: Duration,
    pub max_message_size: usize,
}

impl TransportConfig {
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_pong_wait(mut self, pong_wait: Duration) -> Self {
        self.pong_wait = pong_wait.max(MIN_PONG_WAIT);
        self
    }

    pub fn with_max_message_size(mut self, bytes: usize) -> Self {
        self.max_message_size = bytes;
        self
    }

    /// Pings go out at 9/10 of the pong window.
    pub fn ping_period(&self) -> Duration {
        (self.pong_wait * 9 / 10).max(MIN_PING_PERIOD)
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 1024,
            pong_wait: Duration::from_secs(60),
            max_message_size: 64 * 1024,
        }
    }
}
