/// Delay and retry tuning for the cast machinery.
///
/// The defaults are tuned against real client responsiveness. They are
/// deliberately overridable from the settings file rather than derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Interval between selection-confirm polls, in milliseconds.
    pub confirm_poll_ms: u64,
    /// Confirm polls before an unconfirmed cast is abandoned.
    pub confirm_retry_limit: u32,
    /// Pause after the injected click before the cast counts as done.
    pub settle_ms: u64,
    /// Delay before the first restore-confirm check.
    pub restore_delay_ms: u64,
    /// Interval between restore-confirm checks once the delay has passed.
    pub restore_poll_ms: u64,
    /// Ceiling on a whole restore attempt before the sequencer gives up.
    pub restore_timeout_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            confirm_poll_ms: 5,
            confirm_retry_limit: 50,
            settle_ms: 10,
            restore_delay_ms: 200,
            restore_poll_ms: 10,
            restore_timeout_ms: 30_000,
        }
    }
}
