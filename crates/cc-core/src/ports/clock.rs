pub trait ClockPort: Send + Sync {
    /// Current time as epoch seconds.
    fn now_secs(&self) -> i64;
}
