/// One-way "state changed" notification, fired after every mutating
/// boundary call. Supplied to the coordinator at construction; delivery is
/// the caller's concern (IPC push, channel send, no-op in tests).
pub trait ChangeNotifier: Send + Sync {
    fn changed(&self);
}

/// Notifier that drops the signal. Useful in tests and headless runs.
pub struct NoopNotifier;

impl ChangeNotifier for NoopNotifier {
    fn changed(&self) {}
}
