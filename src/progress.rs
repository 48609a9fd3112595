//! Progress reporting for long-running ordering computations.
//!
//! Ordering a continental road network takes minutes, so every layer of the
//! pipeline accepts a [`ProgressLog`]. It is a pure observer: messages are
//! human-readable strings, and a disabled log costs a single branch per
//! report. The observer never influences the computed order.

/// Shared handle to an optional progress message sink.
///
/// The sink must be `Sync` because inertial flow evaluates its projection
/// directions on a rayon pool and reports from whichever worker is active.
#[derive(Clone, Copy, Default)]
pub struct ProgressLog<'a> {
    sink: Option<&'a (dyn Fn(&str) + Sync)>,
}

impl<'a> ProgressLog<'a> {
    /// A disabled log; all reports are dropped.
    pub const fn none() -> Self {
        Self { sink: None }
    }

    pub fn new(sink: &'a (dyn Fn(&str) + Sync)) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Deliver a message. The closure only runs when the log is enabled, so
    /// callers can format freely without guarding.
    pub fn report(&self, message: impl FnOnce() -> String) {
        if let Some(sink) = self.sink {
            sink(&message());
        }
    }
}

impl std::fmt::Debug for ProgressLog<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressLog")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_disabled_log_skips_message_construction() {
        let log = ProgressLog::none();
        log.report(|| unreachable!("disabled log must not build messages"));
    }

    #[test]
    fn test_enabled_log_delivers_messages() {
        let messages: Mutex<Vec<String>> = Mutex::new(Vec::new());
        let sink = |msg: &str| messages.lock().unwrap().push(msg.to_string());
        let log = ProgressLog::new(&sink);
        assert!(log.is_enabled());

        log.report(|| "hello".to_string());
        log.report(|| format!("{} nodes", 42));

        let got = messages.lock().unwrap();
        assert_eq!(*got, vec!["hello".to_string(), "42 nodes".to_string()]);
    }
}
