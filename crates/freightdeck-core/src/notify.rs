// Fire-and-forget user notifications (the toast seam). Non-blocking by
// construction: implementations must not do I/O that can stall a caller.
use std::sync::Mutex;

/// Success/error toast surface.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default notifier that routes toasts into the log stream.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!("{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Captures notifications in memory, for assertions.
#[derive(Default)]
pub struct MemoryNotifier {
    pub messages: Mutex<Vec<(bool, String)>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn successes(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(ok, _)| *ok)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(ok, _)| !*ok)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Notifier for MemoryNotifier {
    fn success(&self, message: &str) {
        self.messages.lock().unwrap().push((true, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push((false, message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_notifier_splits_by_kind() {
        let notifier = MemoryNotifier::new();
        notifier.success("export finished");
        notifier.error("export failed");
        notifier.success("booking saved");

        assert_eq!(notifier.successes().len(), 2);
        assert_eq!(notifier.errors(), vec!["export failed".to_string()]);
    }
}
