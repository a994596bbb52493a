use tracing::info;

/// Sink for human-readable search status messages.
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

impl<F> Notifier for F
where
    F: FnMut(&str),
{
    fn notify(&mut self, message: &str) {
        self(message)
    }
}

/// Collects every message, mostly useful in tests.
impl Notifier for Vec<String> {
    fn notify(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

/// Forwards messages to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&mut self, message: &str) {
        info!("{message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closure_notifier() {
        let mut seen = Vec::new();
        {
            let mut sink = |message: &str| seen.push(message.len());
            sink.notify("abc");
            sink.notify("");
        }
        assert_eq!(seen, vec![3, 0]);
    }

    #[test]
    fn test_vec_notifier() {
        let mut messages: Vec<String> = Vec::new();
        messages.notify("No valid path found");
        assert_eq!(messages, vec!["No valid path found".to_string()]);
    }
}
