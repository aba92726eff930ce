use crate::domain::{DeadLetterQueue, Error};

/// Logs every rejected command as a warning.
#[derive(Default, Debug)]
pub struct LogDLQ {}

impl DeadLetterQueue for LogDLQ {
    fn report(&self, error: &Error) {
        tracing::warn!(%error, "command rejected");
    }
}
