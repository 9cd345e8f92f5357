use serde::Serialize;

/// `{message, result}` wrapper returned by every holiday endpoint.
#[derive(Debug, Serialize)]
pub struct ApiEnvelope<T> {
    pub message: &'static str,
    pub result: Vec<T>,
}

impl<T> ApiEnvelope<T> {
    /// Pick `found` or `empty` by whether `result` has entries.
    pub fn new(result: Vec<T>, found: &'static str, empty: &'static str) -> Self {
        let message = if result.is_empty() { empty } else { found };
        Self { message, result }
    }

    /// Envelope for a rejected request.
    pub fn rejected(message: &'static str) -> Self {
        Self {
            message,
            result: Vec::new(),
        }
    }
}
