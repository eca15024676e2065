use serde::{Deserialize, Serialize};

/// The body of a resolved status poll. `result` is true only when the payment was captured.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PollResponse {
    pub result: bool,
}
