use serde::{Deserialize, Serialize};

/// Wire shape used both by upstream number sources and by the merged response.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NumbersPayload {
    pub numbers: Vec<i64>,
}

impl NumbersPayload {
    pub fn new(numbers: Vec<i64>) -> Self {
        Self { numbers }
    }
}
