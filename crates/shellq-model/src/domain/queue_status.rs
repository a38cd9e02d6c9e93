use serde::{Deserialize, Serialize};

/// Point-in-time view of queue load, as served to a status poller.
///
/// `running` always equals `ids.len()`: both are captured under one lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStatus<I> {
    /// Configured concurrency limit.
    pub limit: usize,
    /// Number of admitted, unfinished tasks.
    pub running: usize,
    /// Identifiers of admitted, unfinished tasks (unspecified order).
    pub ids: Vec<I>,
}

impl<I> QueueStatus<I> {
    /// Free slots at the moment the snapshot was taken.
    pub fn available(&self) -> usize {
        self.limit.saturating_sub(self.running)
    }

    pub fn is_saturated(&self) -> bool {
        self.running >= self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CommandId;

    #[test]
    fn available_and_saturation() {
        let status = QueueStatus {
            limit: 2,
            running: 1,
            ids: vec![CommandId::new(4)],
        };
        assert_eq!(status.available(), 1);
        assert!(!status.is_saturated());

        let full = QueueStatus::<CommandId> {
            limit: 2,
            running: 2,
            ids: vec![CommandId::new(4), CommandId::new(5)],
        };
        assert_eq!(full.available(), 0);
        assert!(full.is_saturated());
    }

    #[test]
    fn serializes_camel_case() {
        let status = QueueStatus {
            limit: 5,
            running: 1,
            ids: vec![CommandId::new(9)],
        };
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, r#"{"limit":5,"running":1,"ids":[9]}"#);
    }
}
