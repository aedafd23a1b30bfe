use bytes::Bytes;

/// A payload published to a topic, shared by every delivery of the fan-out.
///
/// The broker does not interpret `payload`. `timestamp` is the publish time
/// in Unix milliseconds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub topic: String,
    pub payload: Bytes,
    pub timestamp: i64,
}

impl Message {
    pub fn new(topic: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }
}
