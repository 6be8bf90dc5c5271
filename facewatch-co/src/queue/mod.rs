//! Job queue capability
//!
//! The external detection worker is reachable only through a raw JSON
//! message pushed to a named queue. Nothing of the internal object model
//! crosses this boundary; producer and consumer share only the documented
//! message shape.

pub mod mqtt;

use async_trait::async_trait;
use facewatch_common::Result;

pub use mqtt::MqttJobQueue;

/// Fire-and-forget push of a raw payload onto a named queue
///
/// No acknowledgment, retry, or dedup on the sender side; delivery
/// reliability is delegated entirely to the broker.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn push_raw(&self, queue: &str, payload: &str) -> Result<()>;
}
