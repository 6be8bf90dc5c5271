//! MQTT-backed job queue

use async_trait::async_trait;
use facewatch_common::{Error, Result};
use rumqttc::{AsyncClient, MqttOptions, QoS};
use std::time::Duration;
use tracing::{debug, warn};

use super::JobQueue;

/// Job queue backed by an MQTT broker
///
/// Publishes at QoS 0: the queue contract is fire-and-forget and anything
/// stronger belongs to the broker configuration, not this client.
pub struct MqttJobQueue {
    client: AsyncClient,
}

impl MqttJobQueue {
    /// Connect to the broker and start the connection event loop
    ///
    /// The event loop runs on a background task for the lifetime of the
    /// process; publish errors surface on the caller, connection errors are
    /// logged and retried by rumqttc's automatic reconnect.
    pub fn connect(host: &str, port: u16, client_id: &str) -> Self {
        let mut options = MqttOptions::new(client_id, host, port);
        options.set_keep_alive(Duration::from_secs(30));

        let (client, mut event_loop) = AsyncClient::new(options, 16);

        tokio::spawn(async move {
            loop {
                match event_loop.poll().await {
                    Ok(event) => debug!(?event, "MQTT event"),
                    Err(e) => {
                        warn!(error = %e, "MQTT connection error, retrying");
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        });

        Self { client }
    }
}

#[async_trait]
impl JobQueue for MqttJobQueue {
    async fn push_raw(&self, queue: &str, payload: &str) -> Result<()> {
        self.client
            .publish(queue, QoS::AtMostOnce, false, payload.as_bytes().to_vec())
            .await
            .map_err(|e| Error::Queue(format!("publish to '{}' failed: {}", queue, e)))
    }
}
