//! Outbound publishing seam.

use std::future::Future;

use rumqttc::{AsyncClient, QoS};

use crate::error::MqttError;

/// Something that can publish an MQTT message.
pub trait Publish {
    fn publish(
        &self,
        topic: String,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), MqttError>> + Send;
}

impl Publish for AsyncClient {
    fn publish(
        &self,
        topic: String,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), MqttError>> + Send {
        async move {
            AsyncClient::publish(self, topic, QoS::AtLeastOnce, false, payload)
                .await
                .map_err(MqttError::Client)
        }
    }
}

impl<T: Publish + Send + Sync> Publish for std::sync::Arc<T> {
    fn publish(
        &self,
        topic: String,
        payload: Vec<u8>,
    ) -> impl Future<Output = Result<(), MqttError>> + Send {
        (**self).publish(topic, payload)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records every published message.
    #[derive(Default)]
    pub(crate) struct RecordingPublisher {
        pub(crate) sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingPublisher {
        pub(crate) fn sent(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Publish for RecordingPublisher {
        fn publish(
            &self,
            topic: String,
            payload: Vec<u8>,
        ) -> impl Future<Output = Result<(), MqttError>> + Send {
            let payload = String::from_utf8_lossy(&payload).into_owned();
            self.sent.lock().unwrap().push((topic, payload));
            async { Ok(()) }
        }
    }
}
