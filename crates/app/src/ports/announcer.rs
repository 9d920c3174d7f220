//! Announcer port — sounds and speech on the house speakers.

use std::future::Future;

use venthub_domain::error::VentHubError;
use venthub_domain::speech::SpeechRequest;

/// Plays a [`SpeechRequest`] on the speakers.
pub trait Announcer {
    /// Queue `request`. Quiet hours may silently drop it.
    fn announce(
        &self,
        request: SpeechRequest,
    ) -> impl Future<Output = Result<(), VentHubError>> + Send;
}

impl<T: Announcer + Send + Sync> Announcer for std::sync::Arc<T> {
    fn announce(
        &self,
        request: SpeechRequest,
    ) -> impl Future<Output = Result<(), VentHubError>> + Send {
        (**self).announce(request)
    }
}
