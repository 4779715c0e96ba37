//! Transport adapters.

use crate::ports::PackageTransport;
use async_trait::async_trait;
use hb_01_message_channel::{ChannelError, MessageChannel};
use shared_types::MessagePackage;

#[async_trait]
impl PackageTransport for MessageChannel {
    async fn transmit(&self, package: &MessagePackage) -> Result<(), ChannelError> {
        self.send(package).await
    }
}
