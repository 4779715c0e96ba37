//! Outbound Ports (Driven Ports)
//!
//! The correlator only needs a way to put one request package on the wire.

use async_trait::async_trait;
use hb_01_message_channel::ChannelError;
use shared_types::MessagePackage;
use std::sync::Arc;

/// Sending side of the request channel.
#[async_trait]
pub trait PackageTransport: Send + Sync {
    /// Transmit one package. Returning `Ok` means the package left this
    /// process, not that the host received it.
    async fn transmit(&self, package: &MessagePackage) -> Result<(), ChannelError>;
}

#[async_trait]
impl<T: PackageTransport + ?Sized> PackageTransport for Arc<T> {
    async fn transmit(&self, package: &MessagePackage) -> Result<(), ChannelError> {
        (**self).transmit(package).await
    }
}
