//! # Framing On A Live Socket
//!
//! Frames written to a listening channel in arbitrary fragments are
//! reassembled into the same packages, in order.

#[cfg(test)]
mod tests {
    use crate::fixtures::{loopback, WAIT};
    use hb_01_message_channel::{encode_frame, Endpoint, MessageChannel, DEFAULT_MAX_FRAME_LEN};
    use serde_json::json;
    use shared_types::{EventRecord, MessagePackage, PackageType, RequestId};
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;
    use tokio::sync::mpsc;
    use tokio::time::{sleep, timeout};

    async fn listening_channel() -> (MessageChannel, mpsc::UnboundedReceiver<MessagePackage>) {
        let channel = MessageChannel::open(Endpoint::Listen(loopback()))
            .await
            .unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        channel.on_receive(move |package| {
            let _ = tx.send(package);
        });
        (channel, rx)
    }

    fn packages() -> Vec<MessagePackage> {
        vec![
            MessagePackage::request(RequestId(1), PackageType::Pull, vec![json!({"class": "Level"})]),
            MessagePackage::unsolicited(
                PackageType::Delete,
                vec![json!([1, 2, 3]), json!("x".repeat(5000))],
                vec![EventRecord::note("large")],
            ),
            MessagePackage::request(RequestId(2), PackageType::ConnectionCheck, vec![]),
        ]
    }

    #[tokio::test]
    async fn test_fragmented_frames_reassemble_in_order() {
        let (channel, mut received) = listening_channel().await;
        let mut stream = TcpStream::connect(channel.local_addr().unwrap()).await.unwrap();

        let mut wire = Vec::new();
        for package in packages() {
            wire.extend_from_slice(&encode_frame(&package, DEFAULT_MAX_FRAME_LEN).unwrap());
        }

        let sizes = [1, 5, 2, 13, 700, 3];
        let mut offset = 0;
        let mut turn = 0;
        while offset < wire.len() {
            let end = (offset + sizes[turn % sizes.len()]).min(wire.len());
            stream.write_all(&wire[offset..end]).await.unwrap();
            stream.flush().await.unwrap();
            offset = end;
            turn += 1;
            if turn % 4 == 0 {
                sleep(Duration::from_millis(2)).await;
            }
        }

        for expected in packages() {
            let package = timeout(WAIT, received.recv()).await.unwrap().unwrap();
            assert_eq!(package, expected);
        }
        assert_eq!(channel.stats().frames_received, 3);
    }

    #[tokio::test]
    async fn test_bad_magic_drops_only_that_connection() {
        let (channel, mut received) = listening_channel().await;
        let addr = channel.local_addr().unwrap();

        let mut bad = TcpStream::connect(addr).await.unwrap();
        bad.write_all(b"XX\0\0\0\x02{}").await.unwrap();

        let mut good = TcpStream::connect(addr).await.unwrap();
        let package = MessagePackage::request(RequestId(5), PackageType::Pull, vec![]);
        good.write_all(&encode_frame(&package, DEFAULT_MAX_FRAME_LEN).unwrap())
            .await
            .unwrap();

        let delivered = timeout(WAIT, received.recv()).await.unwrap().unwrap();
        assert_eq!(delivered, package);
    }
}
