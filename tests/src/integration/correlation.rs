//! # Request Correlation Over TCP
//!
//! Reply matching, bounded waits and single-flight behavior with a scripted
//! host on the other end of real sockets.

#[cfg(test)]
mod tests {
    use crate::fixtures::{scripted_bridge, WAIT};
    use hb_02_request_correlator::CONNECTION_FAILED_MESSAGE;
    use serde_json::json;
    use shared_types::{
        EventLevel, EventRecord, MessagePackage, NativeClass, PackageType, TransactionOutcome,
    };
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    #[tokio::test]
    async fn test_reply_payload_and_events_in_order() {
        let (session, mut host, log) = scripted_bridge(WAIT).await;

        let caller = {
            let session = session.clone();
            tokio::spawn(async move { session.pull(&NativeClass::new("Level")).await })
        };

        let request = host.next_request().await;
        assert_eq!(request.package_type(), PackageType::Pull);
        host.reply(
            &request,
            vec![json!({"name": "L1"}), json!({"name": "L2"})],
            vec![
                EventRecord::note("first"),
                EventRecord::warning("second"),
                EventRecord::error("third"),
            ],
        )
        .await;

        let payload = caller.await.unwrap();
        assert_eq!(payload, vec![json!({"name": "L1"}), json!({"name": "L2"})]);

        let events = log.all();
        let messages: Vec<&str> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
        assert_eq!(events[1].level, EventLevel::Warning);
    }

    #[tokio::test]
    async fn test_silent_host_times_out_once() {
        let (session, mut host, log) = scripted_bridge(Duration::from_millis(200)).await;

        let payload = session.pull(&NativeClass::new("Level")).await;

        assert!(payload.is_empty());
        assert!(host.request_within(WAIT).await.is_some());
        assert_eq!(log.all().len(), 1);
        assert_eq!(log.error_count(), 1);
    }

    #[tokio::test]
    async fn test_failed_connection_check_is_recorded() {
        let (session, mut host, log) = scripted_bridge(WAIT).await;

        let caller = {
            let session = session.clone();
            tokio::spawn(async move { session.check_connection().await })
        };
        let request = host.next_request().await;
        host.reply(&request, vec![json!(false)], vec![]).await;

        assert!(!caller.await.unwrap());
        let messages: Vec<String> = log.all().into_iter().map(|e| e.message).collect();
        assert_eq!(messages, vec![CONNECTION_FAILED_MESSAGE.to_string()]);
    }

    #[tokio::test]
    async fn test_second_request_waits_for_first() {
        let (session, mut host, _log) = scripted_bridge(WAIT).await;

        let first = {
            let session = session.clone();
            tokio::spawn(async move { session.pull(&NativeClass::new("Level")).await })
        };
        let request_1 = host.next_request().await;

        let second = {
            let session = session.clone();
            tokio::spawn(async move { session.push(vec![json!({"name": "L9"})]).await })
        };
        assert!(host.request_within(Duration::from_millis(200)).await.is_none());

        host.reply(&request_1, vec![json!("one")], vec![]).await;
        assert_eq!(first.await.unwrap(), vec![json!("one")]);

        let request_2 = host.next_request().await;
        assert_eq!(request_2.package_type(), PackageType::Push);
        assert!(request_2.request_id() > request_1.request_id());

        let outcome = TransactionOutcome::committed([shared_types::NumericId(9)]);
        host.reply(&request_2, vec![json!(outcome)], vec![]).await;
        assert_eq!(second.await.unwrap(), outcome);
    }

    #[tokio::test]
    async fn test_late_reply_does_not_satisfy_next_request() {
        let (session, mut host, log) = scripted_bridge(Duration::from_millis(300)).await;

        let timed_out = session.pull(&NativeClass::new("Level")).await;
        assert!(timed_out.is_empty());
        let stale = host.next_request().await;

        let caller = {
            let session = session.clone();
            tokio::spawn(async move { session.pull(&NativeClass::new("Grid")).await })
        };
        let current = host.next_request().await;

        host.reply(&stale, vec![json!("stale")], vec![EventRecord::error("stale event")])
            .await;
        host.reply(&current, vec![json!("fresh")], vec![]).await;

        assert_eq!(caller.await.unwrap(), vec![json!("fresh")]);
        assert!(log.all().iter().all(|e| e.message != "stale event"));
        let stats = session.correlator().pending_stats();
        assert_eq!(stats.total_stale.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_unsolicited_packages_are_ignored() {
        let (session, mut host, log) = scripted_bridge(WAIT).await;

        let caller = {
            let session = session.clone();
            tokio::spawn(async move { session.pull(&NativeClass::new("Level")).await })
        };
        let request = host.next_request().await;

        host.send(&MessagePackage::unsolicited(
            PackageType::Pull,
            vec![json!("noise")],
            vec![EventRecord::warning("noise")],
        ))
        .await;
        host.reply(&request, vec![json!("answer")], vec![]).await;

        assert_eq!(caller.await.unwrap(), vec![json!("answer")]);
        assert!(log.all().is_empty());
    }
}
