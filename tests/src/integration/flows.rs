//! # End-to-End Flows
//!
//! Caller session → push channel → host listener → dispatcher → document,
//! and the reply back through the pull channel.

#[cfg(test)]
mod tests {
    use crate::fixtures::{sample_document, start_bridge};
    use hb_04_document_mutator::HostDocument;
    use serde_json::json;
    use shared_types::{
        from_data, ElementLocator, EventLevel, NativeClass, NumericId, SelectionPolicy,
        SettingsBundle, WorksetPolicy,
    };

    fn by_uid(uid: &str, domain_type: &str) -> ElementLocator {
        ElementLocator::by_unique_id(uid, domain_type)
    }

    fn ids(outcome: &shared_types::TransactionOutcome) -> Vec<NumericId> {
        outcome.affected.iter().copied().collect()
    }

    #[tokio::test]
    async fn test_connection_check_round_trip() {
        let bridge = start_bridge(sample_document(), SettingsBundle::default()).await;

        assert!(bridge.session.check_connection().await);
        assert_eq!(bridge.host.handled(), 1);
        assert!(bridge.caller_log.all().is_empty());
    }

    #[tokio::test]
    async fn test_delete_only_touches_allowed_elements() {
        let settings = SettingsBundle::default()
            .with_selection(SelectionPolicy::open().allow_unique_ids(["u-1"]));
        let bridge = start_bridge(sample_document(), settings).await;

        let outcome = bridge
            .session
            .delete(&[by_uid("u-1", "Level"), by_uid("u-2", "Level")])
            .await;

        assert!(outcome.success);
        assert_eq!(ids(&outcome), vec![NumericId(1)]);
        let document = bridge.document.lock();
        assert!(document.contains(NumericId(2)));
        assert_eq!(document.counters().transactions_started, 1);
        assert_eq!(document.counters().commits, 1);
    }

    #[tokio::test]
    async fn test_all_denied_opens_no_transaction() {
        let settings = SettingsBundle::default()
            .with_workset(WorksetPolicy::open().open_worksets_only(true));
        let bridge = start_bridge(sample_document(), settings).await;

        let outcome = bridge.session.delete(&[by_uid("u-3", "Wall")]).await;

        assert!(!outcome.success);
        assert!(outcome.affected.is_empty());
        assert_eq!(bridge.document.lock().counters().transactions_started, 0);

        let events = bridge.caller_log.all();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, EventLevel::Warning);
    }

    #[tokio::test]
    async fn test_empty_delete_fails_without_transaction() {
        let bridge = start_bridge(sample_document(), SettingsBundle::default()).await;

        let outcome = bridge.session.delete(&[]).await;

        assert!(!outcome.success);
        assert_eq!(bridge.document.lock().counters().transactions_started, 0);
        assert_eq!(bridge.document.lock().len(), 4);
    }

    #[tokio::test]
    async fn test_cascaded_deletes_are_committed_and_reported() {
        let bridge = start_bridge(sample_document(), SettingsBundle::default()).await;

        let outcome = bridge.session.delete(&[by_uid("u-3", "Wall")]).await;

        assert!(outcome.success);
        assert_eq!(ids(&outcome), vec![NumericId(3), NumericId(4)]);
        let document = bridge.document.lock();
        assert!(!document.contains(NumericId(4)));
        assert_eq!(document.counters().commits, 1);
    }

    #[tokio::test]
    async fn test_unresolved_targets_are_replayed_to_caller() {
        let bridge = start_bridge(sample_document(), SettingsBundle::default()).await;

        let outcome = bridge
            .session
            .delete(&[by_uid("u-missing", "Level"), ElementLocator::by_name("L2", "Storey")])
            .await;

        assert_eq!(ids(&outcome), vec![NumericId(2)]);
        let events = bridge.caller_log.all();
        assert_eq!(events.len(), 1);
        assert!(events[0].is_error());
        assert!(events[0].message.contains("u-missing"));
    }

    #[tokio::test]
    async fn test_pulled_objects_can_be_deleted() {
        let bridge = start_bridge(sample_document(), SettingsBundle::default()).await;

        let objects = bridge.session.pull(&NativeClass::new("Level")).await;
        assert_eq!(objects.len(), 2);

        let targets: Vec<ElementLocator> = from_data(&objects).unwrap();
        let outcome = bridge.session.delete(&targets).await;

        assert_eq!(ids(&outcome), vec![NumericId(1), NumericId(2)]);
        assert!(bridge
            .document
            .lock()
            .elements_of_class(&NativeClass::new("Level"))
            .is_empty());
    }

    #[tokio::test]
    async fn test_pull_is_read_gated() {
        let settings = SettingsBundle::default()
            .with_selection(
                SelectionPolicy::open()
                    .allow_numeric_ids((1..=4).map(NumericId))
                    .allow_categories(["Walls", "Doors"]),
            )
            .with_workset(WorksetPolicy::open().open_worksets_only(true));
        let bridge = start_bridge(sample_document(), settings).await;

        assert!(bridge.session.pull(&NativeClass::new("Wall")).await.is_empty());
        assert!(bridge.session.pull(&NativeClass::new("Level")).await.is_empty());
    }

    #[tokio::test]
    async fn test_push_creates_in_one_transaction() {
        let bridge = start_bridge(sample_document(), SettingsBundle::default()).await;

        let outcome = bridge
            .session
            .push(vec![
                json!({"name": "L3", "domain_type": "Storey"}),
                json!({"name": "L4", "domain_type": "Storey"}),
            ])
            .await;

        assert!(outcome.success);
        assert_eq!(outcome.affected.len(), 2);
        let document = bridge.document.lock();
        assert_eq!(document.len(), 6);
        assert_eq!(document.counters().transactions_started, 1);
    }

    #[tokio::test]
    async fn test_session_survives_host_side_failure() {
        let bridge = start_bridge(
            sample_document().reporting_nothing_deleted(),
            SettingsBundle::default(),
        )
        .await;

        let outcome = bridge.session.delete(&[by_uid("u-1", "Level")]).await;
        assert!(!outcome.success);
        assert_eq!(bridge.document.lock().counters().rollbacks, 1);
        assert_eq!(bridge.caller_log.error_count(), 1);

        assert!(bridge.session.check_connection().await);
    }

    #[tokio::test]
    async fn test_activity_is_exported_as_metrics() {
        let bridge = start_bridge(sample_document(), SettingsBundle::default()).await;
        assert!(bridge.session.delete(&[by_uid("u-1", "Level")]).await.success);

        let text = hb_telemetry::gather_metrics().unwrap();
        assert!(text.contains("hb_mutator_elements_deleted_total"));
        assert!(text.contains("hb_channel_packages_sent_total"));
    }
}
