//! Tests for the synchronizer and the change-feed worker.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use crate::backend::{ChangeFeed, ChangeKind, InMemoryBackend, Table};
    use crate::events::{ConsoleEvent, MockConsoleEventSink, NotificationLevel};
    use crate::session::Role;
    use crate::sync::{feed_channel, spawn_resync_worker, tables_for_role, DataCache, Synchronizer};

    fn synchronizer(memory: &InMemoryBackend, sink: &MockConsoleEventSink) -> Arc<Synchronizer> {
        Arc::new(Synchronizer::new(
            memory.backend().records,
            Arc::new(DataCache::new()),
            Arc::new(sink.clone()),
        ))
    }

    fn room_names(sync: &Synchronizer) -> Vec<String> {
        sync.cache().read(Table::Rooms, |rows| {
            rows.rooms()
                .map(|rooms| rooms.iter().map(|r| r.name.clone()).collect())
                .unwrap_or_default()
        })
    }

    #[tokio::test]
    async fn refresh_without_session_clears_and_skips_store() {
        let memory = InMemoryBackend::new();
        memory.seed(Table::Rooms, json!({"name": "Acorn", "capacity": 8}));
        let sink = MockConsoleEventSink::new();
        let sync = synchronizer(&memory, &sink);

        for table in Table::ALL {
            sync.refresh(table).await;
        }

        assert_eq!(memory.total_store_calls(), 0);
        for table in Table::ALL {
            let state = sync.cache().state(table);
            assert!(state.rows.is_empty());
            assert!(!state.loading);
        }
    }

    #[tokio::test]
    async fn refresh_orders_rooms_by_name() {
        let memory = InMemoryBackend::new();
        memory.seed(Table::Rooms, json!({"name": "Sunflower", "capacity": 12}));
        memory.seed(Table::Rooms, json!({"name": "Acorn", "capacity": 8}));
        let sink = MockConsoleEventSink::new();
        let sync = synchronizer(&memory, &sink);
        sync.set_session_active(true);

        sync.refresh(Table::Rooms).await;

        assert_eq!(room_names(&sync), vec!["Acorn", "Sunflower"]);
        assert!(sink.events().contains(&ConsoleEvent::TableRefreshed {
            table: Table::Rooms,
            rows: 2
        }));
    }

    #[tokio::test]
    async fn fetch_fault_empties_table_and_notifies() {
        let memory = InMemoryBackend::new();
        memory.seed(Table::Rooms, json!({"name": "Acorn", "capacity": 8}));
        let sink = MockConsoleEventSink::new();
        let sync = synchronizer(&memory, &sink);
        sync.set_session_active(true);
        sync.refresh(Table::Rooms).await;
        assert_eq!(sync.cache().len(Table::Rooms), 1);

        memory.fail_table(Table::Rooms);
        sync.refresh(Table::Rooms).await;

        assert_eq!(sync.cache().len(Table::Rooms), 0);
        assert!(!sync.cache().is_loading(Table::Rooms));
        assert_eq!(
            sink.messages(NotificationLevel::Error),
            vec!["Error fetching rooms: simulated failure on table 'rooms'"]
        );
    }

    #[tokio::test]
    async fn undecodable_rows_are_skipped_not_fatal() {
        let memory = InMemoryBackend::new();
        memory.seed(
            Table::Invoices,
            json!({"id": "inv-1", "child_id": "c1", "invoice_date": "2024-05-01",
                   "amount_due": "500.00", "status": "Paid"}),
        );
        memory.seed(
            Table::Invoices,
            json!({"id": "inv-2", "child_id": "c1", "invoice_date": "2024-05-02",
                   "amount_due": "80.00", "status": "Cancelled"}),
        );
        memory.seed(
            Table::DailyReports,
            json!({"id": "dr-1", "child_id": "c1", "report_date": "2024-05-01"}),
        );
        memory.seed(
            Table::DailyReports,
            json!({"id": "dr-2", "child_id": "c1", "report_date": null}),
        );
        let sink = MockConsoleEventSink::new();
        let sync = synchronizer(&memory, &sink);
        sync.set_session_active(true);

        sync.refresh_many(&[Table::Invoices, Table::DailyReports]).await;

        let invoice_ids: Vec<String> = sync.cache().read(Table::Invoices, |rows| {
            rows.invoices()
                .map(|invoices| invoices.iter().map(|i| i.id.clone()).collect())
                .unwrap_or_default()
        });
        assert_eq!(invoice_ids, vec!["inv-1"]);
        assert_eq!(sync.cache().len(Table::DailyReports), 1);
        assert!(sink.messages(NotificationLevel::Error).is_empty());
    }

    #[tokio::test]
    async fn load_for_role_touches_only_role_tables() {
        let memory = InMemoryBackend::new();
        let sink = MockConsoleEventSink::new();
        let sync = synchronizer(&memory, &sink);
        sync.set_session_active(true);

        sync.load_for_role(Role::Parent).await;

        let expected = tables_for_role(Role::Parent);
        for table in Table::ALL {
            let calls = memory.select_calls(table);
            assert_eq!(calls, usize::from(expected.contains(&table)), "{}", table);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn worker_coalesces_bursts_per_table() {
        let memory = InMemoryBackend::new();
        let sink = MockConsoleEventSink::new();
        let sync = synchronizer(&memory, &sink);
        sync.set_session_active(true);
        let subscription = ChangeFeed::subscribe(
            &memory,
            &feed_channel(Role::Admin),
            &[Table::Children, Table::Rooms],
        )
        .await
        .unwrap();
        let handle = spawn_resync_worker(subscription, sync.clone(), Duration::from_millis(20));

        memory.push_change(Table::Children, ChangeKind::Insert);
        memory.push_change(Table::Children, ChangeKind::Update);
        memory.push_change(Table::Rooms, ChangeKind::Delete);
        memory.push_change(Table::Children, ChangeKind::Delete);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(memory.select_calls(Table::Children), 1);
        assert_eq!(memory.select_calls(Table::Rooms), 1);
        assert_eq!(memory.select_calls(Table::Staff), 0);

        drop(handle);
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(memory.open_channels().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn worker_reports_a_feed_that_ends() {
        let memory = InMemoryBackend::new();
        let sink = MockConsoleEventSink::new();
        let sync = synchronizer(&memory, &sink);
        sync.set_session_active(true);
        let subscription = ChangeFeed::subscribe(&memory, &feed_channel(Role::Admin), &[Table::Rooms])
            .await
            .unwrap();
        let handle = spawn_resync_worker(subscription, sync.clone(), Duration::from_millis(20));

        memory.close_channels();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(handle.is_finished());
        let errors = sink.messages(NotificationLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("Live updates disconnected"));
    }
}
