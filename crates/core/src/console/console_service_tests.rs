//! End-to-end console scenarios against the in-memory backend.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::backend::{FileUpload, InMemoryBackend, Table};
    use crate::billing::{InvoiceInput, InvoiceItem, InvoiceStatus};
    use crate::children::ChildInput;
    use crate::console::{CommandOutcome, Confirmation, Console, ConsoleConfig};
    use crate::daily_reports::DailyReportInput;
    use crate::events::{MockConsoleEventSink, NotificationLevel};
    use crate::navigation::{Page, View};
    use crate::rooms::RoomInput;
    use crate::session::Role;
    use crate::staff::StaffInput;

    const PASSWORD: &str = "secret-pass";

    struct Harness {
        memory: InMemoryBackend,
        sink: MockConsoleEventSink,
        console: Arc<Console>,
    }

    async fn harness() -> Harness {
        let memory = InMemoryBackend::new();
        let sink = MockConsoleEventSink::new();
        let console = Arc::new(Console::new(
            memory.backend(),
            Arc::new(sink.clone()),
            ConsoleConfig {
                resync_debounce: Duration::from_millis(10),
            },
        ));
        console.start().await;
        Harness {
            memory,
            sink,
            console,
        }
    }

    /// Registers an account linked to a staff row. Returns the staff id.
    fn staff_account(memory: &InMemoryBackend, email: &str, role: &str) -> String {
        let user_id = memory.register_user(email, PASSWORD);
        memory.seed(
            Table::Staff,
            json!({"name": "Bea Park", "email": email, "role": role, "user_id": user_id}),
        )
    }

    /// Registers an account linked to a parent row. Returns the parent id.
    fn parent_account(memory: &InMemoryBackend, email: &str) -> String {
        let user_id = memory.register_user(email, PASSWORD);
        memory.seed(
            Table::Parents,
            json!({"first_name": "Ana", "last_name": "Ruiz", "email": email, "user_id": user_id}),
        )
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn sign_up_then_unlinked_sign_in_shows_unknown_role() {
        let h = harness().await;
        assert_eq!(h.console.view(), View::SignIn);

        let outcome = h.console.sign_up("new@daycare.test", PASSWORD).await;
        assert!(outcome.is_completed());
        assert_eq!(
            h.sink.messages(NotificationLevel::Success),
            vec!["Signup successful! Please check your email to confirm."]
        );

        let outcome = h.console.sign_in("new@daycare.test", PASSWORD).await;
        assert!(outcome.is_completed());
        assert_eq!(h.console.role(), Some(Role::UnknownProfile));
        assert_eq!(h.console.view(), View::UnknownRole);
        assert_eq!(h.console.portal_name(), "Welcome");
        assert!(h.memory.open_channels().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn bad_credentials_are_reported_verbatim() {
        let h = harness().await;

        let outcome = h.console.sign_in("nobody@daycare.test", "wrong").await;

        assert_eq!(
            outcome,
            CommandOutcome::Failed {
                message: "Signin error: Invalid login credentials".to_string()
            }
        );
        assert_eq!(h.console.view(), View::SignIn);
    }

    #[tokio::test(start_paused = true)]
    async fn created_room_reaches_cache_through_change_feed() {
        let h = harness().await;
        staff_account(&h.memory, "admin@daycare.test", "admin");
        h.memory
            .seed(Table::Rooms, json!({"name": "Acorn", "capacity": 8}));
        h.console.sign_in("admin@daycare.test", PASSWORD).await;
        assert_eq!(
            h.console.view(),
            View::Portal {
                role: Role::Admin,
                page: Page::AdminDashboard
            }
        );
        assert_eq!(h.console.table(Table::Rooms).rows.len(), 1);

        let outcome = h.console.create_room(RoomInput::new("Sunflower", 12)).await;
        assert_eq!(
            outcome,
            CommandOutcome::Completed {
                message: "Room added!".to_string(),
                page: Some(Page::Rooms)
            }
        );
        assert_eq!(h.console.page(), Some(Page::Rooms));

        settle().await;

        let names: Vec<String> = h.console.cache().read(Table::Rooms, |rows| {
            rows.rooms()
                .map(|r| r.iter().map(|room| room.name.clone()).collect())
                .unwrap_or_default()
        });
        assert_eq!(names, vec!["Acorn", "Sunflower"]);
    }

    #[tokio::test(start_paused = true)]
    async fn landing_page_is_seeded_once_per_session() {
        let h = harness().await;
        staff_account(&h.memory, "teacher@daycare.test", "Teacher");

        h.console.sign_in("teacher@daycare.test", PASSWORD).await;
        settle().await;
        assert_eq!(h.console.page(), Some(Page::TeacherDashboard));

        h.console.navigate(Page::AdminGallery);
        h.memory.refresh_session();
        settle().await;

        assert_eq!(h.console.page(), Some(Page::AdminGallery));
        assert_eq!(
            h.console.view(),
            View::Portal {
                role: Role::Teacher,
                page: Page::AdminGallery
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_clears_session_caches_and_feed() {
        let h = harness().await;
        staff_account(&h.memory, "admin@daycare.test", "admin");
        h.memory
            .seed(Table::Rooms, json!({"name": "Acorn", "capacity": 8}));
        h.console.sign_in("admin@daycare.test", PASSWORD).await;
        assert_eq!(h.memory.open_channels(), vec!["console-updates-admin"]);

        let outcome = h.console.sign_out().await;
        settle().await;

        assert!(outcome.is_completed());
        assert_eq!(h.console.view(), View::SignIn);
        assert_eq!(h.console.page(), None);
        assert!(h.console.current_user().is_none());
        assert!(h.console.table(Table::Rooms).rows.is_empty());
        assert!(h.memory.open_channels().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn expired_session_returns_to_sign_in() {
        let h = harness().await;
        staff_account(&h.memory, "admin@daycare.test", "admin");
        h.memory
            .seed(Table::Rooms, json!({"name": "Acorn", "capacity": 8}));
        h.console.sign_in("admin@daycare.test", PASSWORD).await;
        settle().await;
        assert_eq!(h.console.table(Table::Rooms).rows.len(), 1);

        h.memory.expire_session();
        settle().await;

        assert_eq!(h.console.view(), View::SignIn);
        assert!(h.console.role().is_none());
        assert!(h.console.table(Table::Rooms).rows.is_empty());
        assert!(h.memory.open_channels().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_commands_issue_no_writes() {
        let h = harness().await;
        staff_account(&h.memory, "admin@daycare.test", "admin");
        h.console.sign_in("admin@daycare.test", PASSWORD).await;

        let outcome = h
            .console
            .create_child(ChildInput {
                name: "Zoe".to_string(),
                ..Default::default()
            })
            .await;
        assert_eq!(
            outcome,
            CommandOutcome::Rejected {
                message: "Primary Parent is required.".to_string()
            }
        );

        let outcome = h
            .console
            .create_staff(StaffInput {
                name: "Cal".to_string(),
                email: "cal@daycare.test".to_string(),
                role: "Teacher".to_string(),
                ..Default::default()
            })
            .await;
        assert!(matches!(outcome, CommandOutcome::Rejected { .. }));

        assert_eq!(h.memory.write_calls(Table::Children), 0);
        assert_eq!(h.memory.write_calls(Table::Staff), 0);
        assert_eq!(h.sink.messages(NotificationLevel::Error).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_staff_email_is_a_warning() {
        let h = harness().await;
        staff_account(&h.memory, "admin@daycare.test", "admin");
        h.console.sign_in("admin@daycare.test", PASSWORD).await;

        let outcome = h
            .console
            .create_staff(StaffInput {
                name: "Other".to_string(),
                email: "admin@daycare.test".to_string(),
                role: "assistant".to_string(),
                ..Default::default()
            })
            .await;

        assert!(matches!(outcome, CommandOutcome::Rejected { .. }));
        assert_eq!(
            h.sink.messages(NotificationLevel::Warning),
            vec!["Staff with email admin@daycare.test already exists."]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn parent_with_children_cannot_be_deleted() {
        let h = harness().await;
        staff_account(&h.memory, "admin@daycare.test", "admin");
        let parent_id = h.memory.seed(
            Table::Parents,
            json!({"first_name": "Ana", "last_name": "Ruiz", "email": "ana@daycare.test"}),
        );
        h.memory.seed(
            Table::Children,
            json!({"name": "Zoe", "primary_parent_id": parent_id}),
        );
        h.console.sign_in("admin@daycare.test", PASSWORD).await;

        let calls_before = h.memory.total_store_calls();
        let outcome = h
            .console
            .delete_parent(&parent_id, Confirmation::Declined)
            .await;
        assert_eq!(outcome, CommandOutcome::Cancelled);
        assert_eq!(h.memory.total_store_calls(), calls_before);

        let outcome = h
            .console
            .delete_parent(&parent_id, Confirmation::Confirmed)
            .await;
        assert_eq!(
            outcome,
            CommandOutcome::Rejected {
                message: "Parent is linked to 1 child(ren). Reassign children first.".to_string()
            }
        );
        assert_eq!(h.memory.write_calls(Table::Parents), 0);
        assert_eq!(h.memory.rows(Table::Parents).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn report_photos_show_only_in_own_parents_gallery() {
        let h = harness().await;
        staff_account(&h.memory, "teacher@daycare.test", "teacher");
        let parent_id = parent_account(&h.memory, "ana@daycare.test");
        let own_child = h.memory.seed(
            Table::Children,
            json!({"name": "Zoe", "primary_parent_id": parent_id}),
        );
        let other_child = h.memory.seed(
            Table::Children,
            json!({"name": "Max", "primary_parent_id": "someone-else"}),
        );
        h.memory.seed(
            Table::DailyReports,
            json!({"child_id": other_child, "report_date": "2024-05-02",
                   "photo_url_1": "memory://galleryfiles/other.png"}),
        );

        h.console.sign_in("teacher@daycare.test", PASSWORD).await;
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let outcome = h
            .console
            .create_daily_report(
                DailyReportInput::new(own_child.clone(), date),
                vec![
                    FileUpload::new("nap time.png", vec![1, 2, 3]),
                    FileUpload::new("lunch.jpg", vec![4, 5, 6]),
                ],
            )
            .await;
        assert!(outcome.is_completed());
        assert_eq!(h.console.page(), Some(Page::AdminDailyReports));

        let stored = h
            .memory
            .rows(Table::DailyReports)
            .into_iter()
            .find(|r| r["child_id"] == own_child.as_str())
            .unwrap();
        let url_1 = stored["photo_url_1"].as_str().unwrap().to_string();
        let url_2 = stored["photo_url_2"].as_str().unwrap().to_string();
        assert!(url_1.contains("/report_1/") && url_1.ends_with("_nap_time.png"));
        assert!(url_2.contains("/report_2/"));
        assert_eq!(h.memory.blob_paths("galleryfiles").len(), 2);

        h.console.sign_out().await;
        h.console.sign_in("ana@daycare.test", PASSWORD).await;
        assert_eq!(h.console.role(), Some(Role::Parent));

        let gallery = h.console.gallery();
        let urls: Vec<&str> = gallery.iter().map(|g| g.url.as_str()).collect();
        assert_eq!(urls, vec![url_1.as_str(), url_2.as_str()]);
        assert!(gallery.iter().all(|g| g.child_name == "Zoe"));
    }

    #[tokio::test(start_paused = true)]
    async fn invoice_exports_to_pdf_with_parent_bill_to() {
        let h = harness().await;
        staff_account(&h.memory, "admin@daycare.test", "admin");
        let parent_id = h.memory.seed(
            Table::Parents,
            json!({"first_name": "Ana", "last_name": "Ruiz", "email": "ana@daycare.test"}),
        );
        let child_id = h.memory.seed(
            Table::Children,
            json!({"name": "Zoe", "primary_parent_id": parent_id}),
        );
        h.console.sign_in("admin@daycare.test", PASSWORD).await;

        let outcome = h
            .console
            .create_invoice(InvoiceInput {
                child_id: child_id.clone(),
                invoice_number: "INV-042".to_string(),
                invoice_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
                due_date: None,
                status: InvoiceStatus::Unpaid,
                items: vec![InvoiceItem::new("Monthly Fee", dec!(500.00))],
                notes: None,
            })
            .await;
        assert_eq!(outcome.message(), Some("Invoice created!"));
        settle().await;

        let invoice_id = h
            .console
            .cache()
            .read(Table::Invoices, |rows| {
                rows.invoices().and_then(|i| i.iter().next().map(|i| i.id.clone()))
            })
            .unwrap();
        let details = h.console.invoice_details(&invoice_id).await.unwrap();
        assert_eq!(details.bill_to.unwrap().name, "Ana Ruiz");
        assert_eq!(details.invoice.amount_due, dec!(500.00));

        let (file_name, bytes) = h.console.export_invoice_pdf(&invoice_id).await.unwrap();
        assert_eq!(file_name, "invoice_INV-042.pdf");
        let pdf = String::from_utf8(bytes).unwrap();
        assert!(pdf.contains("(Total Due: $500.00) Tj"));
        assert!(pdf.contains("(Ana Ruiz) Tj"));
    }
}
