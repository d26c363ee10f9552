//! Entity commands.
//!
//! Each command validates, issues one write (after at most one pre-check
//! query), then notifies. Caches are never patched here; they change only
//! when the change feed reports the write.

use chrono::Utc;
use log::{error, warn};

use super::command_model::{CommandOutcome, Confirmation};
use super::console_service::Console;
use crate::announcements::AnnouncementInput;
use crate::backend::{AuthChange, AuthEvent, FileUpload, Table};
use crate::billing::{InvoiceDetails, InvoiceDocument, InvoiceInput};
use crate::children::{Child, ChildInput};
use crate::constants::INVOICE_ISSUER;
use crate::daily_reports::DailyReportInput;
use crate::errors::{Error, Result};
use crate::events::{ConsoleEvent, NotificationLevel};
use crate::incidents::IncidentInput;
use crate::medications::{MedicationInput, MedicationLogInput};
use crate::navigation::Page;
use crate::parents::ParentInput;
use crate::rooms::RoomInput;
use crate::session::CurrentUser;
use crate::staff::StaffInput;
use crate::waitlist::{WaitlistInput, WaitlistSave};

impl Console {
    fn completed(&self, message: &str, page: Option<Page>) -> CommandOutcome {
        self.sink.emit(ConsoleEvent::success(message));
        if let Some(page) = page {
            self.navigate(page);
        }
        CommandOutcome::Completed {
            message: message.to_string(),
            page,
        }
    }

    /// Rejections are shown as-is; backend failures carry `prefix`.
    fn failed(&self, prefix: &str, err: Error) -> CommandOutcome {
        if err.is_rejection() {
            let message = err.user_message();
            let level = match err {
                Error::Duplicate(_) => NotificationLevel::Warning,
                _ => NotificationLevel::Error,
            };
            warn!("{}{}", prefix, message);
            self.sink.emit(ConsoleEvent::notification(level, message.clone()));
            CommandOutcome::Rejected { message }
        } else {
            let message = format!("{}{}", prefix, err.user_message());
            error!("{}", message);
            self.sink.emit(ConsoleEvent::error(message.clone()));
            CommandOutcome::Failed { message }
        }
    }

    fn finish(
        &self,
        result: Result<()>,
        success: &str,
        page: Option<Page>,
        error_prefix: &str,
    ) -> CommandOutcome {
        match result {
            Ok(()) => self.completed(success, page),
            Err(e) => self.failed(error_prefix, e),
        }
    }

    fn actor(&self) -> Result<CurrentUser> {
        self.current_user().ok_or(Error::NoSession)
    }

    fn cached_child(&self, child_id: &str) -> Option<Child> {
        self.cache().read(Table::Children, |rows| {
            rows.children().and_then(|c| c.get(child_id)).cloned()
        })
    }

    // Auth

    pub async fn sign_up(&self, email: &str, password: &str) -> CommandOutcome {
        let result = self.backend.identity.sign_up(email, password).await;
        self.finish(
            result,
            "Signup successful! Please check your email to confirm.",
            None,
            "Signup error: ",
        )
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> CommandOutcome {
        match self.backend.identity.sign_in(email, password).await {
            Ok(session) => {
                self.handle_auth_change(AuthChange::new(AuthEvent::SignedIn, Some(session)))
                    .await;
                CommandOutcome::Completed {
                    message: "Signed in.".to_string(),
                    page: self.page(),
                }
            }
            Err(e) => self.failed("Signin error: ", e),
        }
    }

    pub async fn sign_out(&self) -> CommandOutcome {
        match self.backend.identity.sign_out().await {
            Ok(()) => {
                self.handle_auth_change(AuthChange::new(AuthEvent::SignedOut, None))
                    .await;
                CommandOutcome::Completed {
                    message: "Signed out.".to_string(),
                    page: None,
                }
            }
            Err(e) => self.failed("Signout error: ", e),
        }
    }

    // Children

    pub async fn create_child(&self, input: ChildInput) -> CommandOutcome {
        let result = self.services.children.create_child(input).await;
        self.finish(
            result,
            "Child added successfully!",
            Some(Page::Children),
            "Add child error: ",
        )
    }

    pub async fn update_child(&self, child_id: &str, input: ChildInput) -> CommandOutcome {
        let result = self.services.children.update_child(child_id, input).await;
        self.finish(result, "Child updated!", None, "Update child error: ")
    }

    pub async fn delete_child(&self, child_id: &str, confirmation: Confirmation) -> CommandOutcome {
        if confirmation != Confirmation::Confirmed {
            return CommandOutcome::Cancelled;
        }
        let result = self.services.children.delete_child(child_id).await;
        self.finish(result, "Child deleted!", None, "Delete child error: ")
    }

    /// Flips the check-in state of a cached child.
    pub async fn toggle_check_in(&self, child_id: &str) -> CommandOutcome {
        let result = match self.cached_child(child_id) {
            Some(child) => self
                .services
                .children
                .toggle_check_in(&child, Utc::now())
                .await
                .map(|_| ()),
            None => Err(Error::NotFound("Child not found.".to_string())),
        };
        self.finish(
            result,
            "Child checked in/out successfully!",
            None,
            "Check-in/out error: ",
        )
    }

    // Staff

    pub async fn create_staff(&self, input: StaffInput) -> CommandOutcome {
        let actor = self.current_user();
        let result = self.services.staff.create_staff(input, actor.as_ref()).await;
        self.finish(result, "Staff added!", Some(Page::Staff), "Add staff error: ")
    }

    pub async fn update_staff(&self, staff_id: &str, input: StaffInput) -> CommandOutcome {
        let result = self.services.staff.update_staff(staff_id, input).await;
        self.finish(
            result,
            "Staff member updated successfully!",
            None,
            "Error updating staff member: ",
        )
    }

    pub async fn delete_staff(&self, staff_id: &str, confirmation: Confirmation) -> CommandOutcome {
        if confirmation != Confirmation::Confirmed {
            return CommandOutcome::Cancelled;
        }
        let result = self.services.staff.delete_staff(staff_id).await;
        self.finish(result, "Staff member deleted!", None, "Delete staff error: ")
    }

    // Rooms

    pub async fn create_room(&self, input: RoomInput) -> CommandOutcome {
        let result = self.services.rooms.create_room(input).await;
        self.finish(result, "Room added!", Some(Page::Rooms), "Add room error: ")
    }

    pub async fn update_room(&self, room_id: &str, input: RoomInput) -> CommandOutcome {
        let result = self.services.rooms.update_room(room_id, input).await;
        self.finish(result, "Room updated!", None, "Update room error: ")
    }

    pub async fn delete_room(&self, room_id: &str, confirmation: Confirmation) -> CommandOutcome {
        if confirmation != Confirmation::Confirmed {
            return CommandOutcome::Cancelled;
        }
        let result = self.services.rooms.delete_room(room_id).await;
        self.finish(result, "Room deleted!", None, "Delete room error: ")
    }

    // Parents

    pub async fn create_parent(&self, input: ParentInput) -> CommandOutcome {
        let result = self.services.parents.create_parent(input).await;
        self.finish(
            result,
            "Parent added successfully!",
            Some(Page::AdminParents),
            "Error adding parent: ",
        )
    }

    pub async fn update_parent(&self, parent_id: &str, input: ParentInput) -> CommandOutcome {
        let result = self.services.parents.update_parent(parent_id, input).await;
        self.finish(result, "Parent details updated!", None, "Error updating parent: ")
    }

    pub async fn delete_parent(&self, parent_id: &str, confirmation: Confirmation) -> CommandOutcome {
        if confirmation != Confirmation::Confirmed {
            return CommandOutcome::Cancelled;
        }
        let result = self.services.parents.delete_parent(parent_id).await;
        self.finish(
            result,
            "Parent deleted successfully!",
            None,
            "Error deleting parent: ",
        )
    }

    // Daily reports

    pub async fn create_daily_report(
        &self,
        input: DailyReportInput,
        photos: Vec<FileUpload>,
    ) -> CommandOutcome {
        let actor = match self.actor() {
            Ok(actor) => actor,
            Err(e) => return self.failed("Error adding daily report: ", e),
        };
        let page = if actor.role.is_staff() {
            Page::AdminDailyReports
        } else {
            Page::ParentDashboard
        };
        let result = self
            .services
            .daily_reports
            .create_report(input, photos, &actor, Utc::now())
            .await;
        self.finish(
            result,
            "Daily report added successfully!",
            Some(page),
            "Error adding daily report: ",
        )
    }

    // Incidents

    pub async fn log_incident(&self, input: IncidentInput) -> CommandOutcome {
        let result = match self.actor() {
            Ok(actor) => self.services.incidents.log_incident(input, &actor).await,
            Err(e) => Err(e),
        };
        self.finish(
            result,
            "Incident report logged!",
            Some(Page::AdminIncidentReports),
            "Log incident error: ",
        )
    }

    // Medications

    pub async fn create_medication(&self, input: MedicationInput) -> CommandOutcome {
        let result = self.services.medications.create_medication(input).await;
        self.finish(result, "Medication added!", None, "Add medication error: ")
    }

    pub async fn update_medication(
        &self,
        medication_id: &str,
        input: MedicationInput,
    ) -> CommandOutcome {
        let result = self
            .services
            .medications
            .update_medication(medication_id, input)
            .await;
        self.finish(result, "Medication updated!", None, "Update medication error: ")
    }

    pub async fn delete_medication(
        &self,
        medication_id: &str,
        confirmation: Confirmation,
    ) -> CommandOutcome {
        if confirmation != Confirmation::Confirmed {
            return CommandOutcome::Cancelled;
        }
        let result = self.services.medications.delete_medication(medication_id).await;
        self.finish(result, "Medication deleted!", None, "Delete medication error: ")
    }

    pub async fn log_medication(&self, input: MedicationLogInput) -> CommandOutcome {
        let result = match self.actor() {
            Ok(actor) => {
                self.services
                    .medications
                    .log_administration(input, &actor)
                    .await
            }
            Err(e) => Err(e),
        };
        self.finish(
            result,
            "Medication administration logged!",
            None,
            "Log med admin error: ",
        )
    }

    // Announcements

    pub async fn create_announcement(&self, input: AnnouncementInput) -> CommandOutcome {
        let result = match self.actor() {
            Ok(actor) => {
                self.services
                    .announcements
                    .create_announcement(input, &actor)
                    .await
            }
            Err(e) => Err(e),
        };
        self.finish(
            result,
            "Announcement created!",
            Some(Page::AdminAnnouncements),
            "Create announcement error: ",
        )
    }

    pub async fn update_announcement(
        &self,
        announcement_id: &str,
        input: AnnouncementInput,
    ) -> CommandOutcome {
        let result = match self.actor() {
            Ok(actor) => {
                self.services
                    .announcements
                    .update_announcement(announcement_id, input, &actor)
                    .await
            }
            Err(e) => Err(e),
        };
        self.finish(
            result,
            "Announcement updated!",
            Some(Page::AdminAnnouncements),
            "Update announcement error: ",
        )
    }

    pub async fn delete_announcement(
        &self,
        announcement_id: &str,
        confirmation: Confirmation,
    ) -> CommandOutcome {
        if confirmation != Confirmation::Confirmed {
            return CommandOutcome::Cancelled;
        }
        let result = self
            .services
            .announcements
            .delete_announcement(announcement_id)
            .await;
        self.finish(
            result,
            "Announcement deleted!",
            None,
            "Delete announcement error: ",
        )
    }

    // Billing

    pub async fn create_invoice(&self, input: InvoiceInput) -> CommandOutcome {
        let actor = self.current_user();
        let result = self
            .services
            .invoices
            .create_invoice(input, actor.as_ref())
            .await;
        self.finish(
            result,
            "Invoice created!",
            Some(Page::AdminBilling),
            "Create invoice error: ",
        )
    }

    /// Resolves a cached invoice with its child and billed parent.
    pub async fn invoice_details(&self, invoice_id: &str) -> Result<InvoiceDetails> {
        let invoice = self
            .cache()
            .read(Table::Invoices, |rows| {
                rows.invoices().and_then(|i| i.get(invoice_id)).cloned()
            })
            .ok_or_else(|| Error::NotFound("Invoice not found.".to_string()))?;
        let child = self.cached_child(&invoice.child_id);

        match self.services.invoices.invoice_details(invoice, child).await {
            Ok(details) => {
                if let Some(e) = &details.parent_lookup_error {
                    self.sink
                        .emit(ConsoleEvent::error(format!("Error fetching parent details: {}", e)));
                }
                Ok(details)
            }
            Err(e) => {
                self.sink.emit(ConsoleEvent::error(e.user_message()));
                Err(e)
            }
        }
    }

    /// Renders a cached invoice to PDF. Returns the file name and bytes.
    pub async fn export_invoice_pdf(&self, invoice_id: &str) -> Result<(String, Vec<u8>)> {
        let details = self.invoice_details(invoice_id).await?;
        let document = InvoiceDocument::from_details(&details, INVOICE_ISSUER);
        Ok((document.file_name(), document.to_pdf()))
    }

    // Waitlist

    pub async fn save_waitlist_entry(&self, input: WaitlistInput) -> CommandOutcome {
        match self.services.waitlist.save_entry(input).await {
            Ok(WaitlistSave::Added) => {
                self.completed("Waitlist entry added!", Some(Page::AdminWaitlist))
            }
            Ok(WaitlistSave::Updated) => {
                self.completed("Waitlist entry updated!", Some(Page::AdminWaitlist))
            }
            Err(e) => self.failed("Waitlist error: ", e),
        }
    }

    pub async fn delete_waitlist_entry(
        &self,
        entry_id: &str,
        confirmation: Confirmation,
    ) -> CommandOutcome {
        if confirmation != Confirmation::Confirmed {
            return CommandOutcome::Cancelled;
        }
        let result = self.services.waitlist.delete_entry(entry_id).await;
        self.finish(
            result,
            "Waitlist entry removed!",
            None,
            "Delete waitlist entry error: ",
        )
    }
}
