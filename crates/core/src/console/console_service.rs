use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

use crate::announcements::AnnouncementService;
use crate::backend::{AuthChange, AuthEvent, AuthSession, Backend, Table};
use crate::billing::{Invoice, InvoiceService};
use crate::children::ChildService;
use crate::constants::DEFAULT_RESYNC_DEBOUNCE_MS;
use crate::daily_reports::{DailyReport, DailyReportService};
use crate::dashboard::{self, AdminStats, ParentOverview};
use crate::events::{ConsoleEvent, ConsoleEventSink};
use crate::gallery::{self, GalleryItem};
use crate::incidents::IncidentService;
use crate::medications::MedicationService;
use crate::navigation::{self, NavItem, Page, View};
use crate::parents::ParentService;
use crate::rooms::RoomService;
use crate::session::{CurrentUser, Role, RoleResolver, SessionSnapshot};
use crate::staff::StaffService;
use crate::sync::{
    feed_channel, spawn_resync_worker, tables_for_role, DataCache, ResyncHandle, Synchronizer,
    TableState,
};
use crate::waitlist::WaitlistService;

#[derive(Debug, Clone)]
pub struct ConsoleConfig {
    /// Window for coalescing change notifications per table.
    pub resync_debounce: Duration,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            resync_debounce: Duration::from_millis(DEFAULT_RESYNC_DEBOUNCE_MS),
        }
    }
}

#[derive(Default)]
struct ConsoleState {
    session: Option<AuthSession>,
    user: Option<CurrentUser>,
    page: Option<Page>,
}

pub(super) struct Services {
    pub children: ChildService,
    pub staff: StaffService,
    pub rooms: RoomService,
    pub parents: ParentService,
    pub daily_reports: DailyReportService,
    pub incidents: IncidentService,
    pub medications: MedicationService,
    pub announcements: AnnouncementService,
    pub invoices: InvoiceService,
    pub waitlist: WaitlistService,
}

impl Services {
    fn new(backend: &Backend) -> Self {
        let store = backend.records.clone();
        Self {
            children: ChildService::new(store.clone()),
            staff: StaffService::new(store.clone()),
            rooms: RoomService::new(store.clone()),
            parents: ParentService::new(store.clone()),
            daily_reports: DailyReportService::new(store.clone(), backend.blobs.clone()),
            incidents: IncidentService::new(store.clone()),
            medications: MedicationService::new(store.clone()),
            announcements: AnnouncementService::new(store.clone()),
            invoices: InvoiceService::new(store.clone()),
            waitlist: WaitlistService::new(store),
        }
    }
}

/// One console session over a hosted backend.
///
/// Holds the session, the resolved user, the page token and the table
/// caches. Session changes arrive from the identity provider and are
/// handled one at a time.
pub struct Console {
    pub(super) backend: Backend,
    pub(super) sink: Arc<dyn ConsoleEventSink>,
    pub(super) services: Services,
    resolver: RoleResolver,
    synchronizer: Arc<Synchronizer>,
    cache: Arc<DataCache>,
    config: ConsoleConfig,
    state: RwLock<ConsoleState>,
    feed: Mutex<Option<ResyncHandle>>,
    auth_listener: Mutex<Option<JoinHandle<()>>>,
    auth_gate: tokio::sync::Mutex<()>,
}

impl Console {
    pub fn new(backend: Backend, sink: Arc<dyn ConsoleEventSink>, config: ConsoleConfig) -> Self {
        let cache = Arc::new(DataCache::new());
        let synchronizer = Arc::new(Synchronizer::new(
            backend.records.clone(),
            cache.clone(),
            sink.clone(),
        ));
        Self {
            services: Services::new(&backend),
            resolver: RoleResolver::new(backend.records.clone()),
            backend,
            sink,
            synchronizer,
            cache,
            config,
            state: RwLock::new(ConsoleState::default()),
            feed: Mutex::new(None),
            auth_listener: Mutex::new(None),
            auth_gate: tokio::sync::Mutex::new(()),
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, ConsoleState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, ConsoleState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    fn feed_slot(&self) -> MutexGuard<'_, Option<ResyncHandle>> {
        self.feed.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Restores any existing session and starts listening for session
    /// changes.
    pub async fn start(self: &Arc<Self>) {
        let mut changes = self.backend.identity.subscribe();

        match self.backend.identity.current_session().await {
            Ok(session) => {
                self.handle_auth_change(AuthChange::new(AuthEvent::InitialSession, session))
                    .await
            }
            Err(e) => warn!("Could not restore session: {}", e),
        }

        let console: Weak<Console> = Arc::downgrade(self);
        let listener = tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(change) => match console.upgrade() {
                        Some(console) => {
                            if console.is_current(&change).await {
                                console.handle_auth_change(change).await;
                            } else {
                                debug!("Skipping superseded {:?} notification", change.event);
                            }
                        }
                        None => break,
                    },
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Auth listener skipped {} session change(s)", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Auth listener stopped");
        });
        let previous = self
            .auth_listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .replace(listener);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    /// Stops the auth listener and the change-feed worker.
    pub fn shutdown(&self) {
        if let Some(listener) = self
            .auth_listener
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            listener.abort();
        }
        self.stop_feed();
    }

    /// Whether `change` still describes the provider's current session.
    /// Commands apply their own changes directly, so notifications queued
    /// behind a later sign-in or sign-out are dropped.
    async fn is_current(&self, change: &AuthChange) -> bool {
        match self.backend.identity.current_session().await {
            Ok(current) => {
                current.as_ref().map(|s| s.access_token.as_str())
                    == change.session.as_ref().map(|s| s.access_token.as_str())
            }
            Err(_) => true,
        }
    }

    /// Applies a session-change notification.
    ///
    /// The profile is re-resolved on every notification. The landing page
    /// is seeded only when no page is set or the identity changed. Tables
    /// are reloaded and the feed resubscribed only when the identity or
    /// its role changed.
    pub async fn handle_auth_change(&self, change: AuthChange) {
        let _gate = self.auth_gate.lock().await;
        debug!("Session change: {:?}", change.event);

        let Some(session) = change.session else {
            self.clear_session();
            return;
        };

        let user = self.resolver.resolve(&session.user).await;
        let role = user.role;

        let (identity_changed, role_changed, profile_changed, seeded) = {
            let mut state = self.write_state();
            let previous = state.user.as_ref();
            let identity_changed = previous.map(|u| u.user_id.as_str()) != Some(user.user_id.as_str());
            let role_changed = previous.map(|u| u.role) != Some(role);
            let display_changed =
                previous.map(|u| u.display_name.as_str()) != Some(user.display_name.as_str());
            state.session = Some(session);
            state.user = Some(user.clone());
            let seeded = if state.page.is_none() || identity_changed {
                let landing = navigation::landing_page(role);
                state.page = Some(landing);
                Some(landing)
            } else {
                None
            };
            (
                identity_changed,
                role_changed,
                identity_changed || role_changed || display_changed,
                seeded,
            )
        };

        if profile_changed {
            info!("Session established for {} as {}", user.user_id, role);
            self.sink.emit(ConsoleEvent::SessionChanged {
                role: Some(role),
                display_name: Some(user.display_name.clone()),
            });
        }
        if let Some(page) = seeded {
            self.sink.emit(ConsoleEvent::Navigated { page: Some(page) });
        }

        self.synchronizer.set_session_active(true);
        if identity_changed || role_changed {
            self.stop_feed();
            self.cache.clear_all();
            self.start_feed(role).await;
            self.synchronizer.load_for_role(role).await;
        }
    }

    fn clear_session(&self) {
        let was_signed_in = {
            let mut state = self.write_state();
            let was_signed_in = state.session.is_some() || state.user.is_some();
            *state = ConsoleState::default();
            was_signed_in
        };
        self.synchronizer.set_session_active(false);
        self.stop_feed();
        self.synchronizer.clear_all();
        if was_signed_in {
            info!("Session cleared");
            self.sink.emit(ConsoleEvent::SessionChanged {
                role: None,
                display_name: None,
            });
            self.sink.emit(ConsoleEvent::Navigated { page: None });
        }
    }

    async fn start_feed(&self, role: Role) {
        let tables = tables_for_role(role);
        if tables.is_empty() {
            return;
        }
        let channel = feed_channel(role);
        match self.backend.feed.subscribe(&channel, &tables).await {
            Ok(subscription) => {
                debug!("Subscribed to {} for {} table(s)", channel, tables.len());
                let handle = spawn_resync_worker(
                    subscription,
                    self.synchronizer.clone(),
                    self.config.resync_debounce,
                );
                if let Some(old) = self.feed_slot().replace(handle) {
                    old.abort();
                }
            }
            Err(e) => warn!("Change feed unavailable on {}: {}", channel, e),
        }
    }

    fn stop_feed(&self) {
        if let Some(handle) = self.feed_slot().take() {
            handle.abort();
        }
    }

    // Reads

    pub fn current_user(&self) -> Option<CurrentUser> {
        self.read_state().user.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.read_state().user.as_ref().map(|u| u.role)
    }

    pub fn page(&self) -> Option<Page> {
        self.read_state().page
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.read_state();
        SessionSnapshot {
            signed_in: state.session.is_some(),
            role: state.user.as_ref().map_or(Role::Unknown, |u| u.role),
            user: state.user.clone(),
        }
    }

    /// The view for the current role and page token.
    pub fn view(&self) -> View {
        let state = self.read_state();
        let role = state
            .session
            .as_ref()
            .map(|_| state.user.as_ref().map_or(Role::Unknown, |u| u.role));
        navigation::route(role, state.page)
    }

    /// Sets the page token and returns the resulting view.
    pub fn navigate(&self, page: Page) -> View {
        self.write_state().page = Some(page);
        self.sink.emit(ConsoleEvent::Navigated { page: Some(page) });
        self.view()
    }

    pub fn nav_items(&self) -> &'static [NavItem] {
        match self.role() {
            Some(role) => navigation::nav_items(role),
            None => &[],
        }
    }

    pub fn portal_name(&self) -> &'static str {
        navigation::portal_name(self.role().unwrap_or(Role::Unknown))
    }

    pub fn table(&self, table: Table) -> TableState {
        self.cache.state(table)
    }

    pub fn cache(&self) -> &DataCache {
        &self.cache
    }

    /// Re-fetches one table on demand.
    pub async fn refresh(&self, table: Table) -> TableState {
        self.synchronizer.refresh(table).await;
        self.cache.state(table)
    }

    pub fn gallery(&self) -> Vec<GalleryItem> {
        self.current_user()
            .map(|user| gallery::gallery_items(&self.cache, &user))
            .unwrap_or_default()
    }

    pub fn admin_stats(&self) -> AdminStats {
        dashboard::admin_stats(&self.cache)
    }

    pub fn parent_overview(&self) -> Option<ParentOverview> {
        self.current_user()
            .filter(|u| u.role == Role::Parent)
            .map(|user| dashboard::parent_overview(&self.cache, &user))
    }

    pub fn parent_daily_reports(&self) -> Vec<DailyReport> {
        self.current_user()
            .filter(|u| u.role == Role::Parent)
            .map(|user| dashboard::parent_daily_reports(&self.cache, &user))
            .unwrap_or_default()
    }

    pub fn parent_invoices(&self) -> Vec<Invoice> {
        self.current_user()
            .filter(|u| u.role == Role::Parent)
            .map(|user| dashboard::parent_invoices(&self.cache, &user))
            .unwrap_or_default()
    }
}

impl Drop for Console {
    fn drop(&mut self) {
        self.shutdown();
    }
}
