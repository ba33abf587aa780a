use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::models::directory::UserSummary;
use crate::models::meeting::Meeting;
use crate::models::settings::Settings;
use crate::services::api::{ApiError, BookingBackend, RestBackend};
use crate::services::meeting_editor::{EditorError, MeetingEditor};
use crate::services::notification::ToastManager;
use crate::services::settings::{load_settings_or_default, SettingsService};
use crate::ui_egui::dashboard::{render_dashboard, DashboardAction};
use crate::ui_egui::meeting_dialog::{render_meeting_dialog, MeetingDialogAction, MeetingDialogState};
use crate::ui_egui::toast::render_toasts;
use crate::utils::date::split_local;

/// Participant search response tagged with its generation
type SearchResponse = (u64, Result<Vec<UserSummary>, ApiError>);

pub struct RoomDeskApp {
    settings: Settings,
    runtime: Runtime,
    backend: Arc<dyn BookingBackend>,
    editor: MeetingEditor,
    /// Present while the edit dialog is shown
    dialog: Option<MeetingDialogState>,
    toasts: ToastManager,
    meetings: Vec<Meeting>,
    search_tx: UnboundedSender<SearchResponse>,
    search_rx: UnboundedReceiver<SearchResponse>,
    /// Absent when the platform has no config directory
    settings_service: Option<SettingsService>,
    /// Setup row text while no acting user is configured
    user_id_input: String,
}

impl eframe::App for RoomDeskApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_update(ctx);
    }
}

impl RoomDeskApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Result<Self> {
        let settings_service = match SettingsService::from_project_dirs() {
            Ok(service) => Some(service),
            Err(err) => {
                log::warn!("No settings location available: {:#}", err);
                None
            }
        };
        let settings = match &settings_service {
            Some(service) => {
                log::info!("Loading settings from {}", service.path().display());
                load_settings_or_default(service)
            }
            None => Settings::default(),
        };

        if let Some(reason) = editing_blocked_reason(&settings) {
            log::warn!("{}", reason);
        }

        let timezone: Tz = settings.timezone().unwrap_or_else(|err| {
            log::warn!("{}; using UTC", err);
            chrono_tz::UTC
        });

        let runtime = Runtime::new().context("Failed to start async runtime")?;
        let backend: Arc<dyn BookingBackend> = Arc::new(RestBackend::new(&settings)?);
        let editor = build_editor(&settings, timezone);
        let (search_tx, search_rx) = unbounded_channel();

        cc.egui_ctx.set_visuals(if resolve_dark_mode(&settings.theme) {
            egui::Visuals::dark()
        } else {
            egui::Visuals::light()
        });

        let mut app = Self {
            settings,
            runtime,
            backend,
            editor,
            dialog: None,
            toasts: ToastManager::new(),
            meetings: Vec::new(),
            search_tx,
            search_rx,
            settings_service,
            user_id_input: String::new(),
        };
        app.refresh_meetings();
        Ok(app)
    }

    fn handle_update(&mut self, ctx: &egui::Context) {
        self.drain_search_responses();
        self.dispatch_due_search(ctx);

        let tz = self.editor.timezone();
        let action = egui::CentralPanel::default()
            .show(ctx, |ui| {
                render_dashboard(
                    ui,
                    &self.meetings,
                    tz,
                    self.editor.is_open(),
                    &self.settings,
                    &mut self.user_id_input,
                )
            })
            .inner;

        match action {
            DashboardAction::Refresh => self.refresh_meetings(),
            DashboardAction::Edit(id) => self.open_editor(&id),
            DashboardAction::SetActingUser(id) => self.set_acting_user(id),
            DashboardAction::None => {}
        }

        self.show_dialog(ctx);
        render_toasts(ctx, &mut self.toasts);
    }

    fn set_acting_user(&mut self, id: String) {
        let mut updated = self.settings.clone();
        updated.acting_user_id = id;

        if let Some(service) = &self.settings_service {
            if let Err(err) = service.update(&updated) {
                log::warn!("Failed to save acting user: {:#}", err);
                self.toasts.error(format!("Could not save settings: {:#}", err));
                return;
            }
        } else if let Err(err) = updated.validate() {
            self.toasts.error(err);
            return;
        }

        log::info!("Acting user set to {}", updated.acting_user_id);
        self.editor = build_editor(&updated, self.editor.timezone());
        self.settings = updated;
        self.user_id_input.clear();
        self.toasts.success("User id saved");
    }

    fn refresh_meetings(&mut self) {
        match self.runtime.block_on(self.backend.list_meetings()) {
            Ok(meetings) => {
                log::info!("Loaded {} meetings", meetings.len());
                self.meetings = meetings;
            }
            Err(err) => {
                log::warn!("Failed to load meetings: {}", err);
                self.toasts.error(format!("Could not load meetings: {}", err));
            }
        }
    }

    fn open_editor(&mut self, meeting_id: &str) {
        if let Some(reason) = editing_blocked_reason(&self.settings) {
            self.toasts.error(reason);
            return;
        }

        let Some(meeting) = self.meetings.iter().find(|m| m.id == meeting_id).cloned() else {
            log::warn!("Meeting {} is no longer listed", meeting_id);
            return;
        };

        self.runtime
            .block_on(self.editor.open(meeting, self.backend.as_ref(), &mut self.toasts));
        self.dialog = self.editor.draft().map(|draft| MeetingDialogState::new(draft.time));
    }

    fn show_dialog(&mut self, ctx: &egui::Context) {
        let Some(state) = self.dialog.as_mut() else {
            return;
        };

        let (today, now) = split_local(Utc::now(), self.editor.timezone());
        match render_meeting_dialog(ctx, &mut self.editor, state, today, now) {
            MeetingDialogAction::Save => self.submit(),
            MeetingDialogAction::Cancel => {
                self.editor.close();
                self.dialog = None;
            }
            MeetingDialogAction::None => {}
        }
    }

    fn submit(&mut self) {
        let meetings = &mut self.meetings;
        let result = self.runtime.block_on(self.editor.submit(
            self.backend.as_ref(),
            &mut self.toasts,
            |saved| merge_saved(meetings, saved),
        ));

        match result {
            Ok(_) => {
                self.dialog = None;
                // Series edits can move occurrences the list has never seen
                self.refresh_meetings();
            }
            Err(EditorError::NotEditing) => self.dialog = None,
            Err(err) => log::debug!("Submit did not complete: {}", err),
        }
    }

    fn dispatch_due_search(&mut self, ctx: &egui::Context) {
        let Some(ticket) = self.editor.poll_search(Instant::now()) else {
            if self.editor.is_open() {
                // Wake up to issue a debounced search once input pauses
                ctx.request_repaint_after(Duration::from_millis(self.settings.search_debounce_ms.max(50)));
            }
            return;
        };

        let backend = Arc::clone(&self.backend);
        let tx = self.search_tx.clone();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let result = backend.search_users(&ticket.query).await;
            if tx.send((ticket.generation, result)).is_err() {
                log::debug!("Search response dropped, app is shutting down");
            }
            ctx.request_repaint();
        });
    }

    fn drain_search_responses(&mut self) {
        while let Ok((generation, result)) = self.search_rx.try_recv() {
            self.editor.apply_search_result(generation, result, &mut self.toasts);
        }
    }
}

fn build_editor(settings: &Settings, timezone: Tz) -> MeetingEditor {
    MeetingEditor::new(
        settings.acting_user_id.trim(),
        timezone,
        Duration::from_millis(settings.search_debounce_ms),
    )
}

/// Why meetings cannot be edited with these settings, if anything
pub(crate) fn editing_blocked_reason(settings: &Settings) -> Option<String> {
    settings
        .acting_user_id
        .trim()
        .is_empty()
        .then(|| "Set your user id before editing meetings".to_string())
}

/// Replace listed meetings with their saved versions
pub(crate) fn merge_saved(meetings: &mut Vec<Meeting>, saved: &[Meeting]) {
    for updated in saved {
        match meetings.iter_mut().find(|m| m.id == updated.id) {
            Some(existing) => *existing = updated.clone(),
            None => meetings.push(updated.clone()),
        }
    }
    meetings.sort_by_key(|m| m.start_time);
}

fn resolve_dark_mode(theme: &str) -> bool {
    match theme {
        "dark" => true,
        "system" => matches!(dark_light::detect(), dark_light::Mode::Dark),
        _ => false,
    }
}
