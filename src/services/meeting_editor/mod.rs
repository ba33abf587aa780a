//! Meeting edit workflow.
//!
//! `Closed → Loading → Editing → Submitting → (Closed | Editing)`.
//! The editor owns the draft for one meeting, talks to the backend through
//! [`BookingBackend`] and reports progress as toasts.

use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use thiserror::Error;

use crate::models::directory::{Device, Room, UserSummary};
use crate::models::meeting::Meeting;
use crate::services::api::{ApiError, BookingBackend};
use crate::services::notification::ToastManager;

pub mod changes;
pub mod draft;
pub mod failure;
pub mod search;

pub use changes::changed_fields;
pub use draft::{is_valid_guest_email, MeetingDraft, RecurrenceDraft, ValidationError};
pub use failure::SubmitFailure;
pub use search::{ParticipantSearch, SearchApplied, SearchTicket};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorPhase {
    Closed,
    Loading,
    Editing,
    Submitting,
}

/// Why a submission did not go through
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("No meeting is open for editing")]
    NotEditing,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Nothing to update")]
    NoChanges,
    #[error("{}", .failure.notice())]
    Backend {
        failure: SubmitFailure,
        source: ApiError,
    },
}

pub struct MeetingEditor {
    acting_user_id: String,
    timezone: Tz,
    phase: EditorPhase,
    original: Option<Meeting>,
    draft: Option<MeetingDraft>,
    rooms: Vec<Room>,
    devices: Vec<Device>,
    search: ParticipantSearch,
    /// Labels for every user seen so far, keyed by id
    known_users: BTreeMap<String, UserSummary>,
    last_error: Option<String>,
}

impl MeetingEditor {
    pub fn new(acting_user_id: impl Into<String>, timezone: Tz, search_debounce: Duration) -> Self {
        let acting_user_id = acting_user_id.into();
        Self {
            search: ParticipantSearch::new(search_debounce, acting_user_id.clone()),
            acting_user_id,
            timezone,
            phase: EditorPhase::Closed,
            original: None,
            draft: None,
            rooms: Vec::new(),
            devices: Vec::new(),
            known_users: BTreeMap::new(),
            last_error: None,
        }
    }

    pub fn phase(&self) -> EditorPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase != EditorPhase::Closed
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn original(&self) -> Option<&Meeting> {
        self.original.as_ref()
    }

    pub fn draft(&self) -> Option<&MeetingDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut MeetingDraft> {
        self.draft.as_mut()
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn search_results(&self) -> &[UserSummary] {
        self.search.results()
    }

    pub fn known_user(&self, id: &str) -> Option<&UserSummary> {
        self.known_users.get(id)
    }

    /// In-form message from the last failed submit
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether the series toggle is meaningful for the open meeting
    pub fn has_series(&self) -> bool {
        self.original
            .as_ref()
            .map_or(false, |meeting| meeting.recurrence_series_id.is_some())
    }

    /// Load catalogs and seed the draft from `meeting`.
    ///
    /// Room and device lists are fetched concurrently; a failing catalog is
    /// reported and left empty so the form stays usable.
    pub async fn open(
        &mut self,
        meeting: Meeting,
        backend: &dyn BookingBackend,
        toasts: &mut ToastManager,
    ) {
        self.phase = EditorPhase::Loading;
        self.last_error = None;
        self.search.reset();
        log::info!("Opening meeting {} for editing", meeting.id);

        let (rooms, devices) = tokio::join!(backend.list_rooms(), backend.list_devices());

        self.rooms = rooms.unwrap_or_else(|err| {
            log::warn!("Failed to load rooms: {}", err);
            toasts.warning(format!("Could not load rooms: {}", err));
            Vec::new()
        });
        self.devices = devices.unwrap_or_else(|err| {
            log::warn!("Failed to load devices: {}", err);
            toasts.warning(format!("Could not load devices: {}", err));
            Vec::new()
        });

        for user in &meeting.participants {
            self.known_users.insert(user.id.clone(), user.clone());
        }
        self.search.seed(meeting.participants.iter().cloned());

        self.draft = Some(MeetingDraft::from_meeting(
            &meeting,
            &self.acting_user_id,
            self.timezone,
        ));
        self.original = Some(meeting);
        self.phase = EditorPhase::Editing;
    }

    /// Discard the draft without submitting
    pub fn close(&mut self) {
        self.phase = EditorPhase::Closed;
        self.original = None;
        self.draft = None;
        self.last_error = None;
        self.known_users.clear();
        self.search.reset();
    }

    pub fn search_query_changed(&mut self, query: &str, now: Instant) {
        self.search.query_changed(query, now);
    }

    /// Search that is due to be sent, if the debounce window has elapsed
    pub fn poll_search(&mut self, now: Instant) -> Option<SearchTicket> {
        if self.phase != EditorPhase::Editing {
            return None;
        }
        self.search.poll(now)
    }

    pub fn apply_search_result(
        &mut self,
        generation: u64,
        result: Result<Vec<UserSummary>, ApiError>,
        toasts: &mut ToastManager,
    ) {
        if let Ok(users) = &result {
            for user in users {
                self.known_users.insert(user.id.clone(), user.clone());
            }
        }

        if let SearchApplied::Failed(err) = self.search.apply(generation, result) {
            log::warn!("Participant search failed: {}", err);
            toasts.warning(format!("User search failed: {}", err));
        }
    }

    /// Send a due search and apply its response
    pub async fn run_search(
        &mut self,
        ticket: SearchTicket,
        backend: &dyn BookingBackend,
        toasts: &mut ToastManager,
    ) {
        let result = backend.search_users(&ticket.query).await;
        self.apply_search_result(ticket.generation, result, toasts);
    }

    /// Validate the draft and send it as a single or whole-series update.
    ///
    /// `on_saved` runs after a successful update, once the editor is closed.
    pub async fn submit<F>(
        &mut self,
        backend: &dyn BookingBackend,
        toasts: &mut ToastManager,
        on_saved: F,
    ) -> Result<Vec<Meeting>, EditorError>
    where
        F: FnOnce(&[Meeting]),
    {
        if self.phase != EditorPhase::Editing {
            return Err(EditorError::NotEditing);
        }
        let (Some(original), Some(draft)) = (self.original.as_ref(), self.draft.as_ref()) else {
            return Err(EditorError::NotEditing);
        };

        let series_id = original
            .recurrence_series_id
            .clone()
            .filter(|_| draft.edit_series);

        let payload = match draft.build_payload(self.timezone, series_id.is_some()) {
            Ok(payload) => payload,
            Err(err) => {
                toasts.error(err.to_string());
                self.last_error = Some(err.to_string());
                return Err(err.into());
            }
        };

        let changed = changed_fields(original, &payload, &self.acting_user_id);
        if changed.is_empty() {
            toasts.info("Nothing to update");
            return Err(EditorError::NoChanges);
        }

        log::info!(
            "Submitting meeting {} ({}), changed: {}",
            original.id,
            if series_id.is_some() { "series" } else { "single" },
            changed.join(", ")
        );

        let meeting_id = original.id.clone();
        self.phase = EditorPhase::Submitting;
        self.last_error = None;
        toasts.clear_pinned();

        let result = match &series_id {
            Some(series_id) => backend.update_series(series_id, &payload).await,
            None => backend
                .update_meeting(&meeting_id, &payload)
                .await
                .map(|meeting| vec![meeting]),
        };

        match result {
            Ok(meetings) => {
                toasts.success(if series_id.is_some() {
                    "Meeting series updated"
                } else {
                    "Meeting updated"
                });
                self.close();
                on_saved(&meetings);
                Ok(meetings)
            }
            Err(err) => {
                let failure = SubmitFailure::classify(&err);
                log::warn!("Updating meeting {} failed: {}", meeting_id, err);
                let notice = failure.notice();
                toasts.pin_error(notice.clone());
                self.last_error = Some(notice);
                self.phase = EditorPhase::Editing;
                Err(EditorError::Backend {
                    failure,
                    source: err,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::recurrence::{Frequency, RecurrenceRule};
    use crate::services::api::MockBookingBackend;
    use crate::services::notification::ToastLevel;
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn user(id: &str) -> UserSummary {
        UserSummary {
            id: id.to_string(),
            full_name: format!("User {}", id),
            username: id.to_lowercase(),
        }
    }

    fn room(id: &str) -> Room {
        Room {
            id: id.to_string(),
            name: format!("Room {}", id),
            location: None,
        }
    }

    fn meeting() -> Meeting {
        Meeting {
            id: "M1".to_string(),
            title: "Weekly sync".to_string(),
            start_time: Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap(),
            end_time: Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap(),
            room: Some(room("R1")),
            devices: vec![],
            participants: vec![user("U1"), user("U2")],
            guest_emails: vec![],
            description: None,
            recurrence_series_id: None,
            recurrence_rule: None,
        }
    }

    fn catalog_backend() -> MockBookingBackend {
        let mut backend = MockBookingBackend::new();
        backend
            .expect_list_rooms()
            .returning(|| Ok(vec![room("R1"), room("R2")]));
        backend.expect_list_devices().returning(|| Ok(vec![]));
        backend
    }

    fn editor() -> MeetingEditor {
        MeetingEditor::new("U1", chrono_tz::UTC, Duration::from_millis(500))
    }

    #[tokio::test]
    async fn open_seeds_draft_and_search_results() {
        let backend = catalog_backend();
        let mut toasts = ToastManager::new();
        let mut editor = editor();

        editor.open(meeting(), &backend, &mut toasts).await;

        assert_eq!(editor.phase(), EditorPhase::Editing);
        assert_eq!(editor.rooms().len(), 2);
        assert_eq!(editor.search_results(), &[user("U2")]);
        let draft = editor.draft().unwrap();
        assert_eq!(draft.time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(draft.duration_minutes, 60);
        assert!(!toasts.has_toasts());
    }

    #[tokio::test]
    async fn open_degrades_when_a_catalog_fails() {
        let mut backend = MockBookingBackend::new();
        backend
            .expect_list_rooms()
            .returning(|| Err(ApiError::Transport("refused".to_string())));
        backend
            .expect_list_devices()
            .returning(|| Ok(vec![Device { id: "D1".to_string(), name: "Projector".to_string() }]));
        let mut toasts = ToastManager::new();
        let mut editor = editor();

        editor.open(meeting(), &backend, &mut toasts).await;

        assert_eq!(editor.phase(), EditorPhase::Editing);
        assert!(editor.rooms().is_empty());
        assert_eq!(editor.devices().len(), 1);
        assert_eq!(toasts.last().unwrap().level, ToastLevel::Warning);
    }

    #[tokio::test]
    async fn unchanged_submit_makes_no_network_call() {
        let mut backend = catalog_backend();
        backend.expect_update_meeting().never();
        backend.expect_update_series().never();
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(meeting(), &backend, &mut toasts).await;

        let result = editor.submit(&backend, &mut toasts, |_| {}).await;

        assert_eq!(result, Err(EditorError::NoChanges));
        assert_eq!(editor.phase(), EditorPhase::Editing);
        assert_eq!(toasts.last().unwrap().message, "Nothing to update");
    }

    #[tokio::test]
    async fn malformed_guest_is_rejected_locally() {
        let mut backend = catalog_backend();
        backend.expect_update_meeting().never();
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(meeting(), &backend, &mut toasts).await;
        editor.draft_mut().unwrap().add_guest("foo@bar");

        let result = editor.submit(&backend, &mut toasts, |_| {}).await;

        assert_eq!(
            result,
            Err(EditorError::Validation(ValidationError::InvalidGuestEmails(vec![
                "foo@bar".to_string()
            ])))
        );
        assert_eq!(editor.last_error(), Some("Invalid guest emails: foo@bar"));
    }

    #[tokio::test]
    async fn room_change_sends_full_payload() {
        let mut backend = catalog_backend();
        backend
            .expect_update_meeting()
            .withf(|id, payload| {
                id == "M1"
                    && payload.room_id == "R2"
                    && payload.title == "Weekly sync"
                    && payload.start_time == Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
                    && payload.end_time == Utc.with_ymd_and_hms(2025, 6, 2, 10, 0, 0).unwrap()
                    && payload.participant_ids == vec!["U1".to_string(), "U2".to_string()]
                    && payload.recurrence_rule.is_none()
            })
            .times(1)
            .returning(|_, _| {
                let mut updated = meeting();
                updated.room = Some(room("R2"));
                Ok(updated)
            });
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(meeting(), &backend, &mut toasts).await;
        editor.draft_mut().unwrap().room_id = Some("R2".to_string());

        let mut refreshed = 0;
        let saved = editor
            .submit(&backend, &mut toasts, |meetings| refreshed = meetings.len())
            .await
            .unwrap();

        assert_eq!(saved[0].room_id(), Some("R2"));
        assert_eq!(refreshed, 1);
        assert_eq!(editor.phase(), EditorPhase::Closed);
        assert_eq!(toasts.last().unwrap().level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn series_frequency_change_goes_to_series_update() {
        let mut recurring = meeting();
        recurring.recurrence_series_id = Some("S1".to_string());
        recurring.recurrence_rule = Some(RecurrenceRule::every(
            Frequency::Daily,
            NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
        ));

        let mut backend = catalog_backend();
        backend.expect_update_meeting().never();
        backend
            .expect_update_series()
            .withf(|series_id, payload| {
                series_id == "S1"
                    && payload
                        .recurrence_rule
                        .as_ref()
                        .map_or(false, |rule| rule.frequency == Frequency::Weekly && rule.interval == 1)
            })
            .times(1)
            .returning(|_, _| Ok(vec![]));
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(recurring, &backend, &mut toasts).await;

        let draft = editor.draft_mut().unwrap();
        assert!(draft.edit_series);
        draft.recurrence.as_mut().unwrap().frequency = Frequency::Weekly;

        assert!(editor.submit(&backend, &mut toasts, |_| {}).await.is_ok());
    }

    #[tokio::test]
    async fn unticking_series_toggle_updates_single_occurrence() {
        let mut recurring = meeting();
        recurring.recurrence_series_id = Some("S1".to_string());

        let mut backend = catalog_backend();
        backend.expect_update_series().never();
        backend
            .expect_update_meeting()
            .times(1)
            .returning(|_, _| Ok(meeting()));
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(recurring, &backend, &mut toasts).await;

        let draft = editor.draft_mut().unwrap();
        draft.edit_series = false;
        draft.title = "Renamed".to_string();

        assert!(editor.submit(&backend, &mut toasts, |_| {}).await.is_ok());
    }

    #[tokio::test]
    async fn maintenance_error_maps_to_room_notice() {
        let mut backend = catalog_backend();
        backend.expect_update_meeting().returning(|_, _| {
            Err(ApiError::Status {
                status: 400,
                message: "Phòng R2 đang bảo trì".to_string(),
                field_errors: BTreeMap::new(),
            })
        });
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(meeting(), &backend, &mut toasts).await;
        editor.draft_mut().unwrap().room_id = Some("R2".to_string());

        let err = editor.submit(&backend, &mut toasts, |_| {}).await.unwrap_err();

        assert!(matches!(
            err,
            EditorError::Backend { failure: SubmitFailure::RoomUnderMaintenance, .. }
        ));
        assert_eq!(editor.phase(), EditorPhase::Editing);
        let toast = toasts.last().unwrap();
        assert_eq!(toast.message, SubmitFailure::RoomUnderMaintenance.notice());
        assert!(toast.pinned);
    }

    #[tokio::test]
    async fn retry_clears_pinned_failure() {
        let mut backend = catalog_backend();
        let mut calls = 0;
        backend.expect_update_meeting().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Err(ApiError::Transport("connection reset".to_string()))
            } else {
                Ok(meeting())
            }
        });
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(meeting(), &backend, &mut toasts).await;
        editor.draft_mut().unwrap().title = "Renamed".to_string();

        assert!(editor.submit(&backend, &mut toasts, |_| {}).await.is_err());
        assert!(toasts.toasts().iter().any(|t| t.pinned));

        assert!(editor.submit(&backend, &mut toasts, |_| {}).await.is_ok());
        assert!(toasts.toasts().iter().all(|t| !t.pinned));
        assert_eq!(toasts.last().unwrap().level, ToastLevel::Success);
    }

    #[tokio::test]
    async fn oversized_duration_is_rejected_before_sending() {
        let mut backend = catalog_backend();
        backend.expect_update_meeting().never();
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(meeting(), &backend, &mut toasts).await;
        editor.draft_mut().unwrap().duration_minutes = i64::MAX / 1000;

        let result = editor.submit(&backend, &mut toasts, |_| {}).await;

        assert_eq!(
            result,
            Err(EditorError::Validation(ValidationError::InvalidDuration))
        );
        assert_eq!(editor.phase(), EditorPhase::Editing);
    }

    #[tokio::test]
    async fn untouched_meeting_with_seconds_is_not_a_change() {
        let mut backend = catalog_backend();
        backend.expect_update_meeting().never();
        let mut stored = meeting();
        stored.start_time = Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 30).unwrap();
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(stored, &backend, &mut toasts).await;
        assert_eq!(editor.draft().unwrap().duration_minutes, 60);

        let result = editor.submit(&backend, &mut toasts, |_| {}).await;
        assert_eq!(result, Err(EditorError::NoChanges));
    }

    #[tokio::test]
    async fn empty_acting_user_is_never_sent() {
        let mut backend = catalog_backend();
        backend.expect_update_meeting().never();
        let mut toasts = ToastManager::new();
        let mut editor = MeetingEditor::new("", chrono_tz::UTC, Duration::from_millis(500));
        editor.open(meeting(), &backend, &mut toasts).await;
        editor.draft_mut().unwrap().title = "Renamed".to_string();

        let result = editor.submit(&backend, &mut toasts, |_| {}).await;
        assert_eq!(
            result,
            Err(EditorError::Validation(ValidationError::MissingActingUser))
        );
    }

    #[tokio::test]
    async fn close_forgets_users_from_the_previous_meeting() {
        let backend = catalog_backend();
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(meeting(), &backend, &mut toasts).await;
        assert!(editor.known_user("U2").is_some());

        editor.close();
        assert!(editor.known_user("U2").is_none());
    }

    #[tokio::test]
    async fn submit_without_open_meeting_is_refused() {
        let backend = MockBookingBackend::new();
        let mut toasts = ToastManager::new();
        let mut editor = editor();

        let result = editor.submit(&backend, &mut toasts, |_| {}).await;
        assert_eq!(result, Err(EditorError::NotEditing));
    }

    #[tokio::test]
    async fn run_search_excludes_acting_user() {
        let mut backend = catalog_backend();
        backend
            .expect_search_users()
            .withf(|query| query == "us")
            .returning(|_| Ok(vec![user("U1"), user("U7")]));
        let mut toasts = ToastManager::new();
        let mut editor = editor();
        editor.open(meeting(), &backend, &mut toasts).await;

        let t0 = Instant::now();
        editor.search_query_changed("us", t0);
        let ticket = editor.poll_search(t0 + Duration::from_millis(500)).unwrap();
        editor.run_search(ticket, &backend, &mut toasts).await;

        assert_eq!(editor.search_results(), &[user("U7")]);
        assert_eq!(editor.known_user("U7").unwrap().full_name, "User U7");
    }
}
