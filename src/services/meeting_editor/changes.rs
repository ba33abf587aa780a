//! Change detection between a loaded meeting and a freshly built payload.
//! Collections are compared order-independently; timestamps go through the
//! shared canonical form so seeding and submission cannot drift apart.

use crate::models::meeting::{Meeting, MeetingPayload};
use crate::utils::date::canonical;

fn sorted<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut values: Vec<String> = items.into_iter().map(|s| s.as_ref().to_string()).collect();
    values.sort();
    values.dedup();
    values
}

/// Names of the fields the payload would change.
///
/// The acting user counts as an original participant, since every draft
/// carries them anyway. The recurrence rule only counts when the payload
/// carries one (whole-series edits).
pub fn changed_fields(
    original: &Meeting,
    payload: &MeetingPayload,
    acting_user_id: &str,
) -> Vec<&'static str> {
    let mut changed = Vec::new();

    if original.title.trim() != payload.title.trim() {
        changed.push("title");
    }

    let original_description = original.description.as_deref().unwrap_or("").trim();
    if original_description != payload.description.trim() {
        changed.push("description");
    }

    if canonical(original.start_time) != canonical(payload.start_time) {
        changed.push("startTime");
    }

    if canonical(original.end_time) != canonical(payload.end_time) {
        changed.push("endTime");
    }

    if original.room_id().unwrap_or("") != payload.room_id {
        changed.push("roomId");
    }

    let original_devices = sorted(original.devices.iter().map(|d| d.id.as_str()));
    if original_devices != sorted(&payload.device_ids) {
        changed.push("deviceIds");
    }

    let original_participants = sorted(
        original
            .participants
            .iter()
            .map(|u| u.id.as_str())
            .chain(std::iter::once(acting_user_id)),
    );
    if original_participants != sorted(&payload.participant_ids) {
        changed.push("participantIds");
    }

    if sorted(&original.guest_emails) != sorted(&payload.guest_emails) {
        changed.push("guestEmails");
    }

    if let Some(rule) = &payload.recurrence_rule {
        if original.recurrence_rule.as_ref() != Some(rule) {
            changed.push("recurrenceRule");
        }
    }

    changed
}
