use chrono::{NaiveDate, NaiveTime};
use egui::{Color32, RichText};
use egui_extras::DatePickerButton;
use std::time::Instant;

use crate::models::directory::{Device, Room, UserSummary};
use crate::models::recurrence::Frequency;
use crate::services::meeting_editor::draft::MAX_DURATION_MINUTES;
use crate::services::meeting_editor::{is_valid_guest_email, EditorPhase, MeetingDraft, MeetingEditor};
use crate::ui_egui::clock_picker::render_clock_picker;

use super::state::{end_label, MeetingDialogState};

const FORM_LABEL_WIDTH: f32 = 180.0;
const CLOCK_DIAMETER: f32 = 200.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeetingDialogAction {
    None,
    Save,
    Cancel,
}

/// Participant as listed in the form
struct ParticipantRow {
    id: String,
    label: String,
    removable: bool,
}

/// Draw the edit dialog for the editor's open draft.
///
/// `today` and `now` are in the display timezone and drive which clock
/// positions are disabled.
pub fn render_meeting_dialog(
    ctx: &egui::Context,
    editor: &mut MeetingEditor,
    state: &mut MeetingDialogState,
    today: NaiveDate,
    now: NaiveTime,
) -> MeetingDialogAction {
    let Some(current) = editor.draft() else {
        return MeetingDialogAction::None;
    };
    let participants: Vec<ParticipantRow> = current
        .participant_ids()
        .iter()
        .map(|id| ParticipantRow {
            id: id.clone(),
            label: editor
                .known_user(id)
                .map(UserSummary::label)
                .unwrap_or_else(|| id.clone()),
            removable: id != current.acting_user_id(),
        })
        .collect();

    let rooms = editor.rooms().to_vec();
    let devices = editor.devices().to_vec();
    let results = editor.search_results().to_vec();
    let has_series = editor.has_series();
    let submitting = editor.phase() == EditorPhase::Submitting;
    let error = editor.last_error().map(str::to_string);

    let Some(draft) = editor.draft_mut() else {
        return MeetingDialogAction::None;
    };

    let mut action = MeetingDialogAction::None;
    let mut query_changed = false;
    let mut dialog_open = true;

    egui::Window::new("Edit Meeting")
        .open(&mut dialog_open)
        .collapsible(false)
        .resizable(true)
        .default_width(620.0)
        .default_height(760.0)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                render_error_banner(ui, error.as_deref());
                ui.add_enabled_ui(!submitting, |ui| {
                    render_basic_information_section(ui, draft);
                    render_schedule_section(ui, draft, state, today, now);
                    render_room_section(ui, draft, &rooms, &devices);
                    query_changed = render_people_section(ui, draft, state, &results, &participants);
                    if has_series {
                        render_series_section(ui, draft);
                    }
                });
                action = render_action_buttons(ui, submitting);
            });
        });

    if query_changed {
        editor.search_query_changed(&state.search_query, Instant::now());
    }

    if !dialog_open {
        action = MeetingDialogAction::Cancel;
    }

    action
}

fn render_error_banner(ui: &mut egui::Ui, error: Option<&str>) {
    if let Some(error) = error {
        ui.colored_label(Color32::RED, RichText::new(error).strong());
        ui.add_space(8.0);
    }
}

fn render_basic_information_section(ui: &mut egui::Ui, draft: &mut MeetingDraft) {
    ui.heading("Basic Information");
    ui.add_space(4.0);

    labeled_row(
        ui,
        if draft.title.trim().is_empty() {
            RichText::new("Title:")
                .strong()
                .color(Color32::from_rgb(255, 150, 150))
        } else {
            RichText::new("Title:").strong()
        },
        |ui| {
            ui.text_edit_singleline(&mut draft.title);
            ui.label(RichText::new("*").color(Color32::from_rgb(255, 150, 150)));
        },
    );

    labeled_row(ui, "Description:", |ui| {
        let width = ui.available_width();
        ui.add_sized([width, 80.0], egui::TextEdit::multiline(&mut draft.description));
    });

    end_section(ui);
}

fn render_schedule_section(
    ui: &mut egui::Ui,
    draft: &mut MeetingDraft,
    state: &mut MeetingDialogState,
    today: NaiveDate,
    now: NaiveTime,
) {
    ui.heading("Date and Time");
    ui.add_space(4.0);

    labeled_row(ui, "Date:", |ui| {
        ui.add(DatePickerButton::new(&mut draft.date).id_source("meeting_date"));
        if draft.date < today {
            ui.label(RichText::new("⚠ in the past").color(Color32::from_rgb(200, 150, 0)));
        }
    });

    state.refresh_disabled_times(draft.date, today, now);
    labeled_row(ui, "Start time:", |ui| {
        if render_clock_picker(ui, &mut state.picker, CLOCK_DIAMETER) {
            draft.time = state.picker.time();
        }
    });

    labeled_row(ui, "Duration:", |ui| {
        ui.add(
            // Dragging stays in bounds; a stored value outside them is left for validate()
            egui::DragValue::new(&mut draft.duration_minutes)
                .range(1..=MAX_DURATION_MINUTES)
                .clamp_to_range(false)
                .suffix(" min"),
        );
        if let Some(label) = end_label(draft.time, draft.duration_minutes) {
            ui.label(RichText::new(label).weak());
        }
    });

    end_section(ui);
}

fn render_room_section(ui: &mut egui::Ui, draft: &mut MeetingDraft, rooms: &[Room], devices: &[Device]) {
    ui.heading("Room and Equipment");
    ui.add_space(4.0);

    labeled_row(ui, "Room:", |ui| {
        let selected = draft
            .room_id
            .as_deref()
            .and_then(|id| rooms.iter().find(|room| room.id == id))
            .map(Room::label)
            .or_else(|| draft.room_id.clone())
            .unwrap_or_else(|| "Select a room".to_string());

        egui::ComboBox::from_id_source("room_combo")
            .selected_text(selected)
            .width(260.0)
            .show_ui(ui, |ui| {
                for room in rooms {
                    ui.selectable_value(&mut draft.room_id, Some(room.id.clone()), room.label());
                }
            });
        ui.label(RichText::new("*").color(Color32::from_rgb(255, 150, 150)));
    });

    labeled_row(ui, "Devices:", |ui| {
        if devices.is_empty() {
            ui.label(RichText::new("No devices available").weak());
            return;
        }
        ui.vertical(|ui| {
            for device in devices {
                let mut checked = draft.device_ids.contains(&device.id);
                if ui.checkbox(&mut checked, &device.name).changed() {
                    draft.toggle_device(&device.id);
                }
            }
        });
    });

    end_section(ui);
}

/// Returns whether the search query was edited this frame
fn render_people_section(
    ui: &mut egui::Ui,
    draft: &mut MeetingDraft,
    state: &mut MeetingDialogState,
    results: &[UserSummary],
    participants: &[ParticipantRow],
) -> bool {
    ui.heading("People");
    ui.add_space(4.0);

    let mut query_changed = false;
    labeled_row(ui, "Find people:", |ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.search_query).hint_text("Name or username"),
        );
        query_changed = response.changed();
    });

    let candidates: Vec<&UserSummary> = results
        .iter()
        .filter(|user| !draft.participant_ids().contains(&user.id))
        .collect();
    if !candidates.is_empty() {
        indented_row(ui, |ui| {
            ui.vertical(|ui| {
                for user in candidates {
                    if ui.small_button(format!("+ {}", user.label())).clicked() {
                        draft.add_participant(user.id.clone());
                    }
                }
            });
        });
    }

    labeled_row(ui, "Participants:", |ui| {
        ui.vertical(|ui| {
            for row in participants {
                ui.horizontal(|ui| {
                    ui.label(&row.label);
                    if row.removable {
                        if ui.small_button("✕").on_hover_text("Remove").clicked() {
                            draft.remove_participant(&row.id);
                        }
                    } else {
                        ui.label(RichText::new("(you)").weak());
                    }
                });
            }
        });
    });

    labeled_row(ui, "Guest emails:", |ui| {
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.guest_input).hint_text("name@example.com"),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if (ui.button("Add").clicked() || submitted) && draft.add_guest(&state.guest_input) {
            state.guest_input.clear();
        }
    });

    let guests: Vec<String> = draft.guest_emails.iter().cloned().collect();
    for email in guests {
        indented_row(ui, |ui| {
            if is_valid_guest_email(&email) {
                ui.label(&email);
            } else {
                ui.colored_label(Color32::from_rgb(220, 80, 80), format!("{} (invalid)", email));
            }
            if ui.small_button("✕").on_hover_text("Remove guest").clicked() {
                draft.remove_guest(&email);
            }
        });
    }

    end_section(ui);
    query_changed
}

fn render_series_section(ui: &mut egui::Ui, draft: &mut MeetingDraft) {
    ui.heading("Recurrence");
    ui.add_space(4.0);

    indented_row(ui, |ui| {
        ui.checkbox(&mut draft.edit_series, "Apply changes to the whole series");
    });

    if draft.edit_series {
        if let Some(recurrence) = draft.recurrence.as_mut() {
            labeled_row(ui, "Frequency:", |ui| {
                egui::ComboBox::from_id_source("series_frequency_combo")
                    .selected_text(recurrence.frequency.as_str())
                    .show_ui(ui, |ui| {
                        for frequency in Frequency::ALL {
                            ui.selectable_value(&mut recurrence.frequency, frequency, frequency.as_str());
                        }
                    });
            });

            labeled_row(ui, "Repeat until:", |ui| {
                ui.add(DatePickerButton::new(&mut recurrence.repeat_until).id_source("series_until"));
            });
        }
    } else {
        indented_row(ui, |ui| {
            ui.label(RichText::new("Only this occurrence will change").weak());
        });
    }

    end_section(ui);
}

fn render_action_buttons(ui: &mut egui::Ui, submitting: bool) -> MeetingDialogAction {
    let mut action = MeetingDialogAction::None;

    indented_row(ui, |ui| {
        let save_button = egui::Button::new(if submitting { "Saving..." } else { "Save" }).fill(
            if submitting {
                Color32::from_gray(60)
            } else {
                Color32::from_rgb(70, 120, 200)
            },
        );

        if ui.add_enabled(!submitting, save_button).clicked() {
            action = MeetingDialogAction::Save;
        }

        if ui.add_enabled(!submitting, egui::Button::new("Cancel")).clicked() {
            action = MeetingDialogAction::Cancel;
        }

        if submitting {
            ui.spinner();
        }
    });

    action
}

fn end_section(ui: &mut egui::Ui) {
    ui.add_space(12.0);
    ui.separator();
    ui.add_space(8.0);
}

fn labeled_row<F>(ui: &mut egui::Ui, label: impl Into<egui::WidgetText>, add_contents: F)
where
    F: FnOnce(&mut egui::Ui),
{
    ui.horizontal(|ui| {
        render_form_label(ui, label);
        add_contents(ui);
    });
}

fn render_form_label(ui: &mut egui::Ui, label: impl Into<egui::WidgetText>) {
    let text = label.into();
    ui.allocate_ui_with_layout(
        egui::Vec2::new(FORM_LABEL_WIDTH, 24.0),
        egui::Layout::right_to_left(egui::Align::Center),
        move |ui| {
            ui.label(text);
        },
    );
}

fn indented_row<F>(ui: &mut egui::Ui, add_contents: F)
where
    F: FnOnce(&mut egui::Ui),
{
    ui.horizontal(|ui| {
        ui.add_space(FORM_LABEL_WIDTH);
        add_contents(ui);
    });
}
