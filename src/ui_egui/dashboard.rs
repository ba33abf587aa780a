use chrono_tz::Tz;
use egui::RichText;

use crate::models::meeting::Meeting;
use crate::models::settings::Settings;
use crate::utils::date::split_local;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardAction {
    None,
    Refresh,
    Edit(String),
    /// Persist the acting user id typed into the setup row
    SetActingUser(String),
}

/// Date, start and end of a meeting as shown in the list
pub(crate) fn schedule_label(meeting: &Meeting, tz: Tz) -> String {
    let (date, start) = split_local(meeting.start_time, tz);
    let (end_date, end) = split_local(meeting.end_time, tz);
    if end_date == date {
        format!("{} {}-{}", date.format("%a %d %b %Y"), start.format("%H:%M"), end.format("%H:%M"))
    } else {
        format!(
            "{} {} - {} {}",
            date.format("%a %d %b %Y"),
            start.format("%H:%M"),
            end_date.format("%d %b"),
            end.format("%H:%M")
        )
    }
}

/// List of the user's meetings with per-row edit buttons
pub fn render_dashboard(
    ui: &mut egui::Ui,
    meetings: &[Meeting],
    tz: Tz,
    editor_open: bool,
    settings: &Settings,
    user_id_input: &mut String,
) -> DashboardAction {
    let mut action = DashboardAction::None;

    ui.horizontal(|ui| {
        ui.heading("My Meetings");
        ui.add_space(12.0);
        if ui.button("⟳ Refresh").clicked() {
            action = DashboardAction::Refresh;
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(RichText::new(format!("{} · {}", settings.base_url(), tz.name())).weak());
        });
    });
    ui.separator();

    if settings.acting_user_id.trim().is_empty() {
        ui.horizontal(|ui| {
            ui.label(
                RichText::new("⚠ Set your user id before editing meetings:")
                    .color(ui.visuals().warn_fg_color),
            );
            ui.add(egui::TextEdit::singleline(user_id_input).hint_text("e.g. U123").desired_width(160.0));
            let id = user_id_input.trim();
            if ui.add_enabled(!id.is_empty(), egui::Button::new("Save")).clicked() {
                action = DashboardAction::SetActingUser(id.to_string());
            }
        });
        ui.separator();
    }

    if meetings.is_empty() {
        ui.label(RichText::new("No meetings to show").weak());
        return action;
    }

    egui::ScrollArea::vertical().show(ui, |ui| {
        egui::Grid::new("meeting_list")
            .num_columns(4)
            .striped(true)
            .spacing([16.0, 6.0])
            .show(ui, |ui| {
                ui.label(RichText::new("Title").strong());
                ui.label(RichText::new("When").strong());
                ui.label(RichText::new("Room").strong());
                ui.label("");
                ui.end_row();

                for meeting in meetings {
                    ui.horizontal(|ui| {
                        ui.label(&meeting.title);
                        if meeting.recurrence_series_id.is_some() {
                            ui.label(RichText::new("↻").weak()).on_hover_text("Part of a series");
                        }
                    });
                    ui.label(schedule_label(meeting, tz));
                    ui.label(
                        meeting
                            .room
                            .as_ref()
                            .map(|room| room.label())
                            .unwrap_or_else(|| "-".to_string()),
                    );
                    if ui
                        .add_enabled(!editor_open, egui::Button::new("Edit"))
                        .clicked()
                    {
                        action = DashboardAction::Edit(meeting.id.clone());
                    }
                    ui.end_row();
                }
            });
    });

    action
}
