//! egui rendering for the analog clock picker.
//!
//! Pointer state is polled every frame, so a drag ends on release wherever
//! the pointer is and nothing outlives the widget.

use egui::{Align2, Color32, FontId, Pos2, Sense, Stroke, Vec2};

use super::state::ClockPicker;
use crate::models::clock::{hand_angle, ClockHand, ClockValue, Period};

const HOUR_HAND_RATIO: f32 = 0.5;
const MINUTE_HAND_RATIO: f32 = 0.78;
const NUMERAL_RATIO: f32 = 0.82;
const GRAB_RADIUS: f32 = 16.0;

/// Point at `angle` degrees clockwise from 12 o'clock, `distance` from `center`
pub(crate) fn point_on_dial(center: Pos2, distance: f32, angle: f32) -> Pos2 {
    let radians = angle.to_radians();
    center + Vec2::new(radians.sin() * distance, -radians.cos() * distance)
}

/// Hand whose tip is closest to `pointer`, if within grabbing distance
pub(crate) fn pick_hand(pointer: Pos2, center: Pos2, radius: f32, value: &ClockValue) -> Option<ClockHand> {
    [
        (ClockHand::Minute, MINUTE_HAND_RATIO),
        (ClockHand::Hour, HOUR_HAND_RATIO),
    ]
    .into_iter()
    .map(|(hand, ratio)| {
        let tip = point_on_dial(center, radius * ratio, hand_angle(value, hand));
        (hand, tip.distance(pointer))
    })
    .filter(|(_, distance)| *distance <= GRAB_RADIUS)
    .min_by(|a, b| a.1.total_cmp(&b.1))
    .map(|(hand, _)| hand)
}

/// Numeral 1-12 under `pointer`, if any
pub(crate) fn numeral_at(pointer: Pos2, center: Pos2, radius: f32) -> Option<u32> {
    (1..=12u32).find(|hour| {
        let pos = point_on_dial(center, radius * NUMERAL_RATIO, *hour as f32 * 30.0);
        pos.distance(pointer) <= GRAB_RADIUS
    })
}

/// Render the AM/PM toggle and dial. Returns whether the value changed.
pub fn render_clock_picker(ui: &mut egui::Ui, picker: &mut ClockPicker, diameter: f32) -> bool {
    let mut changed = false;

    ui.vertical(|ui| {
        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(picker.formatted())
                    .font(FontId::monospace(18.0))
                    .strong(),
            );
            ui.add_space(8.0);
            for period in [Period::Am, Period::Pm] {
                let selected = picker.value().period == period;
                let available = picker.is_period_available(period);
                let response = ui
                    .add_enabled(available, egui::SelectableLabel::new(selected, period.as_str()))
                    .on_disabled_hover_text("Every hour in this period is unavailable");
                if response.clicked() {
                    changed |= picker.set_period(period);
                }
            }
        });

        changed |= render_dial(ui, picker, diameter);
    });

    changed
}

fn render_dial(ui: &mut egui::Ui, picker: &mut ClockPicker, diameter: f32) -> bool {
    let (response, painter) = ui.allocate_painter(Vec2::splat(diameter), Sense::click_and_drag());
    let center = response.rect.center();
    let radius = diameter / 2.0 - 4.0;
    let mut changed = false;

    if response.drag_started() {
        if let Some(pointer) = response.interact_pointer_pos() {
            if let Some(hand) = pick_hand(pointer, center, radius, &picker.value()) {
                picker.begin_drag(hand);
            }
        }
    }

    if response.dragged() && picker.drag_hand().is_some() {
        if let Some(pointer) = response.interact_pointer_pos() {
            let offset = pointer - center;
            changed |= picker.pointer_moved(offset.x, offset.y);
        }
    }

    let released = ui.input(|i| !i.pointer.any_down());
    if response.drag_stopped() || (released && picker.drag_hand().is_some()) {
        picker.end_drag();
    }

    if response.clicked() {
        if let Some(hour) = response
            .interact_pointer_pos()
            .and_then(|pointer| numeral_at(pointer, center, radius))
        {
            changed |= picker.tap_hour(hour);
        }
    }

    let visuals = ui.visuals();
    let text_color = visuals.text_color();
    let weak_color = visuals.weak_text_color();
    let accent = visuals.selection.bg_fill;

    painter.circle_filled(center, radius, visuals.extreme_bg_color);
    painter.circle_stroke(center, radius, Stroke::new(1.0, visuals.widgets.inactive.bg_stroke.color));

    for hour in 1..=12u32 {
        let pos = point_on_dial(center, radius * NUMERAL_RATIO, hour as f32 * 30.0);
        let color = if picker.is_hour_disabled(hour) {
            weak_color
        } else if picker.value().hour_display == hour {
            accent
        } else {
            text_color
        };
        painter.text(pos, Align2::CENTER_CENTER, hour.to_string(), FontId::proportional(14.0), color);
    }

    for minute in (0..60u32).step_by(5) {
        let outer = point_on_dial(center, radius - 2.0, minute as f32 * 6.0);
        let inner = point_on_dial(center, radius - 6.0, minute as f32 * 6.0);
        painter.line_segment([inner, outer], Stroke::new(1.0, weak_color));
    }

    let value = picker.value();
    let active = picker.drag_hand();
    for (hand, ratio, width) in [
        (ClockHand::Hour, HOUR_HAND_RATIO, 4.0),
        (ClockHand::Minute, MINUTE_HAND_RATIO, 2.5),
    ] {
        let tip = point_on_dial(center, radius * ratio, hand_angle(&value, hand));
        let color = if active == Some(hand) { accent } else { text_color };
        painter.line_segment([center, tip], Stroke::new(width, color));
        painter.circle_filled(tip, 5.0, color);
    }
    painter.circle_filled(center, 3.0, Color32::GRAY);

    changed
}
