//! Draws the toast queue in the bottom-right corner using the active visuals.

use egui::{Color32, Context, Pos2, RichText, Visuals};
use std::time::Instant;

use crate::services::notification::{Toast, ToastLevel, ToastManager};

const TOAST_WIDTH: f32 = 340.0;
const TOAST_HEIGHT: f32 = 40.0;
const MARGIN: f32 = 10.0;
const SPACING: f32 = 5.0;

fn accent(level: ToastLevel, visuals: &Visuals) -> Color32 {
    match level {
        ToastLevel::Success => Color32::from_rgb(70, 170, 100),
        ToastLevel::Info => visuals.hyperlink_color,
        ToastLevel::Warning => visuals.warn_fg_color,
        ToastLevel::Error => visuals.error_fg_color,
    }
}

fn toast_text(toast: &Toast) -> String {
    if toast.repeats > 1 {
        format!("{} (×{})", toast.message, toast.repeats)
    } else {
        toast.message.clone()
    }
}

pub fn render_toasts(ctx: &Context, toasts: &mut ToastManager) {
    let now = Instant::now();
    toasts.cleanup_at(now);
    if !toasts.has_toasts() {
        return;
    }

    let style = ctx.style();
    let visuals = &style.visuals;
    let screen_rect = ctx.screen_rect();
    let mut dismissed = Vec::new();
    let mut fading = false;

    // Newest toast sits at the bottom
    for (slot, toast) in toasts.toasts().iter().rev().enumerate() {
        let opacity = toast.opacity_at(now);
        if opacity <= 0.0 {
            continue;
        }
        fading |= !toast.pinned;

        let pos = Pos2::new(
            screen_rect.right() - TOAST_WIDTH - MARGIN,
            screen_rect.bottom() - TOAST_HEIGHT - MARGIN - slot as f32 * (TOAST_HEIGHT + SPACING),
        );
        let color = accent(toast.level, visuals).gamma_multiply(opacity);

        egui::Area::new(egui::Id::new(("toast", toast.id)))
            .fixed_pos(pos)
            .order(egui::Order::Foreground)
            .show(ctx, |ui| {
                egui::Frame::popup(&style)
                    .fill(visuals.window_fill.gamma_multiply(opacity))
                    .stroke(egui::Stroke::new(1.0, color))
                    .show(ui, |ui| {
                        ui.set_min_width(TOAST_WIDTH - 24.0);
                        ui.horizontal_wrapped(|ui| {
                            ui.label(RichText::new(toast.level.icon()).color(color).strong());
                            ui.label(RichText::new(toast_text(toast)).color(color));
                            if toast.pinned && ui.small_button("✕").on_hover_text("Dismiss").clicked() {
                                dismissed.push(toast.id);
                            }
                        });
                    });
            });
    }

    for id in dismissed {
        toasts.dismiss(id);
    }

    if fading {
        ctx.request_repaint();
    }
}
