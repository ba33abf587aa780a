//! Toast queue shared by the meeting editor and the shell.
//!
//! Transient toasts fade out after [`TOAST_LIFETIME`]. Submit failures are
//! pinned until dismissed or until the next submit starts. Raising the same
//! message as the newest toast refreshes it instead of stacking a copy, so
//! a flaky search does not bury the screen.

use std::time::{Duration, Instant};

pub const TOAST_LIFETIME: Duration = Duration::from_secs(3);
const FADE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastLevel {
    pub fn icon(&self) -> &'static str {
        match self {
            ToastLevel::Success => "✔",
            ToastLevel::Info => "ℹ",
            ToastLevel::Warning => "⚠",
            ToastLevel::Error => "✖",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    /// Stable across frames; used as the widget id and for dismissal
    pub id: u64,
    pub message: String,
    pub level: ToastLevel,
    pub shown_at: Instant,
    pub pinned: bool,
    /// Times the message was raised back to back
    pub repeats: u32,
}

impl Toast {
    pub fn is_expired_at(&self, now: Instant) -> bool {
        !self.pinned && now.saturating_duration_since(self.shown_at) >= TOAST_LIFETIME
    }

    /// 1.0 until the last [`FADE`] of the lifetime, then down to 0.0
    pub fn opacity_at(&self, now: Instant) -> f32 {
        if self.pinned {
            return 1.0;
        }
        let remaining = TOAST_LIFETIME.saturating_sub(now.saturating_duration_since(self.shown_at));
        if remaining >= FADE {
            1.0
        } else {
            remaining.as_secs_f32() / FADE.as_secs_f32()
        }
    }
}

#[derive(Debug, Default)]
pub struct ToastManager {
    toasts: Vec<Toast>,
    next_id: u64,
}

impl ToastManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Success, false, Instant::now());
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Info, false, Instant::now());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Warning, false, Instant::now());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Error, false, Instant::now());
    }

    /// Error that stays on screen until dismissed
    pub fn pin_error(&mut self, message: impl Into<String>) {
        self.push(message.into(), ToastLevel::Error, true, Instant::now());
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.retain(|t| t.id != id);
    }

    /// Drop every pinned toast, e.g. when a retry starts
    pub fn clear_pinned(&mut self) {
        self.toasts.retain(|t| !t.pinned);
    }

    pub fn cleanup_at(&mut self, now: Instant) {
        self.toasts.retain(|t| !t.is_expired_at(now));
    }

    pub fn toasts(&self) -> &[Toast] {
        &self.toasts
    }

    /// Most recent toast, if any
    pub fn last(&self) -> Option<&Toast> {
        self.toasts.last()
    }

    pub fn has_toasts(&self) -> bool {
        !self.toasts.is_empty()
    }

    fn push(&mut self, message: String, level: ToastLevel, pinned: bool, now: Instant) {
        if let Some(last) = self.toasts.last_mut() {
            if last.level == level && last.message == message {
                last.shown_at = now;
                last.pinned |= pinned;
                last.repeats += 1;
                return;
            }
        }

        self.next_id += 1;
        self.toasts.push(Toast {
            id: self.next_id,
            message,
            level,
            shown_at: now,
            pinned,
            repeats: 1,
        });
    }
}
