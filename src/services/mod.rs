// Service module exports

pub mod api;
pub mod meeting_editor;
pub mod notification;
pub mod settings;
