mod app;
pub mod clock_picker;
mod dashboard;
pub mod meeting_dialog;
mod toast;

pub use app::RoomDeskApp;
