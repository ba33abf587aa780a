mod render;
mod state;

pub use render::{render_meeting_dialog, MeetingDialogAction};
pub use state::{past_time_rule, MeetingDialogState};
