//! Analog clock time picker.

mod render;
mod state;

pub use render::render_clock_picker;
pub use state::{ChangeListener, ClockPicker, DisabledTime};
