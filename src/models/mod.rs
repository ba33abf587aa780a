// Module exports for models

pub mod clock;
pub mod directory;
pub mod meeting;
pub mod recurrence;
pub mod settings;
