//! Transport schedule search page.

pub mod form;
pub mod search;
pub mod view;

pub use form::ScheduleForm;
pub use search::{RaspBackend, ScheduleSearch};
