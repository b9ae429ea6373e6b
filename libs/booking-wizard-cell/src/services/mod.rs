pub mod availability;
pub mod validation;
pub mod wizard;
pub mod submission;
pub mod session;

pub use availability::{day_summary, month_overview, SlotCalendar, SlotSource};
pub use wizard::{BookingWizard, StepContext, Transition};
pub use submission::{sink_from_config, BookingSink, HttpBookingSink, LoggingBookingSink};
pub use session::BookingService;
