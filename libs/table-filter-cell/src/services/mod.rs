pub mod engine;
pub mod table;

pub use engine::{apply, matches, parse_record_date, sort_by_key, week_bounds};
pub use table::TableFilter;
