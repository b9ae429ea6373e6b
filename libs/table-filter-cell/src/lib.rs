// =====================================================================================
// TABLE FILTER CELL - SEARCH, BADGE, DATE AND STATUS FILTERING FOR LIST VIEWS
// =====================================================================================

pub mod models;
pub mod services;

pub use models::*;
pub use services::*;
