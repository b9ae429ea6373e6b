// =====================================================================================
// BOOKING WIZARD CELL - MULTI-STEP APPOINTMENT BOOKING
// =====================================================================================

pub mod models;
pub mod error;
pub mod services;
pub mod handlers;
pub mod router;

pub use models::*;
pub use error::*;
pub use services::*;
pub use router::booking_routes;
