pub mod booking;
pub mod listing;
pub mod local_store;
pub mod normalizer;

pub use booking::AppointmentBookingService;
pub use listing::AppointmentListingService;
pub use local_store::LocalAppointmentStore;
pub use normalizer::{normalize, normalize_all, normalize_at};
