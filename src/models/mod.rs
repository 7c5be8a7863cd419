pub mod chat;
pub mod insights;
pub mod itinerary;
pub mod replan;
pub mod review;
pub mod trip;
