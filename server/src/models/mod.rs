pub mod event;
pub mod lookup;
pub mod organizer;
pub mod user;
