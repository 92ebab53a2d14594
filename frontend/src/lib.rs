//! Browser-side logic of the event listing: filter, sort and paginate events held in an
//! [store::AppStore], render them to HTML cards and talk to the backend API.

pub mod api;
pub mod controller;
pub mod debounce;
pub mod filter;
pub mod render;
pub mod sample;
pub mod sort;
pub mod store;

pub use api::{ApiClient, ClientError};
pub use controller::{EventBrowser, EventSource};
pub use filter::Filters;
pub use sort::SortOrder;
pub use store::{Action, AppStore};
