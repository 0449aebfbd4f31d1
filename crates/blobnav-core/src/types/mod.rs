//! Listing data model shared by the engine, backends and the HTTP layer.

mod breadcrumb;
mod continuation;
mod entry;
mod listing_page;

pub use breadcrumb::Breadcrumb;
pub use continuation::ContinuationToken;
pub use entry::Entry;
pub use listing_page::ListingPage;
