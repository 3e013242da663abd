//! Dashboard front end: the view session the inventory and listing pages
//! drive, the bundled sample records and a serializable board report.

pub mod report;
pub mod samples;
pub mod session;

pub use report::{BoardReport, GroupRow, ListingRows};
pub use samples::{
    sample_goat_listings, sample_inventory, sample_listings, sample_source, sample_stockx_listings,
};
pub use session::DashboardSession;
