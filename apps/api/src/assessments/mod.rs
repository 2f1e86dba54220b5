pub mod handlers;
pub mod reports;
pub mod scoring;
pub mod sync;
