pub mod batch;
pub mod classify;
pub mod histogram;
pub mod percentile;
pub mod summary;
pub mod trend;
