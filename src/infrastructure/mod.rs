pub mod analysis;
pub mod observability;
pub mod persistence;
pub mod storage;
