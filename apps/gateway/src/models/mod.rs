pub mod job;
pub mod query;
pub mod upload;
