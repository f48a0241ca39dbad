pub mod completions;
pub mod explore;
pub mod export;
pub mod fetch;
pub mod metrics;
pub mod report;
pub mod sample;
pub mod summary;
