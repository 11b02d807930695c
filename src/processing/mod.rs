pub mod aggregation;
pub mod error;
pub mod extraction;
pub mod post_processor;
