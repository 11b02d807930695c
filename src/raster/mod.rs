pub mod engine;
pub mod error;
pub mod frame;
pub mod geotiff;
pub mod ops;
pub mod stack;
