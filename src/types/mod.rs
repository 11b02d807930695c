pub mod descriptor;
pub mod extent;
pub mod time_range;
pub mod traits;
