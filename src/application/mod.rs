pub mod amenities;
pub mod insights;
pub mod query;
pub mod suggest;
