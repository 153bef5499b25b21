pub mod cache;
pub mod db;
pub mod history;
pub mod memory;
