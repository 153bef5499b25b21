//! livability - turn a street address into walking/driving scores, an area
//! type and a list of nearby amenities from OpenStreetMap.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod presentation;
pub mod state;
