pub mod http;
pub mod mapbox;
pub mod overpass;
