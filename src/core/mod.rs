pub mod calibration;
pub mod config;
pub mod constants;
pub mod geo;
pub mod overlay;
pub mod transform;
pub mod view;
