pub mod curve;
pub mod error;
pub mod fields;
pub mod observe;
pub mod params;
pub mod plot;
pub mod renderer;
pub mod session;
pub mod state;
pub mod stats;
