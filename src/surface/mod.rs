pub mod bridge;
pub mod scripted;
pub mod surface;
pub mod surface_model;
