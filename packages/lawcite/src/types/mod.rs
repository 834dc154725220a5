//! Domain data types shared across the resolution pipeline.

pub mod citation;
pub mod law;
pub mod node;
pub mod response;
