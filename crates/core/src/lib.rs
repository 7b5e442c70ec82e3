#![forbid(unsafe_code)]

pub mod model;
pub mod sections;
pub mod time;

pub use time::Clock;
