pub mod association;
pub mod box_matching;
pub mod config;
pub mod error;
pub mod frame;
pub mod io;
pub mod pipeline;
pub mod projection;
pub mod ttc;
pub mod types;
pub mod visualization;
