pub extern crate nalgebra as na;

pub mod environment;
pub mod propagation;
pub mod scenario;
pub mod sim_info;
