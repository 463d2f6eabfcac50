extern crate nalgebra as na;

pub mod aero;
pub mod kinds;
pub mod prelude;
pub mod state;
pub mod time;
