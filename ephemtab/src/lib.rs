extern crate nalgebra as na;

pub use crate::parser::{parse_ephemeris_table, ParseError, ParseErrorExt};
pub use crate::table::{EphemerisRecord, EphemerisTable};

pub mod parser;
pub mod table;

pub const COMMENT_TOKEN: &str = "#";
pub const ORIGIN_KEY: &str = "ORIGIN";
pub const FRAME_KEY: &str = "FRAME";
