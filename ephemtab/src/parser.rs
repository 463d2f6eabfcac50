//! Parser for plain-text Cartesian ephemeris tables.
//!
//! ```text
//! # comment
//! ORIGIN = Earth
//! FRAME = J2000
//! <epoch> <x> <y> <z> <vx> <vy> <vz>
//! ```

use crate::{EphemerisRecord, EphemerisTable, COMMENT_TOKEN, FRAME_KEY, ORIGIN_KEY};
use bodytypes::prelude::CartesianState;
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{line_ending, not_line_ending, space0, space1},
    combinator::{eof, map},
    error::ErrorKind,
    multi::fold_many0,
    number::complete::double,
    sequence::{delimited, preceded},
    Err::Failure,
};
use tracing::debug;

pub type Result<I, O, E = ParseError<I>> = std::result::Result<(I, O), nom::Err<E>>;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum ParseError<I> {
    #[error("Ephemeris table contains no records")]
    Empty,
    #[error("Record epoch {0} does not follow the previous record")]
    NonMonotonicEpoch(f64),
    #[error("Record epoch {0} is not finite")]
    NonFiniteEpoch(f64),
    #[error("Duplicate {0} header")]
    DuplicateHeader(&'static str),
    #[error("Parse error")]
    Nom(I, ErrorKind),
}

pub trait ParseErrorExt {
    fn is_failure(&self) -> bool;
}

impl<I> ParseErrorExt for nom::Err<ParseError<I>> {
    fn is_failure(&self) -> bool {
        matches!(
            self,
            nom::Err::Error(ParseError::Empty)
                | nom::Err::Error(ParseError::NonMonotonicEpoch(_))
                | nom::Err::Failure(_)
        )
    }
}

pub fn parse_ephemeris_table(s: &str) -> Result<&str, EphemerisTable> {
    use TableLine::*;

    let (s, fold) = fold_many0(
        read_line,
        || Ok(EphemerisTable::default()),
        |acc: std::result::Result<EphemerisTable, ParseError<&str>>, line| {
            let mut table = acc?;
            match line {
                Origin(name) => {
                    if table.origin.replace(name.to_owned()).is_some() {
                        return Err(ParseError::DuplicateHeader(ORIGIN_KEY));
                    }
                }
                Frame(name) => {
                    if table.frame.replace(name.to_owned()).is_some() {
                        return Err(ParseError::DuplicateHeader(FRAME_KEY));
                    }
                }
                Record(record) => {
                    if !record.epoch.is_finite() {
                        return Err(ParseError::NonFiniteEpoch(record.epoch));
                    }
                    if let Some(prev) = table.records.last() {
                        if record.epoch <= prev.epoch {
                            return Err(ParseError::NonMonotonicEpoch(record.epoch));
                        }
                    }
                    table.records.push(record);
                }
                Ignored(line) => {
                    debug!(line = line, "Skipping ephemeris table line");
                }
            }
            Ok(table)
        },
    )(s)?;

    let table = fold.map_err(Failure)?;

    if !s.is_empty() {
        return Err(Failure(ParseError::Nom(s, ErrorKind::Eof)));
    }

    if table.is_empty() {
        return Err(nom::Err::Error(ParseError::Empty));
    }

    Ok((s, table))
}

/// A line in the table text format
#[derive(Clone, Debug)]
enum TableLine<'a> {
    Origin(&'a str),
    Frame(&'a str),
    Record(EphemerisRecord),
    /// Blank lines and comments
    Ignored(&'a str),
}

fn read_line(s: &str) -> Result<&str, TableLine> {
    // fold_many0 bails on a parser that consumes nothing, so a bare end of input ends the fold
    if s.is_empty() {
        return Err(nom::Err::Error(ParseError::Nom(s, ErrorKind::Eof)));
    }
    let (s, line) = alt((
        map(header(ORIGIN_KEY), TableLine::Origin),
        map(header(FRAME_KEY), TableLine::Frame),
        map(record, TableLine::Record),
        map(preceded(tag(COMMENT_TOKEN), not_line_ending), TableLine::Ignored),
        map(space0, TableLine::Ignored),
    ))(s)?;
    let (s, _) = alt((line_ending, eof))(s)?;
    Ok((s, line))
}

fn header<'a>(key: &'static str) -> impl FnMut(&'a str) -> Result<&'a str, &'a str> {
    move |s: &'a str| {
        let (s, _) = space0(s)?;
        let (s, _) = tag(key)(s)?;
        let (s, _) = delimited(space0, tag("="), space0)(s)?;
        let (s, value) = not_line_ending(s)?;
        Ok((s, value.trim_end()))
    }
}

fn record(s: &str) -> Result<&str, EphemerisRecord> {
    let (s, epoch) = preceded(space0, double)(s)?;
    let mut state = CartesianState::zeros();
    let mut s = s;
    for i in 0..6 {
        let (rest, v) = preceded(space1, double)(s)?;
        state[i] = v;
        s = rest;
    }
    let (s, _) = space0(s)?;
    Ok((s, EphemerisRecord { epoch, state }))
}

impl<I> nom::error::ParseError<I> for ParseError<I> {
    fn from_error_kind(s: I, kind: ErrorKind) -> Self {
        ParseError::Nom(s, kind)
    }

    fn append(_: I, _: ErrorKind, other: Self) -> Self {
        other
    }
}
