// Copyright (c) 2024-present, fjall-rs
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Reading entries from a CSV dataset.
//!
//! Rows have the columns `line,address,id,birthdate,name,email,phone`, the
//! first row is a header. Text fields are cut to the dataset's field widths.

use crate::{entry::Text, Entry};
use std::{io::BufRead, num::ParseIntError, ops::Range};

/// Rows loaded when no range is given
pub const DEFAULT_ROWS: Range<u32> = 70_000..80_000;

const ADDRESS_WIDTH: usize = 50;
const BIRTHDATE_WIDTH: usize = 10;
const NAME_WIDTH: usize = 40;
const EMAIL_WIDTH: usize = 20;
const PHONE_WIDTH: usize = 13;

/// Reason a row could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    /// The row ended before the named column
    MissingField(&'static str),

    /// The named numeric column is not a `u32`
    InvalidNumber(&'static str, ParseIntError),
}

impl std::fmt::Display for RowError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing field {field:?}"),
            Self::InvalidNumber(field, e) => write!(f, "invalid {field:?}: {e}"),
        }
    }
}

impl std::error::Error for RowError {}

/// Error while reading a dataset
#[derive(Debug)]
pub enum Error {
    /// I/O error
    Io(std::io::Error),

    /// Malformed row, with its 1-based position in the file
    Row(usize, RowError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IngestError(Io: {e})"),
            Self::Row(row, e) => write!(f, "IngestError(row {row}: {e})"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Row(_, e) => Some(e),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

fn parse_number(field: &'static str, value: &str) -> Result<u32, RowError> {
    value
        .trim()
        .parse()
        .map_err(|e| RowError::InvalidNumber(field, e))
}

/// Parses one data row into an entry.
///
/// # Errors
///
/// Will return `Err` if a column is missing or a number is malformed.
pub fn parse_row(row: &str) -> Result<Entry, RowError> {
    let mut fields = row.trim_end_matches(['\r', '\n']).split(',');

    let mut next = |name: &'static str| fields.next().ok_or(RowError::MissingField(name));

    let line = parse_number("line", next("line")?)?;
    let address = next("address")?;
    let id = parse_number("id", next("id")?)?;
    let birthdate = next("birthdate")?;
    let name = next("name")?;
    let email = next("email")?;
    let phone = next("phone")?;

    Ok(Entry {
        line,
        id,
        address: Text::truncated(address, ADDRESS_WIDTH),
        birthdate: Text::truncated(birthdate, BIRTHDATE_WIDTH),
        name: Text::truncated(name, NAME_WIDTH),
        email: Text::truncated(email, EMAIL_WIDTH),
        phone: Text::truncated(phone, PHONE_WIDTH),
    })
}

/// Iterator over the entries of a dataset whose line number is in a range
pub struct Rows<R> {
    lines: std::io::Lines<R>,
    range: Range<u32>,
    row: usize,
}

impl<R: BufRead> Rows<R> {
    /// Reads the dataset from `reader`, yielding rows with `line` in `range`.
    pub fn new(reader: R, range: Range<u32>) -> Self {
        Self {
            lines: reader.lines(),
            range,
            row: 0,
        }
    }
}

impl<R: BufRead> Iterator for Rows<R> {
    type Item = Result<Entry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = fail_iter!(self.lines.next()?);
            self.row += 1;

            // Header
            if self.row == 1 || line.trim().is_empty() {
                continue;
            }

            let entry = match parse_row(&line) {
                Ok(entry) => entry,
                Err(e) => return Some(Err(Error::Row(self.row, e))),
            };

            if self.range.contains(&entry.line) {
                return Some(Ok(entry));
            }
        }
    }
}
