use std::{fmt::Formatter, str::FromStr};

use thiserror::Error;

/// A sheet column, stored zero-based and displayed as letters (`A`, `B`, ..., `AA`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column {
    index: u32,
}

impl Column {
    pub fn from_index(index: u32) -> Self {
        Column { index }
    }

    /// Column at the given position of a header row.
    pub fn for_header_position(position: usize) -> Self {
        Column::from_index(u32::try_from(position).unwrap_or(u32::MAX))
    }

    /// 1-based column number (`A` is 1).
    pub fn number(&self) -> u32 {
        self.index.saturating_add(1)
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn letters(&self) -> String {
        number_to_letters(self.number())
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.letters())
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Column(index: {}, letters: {})", self.index, self)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColumnParseError {
    #[error("Empty column")]
    Empty,
    #[error("Non-alphabetic character in column")]
    NonAlphabeticCharacter,
    #[error("Column out of range")]
    OutOfRange,
}

impl FromStr for Column {
    type Err = ColumnParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_col(s)
    }
}

pub fn parse_col<T: AsRef<str>>(col_str: T) -> Result<Column, ColumnParseError> {
    let col_str = col_str.as_ref().trim();
    if col_str.is_empty() {
        return Err(ColumnParseError::Empty);
    }
    if col_str.chars().any(|c| !c.is_ascii_alphabetic()) {
        return Err(ColumnParseError::NonAlphabeticCharacter);
    }

    let col_num = col_str
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(26)
                .and_then(|acc| acc.checked_add(c as u32 - 'A' as u32 + 1))
        })
        .ok_or(ColumnParseError::OutOfRange)?;

    Ok(Column::from_index(col_num - 1))
}

fn number_to_letters(number: u32) -> String {
    let mut number = number;
    let mut result = String::new();
    while number > 0 {
        let remainder = (number - 1) % 26;
        result.push((remainder as u8 + b'A') as char);
        number = (number - 1) / 26;
    }
    result.chars().rev().collect()
}
