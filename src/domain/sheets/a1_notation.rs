use std::fmt::Formatter;

use super::{cell_position::CellPosition, row::Row};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(pub String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl From<String> for A1Notation {
    fn from(s: String) -> Self {
        A1Notation(s)
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub trait ToA1Notation {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation;
}

/// Quotes a sheet title for use in a range, doubling embedded quotes.
///
/// # Examples
/// ```
/// use license_approval::domain::sheets::a1_notation::quote_sheet_title;
/// assert_eq!(quote_sheet_title("Sheet1"), "'Sheet1'");
/// assert_eq!(quote_sheet_title("Bob's"), "'Bob''s'");
/// ```
pub fn quote_sheet_title(sheet_name: &str) -> String {
    format!("'{}'", sheet_name.replace('\'', "''"))
}

/// The whole sheet.
pub fn whole_sheet(sheet_name: &str) -> A1Notation {
    A1Notation(quote_sheet_title(sheet_name))
}

/// A single full row of the sheet, e.g. `'Sheet1'!1:1`.
pub fn whole_row(sheet_name: &str, row: Row) -> A1Notation {
    A1Notation(format!("{}!{}:{}", quote_sheet_title(sheet_name), row, row))
}

impl ToA1Notation for CellPosition {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        match sheet_name {
            Some(sheet_name) => A1Notation(format!(
                "{}!{}{}",
                quote_sheet_title(sheet_name),
                self.col,
                self.row
            )),
            None => A1Notation(format!("{}{}", self.col, self.row)),
        }
    }
}
