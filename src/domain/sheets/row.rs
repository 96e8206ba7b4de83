use std::fmt::Formatter;

/// Number of header rows above the first data row.
pub const HEADER_ROWS: u32 = 1;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Row {
    index: u32,
}

impl Row {
    pub fn from_index(index: u32) -> Self {
        Row { index }
    }

    pub fn from_row(row: u32) -> Self {
        Row {
            index: row.saturating_sub(1), // Convert to zero-based index
        }
    }

    /// Physical row of the `data_index`-th record (0-based) below the header.
    ///
    /// # Examples
    /// ```
    /// use license_approval::domain::sheets::row::Row;
    /// assert_eq!(Row::for_record(0).number(), 2);
    /// assert_eq!(Row::for_record(4).number(), 6);
    /// ```
    pub fn for_record(data_index: usize) -> Self {
        let data_index = u32::try_from(data_index).unwrap_or(u32::MAX);
        Row::from_index(data_index.saturating_add(HEADER_ROWS))
    }

    /// Returns the row number as a 1-based index, the way the spreadsheet shows it.
    ///
    /// # Examples
    /// ```
    /// use license_approval::domain::sheets::row::Row;
    /// let row = Row::from_index(0);
    /// assert_eq!(row.number(), 1);
    /// let row = Row::from_index(25);
    /// assert_eq!(row.number(), 26);
    /// ```
    pub fn number(&self) -> u32 {
        self.index.saturating_add(1)
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Row(index: {}, row: {})", self.index(), self.number())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_record_sits_below_header() {
        assert_eq!(Row::for_record(0), Row::from_row(2));
    }

    #[test]
    fn test_record_offset() {
        assert_eq!(Row::for_record(9), Row::from_row(11));
    }

    #[test]
    fn test_record_offset_saturates() {
        assert_eq!(Row::for_record(usize::MAX).index(), u32::MAX);
    }

    #[test]
    fn test_row_display() {
        let row = Row::from_index(0);
        assert_eq!(row.to_string(), "1");
    }

    #[test]
    fn test_row_debug() {
        let row = Row::from_index(4);
        assert_eq!(format!("{:?}", row), "Row(index: 4, row: 5)");
    }

    #[test]
    fn test_zero_row() {
        let row = Row::from_row(0);
        assert_eq!(row.index(), 0);
        assert_eq!(row.number(), 1);
    }
}
