//! Cell address and range types

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};

/// A cell position, 0-based, rendered as `A1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based)
    pub row: u32,
    /// Column index (0-based, A=0 .. XFD=16383)
    pub col: u16,
}

impl CellAddress {
    /// Create an address from 0-based indices
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse an `A1` reference. `$` markers are accepted and ignored.
    ///
    /// ```
    /// use sheetstream_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("B2").unwrap();
    /// assert_eq!((addr.row, addr.col), (1, 1));
    /// assert_eq!(CellAddress::parse("$D$3").unwrap(), CellAddress::new(2, 3));
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let reference: String = s.trim().chars().filter(|&c| c != '$').collect();
        let split = reference
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| Error::InvalidAddress(format!("no row number in '{}'", s)))?;
        let (letters, digits) = reference.split_at(split);
        if letters.is_empty() {
            return Err(Error::InvalidAddress(format!("no column letters in '{}'", s)));
        }

        let col = Self::letters_to_column(letters)?;
        let row = match digits.parse::<u32>() {
            Ok(row) if row >= 1 => row - 1,
            _ => return Err(Error::InvalidAddress(format!("invalid row number in '{}'", s))),
        };
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        Ok(Self { row, col })
    }

    /// Column letters for a 0-based index (0 = A, 26 = AA)
    pub fn column_to_letters(col: u16) -> String {
        // XFD is the widest a valid column gets; u16::MAX still fits in four
        let mut buf = [0u8; 4];
        let mut start = buf.len();
        let mut n = col as u32 + 1;
        while n > 0 {
            n -= 1;
            start -= 1;
            buf[start] = b'A' + (n % 26) as u8;
            n /= 26;
        }
        buf[start..].iter().map(|&b| b as char).collect()
    }

    /// 0-based index for column letters (case-insensitive)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let col = letters.chars().try_fold(0u32, |acc, c| {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!("invalid column letter '{}'", c)));
            }
            let digit = c.to_ascii_uppercase() as u32 - 'A' as u32 + 1;
            Ok(acc.saturating_mul(26).saturating_add(digit))
        })? - 1;

        if col >= MAX_COLS as u32 {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(col as u16)
    }

    /// `$A$1` form, as defined names need it
    pub fn to_absolute_string(&self) -> String {
        format!("${}${}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// An inclusive rectangle of cells, `start` top-left and `end` bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Top-left corner
    pub start: CellAddress,
    /// Bottom-right corner
    pub end: CellAddress,
}

impl CellRange {
    /// Range spanning two corners given in any order
    pub fn new(a: CellAddress, b: CellAddress) -> Self {
        Self {
            start: CellAddress::new(a.row.min(b.row), a.col.min(b.col)),
            end: CellAddress::new(a.row.max(b.row), a.col.max(b.col)),
        }
    }

    /// Range from 0-based, inclusive row/column indices
    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Parse `A1:B10`, or a single `A1`
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some((start, end)) = s.split_once(':') else {
            let cell = CellAddress::parse(s)?;
            return Ok(Self::new(cell, cell));
        };

        let corner = |part: &str| {
            CellAddress::parse(part).map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))
        };
        Ok(Self::new(corner(start)?, corner(end)?))
    }

    /// Number of rows covered
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns covered
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// `$A$1:$B$2` form
    pub fn to_absolute_string(&self) -> String {
        format!(
            "{}:{}",
            self.start.to_absolute_string(),
            self.end.to_absolute_string()
        )
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
