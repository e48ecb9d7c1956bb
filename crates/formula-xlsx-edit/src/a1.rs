use std::fmt;

use thiserror::Error;

pub const EXCEL_MAX_ROWS: u32 = 1_048_576;
pub const EXCEL_MAX_COLS: u32 = 16_384;

/// A single-cell reference as written in `c/@r`.
///
/// Rows and columns are 0-indexed: `row = 0` is Excel row `1`, `col = 0` is column `A`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub row: u32,
    pub col: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum A1ParseError {
    #[error("empty A1 reference")]
    Empty,
    #[error("missing column in A1 reference")]
    MissingColumn,
    #[error("missing row in A1 reference")]
    MissingRow,
    #[error("invalid column in A1 reference")]
    InvalidColumn,
    #[error("invalid row in A1 reference")]
    InvalidRow,
    #[error("trailing characters in A1 reference")]
    TrailingCharacters,
}

impl CellRef {
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse a relative A1 reference (`B7`, `XFD1048576`).
    ///
    /// `$` markers are rejected: worksheet cell references are always relative.
    pub fn from_a1(a1: &str) -> Result<Self, A1ParseError> {
        if a1.is_empty() {
            return Err(A1ParseError::Empty);
        }

        let bytes = a1.as_bytes();
        let col_end = bytes
            .iter()
            .position(|b| !b.is_ascii_alphabetic())
            .unwrap_or(bytes.len());
        if col_end == 0 {
            return Err(A1ParseError::MissingColumn);
        }
        let row_end = bytes[col_end..]
            .iter()
            .position(|b| !b.is_ascii_digit())
            .map_or(bytes.len(), |len| col_end + len);
        if row_end == col_end {
            return Err(A1ParseError::MissingRow);
        }
        if row_end != bytes.len() {
            return Err(A1ParseError::TrailingCharacters);
        }

        let col = col_index(&a1[..col_end])?;
        if col >= EXCEL_MAX_COLS {
            return Err(A1ParseError::InvalidColumn);
        }
        let row_1_based: u32 = a1[col_end..]
            .parse()
            .map_err(|_| A1ParseError::InvalidRow)?;
        if row_1_based == 0 || row_1_based > EXCEL_MAX_ROWS {
            return Err(A1ParseError::InvalidRow);
        }

        Ok(Self {
            row: row_1_based - 1,
            col,
        })
    }

    pub fn to_a1(self) -> String {
        format!("{}{}", col_letters(self.col), u64::from(self.row) + 1)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// Bijective base-26 column letters (`0` is `A`, `26` is `AA`).
fn col_letters(col: u32) -> String {
    let mut remaining = u64::from(col) + 1;
    let mut letters = Vec::new();
    while remaining > 0 {
        remaining -= 1;
        letters.push(char::from(b'A' + (remaining % 26) as u8));
        remaining /= 26;
    }
    letters.into_iter().rev().collect()
}

/// Inverse of [`col_letters`]; `letters` is non-empty ASCII alphabetic.
fn col_index(letters: &str) -> Result<u32, A1ParseError> {
    letters
        .bytes()
        .try_fold(0u32, |acc, letter| {
            let digit = u32::from(letter.to_ascii_uppercase() - b'A') + 1;
            acc.checked_mul(26)?.checked_add(digit)
        })
        .and_then(|n| n.checked_sub(1))
        .ok_or(A1ParseError::InvalidColumn)
}
