//! Conversion between Excel-style references ("B7", column "AA") and
//! zero-based (row, column) indices.
use thiserror::Error;

/// Errors raised while parsing Excel-style references.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("Empty column letters")]
    EmptyColumn,

    #[error("Invalid column letters '{0}'")]
    InvalidColumn(String),

    #[error("Invalid cell reference '{0}'")]
    InvalidCellRef(String),
}

/// A cell position with 0-based row and column indices.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

/// Decodes column letters to a 0-based index: A -> 0, Z -> 25, AA -> 26.
/// Letters form a bijective base-26 number with digits A=1..Z=26.
pub fn col_to_index(letters: &str) -> Result<usize, ReferenceError> {
    if letters.is_empty() {
        return Err(ReferenceError::EmptyColumn);
    }
    let mut index = 0usize;
    for character in letters.chars() {
        let digit = match character.to_ascii_uppercase() {
            c @ 'A'..='Z' => c as usize - 'A' as usize + 1,
            _ => return Err(ReferenceError::InvalidColumn(letters.to_owned())),
        };
        index = index * 26 + digit;
    }
    Ok(index - 1)
}

/// Encodes a 0-based column index to letters: 0 -> A, 25 -> Z, 26 -> AA.
pub fn index_to_col(index: usize) -> String {
    let mut remaining = index + 1;
    let mut letters = String::new();
    while remaining > 0 {
        remaining -= 1;
        let digit = char::from_u32('A' as u32 + (remaining % 26) as u32).expect("Hardcode letters");
        letters.insert(0, digit);
        remaining /= 26;
    }
    letters
}

/// Parses an Excel-style cell reference into 0-based indices:
/// "A1" -> (0, 0), "B7" -> (6, 1).
/// The reference must be leading letters followed by a positive row number.
pub fn parse_cell_ref(reference: &str) -> Result<CellRef, ReferenceError> {
    let split = reference
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| ReferenceError::InvalidCellRef(reference.to_owned()))?;
    let (letters, digits) = reference.split_at(split);
    if letters.is_empty() || digits.chars().any(|c| !c.is_ascii_digit()) {
        return Err(ReferenceError::InvalidCellRef(reference.to_owned()));
    }
    let row: usize = digits
        .parse()
        .map_err(|_| ReferenceError::InvalidCellRef(reference.to_owned()))?;
    if row == 0 {
        return Err(ReferenceError::InvalidCellRef(reference.to_owned()));
    }
    let col = col_to_index(letters)
        .map_err(|_| ReferenceError::InvalidCellRef(reference.to_owned()))?;
    Ok(CellRef { row: row - 1, col })
}

/// Formats 0-based indices as an Excel-style reference: (6, 1) -> "B7".
pub fn cell_ref_to_string(row: usize, col: usize) -> String {
    format!("{}{}", index_to_col(col), row + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn col_to_index_basics() {
        assert_eq!(col_to_index("A").unwrap(), 0);
        assert_eq!(col_to_index("Z").unwrap(), 25);
        assert_eq!(col_to_index("AA").unwrap(), 26);
        assert_eq!(col_to_index("AZ").unwrap(), 51);
        assert_eq!(col_to_index("ba").unwrap(), 52);
    }

    #[test]
    fn col_to_index_rejects_invalid() {
        assert_eq!(col_to_index(""), Err(ReferenceError::EmptyColumn));
        assert!(col_to_index("A1").is_err());
        assert!(col_to_index("-").is_err());
    }

    #[test]
    fn index_to_col_round_trip() {
        for index in 0..2000 {
            let letters = index_to_col(index);
            assert_eq!(col_to_index(&letters).unwrap(), index);
        }
        assert_eq!(index_to_col(0), "A");
        assert_eq!(index_to_col(25), "Z");
        assert_eq!(index_to_col(26), "AA");
        assert_eq!(index_to_col(701), "ZZ");
        assert_eq!(index_to_col(702), "AAA");
    }

    #[test]
    fn letters_round_trip() {
        for letters in ["A", "Q", "Z", "AA", "AQ", "ZZ", "ABC"] {
            let index = col_to_index(letters).unwrap();
            assert_eq!(index_to_col(index), letters);
        }
    }

    #[test]
    fn parse_cell_ref_basics() {
        assert_eq!(parse_cell_ref("A1").unwrap(), CellRef { row: 0, col: 0 });
        assert_eq!(parse_cell_ref("B7").unwrap(), CellRef { row: 6, col: 1 });
        assert_eq!(parse_cell_ref("AA10").unwrap(), CellRef { row: 9, col: 26 });
    }

    #[test]
    fn parse_cell_ref_rejects_invalid() {
        assert!(parse_cell_ref("").is_err());
        assert!(parse_cell_ref("B").is_err());
        assert!(parse_cell_ref("7").is_err());
        assert!(parse_cell_ref("B0").is_err());
        assert!(parse_cell_ref("B7X").is_err());
    }

    #[test]
    fn cell_ref_to_string_inverse() {
        assert_eq!(cell_ref_to_string(0, 0), "A1");
        assert_eq!(cell_ref_to_string(6, 1), "B7");
        let reference = parse_cell_ref("AB12").unwrap();
        assert_eq!(cell_ref_to_string(reference.row, reference.col), "AB12");
    }
}
