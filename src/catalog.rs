//! Fixed layout of the hall: 5 rows (`A`..`E`) of 18 seats each.
//!
//! Seat identities are static. A seat id is the row letter followed by the
//! seat number zero-padded to two digits, e.g. `A01` or `E18`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ReservationError, Result};
use crate::models::Seat;

pub const ROWS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];
pub const SEATS_PER_ROW: u8 = 18;
pub const TOTAL_SEATS: usize = ROWS.len() * SEATS_PER_ROW as usize;

/// Canonical seat identifier. Only constructible for seats that exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SeatId {
    // field order gives catalog order for the derived Ord
    row: u8,
    number: u8,
}

impl SeatId {
    pub fn new(row: char, number: u8) -> Result<Self> {
        let row_idx = ROWS
            .iter()
            .position(|r| *r == row)
            .ok_or_else(|| ReservationError::InvalidSeatId(format!("row {row:?} (expected A-E)")))?;
        if !(1..=SEATS_PER_ROW).contains(&number) {
            return Err(ReservationError::InvalidSeatId(format!(
                "seat number {number} (expected 1-{SEATS_PER_ROW})"
            )));
        }
        Ok(Self {
            row: row_idx as u8,
            number,
        })
    }

    pub fn row(&self) -> char {
        ROWS[self.row as usize]
    }

    pub fn number(&self) -> u8 {
        self.number
    }

    /// Position in catalog order, `0..TOTAL_SEATS`.
    pub fn index(&self) -> usize {
        self.row as usize * SEATS_PER_ROW as usize + (self.number as usize - 1)
    }
}

impl fmt::Display for SeatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:02}", self.row(), self.number)
    }
}

impl FromStr for SeatId {
    type Err = ReservationError;

    fn from_str(s: &str) -> Result<Self> {
        let (row, number) = parse_seat_id(s)?;
        SeatId::new(row, number)
    }
}

impl From<SeatId> for String {
    fn from(id: SeatId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for SeatId {
    type Error = ReservationError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

/// All 90 seat ids, row `A`→`E`, number 1→18.
pub fn all_seat_ids() -> Vec<SeatId> {
    (0..ROWS.len() as u8)
        .flat_map(|row| (1..=SEATS_PER_ROW).map(move |number| SeatId { row, number }))
        .collect()
}

/// Every seat of the hall, all available.
pub fn all_seats() -> Vec<Seat> {
    all_seat_ids().into_iter().map(Seat::available).collect()
}

/// Seats split per row, in catalog order.
pub fn seat_grid(seats: &[Seat]) -> Vec<(char, Vec<&Seat>)> {
    ROWS.iter()
        .map(|&row| (row, seats.iter().filter(|s| s.row == row).collect()))
        .collect()
}

pub fn format_seat_id(row: char, number: u8) -> Result<String> {
    SeatId::new(row, number).map(|id| id.to_string())
}

/// Splits a canonical id into `(row, number)`.
pub fn parse_seat_id(id: &str) -> Result<(char, u8)> {
    let invalid = || ReservationError::InvalidSeatId(id.to_string());

    let mut chars = id.chars();
    let row = chars.next().ok_or_else(invalid)?;
    let digits = chars.as_str();
    if digits.len() != 2 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let number: u8 = digits.parse().map_err(|_| invalid())?;

    SeatId::new(row, number).map_err(|_| invalid())?;
    Ok((row, number))
}
