//! Block-address range parsing.
//!
//! Weekly incident reports mask the last two digits of a house number:
//! `"25XX FOREST LN"` means somewhere in the 2500-2599 block and `"1XX MAIN
//! ST"` means 100-199. This module turns such an address into concrete low
//! and high addresses that can each be geocoded.
//!
//! Only the first space-delimited token is inspected. Addresses whose first
//! token is not block notation pass through untouched.

use regex::Regex;
use std::sync::LazyLock;

/// Block token: one or more ASCII digits followed by exactly two `X`/`x`.
static BLOCK_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]+)[Xx]{2}$").expect("valid regex"));

/// The two concrete ends of a (possibly block-style) address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRange {
    /// Lowest address on the block (`"2500 FOREST LN ..."`).
    pub low: String,
    /// Highest address on the block (`"2599 FOREST LN ..."`).
    pub high: String,
}

impl AddressRange {
    /// Whether both ends are the same address (no block notation).
    #[must_use]
    pub fn is_single(&self) -> bool {
        self.low == self.high
    }
}

/// Appends the jurisdiction (city and state) to a partial street address.
#[must_use]
pub fn full_address(partial: &str, jurisdiction: &str) -> String {
    format!("{partial} {jurisdiction}")
}

/// Returns the low end of a block address (`"25XX"` -> `"2500"`).
#[must_use]
pub fn parse_range_low(address: &str) -> String {
    replace_block_token(address, "00")
}

/// Returns the high end of a block address (`"25XX"` -> `"2599"`).
#[must_use]
pub fn parse_range_high(address: &str) -> String {
    replace_block_token(address, "99")
}

/// Computes both ends of `address` at once.
#[must_use]
pub fn address_range(address: &str) -> AddressRange {
    AddressRange {
        low: parse_range_low(address),
        high: parse_range_high(address),
    }
}

/// Replaces a leading block token with its digits followed by `fill`.
///
/// A single-digit block (`"1XX"`) therefore becomes a three-digit number
/// (`"100"`/`"199"`), and longer blocks keep every digit (`"25XX"` ->
/// `"2500"`).
fn replace_block_token(address: &str, fill: &str) -> String {
    let token = address.split(' ').next().unwrap_or_default();

    let Some(caps) = BLOCK_TOKEN_RE.captures(token) else {
        return address.to_string();
    };

    let digits = &caps[1];
    format!("{digits}{fill}{}", &address[token.len()..])
}
