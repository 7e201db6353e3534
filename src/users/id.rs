//! Textual user IDs are zero-padded decimal sequence numbers ("0001").

/// Minimum rendered width of an ID.
pub const ID_WIDTH: usize = 4;

/// Normalises "27", "0027" or "id-0027" to 27. Anything without digits
/// (or too large to represent) maps to 0.
pub fn parse_id(text: &str) -> u64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse::<u64>().unwrap_or(0)
}

/// Renders a sequence number as an ID, widening past four digits instead of
/// truncating.
pub fn format_id(n: u64) -> String {
    format!("{:0>width$}", n, width = ID_WIDTH)
}
