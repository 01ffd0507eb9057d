//! Block-letter digits for the countdown screen.

use std::time::Duration;

pub const GLYPH_ROWS: usize = 6;

const DOT: [&str; GLYPH_ROWS] = ["   ", "   ", "   ", "   ", "██╗", "╚═╝"];

const DIGITS: [[&str; GLYPH_ROWS]; 10] = [
    [" ██████╗ ", "██╔═████╗", "██║██╔██║", "████╔╝██║", "╚██████╔╝", " ╚═════╝ "],
    ["   ██╗   ", "  ███║   ", "  ╚██║   ", "   ██║   ", "   ██║   ", "   ╚═╝   "],
    ["██████╗  ", "╚════██╗ ", " █████╔╝ ", "██╔═══╝  ", "███████╗ ", "╚══════╝ "],
    ["██████╗  ", "╚════██╗ ", " █████╔╝ ", " ╚═══██╗ ", "██████╔╝ ", "╚═════╝  "],
    ["██╗  ██╗ ", "██║  ██║ ", "███████║ ", "╚════██║ ", "     ██║ ", "     ╚═╝ "],
    ["███████╗ ", "██╔════╝ ", "███████╗ ", "╚════██║ ", "███████║ ", "╚══════╝ "],
    [" ██████╗ ", "██╔════╝ ", "███████╗ ", "██╔═══██╗", "╚██████╔╝", " ╚═════╝ "],
    ["███████╗ ", "╚════██║ ", "    ██╔╝ ", "   ██╔╝  ", "   ██║   ", "   ╚═╝   "],
    [" █████╗  ", "██╔══██╗ ", "╚█████╔╝ ", "██╔══██╗ ", "╚█████╔╝ ", " ╚════╝  "],
    [" █████╗  ", "██╔══██╗ ", "╚██████║ ", " ╚═══██║ ", " █████╔╝ ", " ╚════╝  "],
];

fn glyph(ch: char) -> Option<&'static [&'static str; GLYPH_ROWS]> {
    match ch {
        '.' => Some(&DOT),
        '0'..='9' => ch.to_digit(10).map(|d| &DIGITS[d as usize]),
        _ => None,
    }
}

/// Render digits and dots as six rows of block characters; other characters
/// are skipped.
pub fn big_text(text: &str) -> Vec<String> {
    let mut rows = vec![String::new(); GLYPH_ROWS];
    for pieces in text.chars().filter_map(glyph) {
        for (row, piece) in rows.iter_mut().zip(pieces.iter()) {
            row.push_str(piece);
        }
    }
    rows
}

/// One decimal below ten seconds, whole seconds above.
pub fn countdown_label(remaining: Duration) -> String {
    let secs = remaining.as_secs_f64();
    if secs < 10.0 {
        format!("{secs:.1}")
    } else {
        format!("{}", secs.ceil() as u64)
    }
}
