//! Bullet and number labels for hierarchical list items.
//!
//! The same algorithm runs during editing, persistence, and HTML export, so it
//! must be pure: marker output depends only on the ordered `(level, kind)`
//! input, never on state carried across calls.

use std::collections::BTreeMap;

/// Whether a list item takes a bullet glyph or a formatted number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Bullet,
    Numbered,
}

/// Numbering style for one nesting level of an ordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberStyle {
    Decimal,
    LowerAlpha,
    LowerRoman,
    UpperAlpha,
    UpperRoman,
}

const NUMBER_STYLES: [NumberStyle; 5] = [
    NumberStyle::Decimal,
    NumberStyle::LowerAlpha,
    NumberStyle::LowerRoman,
    NumberStyle::UpperAlpha,
    NumberStyle::UpperRoman,
];

const BULLETS: [&str; 6] = ["\u{2022}", "\u{25E6}", "\u{25AA}", "\u{25AB}", "\u{2023}", "\u{2043}"];

impl NumberStyle {
    /// Style used at a given nesting level (cycles every five levels).
    pub fn for_level(level: usize) -> Self {
        NUMBER_STYLES[level % NUMBER_STYLES.len()]
    }

    /// Formats a 1-based count in this style, with the trailing dot.
    pub fn format(&self, count: u32) -> String {
        match self {
            NumberStyle::Decimal => format!("{count}."),
            NumberStyle::LowerAlpha => format!("{}.", to_alpha(count)),
            NumberStyle::LowerRoman => format!("{}.", to_roman(count).to_lowercase()),
            NumberStyle::UpperAlpha => format!("{}.", to_alpha(count).to_uppercase()),
            NumberStyle::UpperRoman => format!("{}.", to_roman(count)),
        }
    }
}

/// Bullet glyph used at a given nesting level (cycles every six levels).
pub fn bullet_for_level(level: usize) -> &'static str {
    BULLETS[level % BULLETS.len()]
}

/// Computes the marker string for every item of a list, in document order.
///
/// Counters are tracked per level. When an item sits at the same level as its
/// predecessor, or shallower, all counters for deeper levels are discarded:
/// the next descent starts a fresh sub-sequence. A level that jumps deeper by
/// more than one step simply starts counting at 1; skipped intermediate levels
/// are not back-filled.
pub fn compute_markers(items: &[(usize, MarkerKind)]) -> Vec<String> {
    let mut counters: BTreeMap<usize, u32> = BTreeMap::new();
    let mut prev_level: Option<usize> = None;
    let mut markers = Vec::with_capacity(items.len());

    for &(level, kind) in items {
        if let Some(prev) = prev_level
            && prev >= level
        {
            counters.retain(|&l, _| l <= level);
        }
        let count = counters.entry(level).or_insert(0);
        *count += 1;

        markers.push(match kind {
            MarkerKind::Numbered => NumberStyle::for_level(level).format(*count),
            MarkerKind::Bullet => bullet_for_level(level).to_string(),
        });
        prev_level = Some(level);
    }

    markers
}

/// Computes markers for a whole list block of a single kind.
pub fn list_markers(kind: MarkerKind, levels: impl IntoIterator<Item = usize>) -> Vec<String> {
    let items: Vec<(usize, MarkerKind)> = levels.into_iter().map(|l| (l, kind)).collect();
    compute_markers(&items)
}

/// Spreadsheet-style alphabetic counting: a..z, aa, ab, ...
fn to_alpha(mut n: u32) -> String {
    let mut out = Vec::new();
    while n > 0 {
        n -= 1;
        out.push(b'a' + (n % 26) as u8);
        n /= 26;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

fn to_roman(mut n: u32) -> String {
    const TABLE: [(u32, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut out = String::new();
    for (value, symbol) in TABLE {
        while n >= value {
            out.push_str(symbol);
            n -= value;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn bullets_by_level() {
        let markers = list_markers(MarkerKind::Bullet, [0, 0, 1, 1, 0]);
        assert_eq!(markers, vec!["•", "•", "◦", "◦", "•"]);
    }

    #[test]
    fn numbered_sublist_uses_alpha_and_resets() {
        let markers = list_markers(MarkerKind::Numbered, [0, 1, 1, 0]);
        assert_eq!(markers, vec!["1.", "a.", "b.", "2."]);
    }

    #[test]
    fn sibling_sublists_restart_counting() {
        // Returning to level 0 discards the level-1 counter, so the second
        // descent starts over at "a.".
        let markers = list_markers(MarkerKind::Numbered, [0, 1, 1, 0, 1]);
        assert_eq!(markers, vec!["1.", "a.", "b.", "2.", "a."]);
    }

    #[test]
    fn roman_level_two() {
        let markers = list_markers(MarkerKind::Numbered, [0, 1, 2, 2, 2, 2]);
        assert_eq!(markers, vec!["1.", "a.", "i.", "ii.", "iii.", "iv."]);
    }

    #[test]
    fn style_cycle_wraps_after_five_levels() {
        assert_eq!(NumberStyle::for_level(0), NumberStyle::Decimal);
        assert_eq!(NumberStyle::for_level(3), NumberStyle::UpperAlpha);
        assert_eq!(NumberStyle::for_level(4), NumberStyle::UpperRoman);
        assert_eq!(NumberStyle::for_level(5), NumberStyle::Decimal);
    }

    #[test]
    fn bullet_cycle_wraps_after_six_levels() {
        assert_eq!(bullet_for_level(5), "⁃");
        assert_eq!(bullet_for_level(6), "•");
    }

    #[test]
    fn level_jump_starts_fresh_counter() {
        // 0 -> 2 skips level 1 entirely; level 2 still counts from 1.
        let markers = list_markers(MarkerKind::Numbered, [0, 2, 2, 0]);
        assert_eq!(markers, vec!["1.", "i.", "ii.", "2."]);
    }

    #[test]
    fn deterministic_across_calls() {
        let input: Vec<(usize, MarkerKind)> = [0, 1, 1, 2, 0]
            .into_iter()
            .map(|l| (l, MarkerKind::Numbered))
            .collect();
        assert_eq!(compute_markers(&input), compute_markers(&input));
    }

    #[rstest]
    #[case(1, "1.")]
    #[case(9, "9.")]
    #[case(26, "26.")]
    fn decimal_formatting(#[case] count: u32, #[case] expected: &str) {
        assert_eq!(NumberStyle::Decimal.format(count), expected);
    }

    #[rstest]
    #[case(1, "a.")]
    #[case(26, "z.")]
    #[case(27, "aa.")]
    #[case(28, "ab.")]
    fn alpha_formatting_continues_past_z(#[case] count: u32, #[case] expected: &str) {
        assert_eq!(NumberStyle::LowerAlpha.format(count), expected);
    }

    #[rstest]
    #[case(1, "I.")]
    #[case(4, "IV.")]
    #[case(9, "IX.")]
    #[case(14, "XIV.")]
    #[case(1987, "MCMLXXXVII.")]
    fn roman_formatting(#[case] count: u32, #[case] expected: &str) {
        assert_eq!(NumberStyle::UpperRoman.format(count), expected);
    }

    #[test]
    fn empty_input_yields_no_markers() {
        assert!(compute_markers(&[]).is_empty());
    }
}
