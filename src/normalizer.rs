use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The ASCII Group Separator control character (code point 29).
///
/// GS1 uses it to terminate variable-length fields that are not otherwise
/// length-delimited.
pub const GS: char = '\u{1d}';

/// Textual stand-ins for the Group Separator, as produced by scanners,
/// label-design software, and operators transcribing codes by hand.
///
/// Each entry is `(token, case_insensitive)`. The escaped literal `\x1d` is
/// matched in any case; the bracketed tokens and the arrow glyph are matched
/// exactly.
const GS_PLACEHOLDERS: &[(&str, bool)] = &[
    ("<GS>", false),
    ("[GS]", false),
    ("^]", false),
    ("\u{2194}", false),
    ("\\x1d", true),
];

/// Textual stand-ins for the FNC1 leader symbol. The leader is implicit in
/// the element string and is added by the rendering engine, so these are
/// removed outright.
const FNC1_PLACEHOLDERS: &[&str] = &["<FNC1>", "\\F"];

/// Mapping from Cyrillic letters to the Latin characters on the same physical
/// keys of a standard ЙЦУКЕН layout. One entry per letter of the Russian
/// alphabet; punctuation-key letters map to the unshifted key character.
const CYRILLIC_KEY_PAIRS: [(char, char); 33] = [
    ('й', 'q'),
    ('ц', 'w'),
    ('у', 'e'),
    ('к', 'r'),
    ('е', 't'),
    ('н', 'y'),
    ('г', 'u'),
    ('ш', 'i'),
    ('щ', 'o'),
    ('з', 'p'),
    ('х', '['),
    ('ъ', ']'),
    ('ф', 'a'),
    ('ы', 's'),
    ('в', 'd'),
    ('а', 'f'),
    ('п', 'g'),
    ('р', 'h'),
    ('о', 'j'),
    ('л', 'k'),
    ('д', 'l'),
    ('ж', ';'),
    ('э', '\''),
    ('я', 'z'),
    ('ч', 'x'),
    ('с', 'c'),
    ('м', 'v'),
    ('и', 'b'),
    ('т', 'n'),
    ('ь', 'm'),
    ('б', ','),
    ('ю', '.'),
    ('ё', '`'),
];

// Precomputed map covering both letter cases.
static CYRILLIC_TO_QWERTY: Lazy<HashMap<char, char>> = Lazy::new(|| {
    let mut map = HashMap::with_capacity(CYRILLIC_KEY_PAIRS.len() * 2);
    for (cyr, lat) in CYRILLIC_KEY_PAIRS {
        map.insert(cyr, lat);
        if let Some(upper) = cyr.to_uppercase().next() {
            map.insert(upper, lat.to_ascii_uppercase());
        }
    }
    map
});

/// Options for [`normalize`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Replace Cyrillic letters with the Latin characters on the same
    /// physical keys, recovering input typed in the wrong keyboard layout.
    ///
    /// Off by default: the remap silently corrupts intentionally Cyrillic
    /// payloads. Callers are better served by [`contains_cyrillic`] and a
    /// user-facing error asking the operator to switch input methods.
    pub remap_cyrillic_layout: bool,
}

/// True if `s` contains any Cyrillic character.
pub fn contains_cyrillic(s: &str) -> bool {
    s.chars().any(|c| ('\u{0400}'..='\u{04ff}').contains(&c))
}

/// Canonicalise free-form operator input so that the only separators left in
/// it are real Group Separator control characters.
///
/// In order: trims outer whitespace; strips CR/LF/TAB and Unicode variation
/// selectors anywhere; optionally remaps Cyrillic per
/// [`NormalizeOptions::remap_cyrillic_layout`]; rewrites every recognised
/// Group Separator placeholder to the real control character; removes FNC1
/// placeholders; collapses runs of consecutive separators into one.
///
/// Never fails. Unrecognised content passes through untouched and is left
/// for the parser's grammar to reject.
pub fn normalize(raw: &str, opts: &NormalizeOptions) -> String {
    let mut cleaned = String::with_capacity(raw.len());
    for ch in raw.trim().chars() {
        if matches!(ch, '\r' | '\n' | '\t') || ('\u{fe00}'..='\u{fe0f}').contains(&ch) {
            continue;
        }

        if opts.remap_cyrillic_layout {
            if let Some(&mapped) = CYRILLIC_TO_QWERTY.get(&ch) {
                cleaned.push(mapped);
                continue;
            }
        }

        cleaned.push(ch);
    }

    // Rewrite separator placeholders and drop FNC1 leaders in a single
    // left-to-right pass. Placeholder matches always win over treating their
    // characters as payload.
    let mut rewritten = String::with_capacity(cleaned.len());
    let mut rest = cleaned.as_str();
    'scan: while let Some(ch) = rest.chars().next() {
        for (token, ci) in GS_PLACEHOLDERS {
            if matches_token(rest, token, *ci) {
                rewritten.push(GS);
                rest = &rest[token.len()..];
                continue 'scan;
            }
        }

        for token in FNC1_PLACEHOLDERS {
            if matches_token(rest, token, true) {
                rest = &rest[token.len()..];
                continue 'scan;
            }
        }

        rewritten.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    // Collapse doubled separators from copy-paste or double-encoded input.
    let mut out = String::with_capacity(rewritten.len());
    let mut prev_was_gs = false;
    for ch in rewritten.chars() {
        if ch == GS && prev_was_gs {
            continue;
        }

        prev_was_gs = ch == GS;
        out.push(ch);
    }

    out
}

/// Does `rest` start with `token`? Out-of-boundary slices simply fail the
/// match, so multi-byte input cannot panic here.
fn matches_token(rest: &str, token: &str, case_insensitive: bool) -> bool {
    match rest.get(..token.len()) {
        Some(head) if case_insensitive => head.eq_ignore_ascii_case(token),
        Some(head) => head == token,
        None => false,
    }
}
