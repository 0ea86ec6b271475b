//! # GS1 element-string parser
//!
//! This crate recovers a structured GS1 record from free-form operator input
//! (scanned or pasted) and re-serialises it into the canonical textual forms
//! used when printing DataMatrix labels. An element string is accepted when
//! it matches a fixed grammar, scanned left-to-right with no backtracking:
//!
//! 1. **GTIN**: application identifier `01` followed by exactly 14 decimal
//!    digits.
//! 2. **Serial**: application identifier `21` followed by 1–20 characters.
//!    The serial is terminated by a Group Separator (ASCII 29), by the start
//!    of a recognised tail identifier, or by the end of input.
//! 3. **Tails**: zero or more trailing fields, each optionally preceded by a
//!    Group Separator:
//!    - `91` and `93` carry exactly 4 characters;
//!    - `92` carries 44 or 88 characters drawn from `[A-Za-z0-9+/=_.-]`,
//!      terminated like the serial.
//!
//! Additional rules:
//! - Tail-identifier lookahead always wins: a `91`/`92`/`93` pair at the
//!   cursor ends the field being read, never becomes field content.
//! - Parsing fails fast with a specific [`ParseError`] kind on the first
//!   grammar violation; there is no partial record and no recovery.
//! - Free-form input goes through [`normalize`] first, which rewrites the
//!   textual Group Separator placeholders (`<GS>`, `[GS]`, `^]`, `↔`,
//!   `\x1d`) into the real control character and drops FNC1 markers. The
//!   FNC1 leader itself is added by the rendering engine, never carried here.
//!
//! ## Output
//!
//! A parsed [`ElementString`] derives three forms via
//! [`ElementString::representations`]: a spaced human-readable form, an
//! ASCII-only transcribable form with visible `<GS>` markers, and the
//! byte-exact form (real separators) consumed by the barcode encoder.
//!
//! ## Example
//!
//! ```rust
//! use gs1_element_parser::parse_from_user_input;
//!
//! let record = parse_from_user_input("010001234567890521ABC123<GS>9319AB")
//!     .expect("valid element string");
//! assert_eq!(record.gtin, "00012345678905");
//! assert_eq!(record.serial, "ABC123");
//! assert_eq!(record.tails.len(), 1);
//! ```

pub mod normalizer;

pub use normalizer::{contains_cyrillic, normalize, NormalizeOptions, GS};

use std::fmt;
use thiserror::Error;

/// Length of the GTIN field under AI `01`.
const GTIN_LEN: usize = 14;
/// Longest serial accepted under AI `21`.
const SERIAL_MAX_LEN: usize = 20;
/// Value length of the fixed-width tails, AI `91` and `93`.
const TAIL_FIXED_LEN: usize = 4;
/// The two value lengths accepted for the AI `92` signature field.
const AI92_VALUE_LENGTHS: [usize; 2] = [44, 88];

/// Error kinds raised by [`parse`]. Each maps to one grammar rule and the
/// message is suitable for showing to the operator directly.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected AI (01) followed by a 14-digit GTIN")]
    BadGtin,
    #[error("expected AI (21) with the serial number after the GTIN")]
    MissingSerial,
    #[error("serial number is empty")]
    SerialEmpty,
    #[error("serial number is longer than 20 characters")]
    SerialTooLong,
    #[error("unknown application identifier at position {0}")]
    UnknownAi(usize),
    #[error("AI (91) value must be exactly 4 characters")]
    Ai91LengthInvalid,
    #[error("AI (93) value must be exactly 4 characters")]
    Ai93LengthInvalid,
    #[error("AI (92) value must be 44 or 88 characters of [A-Za-z0-9+/=_.-]")]
    Ai92Invalid,
}

/// The application identifiers recognised for trailing fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TailAi {
    /// AI `91` - 4-character verification key.
    Ai91,
    /// AI `92` - 44- or 88-character crypto signature.
    Ai92,
    /// AI `93` - 4-character internal code.
    Ai93,
}

impl TailAi {
    fn from_digits(a: char, b: char) -> Option<Self> {
        match (a, b) {
            ('9', '1') => Some(TailAi::Ai91),
            ('9', '2') => Some(TailAi::Ai92),
            ('9', '3') => Some(TailAi::Ai93),
            _ => None,
        }
    }

    /// The two-digit identifier as it appears in the element string.
    pub fn as_str(self) -> &'static str {
        match self {
            TailAi::Ai91 => "91",
            TailAi::Ai92 => "92",
            TailAi::Ai93 => "93",
        }
    }
}

impl fmt::Display for TailAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One trailing field of the element string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tail {
    pub ai: TailAi,
    pub value: String,
    /// Whether a Group Separator preceded this tail in the parsed input.
    /// Carried for display and diagnostics only; re-serialisation always
    /// emits a separator regardless of this flag.
    pub had_leading_separator: bool,
}

/// A fully parsed GS1 element string: GTIN, serial, and trailing fields in
/// input order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElementString {
    /// Exactly 14 decimal digits (AI `01`).
    pub gtin: String,
    /// 1–20 characters (AI `21`).
    pub serial: String,
    /// Trailing fields, in order of appearance. May be empty.
    pub tails: Vec<Tail>,
}

/// The three textual serialisations of a record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Representations {
    /// Space-joined `(01) … (21) …` form for display. Not re-parseable.
    pub pretty_ai: String,
    /// `(01)…(21)…` with visible `<GS>` markers; ASCII-only, transcribable.
    pub ai_text: String,
    /// `01…21…` with real Group Separator characters, as consumed by the
    /// barcode encoder (which prepends the FNC1 leader itself).
    pub raw_with_gs: String,
}

impl ElementString {
    /// Derive the three canonical textual forms of this record.
    ///
    /// `raw_with_gs` emits a separator before every tail, including tails
    /// parsed without one: canonical output is always separator-delimited.
    pub fn representations(&self) -> Representations {
        let mut pretty_ai = format!("(01) {} (21) {}", self.gtin, self.serial);
        let mut ai_text = format!("(01){}(21){}", self.gtin, self.serial);
        let mut raw_with_gs = format!("01{}21{}", self.gtin, self.serial);

        for tail in &self.tails {
            pretty_ai.push_str(&format!(" ({}) {}", tail.ai, tail.value));
            ai_text.push_str(&format!("<GS>({}){}", tail.ai, tail.value));
            raw_with_gs.push(GS);
            raw_with_gs.push_str(tail.ai.as_str());
            raw_with_gs.push_str(&tail.value);
        }

        Representations {
            pretty_ai,
            ai_text,
            raw_with_gs,
        }
    }
}

impl fmt::Display for ElementString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(01) {} (21) {}", self.gtin, self.serial)?;
        for tail in &self.tails {
            write!(f, " ({}) {}", tail.ai, tail.value)?;
        }
        Ok(())
    }
}

/// Replace every Group Separator character with the visible `<GS>` marker,
/// for contexts that require ASCII-only display of the raw form.
pub fn escape_gs(raw: &str) -> String {
    raw.replace(GS, "<GS>")
}

/// Parse a normalised element string into an [`ElementString`].
///
/// The input must already contain real Group Separator characters only; run
/// free-form input through [`normalize`] first, or use
/// [`parse_from_user_input`].
pub fn parse(normalized: &str) -> Result<ElementString, ParseError> {
    Scanner::new(normalized).parse()
}

/// The single entry point for callers holding raw operator input: normalise
/// with default options, then parse.
pub fn parse_from_user_input(raw: &str) -> Result<ElementString, ParseError> {
    parse(&normalize(raw, &NormalizeOptions::default()))
}

/// Left-to-right cursor over the normalised input. Positions reported in
/// errors are character indices, not byte offsets.
struct Scanner {
    chars: Vec<char>,
    pos: usize,
}

impl Scanner {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn parse(mut self) -> Result<ElementString, ParseError> {
        let gtin = self.read_gtin()?;
        let serial = self.read_serial()?;

        let mut tails = Vec::new();
        while self.pos < self.chars.len() {
            tails.push(self.read_tail()?);
        }

        Ok(ElementString {
            gtin,
            serial,
            tails,
        })
    }

    fn read_gtin(&mut self) -> Result<String, ParseError> {
        if !self.eat_literal("01") {
            return Err(ParseError::BadGtin);
        }

        let gtin = self.take(GTIN_LEN).ok_or(ParseError::BadGtin)?;
        if !gtin.chars().all(|c| c.is_ascii_digit()) {
            return Err(ParseError::BadGtin);
        }

        Ok(gtin)
    }

    fn read_serial(&mut self) -> Result<String, ParseError> {
        if !self.eat_literal("21") {
            return Err(ParseError::MissingSerial);
        }

        // The serial has no declared length: it runs until a separator, the
        // start of a recognised tail identifier, or the end of input. The
        // lookahead is what lets a separator be omitted before a tail.
        let mut serial = String::new();
        let mut len = 0;
        while let Some(&ch) = self.chars.get(self.pos) {
            if ch == GS || self.tail_ai_at(self.pos).is_some() {
                break;
            }

            serial.push(ch);
            self.pos += 1;
            len += 1;
            if len > SERIAL_MAX_LEN {
                return Err(ParseError::SerialTooLong);
            }
        }

        if serial.is_empty() {
            return Err(ParseError::SerialEmpty);
        }

        Ok(serial)
    }

    fn read_tail(&mut self) -> Result<Tail, ParseError> {
        let had_leading_separator = self.eat_char(GS);

        let ai = match self.tail_ai_at(self.pos) {
            Some(ai) => {
                self.pos += 2;
                ai
            }
            None => return Err(ParseError::UnknownAi(self.pos)),
        };

        let value = match ai {
            TailAi::Ai91 => self
                .take(TAIL_FIXED_LEN)
                .ok_or(ParseError::Ai91LengthInvalid)?,
            TailAi::Ai93 => self
                .take(TAIL_FIXED_LEN)
                .ok_or(ParseError::Ai93LengthInvalid)?,
            TailAi::Ai92 => {
                let mut value = String::new();
                while let Some(&ch) = self.chars.get(self.pos) {
                    if ch == GS || self.tail_ai_at(self.pos).is_some() {
                        break;
                    }

                    value.push(ch);
                    self.pos += 1;
                }

                if !is_valid_ai92_value(&value) {
                    return Err(ParseError::Ai92Invalid);
                }

                value
            }
        };

        Ok(Tail {
            ai,
            value,
            had_leading_separator,
        })
    }

    /// A recognised tail identifier starting at `at`, if any.
    fn tail_ai_at(&self, at: usize) -> Option<TailAi> {
        match (self.chars.get(at), self.chars.get(at + 1)) {
            (Some(&a), Some(&b)) => TailAi::from_digits(a, b),
            _ => None,
        }
    }

    /// Consume `literal` if it sits at the cursor.
    fn eat_literal(&mut self, literal: &str) -> bool {
        let matched = literal
            .chars()
            .enumerate()
            .all(|(i, ch)| self.chars.get(self.pos + i) == Some(&ch));
        if matched {
            self.pos += literal.chars().count();
        }

        matched
    }

    /// Consume a single `ch` if it sits at the cursor.
    fn eat_char(&mut self, ch: char) -> bool {
        if self.chars.get(self.pos) == Some(&ch) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Consume exactly `n` characters, or `None` if fewer remain.
    fn take(&mut self, n: usize) -> Option<String> {
        if self.pos + n > self.chars.len() {
            return None;
        }

        let taken = self.chars[self.pos..self.pos + n].iter().collect();
        self.pos += n;
        Some(taken)
    }
}

fn is_valid_ai92_value(value: &str) -> bool {
    AI92_VALUE_LENGTHS.contains(&value.chars().count())
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '_' | '.' | '-'))
}
