// crates/formsmith-core/src/core/pattern.rs
// ============================================================================
// Module: formsmith Field Patterns
// Description: Portable whole-value patterns for text fields.
// Purpose: Keep field patterns inside the syntax browsers and the preview agree on.
// Dependencies: regex, thiserror
// ============================================================================

//! ## Overview
//! A field pattern is evaluated in three places: the Rust preview, the
//! generated client runtime (`new RegExp(source, 'u')`), and the browser's
//! `pattern` attribute (compiled with the `v` flag). Patterns are therefore
//! restricted to a subset that all three engines read the same way, and the
//! Rust side compiles a translation with ECMAScript semantics.
//!
//! Supported syntax:
//! - literals, `.`, `^`, `$`, alternation, capturing groups and `(?:...)`
//! - quantifiers `*`, `+`, `?`, `{n}`, `{n,}`, `{n,m}`, each optionally lazy
//! - `\d \D \w \W \s \S` with ECMAScript (ASCII digit and word) meaning
//! - `\n \r \t \f \v`, `\xHH`, `\uHHHH`, `\u{H...}`
//! - `\p{..}` and `\P{..}` for general categories and `Script=`/`sc=` values
//! - classes `[...]`/`[^...]` with literal ranges; `( ) [ { } / | -` must be
//!   escaped inside a class and doubled punctuation is rejected there
//!
//! Rejected: inline flags, named groups, lookaround, backreferences, word
//! boundaries, nested or set-operation classes, empty classes, and stray
//! `]`, `{`, `}`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// ECMAScript `.`: anything but a line terminator.
const ANY_CHAR: &str = r"[^\n\r\x{2028}\x{2029}]";
/// ECMAScript `\d`.
const DIGIT: &str = "[0-9]";
/// ECMAScript `\D`.
const NON_DIGIT: &str = "[^0-9]";
/// ECMAScript `\w`.
const WORD: &str = "[0-9A-Za-z_]";
/// ECMAScript `\W`.
const NON_WORD: &str = "[^0-9A-Za-z_]";
/// ECMAScript `\s`.
const SPACE: &str =
    r"[\t\n\x0B\x0C\r \xA0\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]";
/// ECMAScript `\S`.
const NON_SPACE: &str =
    r"[^\t\n\x0B\x0C\r \xA0\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}]";

/// Characters that may be escaped anywhere.
const SYNTAX_CHARS: &str = r"^$\.*+?()[]{}|/";
/// Characters that must be escaped inside a class.
const CLASS_RESERVED: &str = "()[{}/|-";
/// Characters that may not appear doubled inside a class.
const CLASS_DOUBLED: &str = "&!#$%*+,.:;<=>?@^`~";

/// General category names accepted by `\p{..}`.
const GENERAL_CATEGORIES: &[&str] = &[
    "L",
    "Letter",
    "LC",
    "Cased_Letter",
    "Lu",
    "Uppercase_Letter",
    "Ll",
    "Lowercase_Letter",
    "Lt",
    "Titlecase_Letter",
    "Lm",
    "Modifier_Letter",
    "Lo",
    "Other_Letter",
    "M",
    "Mark",
    "Mn",
    "Nonspacing_Mark",
    "Mc",
    "Spacing_Mark",
    "Me",
    "Enclosing_Mark",
    "N",
    "Number",
    "Nd",
    "Decimal_Number",
    "Nl",
    "Letter_Number",
    "No",
    "Other_Number",
    "P",
    "Punctuation",
    "Pc",
    "Connector_Punctuation",
    "Pd",
    "Dash_Punctuation",
    "Ps",
    "Open_Punctuation",
    "Pe",
    "Close_Punctuation",
    "Pi",
    "Initial_Punctuation",
    "Pf",
    "Final_Punctuation",
    "Po",
    "Other_Punctuation",
    "S",
    "Symbol",
    "Sm",
    "Math_Symbol",
    "Sc",
    "Currency_Symbol",
    "Sk",
    "Modifier_Symbol",
    "So",
    "Other_Symbol",
    "Z",
    "Separator",
    "Zs",
    "Space_Separator",
    "Zl",
    "Line_Separator",
    "Zp",
    "Paragraph_Separator",
    "C",
    "Other",
    "Cc",
    "Control",
    "Cf",
    "Format",
    "Co",
    "Private_Use",
    "Cn",
    "Unassigned",
];

/// Property names that take a script value.
const SCRIPT_PROPERTIES: &[&str] = &["Script", "sc", "Script_Extensions", "scx"];

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Pattern rejection reasons.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// Pattern uses syntax outside the portable subset.
    #[error("unsupported syntax at offset {offset}: {reason}")]
    Unsupported {
        /// Character offset of the offending construct.
        offset: usize,
        /// Human-readable reason.
        reason: &'static str,
    },
    /// Pattern is portable but does not compile.
    #[error("{0}")]
    Compile(String),
}

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Compiles a pattern with HTML `pattern` semantics (whole-value match).
///
/// # Errors
///
/// Returns [`PatternError`] when the pattern leaves the portable subset or
/// does not compile.
pub fn compile_pattern(pattern: &str) -> Result<Regex, PatternError> {
    let source = translate_pattern(pattern)?;
    Regex::new(&format!("^(?:{source})$")).map_err(|err| PatternError::Compile(err.to_string()))
}

/// Checks a pattern against the portable subset and returns the equivalent
/// `regex` crate source.
///
/// # Errors
///
/// Returns [`PatternError::Unsupported`] naming the first offending construct.
pub fn translate_pattern(pattern: &str) -> Result<String, PatternError> {
    Translator::new(pattern).run()
}

// ============================================================================
// SECTION: Translator
// ============================================================================

/// Kind of atom produced by an escape or class member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Atom {
    /// A single character; may bound a range.
    Char,
    /// A character set such as `\d`; may not bound a range.
    Set,
}

/// Single-pass scanner over the pattern characters.
struct Translator {
    /// Pattern characters.
    chars: Vec<char>,
    /// Index of the next unread character.
    pos: usize,
    /// Translated `regex` source.
    out: String,
    /// Open group count.
    depth: usize,
}

impl Translator {
    /// Creates a scanner for `pattern`.
    fn new(pattern: &str) -> Self {
        Self {
            chars: pattern.chars().collect(),
            pos: 0,
            out: String::with_capacity(pattern.len()),
            depth: 0,
        }
    }

    /// Scans the whole pattern.
    fn run(mut self) -> Result<String, PatternError> {
        let mut quantifiable = false;
        while let Some(ch) = self.next() {
            let start = self.pos - 1;
            quantifiable = match ch {
                '\\' => {
                    self.escape(start, false)?;
                    true
                }
                '[' => {
                    self.class(start)?;
                    true
                }
                '(' => {
                    self.open_group(start)?;
                    false
                }
                ')' => {
                    if self.depth == 0 {
                        return Err(unsupported(start, "unbalanced closing parenthesis"));
                    }
                    self.depth -= 1;
                    self.out.push(')');
                    true
                }
                '|' | '^' | '$' => {
                    self.out.push(ch);
                    false
                }
                '.' => {
                    self.out.push_str(ANY_CHAR);
                    true
                }
                '*' | '+' | '?' => {
                    if !quantifiable {
                        return Err(unsupported(start, "quantifier has nothing to repeat"));
                    }
                    self.out.push(ch);
                    self.lazy_suffix();
                    false
                }
                '{' => {
                    if !quantifiable {
                        return Err(unsupported(start, "quantifier has nothing to repeat"));
                    }
                    self.braced_quantifier(start)?;
                    self.lazy_suffix();
                    false
                }
                ']' | '}' => return Err(unsupported(start, "unescaped bracket outside a class")),
                other => {
                    self.push_literal(other);
                    true
                }
            };
        }
        if self.depth != 0 {
            return Err(unsupported(self.chars.len(), "unclosed group"));
        }
        Ok(self.out)
    }

    /// Returns the next character.
    fn next(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied();
        if ch.is_some() {
            self.pos += 1;
        }
        ch
    }

    /// Returns the character `offset` positions ahead without consuming it.
    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Appends a literal character, escaped for the `regex` crate.
    fn push_literal(&mut self, ch: char) {
        let mut buf = [0_u8; 4];
        self.out.push_str(&regex::escape(ch.encode_utf8(&mut buf)));
    }

    /// Handles `(` and `(?:`.
    fn open_group(&mut self, start: usize) -> Result<(), PatternError> {
        if self.peek_at(0) == Some('?') {
            if self.peek_at(1) != Some(':') {
                return Err(unsupported(start, "only (?:...) groups are supported"));
            }
            self.pos += 2;
            self.out.push_str("(?:");
        } else {
            self.out.push('(');
        }
        self.depth += 1;
        Ok(())
    }

    /// Consumes a lazy `?` after a quantifier.
    fn lazy_suffix(&mut self) {
        if self.peek_at(0) == Some('?') {
            self.pos += 1;
            self.out.push('?');
        }
    }

    /// Scans `{n}`, `{n,}` or `{n,m}` after the opening brace.
    fn braced_quantifier(&mut self, start: usize) -> Result<(), PatternError> {
        let min = self.digits();
        if min.is_empty() {
            return Err(unsupported(start, "braces must form a {n}, {n,} or {n,m} quantifier"));
        }
        self.out.push('{');
        self.out.push_str(&min);
        if self.peek_at(0) == Some(',') {
            self.pos += 1;
            self.out.push(',');
            let max = self.digits();
            self.out.push_str(&max);
        }
        if self.next() != Some('}') {
            return Err(unsupported(start, "braces must form a {n}, {n,} or {n,m} quantifier"));
        }
        self.out.push('}');
        Ok(())
    }

    /// Consumes a run of ASCII digits.
    fn digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(ch) = self.peek_at(0).filter(char::is_ascii_digit) {
            digits.push(ch);
            self.pos += 1;
        }
        digits
    }

    /// Scans a character class after `[`.
    fn class(&mut self, start: usize) -> Result<(), PatternError> {
        self.out.push('[');
        if self.peek_at(0) == Some('^') {
            self.pos += 1;
            self.out.push('^');
        }
        if self.peek_at(0) == Some(']') {
            return Err(unsupported(start, "empty character classes are not supported"));
        }
        loop {
            let item_start = self.pos;
            let Some(ch) = self.next() else {
                return Err(unsupported(start, "unterminated character class"));
            };
            if ch == ']' {
                self.out.push(']');
                return Ok(());
            }
            let first = self.class_atom(item_start, ch)?;
            if self.peek_at(0) == Some('-') && self.peek_at(1).is_some_and(|next| next != ']') {
                self.pos += 1;
                let end_start = self.pos;
                let Some(end) = self.next() else {
                    return Err(unsupported(start, "unterminated character class"));
                };
                self.out.push('-');
                let last = self.class_atom(end_start, end)?;
                if first == Atom::Set || last == Atom::Set {
                    return Err(unsupported(item_start, "class escapes cannot bound a range"));
                }
            }
        }
    }

    /// Scans one class member starting with `ch`.
    fn class_atom(&mut self, start: usize, ch: char) -> Result<Atom, PatternError> {
        if ch == '\\' {
            return self.escape(start, true);
        }
        if CLASS_RESERVED.contains(ch) {
            return Err(unsupported(start, "this character must be escaped inside a class"));
        }
        if CLASS_DOUBLED.contains(ch) && self.peek_at(0) == Some(ch) {
            return Err(unsupported(start, "doubled punctuation is reserved inside a class"));
        }
        self.push_literal(ch);
        Ok(Atom::Char)
    }

    /// Scans an escape after the backslash.
    fn escape(&mut self, start: usize, in_class: bool) -> Result<Atom, PatternError> {
        let Some(ch) = self.next() else {
            return Err(unsupported(start, "trailing backslash"));
        };
        let set = match ch {
            'd' => DIGIT,
            'D' => NON_DIGIT,
            'w' => WORD,
            'W' => NON_WORD,
            's' => SPACE,
            'S' => NON_SPACE,
            'n' | 'r' | 't' | 'f' | 'v' => {
                self.out.push('\\');
                self.out.push(ch);
                return Ok(Atom::Char);
            }
            'x' => {
                let hex = self.hex_digits(2).ok_or_else(|| unsupported(start, "\\x needs two hex digits"))?;
                self.push_code_point(start, &hex)?;
                return Ok(Atom::Char);
            }
            'u' => {
                let hex = self.unicode_escape(start)?;
                self.push_code_point(start, &hex)?;
                return Ok(Atom::Char);
            }
            'p' | 'P' => {
                self.property(start, ch)?;
                return Ok(Atom::Set);
            }
            'b' | 'B' => return Err(unsupported(start, "word boundaries are not supported")),
            '0' ..= '9' => return Err(unsupported(start, "backreferences and octal escapes are not supported")),
            other if SYNTAX_CHARS.contains(other) || (in_class && other == '-') => {
                self.push_literal(other);
                return Ok(Atom::Char);
            }
            _ => return Err(unsupported(start, "unsupported escape")),
        };
        self.out.push_str(set);
        Ok(Atom::Set)
    }

    /// Consumes exactly `count` hex digits.
    fn hex_digits(&mut self, count: usize) -> Option<String> {
        let hex: String = (0 .. count).map_while(|offset| self.peek_at(offset)).collect();
        if hex.chars().count() != count || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return None;
        }
        self.pos += count;
        Some(hex)
    }

    /// Scans `HHHH` or `{H...}` after `\u`.
    fn unicode_escape(&mut self, start: usize) -> Result<String, PatternError> {
        if self.peek_at(0) != Some('{') {
            return self.hex_digits(4).ok_or_else(|| unsupported(start, "\\u needs four hex digits or braces"));
        }
        self.pos += 1;
        let mut hex = String::new();
        while let Some(ch) = self.peek_at(0).filter(char::is_ascii_hexdigit) {
            hex.push(ch);
            self.pos += 1;
        }
        if hex.is_empty() || hex.len() > 6 || self.next() != Some('}') {
            return Err(unsupported(start, "\\u{...} needs one to six hex digits"));
        }
        Ok(hex)
    }

    /// Appends a code point escape; surrogates are rejected.
    fn push_code_point(&mut self, start: usize, hex: &str) -> Result<(), PatternError> {
        let valid = u32::from_str_radix(hex, 16).ok().and_then(char::from_u32).is_some();
        if !valid {
            return Err(unsupported(start, "escape is not a Unicode scalar value"));
        }
        self.out.push_str("\\x{");
        self.out.push_str(hex);
        self.out.push('}');
        Ok(())
    }

    /// Scans `{Name}` or `{Property=Value}` after `\p` or `\P`.
    fn property(&mut self, start: usize, kind: char) -> Result<(), PatternError> {
        if self.next() != Some('{') {
            return Err(unsupported(start, "property escapes need braces"));
        }
        let mut name = String::new();
        loop {
            match self.next() {
                Some('}') => break,
                Some(ch) => name.push(ch),
                None => return Err(unsupported(start, "unterminated property escape")),
            }
        }
        let known = match name.split_once('=') {
            Some((property, value)) => SCRIPT_PROPERTIES.contains(&property) && is_script_value(value),
            None => GENERAL_CATEGORIES.contains(&name.as_str()),
        };
        if !known {
            return Err(unsupported(start, "only general categories and Script values are supported"));
        }
        self.out.push('\\');
        self.out.push(kind);
        self.out.push('{');
        self.out.push_str(&name);
        self.out.push('}');
        Ok(())
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds an [`PatternError::Unsupported`].
const fn unsupported(offset: usize, reason: &'static str) -> PatternError {
    PatternError::Unsupported {
        offset,
        reason,
    }
}

/// Returns true for canonical script value spellings such as `Old_Italic`.
fn is_script_value(value: &str) -> bool {
    !value.is_empty()
        && value.split('_').all(|segment| {
            segment.starts_with(|ch: char| ch.is_ascii_uppercase())
                && segment.chars().all(|ch| ch.is_ascii_alphanumeric())
        })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
