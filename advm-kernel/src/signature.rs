//! Kernel call signatures.
//!
//! A signature is a compact string describing how many arguments a kernel call
//! takes and which value kinds each position accepts:
//!
//! ```text
//! signature := param*
//! param     := atom '*'?
//! atom      := kind | '[' kind+ ']' | '(' kind+ ')'
//! kind      := 'i' | 'o' | 'r' | '0' | '.'
//! ```
//!
//! - `i` integer, `o` object, `r` any other reference, `0` null, `.` anything.
//! - `[io]` is one required argument that may be an integer or an object.
//! - `(io)` is the same, but optional. Everything after an optional argument
//!   must be optional too.
//! - `*` repeats the preceding atom zero or more times and must come last.
//!
//! The null register is accepted wherever `0` or `i` is, since scripts read it as
//! integer zero.

use std::fmt;

use bitflags::bitflags;
use itertools::Itertools;
use serde::Serialize;
use thiserror::Error;

use crate::variant::{ValueKind, Variant};

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KindSet: u8 {
        const NULL = 1 << 0;
        const INTEGER = 1 << 1;
        const OBJECT = 1 << 2;
        const REFERENCE = 1 << 3;
        const ANY = Self::NULL.bits()
            | Self::INTEGER.bits()
            | Self::OBJECT.bits()
            | Self::REFERENCE.bits();
    }
}

impl KindSet {
    fn from_letter(ch: char) -> Option<KindSet> {
        Some(match ch {
            'i' => KindSet::INTEGER,
            'o' => KindSet::OBJECT,
            'r' => KindSet::REFERENCE,
            '0' => KindSet::NULL,
            '.' => KindSet::ANY,
            _ => return None,
        })
    }

    pub fn accepts(self, kind: ValueKind) -> bool {
        match kind {
            ValueKind::Null => self.intersects(KindSet::NULL | KindSet::INTEGER),
            ValueKind::Integer => self.contains(KindSet::INTEGER),
            ValueKind::Object => self.contains(KindSet::OBJECT),
            ValueKind::Reference => self.contains(KindSet::REFERENCE),
        }
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == KindSet::ANY {
            return write!(f, ".");
        }
        let letters: String = [
            (KindSet::INTEGER, 'i'),
            (KindSet::OBJECT, 'o'),
            (KindSet::REFERENCE, 'r'),
            (KindSet::NULL, '0'),
        ]
        .iter()
        .filter(|(k, _)| self.contains(*k))
        .map(|(_, c)| *c)
        .collect();
        if letters.len() == 1 {
            write!(f, "{letters}")
        } else {
            write!(f, "[{letters}]")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Param {
    kinds: KindSet,
    optional: bool,
    repeat: bool,
}

/// A parsed signature string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    source: Box<str>,
    params: Vec<Param>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("unexpected {ch:?} at {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("group opened at {pos} is never closed")]
    UnclosedGroup { pos: usize },

    #[error("empty group at {pos}")]
    EmptyGroup { pos: usize },

    #[error("required argument at {pos} follows an optional one")]
    RequiredAfterOptional { pos: usize },

    #[error("argument at {pos} follows a repeated one")]
    RepeatNotLast { pos: usize },

    #[error("'*' at {pos} has nothing to repeat")]
    DanglingRepeat { pos: usize },
}

/// Why an argument list was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureMismatch {
    #[error("expected at least {min} argument(s), got {got}")]
    TooFew { min: usize, got: usize },

    #[error("expected at most {max} argument(s), got {got}")]
    TooMany { max: usize, got: usize },

    #[error("argument {position} is {found}, expected {expected}")]
    WrongKind {
        position: usize,
        expected: KindSet,
        found: ValueKind,
    },
}

impl Signature {
    pub fn parse(source: &str) -> Result<Self, SignatureError> {
        let mut params: Vec<Param> = Vec::new();
        let mut seen_optional = false;
        let mut chars = source.char_indices().peekable();

        while let Some((pos, c)) = chars.next() {
            let (kinds, optional) = match c {
                '[' | '(' => {
                    let close = if c == '[' { ']' } else { ')' };
                    let mut kinds = KindSet::empty();
                    loop {
                        match chars.next() {
                            Some((_, ch)) if ch == close => break,
                            Some((p, ch)) => {
                                kinds |= KindSet::from_letter(ch)
                                    .ok_or(SignatureError::UnexpectedChar { ch, pos: p })?;
                            }
                            None => return Err(SignatureError::UnclosedGroup { pos }),
                        }
                    }
                    if kinds.is_empty() {
                        return Err(SignatureError::EmptyGroup { pos });
                    }
                    (kinds, c == '(')
                }
                '*' => return Err(SignatureError::DanglingRepeat { pos }),
                _ => {
                    let kinds = KindSet::from_letter(c)
                        .ok_or(SignatureError::UnexpectedChar { ch: c, pos })?;
                    (kinds, false)
                }
            };
            let repeat = chars.next_if(|&(_, ch)| ch == '*').is_some();

            if params.last().is_some_and(|p| p.repeat) {
                return Err(SignatureError::RepeatNotLast { pos });
            }
            if seen_optional && !optional && !repeat {
                return Err(SignatureError::RequiredAfterOptional { pos });
            }
            seen_optional |= optional;
            params.push(Param {
                kinds,
                optional,
                repeat,
            });
        }

        Ok(Self {
            source: source.into(),
            params,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn min_args(&self) -> usize {
        self.params
            .iter()
            .filter(|p| !p.optional && !p.repeat)
            .count()
    }

    /// `None` when the signature ends in a repeated argument.
    pub fn max_args(&self) -> Option<usize> {
        if self.params.iter().any(|p| p.repeat) {
            None
        } else {
            Some(self.params.len())
        }
    }

    pub fn check(&self, args: &[Variant]) -> Result<(), SignatureMismatch> {
        let mut pos = 0;
        for param in &self.params {
            if param.repeat {
                for (position, arg) in args.iter().enumerate().skip(pos) {
                    if !param.kinds.accepts(arg.kind()) {
                        return Err(SignatureMismatch::WrongKind {
                            position,
                            expected: param.kinds,
                            found: arg.kind(),
                        });
                    }
                }
                return Ok(());
            }
            match args.get(pos) {
                Some(arg) if param.kinds.accepts(arg.kind()) => pos += 1,
                Some(arg) => {
                    return Err(SignatureMismatch::WrongKind {
                        position: pos,
                        expected: param.kinds,
                        found: arg.kind(),
                    });
                }
                None if param.optional => return Ok(()),
                None => {
                    return Err(SignatureMismatch::TooFew {
                        min: self.min_args(),
                        got: args.len(),
                    });
                }
            }
        }
        if pos < args.len() {
            return Err(SignatureMismatch::TooMany {
                max: self.params.len(),
                got: args.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.source)
    }
}

/// The kinds of an actual argument list, for error reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArgShapes(pub Vec<ValueKind>);

impl ArgShapes {
    pub fn of(args: &[Variant]) -> Self {
        Self(args.iter().map(Variant::kind).collect())
    }
}

impl fmt::Display for ArgShapes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.0.iter().map(|k| k.letter()).join(", "))
    }
}
