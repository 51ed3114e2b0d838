//! Table name validation.

use crate::error::{ErrorKind, Result};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// A validated entity table name.
///
/// Table names can't be bound as query parameters, so they end up inside the
/// SQL text. Only plain identifiers (ASCII letters, digits and underscores,
/// not starting with a digit) are accepted, and they are quoted regardless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table<'a>(&'a str);
impl<'a> Table<'a> {
    pub fn new(name: &'a str) -> Result<Self> {
        let mut chars = name.chars();
        let valid = match chars.next() {
            Some(first) => {
                (first.is_ascii_alphabetic() || first == '_') && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
            },
            None => false,
        };
        if !valid {
            exn::bail!(ErrorKind::InvalidTable(name.to_string()));
        }
        Ok(Self(name))
    }

    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'a str {
        self.0
    }
}

impl Display for Table<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.0)
    }
}
