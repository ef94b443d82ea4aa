//! Interned names.
//!
//! Every identifier, resolved symbol and operator name in a tree is a
//! [`Symbol`]: a key into one process-wide table of strings. Keys compare
//! and hash as integers; the text is looked up only for display.

use std::fmt;
use std::sync::LazyLock;

use lasso::{Rodeo, Spur};
use parking_lot::{RwLock, RwLockUpgradableReadGuard};

static NAMES: LazyLock<RwLock<Rodeo>> = LazyLock::new(|| RwLock::new(Rodeo::default()));

/// Interned name of an identifier, resolved symbol or operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(Spur);

impl Symbol {
    /// Intern a name known at compile time.
    pub fn new(text: &'static str) -> Self {
        Self::intern_with(text, |names| names.get_or_intern_static(text))
    }

    /// Intern a name read from input or built at run time.
    pub fn from_dynamic(text: &str) -> Self {
        Self::intern_with(text, |names| names.get_or_intern(text))
    }

    /// Look `text` up under a shared lock and only take the write lock to
    /// insert a name not seen before.
    fn intern_with(text: &str, insert: impl FnOnce(&mut Rodeo) -> Spur) -> Self {
        let names = NAMES.upgradable_read();
        let existing = names.get(text);
        match existing {
            Some(key) => Symbol(key),
            None => {
                let mut names = RwLockUpgradableReadGuard::upgrade(names);
                Symbol(insert(&mut *names))
            }
        }
    }

    /// Borrow the text of the name for the duration of `f`.
    ///
    /// The table stays read-locked recursively, so `f` may display or
    /// compare other symbols.
    pub fn with_str<R>(&self, f: impl FnOnce(&str) -> R) -> R {
        let names = NAMES.read_recursive();
        f(names.resolve(&self.0))
    }
}

/// Declare functions returning well-known symbols.
///
/// # Example
/// ```
/// use bough_core::symbols;
///
/// symbols! {
///     OP_PLUS => "+",
///     #[allow(dead_code)]
///     OP_UNUSED => "unused",
/// }
///
/// assert_eq!(OP_PLUS(), "+");
/// ```
#[macro_export]
macro_rules! symbols {
    ($($(#[$attr:meta])* $name:ident => $text:literal),* $(,)?) => {
        $(
            $(#[$attr])*
            #[allow(non_snake_case)]
            #[inline]
            pub fn $name() -> $crate::Symbol {
                $crate::Symbol::new($text)
            }
        )*
    };
}

impl PartialEq<str> for Symbol {
    fn eq(&self, other: &str) -> bool {
        self.with_str(|text| text == other)
    }
}

impl PartialEq<&str> for Symbol {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

impl PartialEq<Symbol> for &str {
    fn eq(&self, other: &Symbol) -> bool {
        *other == **self
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.with_str(|text| f.write_str(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_interns_once() {
        let a = Symbol::new("counter");
        let b = Symbol::from_dynamic(&String::from("counter"));
        assert_eq!(a, b);
        assert_ne!(a, Symbol::new("other"));
    }

    #[test]
    fn compares_with_str() {
        let sym = Symbol::from_dynamic("+");
        assert_eq!(sym, "+");
        assert!("+" == sym);
        assert!(sym != "-");
        assert_eq!(sym.to_string(), "+");
    }

    #[test]
    fn nested_with_str_does_not_deadlock() {
        let outer = Symbol::new("outer");
        let inner = Symbol::new("inner");
        let joined = outer.with_str(|o| format!("{o}.{inner}"));
        assert_eq!(joined, "outer.inner");
    }
}
