//! Element identifiers backed by string interning.
//!
//! Diagram documents reference elements by string id (`sourceRef`,
//! `bpmnElement`, ...). The [`Id`] type interns those strings once so the
//! element tree can copy and compare ids cheaply.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<R>(f: impl FnOnce(&mut DefaultStringInterner) -> R) -> R {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock");
    f(&mut interner)
}

/// Interned element identifier.
///
/// # Examples
///
/// ```
/// use hfcanvas_core::identifier::Id;
///
/// let email = Id::new("Email_1");
/// let again: Id = "Email_1".into();
///
/// assert_eq!(email, again);
/// assert_eq!(email, "Email_1");
/// assert_eq!(email.to_string(), "Email_1");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Creates an identifier of the form `<prefix>_<index>`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hfcanvas_core::identifier::Id;
    ///
    /// assert_eq!(Id::indexed("Task", 3), "Task_3");
    /// ```
    pub fn indexed(prefix: &str, index: usize) -> Self {
        Self::new(&format!("{prefix}_{index}"))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        with_interner(|interner| {
            let value = interner
                .resolve(self.0)
                .expect("Symbol should exist in interner");
            write!(f, "{value}")
        })
    }
}

impl From<&str> for Id {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| {
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                == other
        })
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}
