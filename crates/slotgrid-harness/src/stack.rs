#![forbid(unsafe_code)]

//! A minimal item stack used as slot content in tests.

use std::fmt;

use slotgrid_core::SlotContent;

/// Material name, amount, and an ownership tag.
///
/// The empty sentinel has no material. Equality includes the tag, so a
/// tagged stack never compares equal to an untagged one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Stack {
    material: String,
    amount: u8,
    owned: bool,
}

impl Stack {
    /// One item of `material`.
    pub fn new(material: impl Into<String>) -> Self {
        Self {
            material: material.into(),
            amount: 1,
            owned: false,
        }
    }

    /// Change the amount.
    #[must_use]
    pub fn with_amount(mut self, amount: u8) -> Self {
        self.amount = amount;
        self
    }

    /// Material name, empty for the sentinel.
    pub fn material(&self) -> &str {
        &self.material
    }

    /// Stack size.
    pub fn amount(&self) -> u8 {
        self.amount
    }
}

impl SlotContent for Stack {
    fn empty() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.material.is_empty() || self.amount == 0
    }

    fn mark_owned(mut self) -> Self {
        self.owned = true;
        self
    }

    fn is_owned(&self) -> bool {
        self.owned
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        write!(f, "{}x{}", self.amount, self.material)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_empty_sentinel() {
        assert!(Stack::empty().is_empty());
        assert!(Stack::new("stone").with_amount(0).is_empty());
        assert!(!Stack::new("stone").is_empty());
    }

    #[test]
    fn tag_changes_equality() {
        let plain = Stack::new("stone");
        let tagged = plain.clone().mark_owned();
        assert!(tagged.is_owned());
        assert_ne!(plain, tagged);
        assert_eq!(tagged.clone().mark_owned(), tagged);
    }

    #[test]
    fn display_shows_amount_and_material() {
        assert_eq!(Stack::new("gold").with_amount(3).to_string(), "3xgold");
        assert_eq!(Stack::empty().to_string(), "-");
    }
}
