//! Block identifiers for the profile form.
//!
//! The form is split into eight fixed blocks, numbered 1..=8 in the order the
//! client walks through them. Four are required for submission.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One fixed section of the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockId {
    Specializations,
    Superpower,
    Abilities,
    Portfolio,
    Services,
    Experience,
    Testimonials,
    Contacts,
}

impl BlockId {
    /// All blocks in canonical order.
    pub const ALL: [BlockId; 8] = [
        BlockId::Specializations,
        BlockId::Superpower,
        BlockId::Abilities,
        BlockId::Portfolio,
        BlockId::Services,
        BlockId::Experience,
        BlockId::Testimonials,
        BlockId::Contacts,
    ];

    /// Number of blocks in the form.
    pub const COUNT: usize = Self::ALL.len();

    /// Block number as shown to the client (1-based).
    pub fn number(self) -> u32 {
        match self {
            BlockId::Specializations => 1,
            BlockId::Superpower => 2,
            BlockId::Abilities => 3,
            BlockId::Portfolio => 4,
            BlockId::Services => 5,
            BlockId::Experience => 6,
            BlockId::Testimonials => 7,
            BlockId::Contacts => 8,
        }
    }

    /// Look up a block by its 1-based number.
    pub fn from_number(number: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.number() == number)
    }

    /// Whether the block must be completed before submission.
    pub fn is_required(self) -> bool {
        matches!(
            self,
            BlockId::Specializations
                | BlockId::Superpower
                | BlockId::Abilities
                | BlockId::Contacts
        )
    }

    /// Required blocks in canonical order.
    pub fn required() -> impl Iterator<Item = BlockId> {
        Self::ALL.into_iter().filter(|b| b.is_required())
    }

    /// Machine name, matching the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            BlockId::Specializations => "specializations",
            BlockId::Superpower => "superpower",
            BlockId::Abilities => "abilities",
            BlockId::Portfolio => "portfolio",
            BlockId::Services => "services",
            BlockId::Experience => "experience",
            BlockId::Testimonials => "testimonials",
            BlockId::Contacts => "contacts",
        }
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.number(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_follow_canonical_order() {
        for (i, block) in BlockId::ALL.iter().enumerate() {
            assert_eq!(block.number(), i as u32 + 1);
            assert_eq!(BlockId::from_number(block.number()), Some(*block));
        }
    }

    #[test]
    fn out_of_range_numbers() {
        assert_eq!(BlockId::from_number(0), None);
        assert_eq!(BlockId::from_number(9), None);
        assert_eq!(BlockId::from_number(u32::MAX), None);
    }

    #[test]
    fn required_blocks() {
        let required: Vec<_> = BlockId::required().collect();
        assert_eq!(
            required,
            vec![
                BlockId::Specializations,
                BlockId::Superpower,
                BlockId::Abilities,
                BlockId::Contacts,
            ]
        );
        assert!(!BlockId::Portfolio.is_required());
        assert!(!BlockId::Testimonials.is_required());
    }

    #[test]
    fn serde_uses_machine_name() {
        let json = serde_json::to_string(&BlockId::Superpower).unwrap();
        assert_eq!(json, "\"superpower\"");
        let parsed: BlockId = serde_json::from_str("\"contacts\"").unwrap();
        assert_eq!(parsed, BlockId::Contacts);
    }

    #[test]
    fn display_includes_number() {
        assert_eq!(BlockId::Abilities.to_string(), "3 (abilities)");
    }
}
