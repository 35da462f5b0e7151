//! Declarative rule table for the profile form.
//!
//! Every block maps to a static list of [`FieldRule`]s. The block validator
//! interprets the table; nothing else in the crate knows which field carries
//! which rule.

use crate::block::BlockId;
use crate::validate::{PatternKind, Rule};

/// What a rule set applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A top-level field of the snapshot.
    Field(&'static str),
    /// A text field of every item in a list section. Errors are reported as
    /// `list[index].field`.
    EachItem {
        list: &'static str,
        field: &'static str,
    },
    /// At least one of the named text fields must be present. Errors are
    /// reported under the fields joined with `|`.
    AnyOf(&'static [&'static str]),
}

/// Rules bound to one target, checked in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub target: Target,
    pub rules: &'static [Rule],
}

const fn field(name: &'static str, rules: &'static [Rule]) -> FieldRule {
    FieldRule {
        target: Target::Field(name),
        rules,
    }
}

const fn each(list: &'static str, field: &'static str, rules: &'static [Rule]) -> FieldRule {
    FieldRule {
        target: Target::EachItem { list, field },
        rules,
    }
}

/// Lower and upper bound for the superpower text.
pub const SUPERPOWER_MIN_CHARS: usize = 10;
pub const SUPERPOWER_MAX_CHARS: usize = 200;

pub const MAX_PORTFOLIO_ITEMS: usize = 10;
pub const MAX_EXPERIENCE_ITEMS: usize = 20;
pub const MAX_TESTIMONIAL_PHOTOS: usize = 20;

/// Contact channels of which at least one must be filled in.
pub const REACHABLE_CONTACTS: &[&str] = &["phone", "telegram", "whatsapp"];

static SPECIALIZATIONS: &[FieldRule] = &[field("specializations", &[Rule::Required, Rule::MinItems(1)])];

static SUPERPOWER: &[FieldRule] = &[field(
    "superpower",
    &[
        Rule::Required,
        Rule::MinLength(SUPERPOWER_MIN_CHARS),
        Rule::MaxLength(SUPERPOWER_MAX_CHARS),
    ],
)];

static ABILITIES: &[FieldRule] = &[field("abilities", &[Rule::Required, Rule::MinItems(1)])];

static PORTFOLIO: &[FieldRule] = &[
    field("portfolio", &[Rule::MaxItems(MAX_PORTFOLIO_ITEMS)]),
    each("portfolio", "title", &[Rule::Required, Rule::MaxLength(100)]),
    each("portfolio", "description", &[Rule::MaxLength(1000)]),
];

static SERVICES: &[FieldRule] = &[
    each("services", "title", &[Rule::Required, Rule::MaxLength(100)]),
    each("services", "description", &[Rule::MaxLength(1000)]),
];

static EXPERIENCE: &[FieldRule] = &[
    field("experience", &[Rule::MaxItems(MAX_EXPERIENCE_ITEMS)]),
    each("experience", "company", &[Rule::Required, Rule::MaxLength(100)]),
    each("experience", "position", &[Rule::Required, Rule::MaxLength(100)]),
    each("experience", "description", &[Rule::MaxLength(1000)]),
];

static TESTIMONIALS: &[FieldRule] = &[field("testimonials", &[Rule::MaxItems(MAX_TESTIMONIAL_PHOTOS)])];

static CONTACTS: &[FieldRule] = &[
    FieldRule {
        target: Target::AnyOf(REACHABLE_CONTACTS),
        rules: &[Rule::Required],
    },
    field("telegram", &[Rule::Pattern(PatternKind::Telegram)]),
    field("email", &[Rule::Pattern(PatternKind::Email)]),
];

/// Rules for a block, in evaluation order.
pub fn rules_for(block: BlockId) -> &'static [FieldRule] {
    match block {
        BlockId::Specializations => SPECIALIZATIONS,
        BlockId::Superpower => SUPERPOWER,
        BlockId::Abilities => ABILITIES,
        BlockId::Portfolio => PORTFOLIO,
        BlockId::Services => SERVICES,
        BlockId::Experience => EXPERIENCE,
        BlockId::Testimonials => TESTIMONIALS,
        BlockId::Contacts => CONTACTS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_blocks_carry_a_required_rule() {
        for block in BlockId::required() {
            assert!(
                rules_for(block)
                    .iter()
                    .any(|r| r.rules.contains(&Rule::Required)),
                "{block} has no required rule"
            );
        }
    }

    #[test]
    fn optional_blocks_have_no_top_level_required_rule() {
        for block in BlockId::ALL.into_iter().filter(|b| !b.is_required()) {
            for rule in rules_for(block) {
                if let Target::Field(_) = rule.target {
                    assert!(!rule.rules.contains(&Rule::Required), "{block} requires a field");
                }
            }
        }
    }

    #[test]
    fn every_block_has_rules() {
        for block in BlockId::ALL {
            assert!(!rules_for(block).is_empty());
        }
    }
}
