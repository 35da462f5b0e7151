//! The in-progress profile: one section per form block.
//!
//! Optional text is always `Option<String>`. Blank input deserializes to
//! `None`, so "absent" has exactly one encoding across the whole snapshot.

use crate::block::BlockId;
use crate::error::{Error, Result};
use crate::validate::FieldValue;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Complete value of every field in the profile form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormSnapshot {
    #[serde(default)]
    pub specializations: Specializations,

    #[serde(default)]
    pub superpower: String,

    /// Selected skill ids (see [`LabelCatalog`](crate::LabelCatalog)).
    #[serde(default)]
    pub abilities: Vec<u32>,

    #[serde(default)]
    pub portfolio: Vec<PortfolioItem>,

    #[serde(default)]
    pub services: Vec<ServiceItem>,

    #[serde(default)]
    pub experience: Vec<ExperienceItem>,

    /// Testimonial photo URLs returned by the upload collaborator.
    #[serde(default)]
    pub testimonials: Vec<String>,

    #[serde(default)]
    pub contacts: Contacts,
}

/// Specialization flags (block 1).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specializations {
    #[serde(default)]
    pub neural_assistants: bool,
    #[serde(default)]
    pub neural_images: bool,
    #[serde(default)]
    pub neural_video: bool,
    #[serde(default)]
    pub neural_text: bool,
    #[serde(default)]
    pub neural_audio: bool,
    #[serde(default)]
    pub automation: bool,
    #[serde(default)]
    pub consulting: bool,
}

impl Specializations {
    /// Flags paired with their field names.
    pub fn flags(&self) -> [(&'static str, bool); 7] {
        [
            ("neural_assistants", self.neural_assistants),
            ("neural_images", self.neural_images),
            ("neural_video", self.neural_video),
            ("neural_text", self.neural_text),
            ("neural_audio", self.neural_audio),
            ("automation", self.automation),
            ("consulting", self.consulting),
        ]
    }

    /// Names of the selected specializations.
    pub fn selected(&self) -> impl Iterator<Item = &'static str> {
        self.flags()
            .into_iter()
            .filter_map(|(name, on)| on.then_some(name))
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }
}

/// A portfolio entry (block 4).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "absent_if_blank")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "absent_if_blank")]
    pub image_url: Option<String>,
}

/// An offered service (block 5).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    #[serde(default)]
    pub title: String,
    /// Price in whole currency units.
    #[serde(default)]
    pub price: Option<u32>,
    #[serde(default, deserialize_with = "absent_if_blank")]
    pub description: Option<String>,
}

/// A work history entry (block 6).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceItem {
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub position: String,
    #[serde(default, deserialize_with = "absent_if_blank")]
    pub period: Option<String>,
    #[serde(default, deserialize_with = "absent_if_blank")]
    pub description: Option<String>,
}

/// Contact handles (block 8).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contacts {
    #[serde(default, deserialize_with = "absent_if_blank")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "absent_if_blank")]
    pub telegram: Option<String>,
    #[serde(default, deserialize_with = "absent_if_blank")]
    pub whatsapp: Option<String>,
    #[serde(default, deserialize_with = "absent_if_blank")]
    pub email: Option<String>,
}

/// Collapse `null`, `""` and whitespace-only strings into `None`.
pub(crate) fn absent_if_blank<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Text fields of a list item, addressable by name for the rule evaluator.
pub(crate) trait Record {
    fn text(&self, field: &str) -> Option<Option<&str>>;
}

impl Record for PortfolioItem {
    fn text(&self, field: &str) -> Option<Option<&str>> {
        match field {
            "title" => Some(Some(self.title.as_str())),
            "description" => Some(Some(self.description.as_str())),
            "link" => Some(self.link.as_deref()),
            "image_url" => Some(self.image_url.as_deref()),
            _ => None,
        }
    }
}

impl Record for ServiceItem {
    fn text(&self, field: &str) -> Option<Option<&str>> {
        match field {
            "title" => Some(Some(self.title.as_str())),
            "description" => Some(self.description.as_deref()),
            _ => None,
        }
    }
}

impl Record for ExperienceItem {
    fn text(&self, field: &str) -> Option<Option<&str>> {
        match field {
            "company" => Some(Some(self.company.as_str())),
            "position" => Some(Some(self.position.as_str())),
            "period" => Some(self.period.as_deref()),
            "description" => Some(self.description.as_deref()),
            _ => None,
        }
    }
}

impl FormSnapshot {
    /// Empty snapshot, as at the start of a form session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of a top-level field for validation.
    pub(crate) fn value(&self, field: &str) -> Option<FieldValue<'_>> {
        let value = match field {
            "specializations" => FieldValue::Count(self.specializations.selected_count()),
            "superpower" => FieldValue::Text(Some(self.superpower.as_str())),
            "abilities" => FieldValue::Count(self.abilities.len()),
            "portfolio" => FieldValue::Count(self.portfolio.len()),
            "services" => FieldValue::Count(self.services.len()),
            "experience" => FieldValue::Count(self.experience.len()),
            "testimonials" => FieldValue::Count(self.testimonials.len()),
            "phone" => FieldValue::Text(self.contacts.phone.as_deref()),
            "telegram" => FieldValue::Text(self.contacts.telegram.as_deref()),
            "whatsapp" => FieldValue::Text(self.contacts.whatsapp.as_deref()),
            "email" => FieldValue::Text(self.contacts.email.as_deref()),
            _ => return None,
        };
        Some(value)
    }

    /// Items of a list section, for per-item rules.
    pub(crate) fn records(&self, list: &str) -> Option<Vec<&dyn Record>> {
        let records = match list {
            "portfolio" => self.portfolio.iter().map(|r| r as &dyn Record).collect(),
            "services" => self.services.iter().map(|r| r as &dyn Record).collect(),
            "experience" => self.experience.iter().map(|r| r as &dyn Record).collect(),
            _ => return None,
        };
        Some(records)
    }

    /// Write one field of one block.
    ///
    /// Struct sections (specializations, contacts) take a field name of the
    /// section. Single-value sections take the block's own name and replace the
    /// whole value. The snapshot is unchanged when an error is returned.
    pub fn set_field(&mut self, block: BlockId, field: &str, value: serde_json::Value) -> Result<()> {
        match block {
            BlockId::Specializations => set_member(&mut self.specializations, block, field, value),
            BlockId::Contacts => set_member(&mut self.contacts, block, field, value),
            BlockId::Superpower => replace(&mut self.superpower, block, field, value),
            BlockId::Abilities => replace(&mut self.abilities, block, field, value),
            BlockId::Portfolio => replace(&mut self.portfolio, block, field, value),
            BlockId::Services => replace(&mut self.services, block, field, value),
            BlockId::Experience => replace(&mut self.experience, block, field, value),
            BlockId::Testimonials => replace(&mut self.testimonials, block, field, value),
        }
    }
}

fn set_member<T>(target: &mut T, block: BlockId, field: &str, value: serde_json::Value) -> Result<()>
where
    T: Serialize + DeserializeOwned,
{
    let invalid = |reason: String| Error::InvalidValue {
        block,
        field: field.to_string(),
        reason,
    };

    let mut current = serde_json::to_value(&*target).map_err(|e| invalid(e.to_string()))?;
    let Some(members) = current.as_object_mut() else {
        return Err(invalid("section is not a record".to_string()));
    };
    if !members.contains_key(field) {
        return Err(Error::UnknownField {
            block,
            field: field.to_string(),
        });
    }
    members.insert(field.to_string(), value);

    *target = serde_json::from_value(current).map_err(|e| invalid(e.to_string()))?;
    Ok(())
}

fn replace<T>(target: &mut T, block: BlockId, field: &str, value: serde_json::Value) -> Result<()>
where
    T: DeserializeOwned,
{
    if field != block.name() {
        return Err(Error::UnknownField {
            block,
            field: field.to_string(),
        });
    }
    *target = serde_json::from_value(value).map_err(|e| Error::InvalidValue {
        block,
        field: field.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}
