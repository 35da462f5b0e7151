//! Human-readable labels for specializations and stored skill ids.

use crate::snapshot::Specializations;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A labelled skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub id: u32,
    pub label: String,
}

/// A labelled specialization flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecializationLabel {
    pub key: String,
    pub label: String,
}

/// Lookup tables from skill id and specialization key to label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelCatalog {
    skills: BTreeMap<u32, String>,
    specializations: BTreeMap<String, String>,
}

impl LabelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add or replace a label.
    pub fn with_skill(mut self, id: u32, label: impl Into<String>) -> Self {
        self.skills.insert(id, label.into());
        self
    }

    /// Builder: add or replace a specialization label.
    pub fn with_specialization(mut self, key: impl Into<String>, label: impl Into<String>) -> Self {
        self.specializations.insert(key.into(), label.into());
        self
    }

    pub fn label(&self, id: u32) -> Option<&str> {
        self.skills.get(&id).map(String::as_str)
    }

    /// Labels for `ids`, skipping unknown ones.
    pub fn labels<'a>(&'a self, ids: &'a [u32]) -> impl Iterator<Item = &'a str> + 'a {
        ids.iter().filter_map(|id| self.label(*id))
    }

    /// All skills ordered by id.
    pub fn skills(&self) -> Vec<Skill> {
        self.skills
            .iter()
            .map(|(id, label)| Skill {
                id: *id,
                label: label.clone(),
            })
            .collect()
    }

    pub fn specialization_label(&self, key: &str) -> Option<&str> {
        self.specializations.get(key).map(String::as_str)
    }

    /// Labels of the selected specializations in form order. Flags without
    /// a label fall back to their key.
    pub fn specialization_labels<'a>(&'a self, selected: &Specializations) -> Vec<&'a str> {
        selected
            .selected()
            .map(|key| self.specialization_label(key).unwrap_or(key))
            .collect()
    }

    /// All specialization labels ordered by key.
    pub fn specializations(&self) -> Vec<SpecializationLabel> {
        self.specializations
            .iter()
            .map(|(key, label)| SpecializationLabel {
                key: key.clone(),
                label: label.clone(),
            })
            .collect()
    }

    /// Number of skill labels.
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Skills and specializations offered on the marketplace out of the box.
    pub fn defaults() -> Self {
        let catalog = [
            ("neural_assistants", "AI assistants"),
            ("neural_images", "Image generation"),
            ("neural_video", "Video generation"),
            ("neural_text", "Text generation"),
            ("neural_audio", "Audio and voice"),
            ("automation", "Automation"),
            ("consulting", "Consulting"),
        ]
        .into_iter()
        .fold(Self::new(), |catalog, (key, label)| catalog.with_specialization(key, label));

        [
            (1, "Prompt engineering"),
            (2, "Fine-tuning"),
            (3, "Retrieval-augmented generation"),
            (4, "Computer vision"),
            (5, "Speech synthesis"),
            (6, "Image generation"),
            (7, "Chatbot development"),
            (8, "Workflow automation"),
            (9, "Data labelling"),
            (10, "Model evaluation"),
        ]
        .into_iter()
        .fold(catalog, |catalog, (id, label)| catalog.with_skill(id, label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_not_empty() {
        let catalog = LabelCatalog::defaults();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.label(1), Some("Prompt engineering"));
    }

    #[test]
    fn unknown_ids_are_skipped() {
        let catalog = LabelCatalog::new().with_skill(3, "RAG");
        let labels: Vec<_> = catalog.labels(&[3, 99]).collect();
        assert_eq!(labels, vec!["RAG"]);
        assert_eq!(catalog.label(99), None);
    }

    #[test]
    fn every_specialization_has_a_default_label() {
        let catalog = LabelCatalog::defaults();
        for (key, _) in Specializations::default().flags() {
            assert!(catalog.specialization_label(key).is_some(), "{key} has no label");
        }
    }

    #[test]
    fn selected_specialization_labels() {
        let catalog = LabelCatalog::new().with_specialization("neural_video", "Video");
        let selected = Specializations {
            neural_video: true,
            consulting: true,
            ..Default::default()
        };
        assert_eq!(catalog.specialization_labels(&selected), vec!["Video", "consulting"]);
    }

    #[test]
    fn skills_are_sorted_by_id() {
        let catalog = LabelCatalog::new().with_skill(5, "b").with_skill(2, "a");
        let ids: Vec<_> = catalog.skills().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![2, 5]);
    }
}
