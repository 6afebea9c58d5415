//! Per-content-type rule chains.

use std::collections::HashMap;
use std::time::Instant;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::issue::IssueReport;
use crate::transform::{MergeSource, RenameTable, Transform, TransformContext};
use crate::unwrap::UnwrapOptions;

/// Content types served through the generic record pipeline.
pub const STANDARD_CONTENT_TYPES: [&str; 7] = [
    "card",
    "product",
    "deal",
    "meal",
    "promo",
    "ingredient",
    "language",
];

/// Ordered transforms keyed by content type.
///
/// Rules for a type run in registration order, and later rules may rely on
/// fields earlier ones produced. Types with no rules pass through unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransformRegistry {
    rules: HashMap<String, Vec<Transform>>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in rule chains for every standard content type.
    pub fn standard() -> Self {
        Self::standard_with_drinks(&RenameTable::drink_categories())
    }

    /// Built-in rule chains with a custom drink-category label table.
    pub fn standard_with_drinks(drinks: &RenameTable) -> Self {
        let mut registry = Self::new();
        for content_type in STANDARD_CONTENT_TYPES {
            for rule in base_rules() {
                registry.register(content_type, rule);
            }
        }
        registry.register(
            "meal",
            Transform::RenameKeys {
                field: "items.drink".into(),
                table: drinks.clone(),
            },
        );
        registry
    }

    /// Append a rule to a content type's chain.
    pub fn register(&mut self, content_type: &str, transform: Transform) -> &mut Self {
        self.rules
            .entry(content_type.to_string())
            .or_default()
            .push(transform);
        self
    }

    pub fn rules_for(&self, content_type: &str) -> &[Transform] {
        self.rules
            .get(content_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    /// Run a content type's chain over an owned record and hand back the
    /// rewritten record.
    pub fn apply(
        &self,
        content_type: &str,
        mut record: Map<String, Value>,
        record_id: &str,
        opts: &UnwrapOptions,
        issues: &mut IssueReport,
    ) -> Map<String, Value> {
        let start = Instant::now();
        let rules = self.rules_for(content_type);
        let mut ctx = TransformContext {
            record_id,
            opts,
            issues,
        };
        let mut applied = 0usize;
        for rule in rules {
            if rule.apply(&mut record, &mut ctx) {
                applied += 1;
            }
        }
        debug!(
            content_type,
            record_id,
            rules = rules.len(),
            applied,
            elapsed_micros = start.elapsed().as_micros() as u64,
            "normalize.transform"
        );
        record
    }
}

/// Rules shared by every standard content type, in execution order.
fn base_rules() -> Vec<Transform> {
    vec![
        Transform::Flatten {
            field: "product".into(),
            inner: None,
            strip: Vec::new(),
        },
        Transform::ProjectList {
            target: "product.products".into(),
            sources: vec!["product.products".into()],
        },
        Transform::ProjectList {
            target: "products".into(),
            sources: vec!["products".into()],
        },
        Transform::GroupList {
            field: "configurable".into(),
            group_key: "id".into(),
            members: "configurableItems".into(),
        },
        Transform::Merge {
            into: "criteria".into(),
            when: "criteriaSize".into(),
            sources: vec![
                MergeSource::new("criteriaSize", "size"),
                MergeSource::new("criteriaSide", "side"),
            ],
        },
        Transform::Merge {
            into: "items".into(),
            when: "itemAnchor".into(),
            sources: vec![
                MergeSource::new("itemAnchor", "anchor"),
                MergeSource::new("itemSide", "side"),
                MergeSource::new("itemDrink", "drink"),
                MergeSource::new("itemToy", "toy").or_default(json!(false)),
            ],
        },
    ]
}
