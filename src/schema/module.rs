use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

/// A single form definition: a flat list of fields whose nesting is expressed
/// through `parentId` lookups.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// One input element of a module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    pub order: u32,
    pub field_type: String,
    #[serde(default)]
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rules: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_config: Option<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRules {
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

/// An inline choice for dropdown/radio/checklist fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOption {
    pub value: String,
    pub label: String,
}

/// Outcome of following `parentId` links upward from a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AncestorWalk {
    /// Reached a root field; `chain` lists the visited ancestors, nearest first.
    Root { chain: Vec<String> },
    /// A `parentId` pointed at an id that does not exist.
    Orphan { missing: String },
    /// The walk revisited `at`, an id already seen in the same walk.
    Cycle { at: String },
}

impl Field {
    pub fn new(id: impl Into<String>, field_type: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            order,
            field_type: field_type.into(),
            label: String::new(),
            validation_rules: None,
            options: None,
            type_config: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn is_required(&self) -> bool {
        self.validation_rules.as_ref().is_some_and(|r| r.required)
    }

    /// Looks up a string entry of `typeConfig`, treating blanks as absent.
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.type_config
            .as_ref()
            .and_then(|config| config.get(key))
            .and_then(|value| value.as_str())
            .filter(|s| !s.trim().is_empty())
    }

    /// Whether `typeConfig` carries a non-null, non-false entry for `key`.
    pub fn config_declares(&self, key: &str) -> bool {
        match self.type_config.as_ref().and_then(|config| config.get(key)) {
            None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => false,
            Some(_) => true,
        }
    }
}

impl Module {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self
    }

    pub fn field(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.fields.iter().any(|f| f.id == id)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    /// Children of `parent_id` in display order.
    pub fn children(&self, parent_id: Option<&str>) -> Vec<&Field> {
        let mut children: Vec<&Field> = self
            .fields
            .iter()
            .filter(|f| f.parent_id.as_deref() == parent_id)
            .collect();
        children.sort_by_key(|f| f.order);
        children
    }

    pub fn id_set(&self) -> AHashSet<&str> {
        self.fields.iter().map(|f| f.id.as_str()).collect()
    }

    /// `id -> parentId` index over the field list. With duplicate ids the
    /// first occurrence wins.
    pub fn parent_index(&self) -> AHashMap<&str, Option<&str>> {
        let mut index = AHashMap::with_capacity(self.fields.len());
        for field in &self.fields {
            index
                .entry(field.id.as_str())
                .or_insert(field.parent_id.as_deref());
        }
        index
    }

    /// Walks the ancestor chain of `id` with a visited set.
    pub fn ancestors(&self, id: &str) -> AncestorWalk {
        walk_ancestors(&self.parent_index(), id)
    }

    /// `id` plus every transitive descendant, breadth first.
    pub fn subtree_ids(&self, id: &str) -> Vec<String> {
        let mut closure = vec![id.to_string()];
        let mut seen: AHashSet<String> = closure.iter().cloned().collect();
        let mut cursor = 0;
        while cursor < closure.len() {
            let current = closure[cursor].clone();
            for child in self
                .fields
                .iter()
                .filter(|f| f.parent_id.as_deref() == Some(current.as_str()))
            {
                if seen.insert(child.id.clone()) {
                    closure.push(child.id.clone());
                }
            }
            cursor += 1;
        }
        closure
    }
}

/// Follows `parentId` links from `start` until a root, a dangling reference,
/// or a revisited id. Bounded by the number of entries in `parents`.
pub fn walk_ancestors(parents: &AHashMap<&str, Option<&str>>, start: &str) -> AncestorWalk {
    let mut visited: AHashSet<&str> = AHashSet::new();
    let mut chain = Vec::new();
    visited.insert(start);

    let mut current = start;
    loop {
        let parent = match parents.get(current) {
            Some(Some(parent)) => *parent,
            Some(None) => return AncestorWalk::Root { chain },
            None => {
                return AncestorWalk::Orphan {
                    missing: current.to_string(),
                };
            }
        };
        if !parents.contains_key(parent) {
            return AncestorWalk::Orphan {
                missing: parent.to_string(),
            };
        }
        if !visited.insert(parent) {
            return AncestorWalk::Cycle {
                at: parent.to_string(),
            };
        }
        chain.push(parent.to_string());
        current = parent;
    }
}
