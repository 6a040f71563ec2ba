//! Structural mutations over a module's field tree.
//!
//! Every operation takes the current module by reference and either returns a
//! brand-new module or a `CommandError`; the input is never touched, so a
//! rejected command leaves no trace.

use crate::config::EditorConfig;
use crate::error::CommandError;
use crate::schema::{AncestorWalk, Field, FieldOption, Module, ValidationRules, walk_ancestors};
use crate::validation::FieldTypeRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub mod ids;
pub mod ordering;

pub use ids::IdAllocator;
pub use ordering::{next_order, orders_contiguous, renumber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Up,
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A new module plus the id of the field the edit produced or touched.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldEdit {
    pub module: Module,
    pub field_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Removal {
    pub module: Module,
    /// Removed ids, the requested field first, then descendants breadth first.
    pub removed: Vec<String>,
}

/// Property changes for `update_field`; `None` leaves a property untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_rules: Option<ValidationRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<FieldOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_config: Option<serde_json::Map<String, serde_json::Value>>,
}

pub struct HierarchyOperations<'a> {
    registry: &'a dyn FieldTypeRegistry,
    config: &'a EditorConfig,
}

impl<'a> HierarchyOperations<'a> {
    pub fn new(registry: &'a dyn FieldTypeRegistry, config: &'a EditorConfig) -> Self {
        Self { registry, config }
    }

    pub fn add_field(
        &self,
        module: &Module,
        field_type: &str,
        parent_id: Option<&str>,
    ) -> Result<FieldEdit, CommandError> {
        let contract = self
            .registry
            .contract(field_type)
            .ok_or_else(|| CommandError::UnknownFieldType(field_type.to_string()))?;
        let mut allocator = IdAllocator::for_module(module, &self.config.id_separator);
        let id = allocator.allocate(field_type);

        if let Some(parent) = parent_id {
            if !module.contains(parent) {
                return Err(CommandError::ParentNotFound {
                    field_id: id,
                    parent_id: parent.to_string(),
                });
            }
        }

        let mut field = Field::new(&id, field_type, next_order(module, parent_id))
            .with_label(contract.display_name);
        field.parent_id = parent_id.map(str::to_string);

        let mut next = module.clone();
        next.fields.push(field);
        debug!(field_id = %id, field_type, parent_id = ?parent_id, "Added field");
        Ok(FieldEdit {
            module: next,
            field_id: id,
        })
    }

    /// Removes `id` together with every field reachable below it.
    pub fn delete_field(&self, module: &Module, id: &str) -> Result<Removal, CommandError> {
        if !module.contains(id) {
            return Err(CommandError::FieldNotFound(id.to_string()));
        }
        let removed = module.subtree_ids(id);

        let mut next = module.clone();
        next.fields.retain(|f| !removed.contains(&f.id));
        renumber(&mut next.fields);
        debug!(field_id = id, removed = removed.len(), "Deleted field subtree");
        Ok(Removal {
            module: next,
            removed,
        })
    }

    /// Clones a single field directly after the original.
    pub fn duplicate_field(&self, module: &Module, id: &str) -> Result<FieldEdit, CommandError> {
        let position = module
            .position(id)
            .ok_or_else(|| CommandError::FieldNotFound(id.to_string()))?;
        let original = &module.fields[position];
        let mut allocator = IdAllocator::for_module(module, &self.config.id_separator);
        let new_id = allocator.allocate(&original.field_type);

        let mut copy = original.clone();
        copy.id = new_id.clone();
        copy.order = original.order + 1;
        copy.label = self.copy_label(&original.label);

        let mut next = module.clone();
        for field in next.fields.iter_mut() {
            if field.parent_id == original.parent_id && field.order > original.order {
                field.order += 1;
            }
        }
        next.fields.insert(position + 1, copy);
        renumber(&mut next.fields);
        debug!(field_id = id, copy_id = %new_id, "Duplicated field");
        Ok(FieldEdit {
            module: next,
            field_id: new_id,
        })
    }

    /// Swaps `id` with its neighbour in the given direction. Sibling positions
    /// come from the renumbered order, so tied or gapped input still moves.
    pub fn move_field(
        &self,
        module: &Module,
        id: &str,
        direction: Direction,
    ) -> Result<Module, CommandError> {
        let mut next = module.clone();
        renumber(&mut next.fields);

        let field = next
            .field(id)
            .ok_or_else(|| CommandError::FieldNotFound(id.to_string()))?;
        let siblings = next.children(field.parent_id.as_deref());
        let index = siblings
            .iter()
            .position(|f| f.id == id)
            .ok_or_else(|| CommandError::FieldNotFound(id.to_string()))?;

        let neighbour = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => Some(index + 1).filter(|&i| i < siblings.len()),
        }
        .map(|i| siblings[i])
        .ok_or_else(|| CommandError::AlreadyAtBoundary {
            field_id: id.to_string(),
            direction,
        })?;

        let (own_order, neighbour_id, neighbour_order) =
            (field.order, neighbour.id.clone(), neighbour.order);
        for f in next.fields.iter_mut() {
            if f.id == id {
                f.order = neighbour_order;
            } else if f.id == neighbour_id {
                f.order = own_order;
            }
        }
        debug!(field_id = id, %direction, swapped_with = %neighbour_id, "Moved field");
        Ok(next)
    }

    /// Reparents `id`, refusing self-parenting, unknown parents and cycles.
    pub fn change_field_parent(
        &self,
        module: &Module,
        id: &str,
        new_parent_id: Option<&str>,
    ) -> Result<Module, CommandError> {
        if !module.contains(id) {
            return Err(CommandError::FieldNotFound(id.to_string()));
        }
        if let Some(parent) = new_parent_id {
            if parent == id {
                return Err(CommandError::SelfParent(id.to_string()));
            }
            if !module.contains(parent) {
                return Err(CommandError::ParentNotFound {
                    field_id: id.to_string(),
                    parent_id: parent.to_string(),
                });
            }

            let mut simulated = module.parent_index();
            simulated.insert(id, Some(parent));
            if let AncestorWalk::Cycle { .. } = walk_ancestors(&simulated, id) {
                return Err(CommandError::CyclicParent {
                    field_id: id.to_string(),
                    parent_id: parent.to_string(),
                });
            }
        }

        let order = module
            .fields
            .iter()
            .filter(|f| f.id != id && f.parent_id.as_deref() == new_parent_id)
            .map(|f| f.order)
            .max()
            .unwrap_or(0)
            + 1;

        let mut next = module.clone();
        for f in next.fields.iter_mut().filter(|f| f.id == id) {
            f.parent_id = new_parent_id.map(str::to_string);
            f.order = order;
        }
        renumber(&mut next.fields);
        debug!(field_id = id, parent_id = ?new_parent_id, "Changed field parent");
        Ok(next)
    }

    pub fn update_field(
        &self,
        module: &Module,
        id: &str,
        patch: &FieldPatch,
    ) -> Result<Module, CommandError> {
        let position = module
            .position(id)
            .ok_or_else(|| CommandError::FieldNotFound(id.to_string()))?;

        let mut next = module.clone();
        let field = &mut next.fields[position];
        if let Some(label) = &patch.label {
            field.label = label.clone();
        }
        if let Some(rules) = &patch.validation_rules {
            field.validation_rules = Some(rules.clone());
        }
        if let Some(options) = &patch.options {
            field.options = Some(options.clone());
        }
        if let Some(config) = &patch.type_config {
            field.type_config = Some(config.clone());
        }
        debug!(field_id = id, "Updated field properties");
        Ok(next)
    }

    /// Inserts a copied subtree under `parent_id` with fresh ids throughout.
    ///
    /// `subtree[0]` is the root; the rest are its descendants. Internal
    /// `parentId` links are remapped to the new ids, the root is relabelled
    /// and appended to the destination sibling group.
    pub fn insert_subtree(
        &self,
        module: &Module,
        subtree: &[Field],
        parent_id: Option<&str>,
    ) -> Result<FieldEdit, CommandError> {
        let Some(root) = subtree.first() else {
            return Err(CommandError::ClipboardEmpty);
        };
        if let Some(parent) = parent_id {
            if !module.contains(parent) {
                return Err(CommandError::ParentNotFound {
                    field_id: root.id.clone(),
                    parent_id: parent.to_string(),
                });
            }
        }

        let mut allocator = IdAllocator::for_module(module, &self.config.id_separator);
        let remapped: ahash::AHashMap<&str, String> = subtree
            .iter()
            .map(|f| (f.id.as_str(), allocator.allocate(&f.field_type)))
            .collect();

        let mut next = module.clone();
        let root_order = next_order(module, parent_id);
        for (index, original) in subtree.iter().enumerate() {
            let mut field = original.clone();
            field.id = remapped[original.id.as_str()].clone();
            if index == 0 {
                field.parent_id = parent_id.map(str::to_string);
                field.order = root_order;
                field.label = self.copy_label(&original.label);
            } else {
                field.parent_id = original
                    .parent_id
                    .as_deref()
                    .and_then(|p| remapped.get(p).cloned());
            }
            next.fields.push(field);
        }
        renumber(&mut next.fields);

        let root_id = remapped[root.id.as_str()].clone();
        debug!(field_id = %root_id, count = subtree.len(), parent_id = ?parent_id, "Inserted subtree");
        Ok(FieldEdit {
            module: next,
            field_id: root_id,
        })
    }

    fn copy_label(&self, label: &str) -> String {
        format!("{}{}", self.config.copy_label_prefix, label)
    }
}
