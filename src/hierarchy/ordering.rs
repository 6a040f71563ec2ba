use crate::schema::{Field, Module};
use ahash::AHashMap;

/// `max(order)` of the siblings under `parent_id`, plus one.
pub fn next_order(module: &Module, parent_id: Option<&str>) -> u32 {
    module
        .fields
        .iter()
        .filter(|f| f.parent_id.as_deref() == parent_id)
        .map(|f| f.order)
        .max()
        .unwrap_or(0)
        + 1
}

/// Rewrites every sibling group's `order` to `1..=n`, keeping the current
/// relative order (ties broken by list position).
pub fn renumber(fields: &mut [Field]) {
    let mut groups: AHashMap<Option<String>, Vec<usize>> = AHashMap::new();
    for (index, field) in fields.iter().enumerate() {
        groups.entry(field.parent_id.clone()).or_default().push(index);
    }

    for indices in groups.values_mut() {
        indices.sort_by_key(|&i| (fields[i].order, i));
        for (position, &i) in indices.iter().enumerate() {
            fields[i].order = position as u32 + 1;
        }
    }
}

/// Whether every sibling group's `order` values form exactly `1..=n`.
pub fn orders_contiguous(module: &Module) -> bool {
    let mut groups: AHashMap<Option<&str>, Vec<u32>> = AHashMap::new();
    for field in &module.fields {
        groups
            .entry(field.parent_id.as_deref())
            .or_default()
            .push(field.order);
    }
    groups.into_values().all(|mut orders| {
        orders.sort_unstable();
        orders
            .iter()
            .enumerate()
            .all(|(i, &order)| order == i as u32 + 1)
    })
}
