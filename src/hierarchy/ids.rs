use crate::schema::Module;
use ahash::AHashSet;

/// Hands out `<type><separator><n>` ids that collide with nothing already in
/// the module nor with anything it allocated before.
pub struct IdAllocator<'a> {
    taken: AHashSet<String>,
    separator: &'a str,
}

impl<'a> IdAllocator<'a> {
    pub fn for_module(module: &Module, separator: &'a str) -> Self {
        Self {
            taken: module.fields.iter().map(|f| f.id.clone()).collect(),
            separator,
        }
    }

    pub fn allocate(&mut self, field_type: &str) -> String {
        let base = id_base(field_type);
        let mut suffix = 1u32;
        loop {
            let candidate = format!("{}{}{}", base, self.separator, suffix);
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            suffix += 1;
        }
    }
}

fn id_base(field_type: &str) -> String {
    let base: String = field_type
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if base.is_empty() {
        "field".to_string()
    } else {
        base
    }
}
