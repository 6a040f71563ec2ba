use ahash::AHashMap;

/// How a field's answers are typed when rule values are parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ValueKind {
    #[default]
    Text,
    Number,
    Boolean,
}

/// Per-type metadata and validation contract published by the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeContract {
    pub display_name: String,
    pub value_kind: ValueKind,
    /// Needs inline options or an external option set (`typeConfig.codeSetId`).
    pub requires_options: bool,
    /// Always reads from an external source (`typeConfig.dataSourceId`).
    pub requires_data_source: bool,
    /// Purely visual; never collects an answer and needs no label.
    pub layout_only: bool,
}

impl FieldTypeContract {
    pub fn new(display_name: impl Into<String>, value_kind: ValueKind) -> Self {
        Self {
            display_name: display_name.into(),
            value_kind,
            requires_options: false,
            requires_data_source: false,
            layout_only: false,
        }
    }
}

/// Source of field-type metadata consumed by validation and the editor.
pub trait FieldTypeRegistry: Send + Sync {
    fn contract(&self, field_type: &str) -> Option<FieldTypeContract>;

    fn is_known(&self, field_type: &str) -> bool {
        self.contract(field_type).is_some()
    }
}

/// Defines the built-in field types, their registration and their lookup by name.
macro_rules! define_field_types {
    ( $( ($name:literal, $display:literal, $kind:ident $(, $flag:ident)* ) ),* $(,)? ) => {
        fn standard_contract(name: &str) -> Option<FieldTypeContract> {
            match name {
                $(
                    $name => {
                        #[allow(unused_mut)]
                        let mut contract = FieldTypeContract::new($display, ValueKind::$kind);
                        $( contract.$flag = true; )*
                        Some(contract)
                    }
                )*
                _ => None,
            }
        }

        fn register_standard_types(types: &mut AHashMap<String, FieldTypeContract>) {
            $(
                if let Some(contract) = standard_contract($name) {
                    types.insert($name.to_string(), contract);
                }
            )*
        }
    };
}

define_field_types! {
    // Free input
    ("text", "Text", Text),
    ("textarea", "Text Area", Text),
    ("email", "Email", Text),
    ("phone", "Phone", Text),
    ("date", "Date", Text),
    ("file", "File Upload", Text),

    // Numeric
    ("number", "Number", Number),
    ("decimal", "Decimal", Number),
    ("currency", "Currency", Number),

    // Boolean
    ("checkbox", "Checkbox", Boolean),
    ("toggle", "Toggle", Boolean),

    // Choice
    ("dropdown", "Dropdown", Text, requires_options),
    ("radio", "Radio Group", Text, requires_options),
    ("checklist", "Checklist", Text, requires_options),

    // External data
    ("autocomplete", "Autocomplete", Text, requires_data_source),

    // Layout
    ("section", "Section", Text),
    ("divider", "Divider", Text, layout_only),
    ("heading", "Heading", Text),
}

/// The built-in registry, extensible with aliases and custom types.
#[derive(Debug, Clone)]
pub struct StandardFieldTypes {
    types: AHashMap<String, FieldTypeContract>,
}

impl Default for StandardFieldTypes {
    fn default() -> Self {
        Self::new()
    }
}

impl StandardFieldTypes {
    pub fn new() -> Self {
        let mut types = AHashMap::new();
        register_standard_types(&mut types);
        Self { types }
    }

    /// Makes `alias` resolve to the contract of the built-in `standard_type`.
    pub fn with_type_alias(mut self, alias: &str, standard_type: &str) -> Self {
        if let Some(contract) = standard_contract(standard_type) {
            self.types.insert(alias.to_string(), contract);
        }
        self
    }

    pub fn with_custom_type(mut self, name: &str, contract: FieldTypeContract) -> Self {
        self.types.insert(name.to_string(), contract);
        self
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl FieldTypeRegistry for StandardFieldTypes {
    fn contract(&self, field_type: &str) -> Option<FieldTypeContract> {
        self.types.get(field_type).cloned()
    }
}
