/// A custom property as written in the map file: name, declared type and raw text.
///
/// Accessors never fail. A value that does not match the declared type, or a
/// declared type that does not match the accessor, reads as zero / `false` / `""`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name.
    pub name: String,
    /// Declared type (`"int"`, `"float"`, `"bool"`, `"string"`, ...). Empty when omitted.
    pub kind: String,
    /// Unparsed value.
    pub raw: String,
}

/// Parsed view of a [`Property`].
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Declared `int`.
    I64(i64),
    /// Declared `float`.
    F32(f32),
    /// Declared `bool`.
    Bool(bool),
    /// Any other declared type, passed through untouched.
    String(String),
}

impl Property {
    /// Creates a property from its three textual parts.
    pub fn new(name: impl Into<String>, kind: impl Into<String>, raw: impl Into<String>) -> Self {
        Property {
            name: name.into(),
            kind: kind.into(),
            raw: raw.into(),
        }
    }

    /// Integer value, 0 unless declared `int` and parseable.
    pub fn as_i64(&self) -> i64 {
        if self.kind == "int" {
            self.raw.trim().parse().unwrap_or(0)
        } else {
            0
        }
    }

    /// Float value, 0 unless declared `float` and parseable.
    pub fn as_f32(&self) -> f32 {
        if self.kind == "float" {
            self.raw.trim().parse().unwrap_or(0.0)
        } else {
            0.0
        }
    }

    /// Bool value, `false` unless declared `bool` and spelled `true` or `1`.
    pub fn as_bool(&self) -> bool {
        self.kind == "bool" && matches!(self.raw.trim(), "true" | "1")
    }

    /// Raw text, whatever the declared type.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Parsed according to the declared type.
    pub fn value(&self) -> PropertyValue {
        match self.kind.as_str() {
            "int" => PropertyValue::I64(self.as_i64()),
            "float" => PropertyValue::F32(self.as_f32()),
            "bool" => PropertyValue::Bool(self.as_bool()),
            _ => PropertyValue::String(self.raw.clone()),
        }
    }
}

/// Ordered property list attached to a map, layer or object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Properties {
    items: Vec<Property>,
}

impl Properties {
    /// Empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a property. A later property with the same name shadows earlier ones.
    pub fn push(&mut self, prop: Property) {
        self.items.push(prop);
    }

    /// Last property with the given name.
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.items.iter().rev().find(|p| p.name == name)
    }

    /// See [`Property::as_i64`]; 0 when absent.
    pub fn get_i64(&self, name: &str) -> i64 {
        self.get(name).map_or(0, Property::as_i64)
    }

    /// Like [`Properties::get_i64`], 0 when the value does not fit.
    pub fn get_i32(&self, name: &str) -> i32 {
        i32::try_from(self.get_i64(name)).unwrap_or(0)
    }

    /// See [`Property::as_f32`]; 0 when absent.
    pub fn get_f32(&self, name: &str) -> f32 {
        self.get(name).map_or(0.0, Property::as_f32)
    }

    /// See [`Property::as_bool`]; `false` when absent.
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).is_some_and(Property::as_bool)
    }

    /// Raw text; `""` when absent.
    pub fn get_string(&self, name: &str) -> &str {
        self.get(name).map_or("", Property::as_str)
    }

    /// Properties in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.items.iter()
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when no property was declared.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl FromIterator<Property> for Properties {
    fn from_iter<I: IntoIterator<Item = Property>>(iter: I) -> Self {
        Properties {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bag() -> Properties {
        [
            Property::new("hp", "int", "12"),
            Property::new("bad_hp", "int", "twelve"),
            Property::new("speed", "float", "1.5"),
            Property::new("bad_speed", "float", "fast"),
            Property::new("solid", "bool", "true"),
            Property::new("label", "string", "gate"),
            Property::new("untyped", "", "42"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn typed_accessors_parse_declared_types() {
        let p = bag();
        assert_eq!(p.get_i64("hp"), 12);
        assert_eq!(p.get_f32("speed"), 1.5);
        assert!(p.get_bool("solid"));
        assert_eq!(p.get_string("label"), "gate");
    }

    #[test]
    fn mismatches_default_to_zero() {
        let p = bag();
        assert_eq!(p.get_i64("bad_hp"), 0);
        assert_eq!(p.get_f32("bad_speed"), 0.0);
        // declared type wins over what the text looks like
        assert_eq!(p.get_i64("untyped"), 0);
        assert_eq!(p.get_i64("speed"), 0);
        assert_eq!(p.get_string("untyped"), "42");
    }

    #[test]
    fn absent_names_default() {
        let p = bag();
        assert_eq!(p.get_i32("missing"), 0);
        assert_eq!(p.get_f32("missing"), 0.0);
        assert!(!p.get_bool("missing"));
        assert_eq!(p.get_string("missing"), "");
    }

    #[test]
    fn value_view_follows_declared_type() {
        let p = bag();
        assert_eq!(p.get("hp").map(Property::value), Some(PropertyValue::I64(12)));
        assert_eq!(p.get("bad_speed").map(Property::value), Some(PropertyValue::F32(0.0)));
        assert_eq!(
            p.get("label").map(Property::value),
            Some(PropertyValue::String("gate".into()))
        );
    }

    #[test]
    fn later_duplicate_shadows_earlier() {
        let mut p = Properties::new();
        p.push(Property::new("n", "int", "1"));
        p.push(Property::new("n", "int", "2"));
        assert_eq!(p.get_i64("n"), 2);
        assert_eq!(p.len(), 2);
    }
}
