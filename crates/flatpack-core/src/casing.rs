//! Name conversions shared by the packer and unpacker.
//!
//! Three namespaces meet in a flatpack document:
//! - property names: snake_case, as declared on entity models (`test_entity`)
//! - field names: lowerCamelCase, as written on the wire (`testEntityUuid`)
//! - type names: lowerCamelCase simple type names used as bucket keys (`testSubEntity`)
//!
//! Everything here is a pure function; entity models may override the
//! pluralized collection name when the default English rules get it wrong.

use convert_case::{Case, Casing};

/// Wire field carrying an entity's own identity.
pub const ID_FIELD: &str = "uuid";

/// Wire suffix marking a reference field (`merchantUuid`).
pub const REFERENCE_FIELD_SUFFIX: &str = "Uuid";

/// Property-casing suffix marking a reference field (`merchant_uuid`).
pub const REFERENCE_PROPERTY_SUFFIX: &str = "_uuid";

/// Property-casing suffixes that mark absolute timestamps.
pub const TIMESTAMP_PROPERTY_SUFFIXES: &[&str] = &["_date", "_at"];

/// Path separator between a namespace and a simple type name.
pub const PATH_SEPARATOR: &str = "::";

/// Convert a wire field name to its canonical property name.
#[must_use]
pub fn property_name(field: &str) -> String {
    field.to_case(Case::Snake)
}

/// Convert a canonical property name to its wire field name.
#[must_use]
pub fn field_name(property: &str) -> String {
    property.to_case(Case::Camel)
}

/// Wire name of the reference field for a property (`merchant` -> `merchantUuid`).
#[must_use]
pub fn reference_field_name(property: &str) -> String {
    format!("{}{REFERENCE_FIELD_SUFFIX}", field_name(property))
}

/// Strip the reference suffix from a canonical property name, if present.
///
/// The bare identity property (`uuid`) is not a reference.
#[must_use]
pub fn strip_reference_suffix(property: &str) -> Option<&str> {
    property
        .strip_suffix(REFERENCE_PROPERTY_SUFFIX)
        .filter(|stem| !stem.is_empty())
}

/// True when a canonical property name follows the timestamp convention.
#[must_use]
pub fn is_timestamp_property(property: &str) -> bool {
    TIMESTAMP_PROPERTY_SUFFIXES
        .iter()
        .any(|suffix| property.len() > suffix.len() && property.ends_with(suffix))
}

/// Bucket/type name for a type path (`shop::MerchantLocation` -> `merchantLocation`).
#[must_use]
pub fn type_name(path: &str) -> String {
    let simple = simple_name(path);

    let mut chars = simple.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Type path for a bucket name, optionally scoped by a namespace
/// (`merchantLocation`, `shop` -> `shop::MerchantLocation`).
#[must_use]
pub fn type_path(bucket: &str, namespace: Option<&str>) -> String {
    let mut chars = bucket.chars();
    let simple: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    match namespace {
        Some(ns) if !ns.is_empty() => format!("{ns}{PATH_SEPARATOR}{simple}"),
        _ => simple,
    }
}

/// Last segment of a type path.
#[must_use]
pub fn simple_name(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}

/// Default collection property name for a type name
/// (`testSubEntity` -> `test_sub_entities`).
#[must_use]
pub fn collection_property_name(type_name: &str) -> String {
    pluralize(&property_name(type_name))
}

/// Pluralize the last word of a snake_case name using plain English rules.
#[must_use]
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }

    let lower = word.to_ascii_lowercase();

    if let Some(stem) = word.strip_suffix('y') {
        let before = stem.chars().last();
        if before.is_some_and(|c| !is_vowel(c)) {
            return format!("{stem}ies");
        }
    }

    if ["s", "x", "z", "ch", "sh"]
        .iter()
        .any(|suffix| lower.ends_with(suffix))
    {
        return format!("{word}es");
    }

    format!("{word}s")
}

const fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'A' | 'E' | 'I' | 'O' | 'U')
}

///
/// TESTS
///
