//! Property predicates
//!
//! A predicate is a conjunction of primitive property tests. Evaluation
//! against a single element is the reference semantics; index plans in the
//! engine must return exactly the elements this evaluation accepts.

use crate::graph::{Cardinality, Element, PropertyValue};
use std::cmp::Ordering;

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyPredicate {
    /// Some value under `key` equals `value`
    Exact { key: String, value: PropertyValue },
    /// Some value under `key` lies inside the bounds; absent bounds are open
    Range {
        key: String,
        min: Option<PropertyValue>,
        max: Option<PropertyValue>,
        include_min: bool,
        include_max: bool,
    },
    /// Some string value under `key` contains `substring`
    Contains {
        key: String,
        substring: String,
        case_sensitive: bool,
    },
    Exists { key: String },
    /// Values under `key` were written with `cardinality`
    Cardinality { key: String, cardinality: Cardinality },
    /// Some vertex property under `key` carries `meta_key`, optionally with
    /// the given value
    MetaProperty {
        key: String,
        meta_key: String,
        meta_value: Option<PropertyValue>,
    },
    And(Vec<PropertyPredicate>),
}

impl PropertyPredicate {
    pub fn exact(key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        PropertyPredicate::Exact {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn range(
        key: impl Into<String>,
        min: Option<PropertyValue>,
        max: Option<PropertyValue>,
        include_min: bool,
        include_max: bool,
    ) -> Self {
        PropertyPredicate::Range {
            key: key.into(),
            min,
            max,
            include_min,
            include_max,
        }
    }

    pub fn greater_than(key: impl Into<String>, value: impl Into<PropertyValue>, inclusive: bool) -> Self {
        Self::range(key, Some(value.into()), None, inclusive, false)
    }

    pub fn less_than(key: impl Into<String>, value: impl Into<PropertyValue>, inclusive: bool) -> Self {
        Self::range(key, None, Some(value.into()), false, inclusive)
    }

    pub fn contains(key: impl Into<String>, substring: impl Into<String>, case_sensitive: bool) -> Self {
        PropertyPredicate::Contains {
            key: key.into(),
            substring: substring.into(),
            case_sensitive,
        }
    }

    pub fn exists(key: impl Into<String>) -> Self {
        PropertyPredicate::Exists { key: key.into() }
    }

    pub fn cardinality(key: impl Into<String>, cardinality: Cardinality) -> Self {
        PropertyPredicate::Cardinality {
            key: key.into(),
            cardinality,
        }
    }

    pub fn meta_property(
        key: impl Into<String>,
        meta_key: impl Into<String>,
        meta_value: Option<PropertyValue>,
    ) -> Self {
        PropertyPredicate::MetaProperty {
            key: key.into(),
            meta_key: meta_key.into(),
            meta_value,
        }
    }

    pub fn and(predicates: impl IntoIterator<Item = PropertyPredicate>) -> Self {
        PropertyPredicate::And(predicates.into_iter().collect())
    }

    /// Primitive predicates of this conjunction, nested ANDs flattened
    pub fn conjuncts(&self) -> Vec<&PropertyPredicate> {
        let mut out = Vec::new();
        self.flatten_into(&mut out);
        out
    }

    fn flatten_into<'a>(&'a self, out: &mut Vec<&'a PropertyPredicate>) {
        match self {
            PropertyPredicate::And(children) => {
                for child in children {
                    child.flatten_into(out);
                }
            }
            primitive => out.push(primitive),
        }
    }

    /// The property key a primitive predicate tests
    pub fn key(&self) -> Option<&str> {
        match self {
            PropertyPredicate::Exact { key, .. }
            | PropertyPredicate::Range { key, .. }
            | PropertyPredicate::Contains { key, .. }
            | PropertyPredicate::Exists { key }
            | PropertyPredicate::Cardinality { key, .. }
            | PropertyPredicate::MetaProperty { key, .. } => Some(key),
            PropertyPredicate::And(_) => None,
        }
    }

    pub fn matches(&self, element: &dyn Element) -> bool {
        match self {
            PropertyPredicate::Exact { key, value } => element.values(key).into_iter().any(|v| v == value),
            PropertyPredicate::Range {
                key,
                min,
                max,
                include_min,
                include_max,
            } => element
                .values(key)
                .into_iter()
                .any(|v| in_range(v, min.as_ref(), max.as_ref(), *include_min, *include_max)),
            PropertyPredicate::Contains {
                key,
                substring,
                case_sensitive,
            } => {
                let needle = if *case_sensitive {
                    substring.clone()
                } else {
                    substring.to_lowercase()
                };
                element.values(key).into_iter().filter_map(PropertyValue::as_string).any(|s| {
                    if *case_sensitive {
                        s.contains(&needle)
                    } else {
                        s.to_lowercase().contains(&needle)
                    }
                })
            }
            PropertyPredicate::Exists { key } => element.has_key(key),
            PropertyPredicate::Cardinality { key, cardinality } => element.cardinality(key) == Some(*cardinality),
            PropertyPredicate::MetaProperty {
                key,
                meta_key,
                meta_value,
            } => element.vertex_properties(key).iter().any(|p| match meta_value {
                Some(expected) => p.meta_value(meta_key) == Some(expected),
                None => p.has_meta(meta_key),
            }),
            PropertyPredicate::And(children) => children.iter().all(|p| p.matches(element)),
        }
    }
}

/// Whether `value` lies inside the bounds. Values not comparable with a
/// present bound never match; with no bounds any comparable value matches.
pub fn in_range(
    value: &PropertyValue,
    min: Option<&PropertyValue>,
    max: Option<&PropertyValue>,
    include_min: bool,
    include_max: bool,
) -> bool {
    if !value.is_comparable() {
        return false;
    }
    let above_min = match min {
        None => true,
        Some(bound) => match value.compare(bound) {
            Some(Ordering::Greater) => true,
            Some(Ordering::Equal) => include_min,
            _ => false,
        },
    };
    let below_max = match max {
        None => true,
        Some(bound) => match value.compare(bound) {
            Some(Ordering::Less) => true,
            Some(Ordering::Equal) => include_max,
            _ => false,
        },
    };
    above_min && below_max
}
