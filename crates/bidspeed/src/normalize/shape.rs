//! Declarative shape schemas and the default-filling pass driven by them.
//!
//! A [`Shape`] describes what a JSON value is expected to look like. The
//! [`Shape::apply`] pass never fails: anything that does not fit is replaced
//! by the shape's default, and anything already normalized comes back
//! unchanged. Object keys outside the declared fields, alias keys included,
//! are carried through untouched so the artifact can be posted back to the
//! service in the form it arrived.

use serde_json::{Map, Number, Value};

/// Expected form of a JSON value.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// Object with a fixed set of fields. Other keys are kept as they are.
    Object(&'static [Field]),
    /// Ordered sequence. Items of the wrong kind are dropped.
    Array(&'static Shape),
    /// Like `Array`, with duplicate items removed (first occurrence wins).
    Set(&'static Shape),
    /// String-keyed mapping with uniform values.
    Map(&'static Shape),
    /// String with the given default.
    Text(&'static str),
    /// String or null.
    OptionalText,
    /// Non-negative integer, defaults to 0.
    Integer,
    /// Finite number, defaults to 0.
    Number,
    /// One of a fixed set of canonical strings.
    Choice {
        variants: &'static [Variant],
        default: &'static str,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    /// Alternate wire names, consulted in order when `name` is absent.
    pub aliases: &'static [&'static str],
    pub shape: Shape,
}

#[derive(Debug, Clone, Copy)]
pub struct Variant {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

impl Shape {
    /// Coerces `raw` into this shape.
    pub fn apply(&self, raw: &Value) -> Value {
        match self {
            Shape::Object(fields) => apply_object(fields, raw),
            Shape::Array(item) => Value::Array(apply_items(item, raw)),
            Shape::Set(item) => {
                let mut unique: Vec<Value> = Vec::new();
                for value in apply_items(item, raw) {
                    if !unique.contains(&value) {
                        unique.push(value);
                    }
                }
                Value::Array(unique)
            }
            Shape::Map(value_shape) => match raw {
                Value::Object(entries) => Value::Object(
                    entries
                        .iter()
                        .filter(|(_, v)| value_shape.accepts(v))
                        .map(|(k, v)| (k.clone(), value_shape.apply(v)))
                        .collect(),
                ),
                _ => Value::Object(Map::new()),
            },
            Shape::Text(default) => {
                Value::String(scalar_text(raw).unwrap_or_else(|| (*default).to_string()))
            }
            Shape::OptionalText => scalar_text(raw).map(Value::String).unwrap_or(Value::Null),
            Shape::Integer => Value::Number(Number::from(coerce_integer(raw))),
            Shape::Number => Number::from_f64(coerce_number(raw))
                .map(Value::Number)
                .unwrap_or_else(|| Value::Number(Number::from(0))),
            Shape::Choice { variants, default } => {
                let chosen = raw
                    .as_str()
                    .and_then(|s| match_variant(*variants, s))
                    .unwrap_or(*default);
                Value::String(chosen.to_string())
            }
        }
    }

    /// Whether `raw` is of a kind this shape can take as a collection item.
    fn accepts(&self, raw: &Value) -> bool {
        match self {
            Shape::Object(_) | Shape::Map(_) => raw.is_object(),
            Shape::Array(_) | Shape::Set(_) => raw.is_array(),
            Shape::Text(_) | Shape::OptionalText => {
                raw.is_string() || raw.is_number() || raw.is_boolean()
            }
            Shape::Integer | Shape::Number => {
                raw.is_number() || raw.as_str().and_then(parse_numeric).is_some()
            }
            Shape::Choice { .. } => raw.is_string(),
        }
    }
}

fn apply_object(fields: &[Field], raw: &Value) -> Value {
    let source = raw.as_object();
    let mut out = source.cloned().unwrap_or_default();
    for field in fields {
        let found = source.and_then(|obj| {
            std::iter::once(field.name)
                .chain(field.aliases.iter().copied())
                .find_map(|key| obj.get(key))
        });
        let value = field.shape.apply(found.unwrap_or(&Value::Null));
        out.insert(field.name.to_string(), value);
    }
    Value::Object(out)
}

fn apply_items(item: &Shape, raw: &Value) -> Vec<Value> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter(|v| item.accepts(v))
            .map(|v| item.apply(v))
            .collect(),
        _ => Vec::new(),
    }
}

fn scalar_text(raw: &Value) -> Option<String> {
    match raw {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn parse_numeric(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

fn coerce_number(raw: &Value) -> f64 {
    let parsed = match raw {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric(s),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}

fn coerce_integer(raw: &Value) -> u64 {
    if let Some(n) = raw.as_u64() {
        return n.min(u64::from(u32::MAX));
    }
    let n = coerce_number(raw);
    if n <= 0.0 {
        0
    } else {
        // Saturating float-to-int cast.
        (n.trunc() as u64).min(u64::from(u32::MAX))
    }
}

fn match_variant(variants: &'static [Variant], raw: &str) -> Option<&'static str> {
    let needle = raw.trim();
    variants
        .iter()
        .find(|v| {
            v.canonical.eq_ignore_ascii_case(needle) || v.aliases.iter().any(|a| *a == needle)
        })
        .map(|v| v.canonical)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ITEM: Shape = Shape::Object(&[
        Field {
            name: "label",
            aliases: &["名称"],
            shape: Shape::Text(""),
        },
        Field {
            name: "count",
            aliases: &[],
            shape: Shape::Integer,
        },
    ]);

    const LEVEL: Shape = Shape::Choice {
        variants: &[
            Variant {
                canonical: "high",
                aliases: &["高"],
            },
            Variant {
                canonical: "low",
                aliases: &[],
            },
        ],
        default: "low",
    };

    #[test]
    fn test_object_fills_missing_fields_and_keeps_unknown_keys() {
        let out = ITEM.apply(&json!({"extra": {"nested": [1]}}));
        assert_eq!(out, json!({"label": "", "count": 0, "extra": {"nested": [1]}}));
    }

    #[test]
    fn test_object_reads_aliases_and_keeps_the_wire_key() {
        let out = ITEM.apply(&json!({"名称": "server", "count": 3}));
        assert_eq!(out, json!({"label": "server", "count": 3, "名称": "server"}));
    }

    #[test]
    fn test_declared_name_wins_over_alias() {
        let out = ITEM.apply(&json!({"label": "switch", "名称": "server"}));
        assert_eq!(out["label"], "switch");
        assert_eq!(ITEM.apply(&out), out);
    }

    #[test]
    fn test_non_object_becomes_default_object() {
        assert_eq!(ITEM.apply(&json!("nope")), json!({"label": "", "count": 0}));
        assert_eq!(ITEM.apply(&Value::Null), json!({"label": "", "count": 0}));
    }

    #[test]
    fn test_array_drops_items_of_the_wrong_kind() {
        let shape = Shape::Array(&ITEM);
        let out = shape.apply(&json!([{"label": "a"}, "b", 4, {"count": 2}]));
        assert_eq!(
            out,
            json!([{"label": "a", "count": 0}, {"label": "", "count": 2}])
        );
    }

    #[test]
    fn test_array_default_when_not_an_array() {
        assert_eq!(Shape::Array(&ITEM).apply(&json!({})), json!([]));
    }

    #[test]
    fn test_set_removes_duplicates_in_order() {
        let shape = Shape::Set(&Shape::Text(""));
        let out = shape.apply(&json!(["Nginx", "Kong", "Nginx", null]));
        assert_eq!(out, json!(["Nginx", "Kong"]));
    }

    #[test]
    fn test_integer_coercion() {
        assert_eq!(Shape::Integer.apply(&json!(12)), json!(12));
        assert_eq!(Shape::Integer.apply(&json!("12")), json!(12));
        assert_eq!(Shape::Integer.apply(&json!(12.9)), json!(12));
        assert_eq!(Shape::Integer.apply(&json!(-4)), json!(0));
        assert_eq!(Shape::Integer.apply(&json!("many")), json!(0));
    }

    #[test]
    fn test_number_coercion() {
        assert_eq!(Shape::Number.apply(&json!(7.5)), json!(7.5));
        assert_eq!(Shape::Number.apply(&json!(" 8 ")), json!(8.0));
        assert_eq!(Shape::Number.apply(&json!("95%")), json!(0.0));
        assert_eq!(Shape::Number.apply(&json!("NaN")), json!(0.0));
    }

    #[test]
    fn test_text_coercion() {
        assert_eq!(Shape::Text("x").apply(&json!(15)), json!("15"));
        assert_eq!(Shape::Text("x").apply(&json!([1])), json!("x"));
        assert_eq!(Shape::OptionalText.apply(&Value::Null), Value::Null);
    }

    #[test]
    fn test_choice_maps_aliases_and_defaults() {
        assert_eq!(LEVEL.apply(&json!("HIGH")), json!("high"));
        assert_eq!(LEVEL.apply(&json!("高")), json!("high"));
        assert_eq!(LEVEL.apply(&json!("urgent")), json!("low"));
        assert_eq!(LEVEL.apply(&json!(1)), json!("low"));
    }

    #[test]
    fn test_map_keeps_only_acceptable_values() {
        let shape = Shape::Map(&Shape::Text(""));
        let out = shape.apply(&json!({"deadline": "2025-12-15", "bad": {}}));
        assert_eq!(out, json!({"deadline": "2025-12-15"}));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let shape = Shape::Array(&ITEM);
        let raw = json!([{"名称": 1, "count": "3.7"}, [], {"label": null}]);
        let once = shape.apply(&raw);
        assert_eq!(shape.apply(&once), once);
    }
}
