use crate::ast::{Element, Kind, Schema, Tuple};
use crate::value::Value;

use super::filter;

pub fn elem(schema: Schema) -> Element {
    Element { schema, optional: false }
}

pub fn optional_element(schema: Schema) -> Element {
    Element { schema, optional: true }
}

pub fn tuple(elements: Vec<Element>) -> Schema {
    Schema::new(Kind::Tuple(Tuple { elements, rest: None }))
}

pub fn tuple_with_rest(elements: Vec<Element>, rest: Schema) -> Schema {
    Schema::new(Kind::Tuple(Tuple { elements, rest: Some(rest) }))
}

pub fn array(item: Schema) -> Schema {
    tuple_with_rest(Vec::new(), item)
}

pub fn non_empty_array(item: Schema) -> Schema {
    tuple_with_rest(vec![elem(item.clone())], item)
}

// -------------------------------- Filters --------------------------------- //

fn len_filter<F>(from: &Schema, description: String, check: F) -> Schema
where
    F: Fn(usize) -> bool + Send + Sync + 'static,
{
    filter(from, description, move |v| v.as_array().is_some_and(|xs| check(xs.len())))
}

pub fn min_items(from: &Schema, n: usize) -> Schema {
    len_filter(from, format!("an array of at least {n} item(s)"), move |len| len >= n)
        .title(format!("minItems({n})"))
}

pub fn max_items(from: &Schema, n: usize) -> Schema {
    len_filter(from, format!("an array of at most {n} item(s)"), move |len| len <= n)
        .title(format!("maxItems({n})"))
}

pub fn items_count(from: &Schema, n: usize) -> Schema {
    len_filter(from, format!("an array of exactly {n} item(s)"), move |len| len == n)
        .title(format!("itemsCount({n})"))
}

/// First element of an array, or `none()` when empty.
pub fn head(item: Schema) -> Schema {
    let to = super::option::option_from_self(crate::derive::type_schema(&item));
    super::transform(
        array(item),
        to,
        |v| match v {
            Value::Array(xs) => xs.into_iter().next().map_or(Value::none(), Value::some),
            other => other,
        },
        |v| match v {
            Value::Option(Some(x)) => Value::Array(vec![*x]),
            Value::Option(None) => Value::Array(Vec::new()),
            other => other,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;
    use crate::parser::{decode_either, encode_either};
    use crate::schema::{number, string};
    use serde_json::json;

    #[test]
    fn non_empty_array_requires_one_item() {
        let s = non_empty_array(string());
        assert_eq!(s.label(), "readonly [string, ...string[]]");
        let err = decode_either(&s, &Value::from(json!([])), &ParseOptions::default()).unwrap_err();
        assert_eq!(err.render(), "readonly [string, ...string[]]\n└─ [0]\n   └─ is missing");
    }

    #[test]
    fn item_count_filters() {
        let o = ParseOptions::default();
        let s = min_items(&array(number()), 2);
        assert!(decode_either(&s, &Value::from(json!([1, 2])), &o).is_ok());
        let err = decode_either(&s, &Value::from(json!([1])), &o).unwrap_err();
        assert_eq!(
            err.render(),
            "minItems(2)\n└─ Predicate refinement failure\n   └─ Expected an array of at least 2 item(s), actual [1]"
        );
        assert!(decode_either(&items_count(&array(number()), 1), &Value::from(json!([1, 2])), &o).is_err());
    }

    #[test]
    fn head_decodes_to_an_option() {
        let o = ParseOptions::default();
        let h = head(number());
        assert_eq!(decode_either(&h, &Value::from(json!([3, 4])), &o).unwrap(), Value::some(3));
        assert_eq!(decode_either(&h, &Value::from(json!([])), &o).unwrap(), Value::none());
        assert_eq!(encode_either(&h, &Value::some(3), &o).unwrap(), Value::from(json!([3])));
    }
}
