use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;

/// Trait for types usable as OpenAI structured output.
///
/// Blanket-implemented for anything that is `JsonSchema + DeserializeOwned`.
/// OpenAI's strict mode needs three fixups over what schemars emits:
/// `additionalProperties: false` on every object, every property listed in
/// `required` (nullable ones included), and no `$ref` indirection.
pub trait StructuredOutput: JsonSchema + DeserializeOwned {
    fn openai_schema() -> serde_json::Value {
        let schema = schema_for!(Self);
        let mut value = serde_json::to_value(schema).unwrap_or_default();

        let definitions = value
            .as_object()
            .and_then(|map| map.get("definitions").cloned())
            .unwrap_or(serde_json::Value::Null);
        rewrite_for_strict_mode(&mut value, &definitions);

        if let serde_json::Value::Object(map) = &mut value {
            map.remove("definitions");
            map.remove("$schema");
        }

        value
    }
}

impl<T: JsonSchema + DeserializeOwned> StructuredOutput for T {}

/// Recursively inline `$ref`s, collapse single-entry `allOf`, force
/// `additionalProperties: false`, and mark all properties required.
fn rewrite_for_strict_mode(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(ref_path)) = map.get("$ref").cloned() {
                if let Some(def) = definitions.get(ref_path.trim_start_matches("#/definitions/")) {
                    *value = def.clone();
                    rewrite_for_strict_mode(value, definitions);
                    return;
                }
            }

            if let Some(serde_json::Value::Array(all_of)) = map.get("allOf").cloned() {
                if let [single] = all_of.as_slice() {
                    *value = single.clone();
                    rewrite_for_strict_mode(value, definitions);
                    return;
                }
            }

            if map.get("type") == Some(&serde_json::Value::String("object".to_string())) {
                map.insert("additionalProperties".to_string(), serde_json::Value::Bool(false));
                if let Some(serde_json::Value::Object(props)) = map.get("properties") {
                    let all_keys: Vec<serde_json::Value> = props
                        .keys()
                        .map(|k| serde_json::Value::String(k.clone()))
                        .collect();
                    map.insert("required".to_string(), serde_json::Value::Array(all_keys));
                }
            }

            for (_, v) in map.iter_mut() {
                rewrite_for_strict_mode(v, definitions);
            }
        }
        serde_json::Value::Array(arr) => {
            for item in arr.iter_mut() {
                rewrite_for_strict_mode(item, definitions);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;

    #[derive(Deserialize, JsonSchema)]
    struct Extraction {
        subject: String,
        tags: Vec<String>,
        note: Option<String>,
    }

    #[test]
    fn strict_schema_shape() {
        let schema = Extraction::openai_schema();
        let obj = schema.as_object().unwrap();

        assert!(!obj.contains_key("$schema"));
        assert!(!obj.contains_key("definitions"));
        assert_eq!(obj.get("additionalProperties"), Some(&serde_json::Value::Bool(false)));

        let required: Vec<&str> = obj
            .get("required")
            .and_then(|r| r.as_array())
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"subject"));
        assert!(required.contains(&"tags"));
        // Nullable fields still listed as required in strict mode.
        assert!(required.contains(&"note"));
    }

    #[test]
    fn nested_types_are_inlined() {
        #[derive(Deserialize, JsonSchema)]
        struct Inner {
            name: String,
        }

        #[derive(Deserialize, JsonSchema)]
        struct Outer {
            inner: Inner,
        }

        let schema = Outer::openai_schema();
        let schema_str = serde_json::to_string(&schema).unwrap();
        assert!(!schema_str.contains("$ref"));
    }
}
