//! Declarative JSON schema validation
//!
//! Validates decoded `serde_json::Value` trees against schemas built
//! with `Schema` / `FieldSchema`. Both inbound request bodies and
//! model-produced JSON go through this before anything trusts them.
//!
//! Malformed input is a normal outcome, not an exception: validation
//! never panics, and it aggregates every violation (recursing through
//! nested objects and array items) instead of stopping at the first.

use serde_json::Value;

/// One failed constraint: where it failed and why
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Violation {
    /// Dotted path to the offending field, e.g. `basics.location` or
    /// `policy_violations[2].confidence`
    pub path: String,
    pub reason: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Object-level check for invariants spanning multiple fields.
///
/// Receives the object value and its path; returns any violations found.
pub type CrossCheck = fn(&Value, &str) -> Vec<Violation>;

/// Expected JSON shape for one field
#[derive(Debug, Clone)]
enum FieldKind {
    String,
    Number,
    Integer,
    Boolean,
    /// Object with a fixed field layout
    Object(Schema),
    /// Object with free-form keys whose values share one schema
    Map(Box<FieldSchema>),
    /// Array whose items share one schema
    Array(Box<FieldSchema>),
    Any,
}

/// Constraints on a single field
#[derive(Debug, Clone)]
pub struct FieldSchema {
    kind: FieldKind,
    min_length: Option<usize>,
    max_length: Option<usize>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    allowed: Option<Vec<String>>,
}

impl FieldSchema {
    fn of(kind: FieldKind) -> Self {
        Self {
            kind,
            min_length: None,
            max_length: None,
            minimum: None,
            maximum: None,
            allowed: None,
        }
    }

    pub fn string() -> Self {
        Self::of(FieldKind::String)
    }

    pub fn number() -> Self {
        Self::of(FieldKind::Number)
    }

    pub fn integer() -> Self {
        Self::of(FieldKind::Integer)
    }

    pub fn boolean() -> Self {
        Self::of(FieldKind::Boolean)
    }

    pub fn object(schema: Schema) -> Self {
        Self::of(FieldKind::Object(schema))
    }

    pub fn map_of(values: FieldSchema) -> Self {
        Self::of(FieldKind::Map(Box::new(values)))
    }

    pub fn array(items: FieldSchema) -> Self {
        Self::of(FieldKind::Array(Box::new(items)))
    }

    pub fn any() -> Self {
        Self::of(FieldKind::Any)
    }

    /// Minimum length for strings and arrays
    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    /// Maximum length for strings and arrays
    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    /// Inclusive lower bound for numeric fields
    pub fn minimum(mut self, v: f64) -> Self {
        self.minimum = Some(v);
        self
    }

    /// Inclusive upper bound for numeric fields
    pub fn maximum(mut self, v: f64) -> Self {
        self.maximum = Some(v);
        self
    }

    /// Restrict a string field to a closed set of values
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|s| s.to_string()).collect());
        self
    }

    fn check(&self, value: &Value, path: &str, out: &mut Vec<Violation>) {
        match (&self.kind, value) {
            (FieldKind::String, Value::String(s)) => {
                if let Some(min) = self.min_length {
                    if s.chars().count() < min {
                        out.push(Violation::new(
                            path,
                            format!("string shorter than minimum length {}", min),
                        ));
                    }
                }
                if let Some(max) = self.max_length {
                    if s.chars().count() > max {
                        out.push(Violation::new(
                            path,
                            format!("string longer than maximum length {}", max),
                        ));
                    }
                }
                if let Some(allowed) = &self.allowed {
                    if !allowed.iter().any(|a| a == s) {
                        out.push(Violation::new(
                            path,
                            format!("value '{}' not in allowed set [{}]", s, allowed.join(", ")),
                        ));
                    }
                }
            }
            (FieldKind::Number, Value::Number(n)) | (FieldKind::Integer, Value::Number(n)) => {
                if matches!(self.kind, FieldKind::Integer) && !n.is_i64() && !n.is_u64() {
                    out.push(Violation::new(path, "expected integer, got fraction"));
                    return;
                }
                let num = n.as_f64().unwrap_or(0.0);
                if let Some(min) = self.minimum {
                    if num < min {
                        out.push(Violation::new(
                            path,
                            format!("value {} below minimum {}", num, min),
                        ));
                    }
                }
                if let Some(max) = self.maximum {
                    if num > max {
                        out.push(Violation::new(
                            path,
                            format!("value {} above maximum {}", num, max),
                        ));
                    }
                }
            }
            (FieldKind::Boolean, Value::Bool(_)) => {}
            (FieldKind::Object(schema), Value::Object(_)) => {
                schema.check_at(value, path, out);
            }
            (FieldKind::Map(values), Value::Object(map)) => {
                for (key, item) in map {
                    values.check(item, &join(path, key), out);
                }
            }
            (FieldKind::Array(items), Value::Array(list)) => {
                if let Some(min) = self.min_length {
                    if list.len() < min {
                        out.push(Violation::new(
                            path,
                            format!("array shorter than minimum length {}", min),
                        ));
                    }
                }
                if let Some(max) = self.max_length {
                    if list.len() > max {
                        out.push(Violation::new(
                            path,
                            format!("array longer than maximum length {}", max),
                        ));
                    }
                }
                for (idx, item) in list.iter().enumerate() {
                    items.check(item, &format!("{}[{}]", path, idx), out);
                }
            }
            (FieldKind::Any, _) => {}
            (_, found) => {
                out.push(Violation::new(
                    path,
                    format!("expected {}, got {}", self.type_name(), json_type(found)),
                ));
            }
        }
    }

    fn type_name(&self) -> &'static str {
        match &self.kind {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Integer => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Object(_) | FieldKind::Map(_) => "object",
            FieldKind::Array(_) => "array",
            FieldKind::Any => "any",
        }
    }
}

/// Schema for a JSON object with a fixed field layout
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<(String, FieldSchema, bool)>,
    checks: Vec<CrossCheck>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required field
    pub fn field(mut self, name: &str, schema: FieldSchema) -> Self {
        self.fields.push((name.to_string(), schema, true));
        self
    }

    /// Add an optional field (validated only when present and non-null)
    pub fn optional_field(mut self, name: &str, schema: FieldSchema) -> Self {
        self.fields.push((name.to_string(), schema, false));
        self
    }

    /// Add an object-level cross-field check
    pub fn check(mut self, check: CrossCheck) -> Self {
        self.checks.push(check);
        self
    }

    /// Validate a value, aggregating every violation found
    pub fn validate(&self, value: &Value) -> Result<(), Vec<Violation>> {
        let mut out = Vec::new();
        self.check_at(value, "", &mut out);
        if out.is_empty() {
            Ok(())
        } else {
            Err(out)
        }
    }

    fn check_at(&self, value: &Value, path: &str, out: &mut Vec<Violation>) {
        let map = match value {
            Value::Object(map) => map,
            other => {
                out.push(Violation::new(
                    if path.is_empty() { "$" } else { path },
                    format!("expected object, got {}", json_type(other)),
                ));
                return;
            }
        };

        for (name, field, required) in &self.fields {
            let field_path = join(path, name);
            match map.get(name) {
                Some(Value::Null) | None => {
                    if *required {
                        out.push(Violation::new(field_path, "required field is missing"));
                    }
                }
                Some(found) => field.check(found, &field_path, out),
            }
        }

        for check in &self.checks {
            out.extend(check(value, path));
        }
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person_schema() -> Schema {
        Schema::new()
            .field("name", FieldSchema::string().min_length(2))
            .field("age", FieldSchema::integer().minimum(0.0).maximum(120.0))
            .optional_field("tags", FieldSchema::array(FieldSchema::string()))
    }

    #[test]
    fn test_valid_object_passes() {
        let value = json!({"name": "Ada", "age": 36, "tags": ["x"]});
        assert!(person_schema().validate(&value).is_ok());
    }

    #[test]
    fn test_missing_required_field_reported_by_path() {
        let value = json!({"age": 36});
        let violations = person_schema().validate(&value).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "name");
        assert_eq!(violations[0].reason, "required field is missing");
    }

    #[test]
    fn test_all_violations_aggregated_not_just_first() {
        let value = json!({"name": "A", "age": 200, "tags": [1, 2]});
        let violations = person_schema().validate(&value).unwrap_err();
        let paths: Vec<&str> = violations.iter().map(|v| v.path.as_str()).collect();
        assert!(paths.contains(&"name"));
        assert!(paths.contains(&"age"));
        assert!(paths.contains(&"tags[0]"));
        assert!(paths.contains(&"tags[1]"));
    }

    #[test]
    fn test_nested_object_paths() {
        let schema = Schema::new().field(
            "basics",
            FieldSchema::object(
                Schema::new()
                    .field("location", FieldSchema::string().min_length(1))
                    .field("datetime", FieldSchema::string()),
            ),
        );
        let value = json!({"basics": {"datetime": "2024-01-01"}});
        let violations = schema.validate(&value).unwrap_err();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].path, "basics.location");
    }

    #[test]
    fn test_enum_restricted_to_closed_set() {
        let schema = Schema::new().field(
            "risk_level",
            FieldSchema::string().one_of(&["low", "medium", "high", "critical"]),
        );
        assert!(schema.validate(&json!({"risk_level": "high"})).is_ok());
        let violations = schema
            .validate(&json!({"risk_level": "catastrophic"}))
            .unwrap_err();
        assert_eq!(violations[0].path, "risk_level");
    }

    #[test]
    fn test_numeric_bounds_are_inclusive() {
        let schema = Schema::new().field(
            "confidence",
            FieldSchema::number().minimum(0.0).maximum(1.0),
        );
        assert!(schema.validate(&json!({"confidence": 0.0})).is_ok());
        assert!(schema.validate(&json!({"confidence": 1.0})).is_ok());
        assert!(schema.validate(&json!({"confidence": 1.01})).is_err());
        assert!(schema.validate(&json!({"confidence": -0.01})).is_err());
    }

    #[test]
    fn test_map_of_values() {
        let schema = Schema::new().field(
            "messages",
            FieldSchema::map_of(FieldSchema::string().min_length(1)),
        );
        assert!(schema
            .validate(&json!({"messages": {"A": "hello", "B": "hi"}}))
            .is_ok());
        let violations = schema
            .validate(&json!({"messages": {"A": ""}}))
            .unwrap_err();
        assert_eq!(violations[0].path, "messages.A");
    }

    #[test]
    fn test_cross_check_runs_on_object() {
        fn even_count(value: &Value, path: &str) -> Vec<Violation> {
            let n = value
                .get("items")
                .and_then(|v| v.as_array())
                .map(|a| a.len())
                .unwrap_or(0);
            if n % 2 != 0 {
                vec![Violation::new(join(path, "items"), "expected even count")]
            } else {
                Vec::new()
            }
        }
        let schema = Schema::new()
            .field("items", FieldSchema::array(FieldSchema::string()))
            .check(even_count);
        assert!(schema.validate(&json!({"items": ["a", "b"]})).is_ok());
        assert!(schema.validate(&json!({"items": ["a"]})).is_err());
    }

    #[test]
    fn test_non_object_root_is_a_violation_not_a_panic() {
        let violations = person_schema().validate(&json!("not an object")).unwrap_err();
        assert_eq!(violations[0].path, "$");
    }

    #[test]
    fn test_null_required_field_is_missing() {
        let value = json!({"name": null, "age": 30});
        let violations = person_schema().validate(&value).unwrap_err();
        assert_eq!(violations[0].path, "name");
    }
}
