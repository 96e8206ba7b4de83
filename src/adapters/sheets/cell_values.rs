use serde_json::Value;

/// Text of a cell as the API returned it. Formatted values arrive as strings already;
/// anything else is stringified and nulls are empty.
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub trait IntoStringGrid {
    fn into_string_grid(self) -> Vec<Vec<String>>;
}

impl IntoStringGrid for Vec<Vec<Value>> {
    fn into_string_grid(self) -> Vec<Vec<String>> {
        self.iter()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect()
    }
}
