use google_sheets4::api::ValueRange;
use serde_json::Value;
use std::borrow::Cow;

use crate::domain::sheets::a1_notation::A1Notation;

pub trait ValueRangeFactory {
    fn from_single_cell<'a, T: Into<Cow<'a, str>>>(range: &A1Notation, cell_value: T) -> Self;
}

fn wrap_value<'a, T: Into<Cow<'a, str>>>(value: T) -> Value {
    Value::String(value.into().into_owned())
}

impl ValueRangeFactory for ValueRange {
    fn from_single_cell<'a, T: Into<Cow<'a, str>>>(range: &A1Notation, cell_value: T) -> Self {
        ValueRange {
            major_dimension: None,
            range: Some(range.to_string()),
            values: Some(vec![vec![wrap_value(cell_value)]]),
        }
    }
}
