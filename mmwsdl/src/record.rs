//! Records: typed structures mapped onto wire messages.
//!
//! A record is declared with [`wsdl_record!`](crate::wsdl_record), which
//! generates the struct together with its field table. The table drives both
//! the [`binder`](crate::binder) (get/set by name) and wire serialization.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};
use std::fmt::Debug;

use crate::binder;
use crate::sequence::SequenceAdapter;

/// Conversion between a field type and the untyped value tree.
///
/// Decoding is lenient: the wire carries everything as text, so numbers and
/// booleans are also accepted in their string form. `None` means the value
/// cannot be converted.
pub trait FieldValue: Sized {
    fn decode(value: &Value) -> Option<Self>;
    fn encode(&self) -> Value;

    /// Value of an element present on the wire without content (`null` in
    /// the tree). Only sequence carriers have one: an empty carrier.
    fn decode_empty() -> Option<Self> {
        None
    }
}

/// A structured value with a fixed set of named fields.
pub trait Record: Default + Clone + Debug + SequenceAdapter {
    /// Name of the type in the service schema
    const TYPE_NAME: &'static str;

    /// Declared field names, as used on the wire and by the binder
    fn field_names() -> &'static [&'static str];

    /// The field carrying the sequence, for sequence carriers
    fn array_attribute() -> Option<&'static str> {
        None
    }

    /// Reads a field by name. `None` when no field matches the name,
    /// `Some(Value::Null)` when the field exists but is unset.
    fn get_field(&self, name: &str) -> Option<Value>;

    /// Writes a field by name. Returns `false` when no field matches the name
    /// or the value does not convert to the field type.
    fn set_field(&mut self, name: &str, value: &Value) -> bool;

    /// Wire form of the record.
    fn to_value(&self) -> Value;

    /// Builds a record from a value tree, see [`binder::populate`].
    fn from_value(value: &Value) -> Option<Self> {
        binder::populate(value)
    }

    /// Builds a record from an option bag. Unknown names are ignored.
    fn from_bag(bag: &Map<String, Value>) -> Self {
        let mut record = Self::default();
        binder::bind(&mut record, bag);
        record
    }
}

impl FieldValue for Value {
    fn decode(value: &Value) -> Option<Self> {
        Some(value.clone())
    }

    fn encode(&self) -> Value {
        self.clone()
    }
}

impl FieldValue for String {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Object(map) => map.get(crate::value::TEXT_KEY).and_then(String::decode),
            _ => None,
        }
    }

    fn encode(&self) -> Value {
        Value::String(self.clone())
    }
}

impl FieldValue for bool {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            Value::Number(n) => n.as_i64().map(|n| n != 0),
            Value::String(s) => match s.trim() {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn encode(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! impl_integer_field {
    ($($ty:ty),*) => {
        $(
            impl FieldValue for $ty {
                fn decode(value: &Value) -> Option<Self> {
                    match value {
                        Value::Number(n) => n
                            .as_i64()
                            .and_then(|n| <$ty>::try_from(n).ok())
                            .or_else(|| n.as_u64().and_then(|n| <$ty>::try_from(n).ok())),
                        Value::String(s) => s.trim().parse().ok(),
                        _ => None,
                    }
                }

                fn encode(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

impl_integer_field!(i8, i16, i32, i64, u8, u16, u32, u64);

impl FieldValue for f64 {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn encode(&self) -> Value {
        serde_json::Number::from_f64(*self)
            .map(Value::Number)
            .unwrap_or(Value::Null)
    }
}

/// `xsd:dateTime`, exchanged as RFC 3339
impl FieldValue for DateTime<Utc> {
    fn decode(value: &Value) -> Option<Self> {
        let text = value.as_str()?;
        DateTime::parse_from_rfc3339(text.trim())
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }

    fn encode(&self) -> Value {
        Value::String(self.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(T::decode_empty()),
            other => T::decode(other).map(Some),
        }
    }

    fn encode(&self) -> Value {
        self.as_ref().map_or(Value::Null, T::encode)
    }
}

/// Sequences also accept a lone element: a list holding a single entry comes
/// back from the wire as that entry alone.
impl<T: FieldValue> FieldValue for Vec<T> {
    fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Vec::new()),
            Value::Array(items) => items.iter().map(T::decode).collect(),
            single => T::decode(single).map(|item| vec![item]),
        }
    }

    fn encode(&self) -> Value {
        Value::Array(self.iter().map(T::encode).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn strings_accept_scalars_and_text_nodes() {
        assert_eq!(String::decode(&json!("a")), Some("a".to_string()));
        assert_eq!(String::decode(&json!(12)), Some("12".to_string()));
        assert_eq!(
            String::decode(&json!({ "@uid": "1", "$text": "614" })),
            Some("614".to_string())
        );
        assert_eq!(String::decode(&json!(["a"])), None);
    }

    #[test]
    fn integers_accept_their_text_form() {
        assert_eq!(u32::decode(&json!("450")), Some(450));
        assert_eq!(u32::decode(&json!(-1)), None);
        assert_eq!(i64::decode(&json!(-1)), Some(-1));
        assert_eq!(u8::decode(&json!(300)), None);
    }

    #[test]
    fn booleans_accept_xsd_lexical_forms() {
        assert_eq!(bool::decode(&json!("true")), Some(true));
        assert_eq!(bool::decode(&json!("0")), Some(false));
        assert_eq!(bool::decode(&json!("maybe")), None);
    }

    #[test]
    fn dates_use_rfc3339() {
        let date = Utc.with_ymd_and_hms(2014, 5, 1, 10, 30, 0).unwrap();
        assert_eq!(date.encode(), json!("2014-05-01T10:30:00Z"));
        assert_eq!(DateTime::<Utc>::decode(&json!("2014-05-01T20:30:00+10:00")), Some(date));
    }

    #[test]
    fn options_map_null_to_none() {
        assert_eq!(Option::<u32>::decode(&Value::Null), Some(None));
        assert_eq!(Option::<u32>::decode(&json!("5")), Some(Some(5)));
        assert_eq!(Option::<u32>::decode(&json!("x")), None);
        assert_eq!(Option::<u32>::None.encode(), Value::Null);
    }

    #[test]
    fn sequences_wrap_single_elements() {
        assert_eq!(Vec::<u32>::decode(&json!(["1", "2"])), Some(vec![1, 2]));
        assert_eq!(Vec::<u32>::decode(&json!("7")), Some(vec![7]));
        assert_eq!(Vec::<u32>::decode(&Value::Null), Some(vec![]));
        assert_eq!(Vec::<u32>::decode(&json!(["1", "x"])), None);
    }
}
