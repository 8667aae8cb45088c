//! Name-based access to record fields.
//!
//! Field names are matched after upper-casing their first letter on both
//! sides, so `userId`, `UserId` and the declared name all address the same
//! field. Unknown names are ignored: binding never fails because of an extra
//! option.

use serde_json::{Map, Value};
use tracing::debug;

use crate::record::{FieldValue, Record};
use crate::value::TEXT_KEY;

/// Compares a requested name with a declared field name, ignoring the case of
/// the first letter.
pub fn same_field(requested: &str, declared: &str) -> bool {
    let mut requested_chars = requested.chars();
    let mut declared_chars = declared.chars();

    match (requested_chars.next(), declared_chars.next()) {
        (Some(a), Some(b)) => {
            a.to_uppercase().eq(b.to_uppercase()) && requested_chars.eq(declared_chars)
        }
        (None, None) => true,
        _ => false,
    }
}

/// Sets a field by name, see [`Record::set_field`].
pub fn set<R: Record>(record: &mut R, name: &str, value: Value) -> bool {
    record.set_field(name, &value)
}

/// Reads a field by name, see [`Record::get_field`].
pub fn get<R: Record>(record: &R, name: &str) -> Option<Value> {
    record.get_field(name)
}

/// Copies every entry of `bag` matching a field of `record`.
///
/// Returns the number of fields actually set.
pub fn bind<R: Record>(record: &mut R, bag: &Map<String, Value>) -> usize {
    let mut bound = 0;

    for (name, value) in bag {
        if record.set_field(name, value) {
            bound += 1;
        } else {
            debug!(record = R::TYPE_NAME, field = %name, "option not bound");
        }
    }

    bound
}

/// Builds a record from a decoded value.
///
/// * `null` gives the default record
/// * an object is bound field by field
/// * an array fills the sequence of a carrier
/// * a scalar fills the text content, when the record has one
pub fn populate<R: Record>(value: &Value) -> Option<R> {
    let mut record = R::default();

    match value {
        Value::Null => {}
        Value::Object(map) => {
            bind(&mut record, map);
        }
        Value::Array(_) => {
            let attribute = R::array_attribute()?;
            if !record.set_field(attribute, value) {
                return None;
            }
        }
        scalar => {
            if !record.set_field(TEXT_KEY, scalar) {
                return None;
            }
        }
    }

    Some(record)
}

/// Appends one raw item to the sequence carried by `record`.
pub fn append<R: Record>(record: &mut R, item: Value) -> bool {
    let Some(attribute) = R::array_attribute() else {
        return false;
    };

    let mut items = match record.get_field(attribute) {
        Some(Value::Array(items)) => items,
        _ => Vec::new(),
    };
    items.push(item);

    record.set_field(attribute, &Value::Array(items))
}

/// Decodes `value` into `slot`, leaving `slot` untouched on failure.
#[doc(hidden)]
pub fn assign<T: FieldValue>(slot: &mut T, value: &Value) -> bool {
    match T::decode(value) {
        Some(decoded) => {
            *slot = decoded;
            true
        }
        None => {
            debug!(
                value = %value,
                expected = std::any::type_name::<T>(),
                "value does not convert"
            );
            false
        }
    }
}

/// Inserts `value` under `key` unless it is `null`.
#[doc(hidden)]
pub fn emit(map: &mut Map<String, Value>, key: &str, value: Value) {
    if !value.is_null() {
        map.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wsdl_record;
    use serde_json::json;

    wsdl_record! {
        pub struct Account = "AccountType" {
            elem "userId" => user_id: Option<String>,
            elem "creditLimit" => credit_limit: Option<u32>,
            attr "type" => kind: Option<String>,
        }
    }

    wsdl_record! {
        pub struct Numbers = "NumbersType" {
            array "number" => numbers: String,
        }
    }

    wsdl_record! {
        pub struct Tagged = "TaggedType" {
            attr "uid" => uid: Option<u32>,
            text "number" => number: String,
        }
    }

    #[test]
    fn first_letter_case_is_ignored() {
        assert!(same_field("userId", "userId"));
        assert!(same_field("UserId", "userId"));
        assert!(same_field("userId", "UserId"));
        assert!(!same_field("userid", "userId"));
        assert!(!same_field("user", "userId"));
        assert!(same_field("", ""));
    }

    #[test]
    fn set_then_get() {
        let mut account = Account::default();
        assert!(set(&mut account, "UserId", json!("alice")));
        assert_eq!(get(&account, "userId"), Some(json!("alice")));
        assert_eq!(account.user_id.as_deref(), Some("alice"));
    }

    #[test]
    fn unset_fields_read_as_null() {
        let account = Account::default();
        assert_eq!(get(&account, "creditLimit"), Some(Value::Null));
        assert_eq!(get(&account, "missing"), None);
    }

    #[test]
    fn bind_ignores_unknown_names() {
        let mut account = Account::default();
        let bag = json!({ "userId": "bob", "colour": "blue", "CreditLimit": "10" });
        let bound = bind(&mut account, bag.as_object().unwrap());

        assert_eq!(bound, 2);
        assert_eq!(account.user_id.as_deref(), Some("bob"));
        assert_eq!(account.credit_limit, Some(10));
    }

    #[test]
    fn bad_values_keep_the_previous_content() {
        let mut account = Account::default();
        assert!(set(&mut account, "creditLimit", json!(5)));
        assert!(!set(&mut account, "creditLimit", json!("lots")));
        assert_eq!(account.credit_limit, Some(5));
    }

    #[test]
    fn attributes_answer_to_both_names() {
        let mut account = Account::default();
        assert!(set(&mut account, "@type", json!("daily")));
        assert_eq!(get(&account, "type"), Some(json!("daily")));
    }

    #[test]
    fn populate_handles_every_shape() {
        let empty: Account = populate(&Value::Null).unwrap();
        assert_eq!(empty, Account::default());

        let numbers: Numbers = populate(&json!(["1", "2"])).unwrap();
        assert_eq!(numbers.numbers, vec!["1", "2"]);
        assert!(populate::<Account>(&json!(["1"])).is_none());

        let tagged: Tagged = populate(&json!("61400000000")).unwrap();
        assert_eq!(tagged.number, "61400000000");
        assert!(populate::<Account>(&json!("x")).is_none());
    }

    #[test]
    fn append_grows_the_sequence() {
        let mut numbers = Numbers::default();
        assert!(append(&mut numbers, json!("1")));
        assert!(append(&mut numbers, json!("2")));
        assert_eq!(numbers.numbers, vec!["1", "2"]);

        let mut account = Account::default();
        assert!(!append(&mut account, json!("1")));
    }
}
