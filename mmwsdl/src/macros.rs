/// Macro pour déclarer un enregistrement WSDL
///
/// Génère la structure, son implémentation de [`Record`](crate::Record), de
/// [`FieldValue`](crate::FieldValue) (pour l'imbriquer dans un autre
/// enregistrement) et de [`SequenceAdapter`](crate::SequenceAdapter).
///
/// # Syntaxe
///
/// ```ignore
/// wsdl_record! {
///     pub struct Recipient = "RecipientType" {
///         attr "uid" => uid: Option<u32>,
///         text "number" => number: String,
///     }
/// }
///
/// // Porteur de séquence : le champ `array` vient en premier
/// wsdl_record! {
///     pub struct Recipients = "RecipientsType" {
///         array "recipient" => recipients: Recipient,
///     }
/// }
/// ```
///
/// Genres de champ :
/// * `elem` : élément enfant
/// * `attr` : attribut XML (`@nom` dans l'arbre de valeurs)
/// * `text` : contenu texte (`$text`)
/// * `array` : séquence portée, éléments répétés
#[macro_export]
macro_rules! wsdl_record {
    // Porteur de séquence
    (
        $(#[$meta:meta])*
        pub struct $name:ident = $type_name:literal {
            array $awire:literal => $afield:ident : $item:ty
            $(, $kind:ident $wire:literal => $field:ident : $ty:ty)* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            pub $afield: Vec<$item>,
            $(pub $field: $ty,)*
        }

        impl $name {
            /// Builds the carrier around `items`.
            pub fn from_items(items: Vec<$item>) -> Self {
                Self {
                    $afield: items,
                    ..Default::default()
                }
            }
        }

        impl $crate::SequenceAdapter for $name {
            type Item = $item;

            fn carried(&self) -> Option<&[$item]> {
                Some(&self.$afield)
            }

            fn carried_mut(&mut self) -> Option<&mut Vec<$item>> {
                Some(&mut self.$afield)
            }
        }

        $crate::wsdl_record!(@record $name, $type_name, Some($awire);
            array $awire => $afield $(, $kind $wire => $field)*);
    };

    // Enregistrement simple
    (
        $(#[$meta:meta])*
        pub struct $name:ident = $type_name:literal {
            $($kind:ident $wire:literal => $field:ident : $ty:ty),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $(pub $field: $ty,)*
        }

        impl $crate::SequenceAdapter for $name {
            type Item = std::convert::Infallible;

            fn carried(&self) -> Option<&[Self::Item]> {
                None
            }

            fn carried_mut(&mut self) -> Option<&mut Vec<Self::Item>> {
                None
            }
        }

        $crate::wsdl_record!(@record $name, $type_name, None;
            $($kind $wire => $field),*);
    };

    // Table des champs commune
    (@record $name:ident, $type_name:literal, $array:expr;
        $($kind:ident $wire:literal => $field:ident),* $(,)?) => {
        impl $crate::Record for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn field_names() -> &'static [&'static str] {
                &[$($wire),*]
            }

            fn array_attribute() -> Option<&'static str> {
                $array
            }

            fn get_field(&self, name: &str) -> Option<$crate::Value> {
                $(
                    if $crate::binder::same_field(name, $wire)
                        || name == $crate::wsdl_record!(@wire $kind $wire)
                    {
                        return Some($crate::FieldValue::encode(&self.$field));
                    }
                )*
                None
            }

            fn set_field(&mut self, name: &str, value: &$crate::Value) -> bool {
                $(
                    if $crate::binder::same_field(name, $wire)
                        || name == $crate::wsdl_record!(@wire $kind $wire)
                    {
                        return $crate::binder::assign(&mut self.$field, value);
                    }
                )*
                false
            }

            fn to_value(&self) -> $crate::Value {
                #[allow(unused_mut)]
                let mut map = $crate::Map::new();
                $(
                    $crate::binder::emit(
                        &mut map,
                        $crate::wsdl_record!(@wire $kind $wire),
                        $crate::FieldValue::encode(&self.$field),
                    );
                )*
                $crate::Value::Object(map)
            }
        }

        impl $crate::FieldValue for $name {
            fn decode(value: &$crate::Value) -> Option<Self> {
                <Self as $crate::Record>::from_value(value)
            }

            fn encode(&self) -> $crate::Value {
                <Self as $crate::Record>::to_value(self)
            }

            fn decode_empty() -> Option<Self> {
                <Self as $crate::Record>::array_attribute().map(|_| Self::default())
            }
        }
    };

    // Nom d'un champ dans l'arbre de valeurs
    (@wire elem $wire:literal) => { $wire };
    (@wire array $wire:literal) => { $wire };
    (@wire attr $wire:literal) => { concat!("@", $wire) };
    (@wire text $wire:literal) => { "$text" };
}

#[cfg(test)]
mod tests {
    use crate::{FieldValue, Record, SequenceAdapter, wsdl_record};
    use serde_json::{Value, json};

    wsdl_record! {
        /// Compte de test
        pub struct Account = "AccountType" {
            attr "type" => kind: Option<String>,
            attr "creditLimit" => credit_limit: Option<u32>,
            elem "owner" => owner: Option<String>,
        }
    }

    wsdl_record! {
        pub struct Entry = "EntryType" {
            attr "uid" => uid: Option<u32>,
            text "value" => value: String,
        }
    }

    wsdl_record! {
        pub struct Entries = "EntriesType" {
            array "entry" => entries: Entry,
            attr "mode" => mode: Option<String>,
        }
    }

    wsdl_record! {
        pub struct Holder = "HolderType" {
            elem "account" => account: Option<Account>,
            elem "entries" => entries: Option<Entries>,
        }
    }

    #[test]
    fn field_table_is_generated() {
        assert_eq!(Account::TYPE_NAME, "AccountType");
        assert_eq!(Account::field_names(), &["type", "creditLimit", "owner"]);
        assert_eq!(Account::array_attribute(), None);
        assert_eq!(Entries::array_attribute(), Some("entry"));
        assert_eq!(Entries::field_names(), &["entry", "mode"]);
    }

    #[test]
    fn to_value_uses_wire_names() {
        let account = Account {
            kind: Some("daily".into()),
            credit_limit: Some(500),
            owner: None,
        };

        assert_eq!(
            account.to_value(),
            json!({ "@type": "daily", "@creditLimit": 500 })
        );
    }

    #[test]
    fn nested_records_decode_from_the_wire_shape() {
        let wire = json!({
            "account": { "@type": "daily", "@creditLimit": "500", "owner": "alice" },
            "entries": {
                "@mode": "queue",
                "entry": [{ "@uid": "1", "$text": "a" }, "b"]
            }
        });

        let holder = Holder::from_value(&wire).unwrap();
        let account = holder.account.as_ref().unwrap();
        assert_eq!(account.credit_limit, Some(500));
        assert_eq!(account.owner.as_deref(), Some("alice"));

        let entries = holder.entries.as_ref().unwrap();
        assert_eq!(entries.mode.as_deref(), Some("queue"));
        assert_eq!(entries.count(), 2);
        assert_eq!(entries.first().unwrap().uid, Some(1));
        assert_eq!(entries.last().unwrap().value, "b");
    }

    #[test]
    fn single_entry_is_still_a_sequence() {
        let entries = Entries::decode(&json!({ "entry": "only" })).unwrap();
        assert_eq!(entries.count(), 1);
        assert_eq!(entries.get(0).unwrap().value, "only");
    }

    #[test]
    fn empty_carrier_element_is_an_empty_sequence() {
        let holder = Holder::from_value(&json!({ "account": null, "entries": null })).unwrap();

        assert_eq!(holder.account, None);
        let entries = holder.entries.as_ref().unwrap();
        assert!(entries.is_sequence());
        assert_eq!(entries.count(), 0);
        assert!(entries.first().is_none());
    }

    #[test]
    fn plain_array_is_adopted_by_the_carrier() {
        let entries = Entries::from_value(&json!(["x", "y"])).unwrap();
        assert_eq!(entries.count(), 2);
        assert_eq!(entries.mode, None);
    }

    #[test]
    fn carriers_serialize_as_repeated_entries() {
        let mut entries = Entries::default();
        entries.add(Entry {
            uid: Some(7),
            value: "a".into(),
        });

        assert_eq!(
            entries.encode(),
            json!({ "entry": [{ "@uid": 7, "$text": "a" }] })
        );
    }

    #[test]
    fn text_field_answers_to_its_declared_name() {
        let mut entry = Entry::default();
        assert!(entry.set_field("Value", &json!("z")));
        assert_eq!(entry.get_field("$text"), Some(json!("z")));
        assert_eq!(entry.get_field("other"), None);
        assert_eq!(Entry::default().get_field("uid"), Some(Value::Null));
    }
}
