//! # mmwsdl
//!
//! Generic binding layer of the MMSoap client:
//!
//! - [`Record`] and the [`wsdl_record!`] macro: typed structures with a
//!   name-addressable field table
//! - [`binder`]: populating records from untyped option bags
//! - [`SequenceAdapter`] and [`Cursor`]: "array of X" records used as
//!   ordered, indexable sequences
//! - [`TransportSession`]: the configured SOAP client, its headers and the
//!   diagnostics of its last exchange
//!
//! ## Example
//!
//! ```
//! use mmwsdl::{Record, SequenceAdapter, wsdl_record};
//! use serde_json::json;
//!
//! wsdl_record! {
//!     pub struct Recipient = "RecipientType" {
//!         attr "uid" => uid: Option<u32>,
//!         text "number" => number: String,
//!     }
//! }
//!
//! wsdl_record! {
//!     pub struct Recipients = "RecipientsType" {
//!         array "recipient" => recipients: Recipient,
//!     }
//! }
//!
//! let recipients = Recipients::from_value(&json!({
//!     "recipient": [{ "@uid": "1", "$text": "61400000001" }, "61400000002"]
//! }))
//! .unwrap();
//!
//! assert_eq!(recipients.count(), 2);
//! assert_eq!(recipients.first().unwrap().uid, Some(1));
//! assert_eq!(Recipient::default().count(), -1);
//! ```

pub mod binder;
pub mod diagnostics;
pub mod errors;
mod macros;
pub mod record;
pub mod sequence;
pub mod session;
pub mod soap;
pub mod transport;
pub mod value;

pub use errors::SessionError;
pub use record::{FieldValue, Record};
pub use sequence::{Cursor, SequenceAdapter};
pub use session::TransportSession;
pub use soap::{SoapFault, SoapHeader, SoapVersion};
pub use transport::TransportOptions;

pub use serde_json::{Map, Value};
