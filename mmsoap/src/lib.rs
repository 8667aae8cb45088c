//! # mmsoap - Client SOAP MessageMedia
//!
//! Cette crate fournit un client pour le service SOAP de MessageMedia
//! (`https://soap.m4u.com.au/`) : vérification du compte, envoi de SMS et
//! lecture des numéros bloqués.
//!
//! ## Architecture
//!
//! - [`MMSoap`] : façade, possède la session de transport
//! - [`services`] : un service par opération, garde la dernière réponse
//! - [`records`] : structures de données du service, déclarées avec
//!   [`mmwsdl::wsdl_record!`]
//! - [`error`] : gestion des erreurs
//!
//! La liaison générique (enregistrements, séquences, session, SOAP) vit dans
//! `mmwsdl`, les options de connexion dans `mmconfig`.
//!
//! ## Utilisation
//!
//! ```rust,no_run
//! use mmsoap::{MMSoap, SendOptions};
//! use serde_yaml::Mapping;
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut client = MMSoap::new("my-user", "my-password", &Mapping::new())?;
//!
//!     let info = client.get_user_info()?;
//!     if let Some(details) = info.account_details {
//!         println!("Credit remaining: {:?}", details.credit_remaining);
//!     }
//!
//!     let sent = client.send_message("+61400000000", "Hello", &SendOptions::default())?;
//!     println!("Sent: {:?}", sent.sent);
//!     Ok(())
//! }
//! ```
//!
//! En cas d'échec, le fault SOAP est renvoyé dans l'erreur et reste
//! consultable ensuite :
//!
//! ```rust,no_run
//! # use mmsoap::MMSoap;
//! # use serde_yaml::Mapping;
//! # fn main() -> anyhow::Result<()> {
//! let mut client = MMSoap::new("my-user", "wrong", &Mapping::new())?;
//! if client.get_user_info().is_err() {
//!     if let Some(fault) = client.session().last_fault("checkUser") {
//!         eprintln!("{}: {}", fault.code, fault.message);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod records;
pub mod services;

pub use client::{BLOCKED_NUMBERS_LIMIT, MMSoap, SendOptions};
pub use error::{MMSoapError, Result};
pub use records::*;
pub use services::{ServiceCheck, ServiceGet, ServiceSend};
