//! # Bing Ads SOAP client
//!
//! Calls the Bing Ads SOAP services with plain JSON values:
//!
//! - request field names are matched against the schema whatever their
//!   casing (`account_id` → `AccountId`) and put in schema order,
//! - response keys come back in snake_case, and `{"long": [...]}` wrappers
//!   become lists of integers,
//! - requests are checked against the XSD before being sent,
//! - HTTP errors and SOAP faults become [`ServerFault`] values.
//!
//! ## Architecture
//!
//! - [`Client`] : configuration, HTTP agent, schema, hooks and SOAP header
//! - [`Service`] : one WSDL service, `call(operation, body)`
//! - [`hooks`] : request and response normalizers, and the hook lists
//! - [`wsdl`] : WSDL and XSD loading into a [`TypeModel`]
//! - [`validator`] : schema validation of outgoing requests
//! - [`transport`] : persistent HTTP agent with retries
//!
//! ## Example
//!
//! ```no_run
//! use bingads::{Client, ServiceKind};
//! use serde_json::json;
//!
//! let client = Client::builder()
//!     .authentication_token("token")
//!     .wsdl_dir("vendor/wsdl")
//!     .build()?;
//! let service = client.service(ServiceKind::CustomerManagement)?;
//! let user = service.call("get_user", json!({"user_id": null}))?;
//! println!("{:?}", user.get("user"));
//! # Ok::<(), bingads::BingAdsError>(())
//! ```

mod client;
mod errors;
mod hash_builder;
mod hash_params;
mod header;
pub mod hooks;
pub mod logging;
mod service;
pub mod transport;
pub mod utils;
pub mod validator;
pub mod wsdl;

#[cfg(test)]
mod test_fixtures;

pub use client::{Client, ClientBuilder};
pub use errors::{ApiError, ApplicationFault, BingAdsError, ServerFault};
pub use hash_builder::HashBuilder;
pub use hash_params::{HashParams, XSI_TYPE_KEY};
pub use header::{
    AUTHENTICATION_TOKEN, CUSTOMER_ACCOUNT_ID, CUSTOMER_ID, DEVELOPER_TOKEN, SharedHeader,
};
pub use hooks::{Callbacks, FieldRecord, normalize_request, normalize_response};
pub use service::{Service, ServiceKind};
pub use validator::{SchemaValidator, ValidationResult, Validator, XsdValidator};
pub use wsdl::{TypeModel, Wsdl, WsdlError};

pub use bingconfig::{Config, Environment};
