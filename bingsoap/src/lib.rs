//! # SOAP envelopes for the Bing Ads API
//!
//! This crate builds SOAP 1.1 request envelopes and parses response
//! envelopes and faults. It knows nothing about WSDL types: callers hand it
//! ready-made header and body elements and get raw elements back.
//!
//! ## Architecture
//!
//! - [`EnvelopeBuilder`] : collects namespaces, header and body, then serializes
//! - [`SoapEnvelope`] : parsed envelope (optional header, mandatory body)
//! - [`SoapFault`] : `s:Fault` with its optional `detail` element
//!
//! ## Example
//!
//! ```
//! use bingsoap::{EnvelopeBuilder, parse_soap_envelope, text_element};
//!
//! let mut builder = EnvelopeBuilder::new();
//! let ns = builder.prefix_for("https://bingads.microsoft.com/CampaignManagement/v13");
//! let mut request = xmltree::Element::new(&format!("{ns}:GetCampaignsByAccountIdRequest"));
//! request
//!     .children
//!     .push(xmltree::XMLNode::Element(text_element(&format!("{ns}:AccountId"), "42")));
//! builder.body(request);
//!
//! let xml = builder.build().unwrap();
//! let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
//! let body = envelope.body.first_element().unwrap();
//! assert_eq!(body.name, "GetCampaignsByAccountIdRequest");
//! ```

mod builder;
mod envelope;
mod fault;
mod parser;

pub use builder::{EnvelopeBuilder, SoapBuildError, text_element};
pub use envelope::{SoapBody, SoapEnvelope, SoapHeader};
pub use fault::{SoapFault, build_soap_fault};
pub use parser::{SoapParseError, extract_body_element, parse_soap_envelope};

/// Namespaces used in every envelope
pub mod namespaces {
    /// SOAP 1.1 envelope
    pub const SOAP_ENVELOPE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

    /// XML Schema instance (`nil`, `type` attributes)
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";

    /// Prefix bound to [`SOAP_ENVELOPE`]
    pub const SOAP_PREFIX: &str = "s";

    /// Prefix bound to [`XSI`]
    pub const XSI_PREFIX: &str = "i";
}

/// Local name of an element or attribute name, without its prefix
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_name() {
        assert_eq!(local_name("s:Body"), "Body");
        assert_eq!(local_name("Body"), "Body");
        assert_eq!(local_name("tns:ArrayOflong"), "ArrayOflong");
    }
}
