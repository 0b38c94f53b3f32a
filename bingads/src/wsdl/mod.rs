//! # WSDL and XSD loading
//!
//! A service description gives the SDK three things: the endpoint URL, the
//! operations with their input/output elements, and the schema types used to
//! rename, reorder, validate and decode message elements.

mod loader;
mod types;

pub use loader::{Operation, Wsdl, WsdlError, load_xsd};
pub use types::{ComplexType, ElementDecl, SimpleType, TypeModel, schema_locations};

use bingsoap::local_name;
use xmltree::Element;

/// Value of the attribute whose local name is `name`
pub(crate) fn attribute<'a>(elem: &'a Element, name: &str) -> Option<&'a str> {
    elem.attributes
        .iter()
        .find(|(key, _)| local_name(key) == name)
        .map(|(_, value)| value.as_str())
}
