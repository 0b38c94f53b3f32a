//! SOAP Faults

use crate::builder::SoapBuildError;
use crate::namespaces::{SOAP_ENVELOPE, SOAP_PREFIX};
use crate::{SoapEnvelope, local_name};
use xmltree::{Element, XMLNode};

/// Erreur SOAP (Fault)
#[derive(Debug, Clone)]
pub struct SoapFault {
    /// Code d'erreur (ex: "s:Server")
    pub fault_code: String,

    /// Description de l'erreur
    pub fault_string: String,

    /// Élément `detail` brut, porteur des erreurs applicatives
    pub detail: Option<Element>,
}

impl SoapFault {
    /// Crée un fault SOAP simple
    pub fn new(fault_code: String, fault_string: String) -> Self {
        Self {
            fault_code,
            fault_string,
            detail: None,
        }
    }

    /// Extracts the `Fault` element carried by an envelope body, if any
    pub fn from_envelope(envelope: &SoapEnvelope) -> Option<Self> {
        let fault = envelope
            .body
            .first_element()
            .filter(|e| local_name(&e.name) == "Fault")?;

        let text_of = |name: &str| {
            child(fault, name)
                .and_then(|e| e.get_text())
                .map(|t| t.trim().to_string())
                .unwrap_or_default()
        };

        Some(Self {
            fault_code: text_of("faultcode"),
            fault_string: text_of("faultstring"),
            detail: child(fault, "detail").cloned(),
        })
    }
}

fn child<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if local_name(&elem.name) == name => Some(elem),
        _ => None,
    })
}

/// Construit un SOAP Fault XML
///
/// # Arguments
///
/// * `fault_code` - Code du fault (ex: "s:Server")
/// * `fault_string` - Message d'erreur
/// * `detail` - Contenu optionnel de l'élément `detail`
pub fn build_soap_fault(
    fault_code: &str,
    fault_string: &str,
    detail: Option<Element>,
) -> Result<String, SoapBuildError> {
    let mut fault = Element::new(&format!("{SOAP_PREFIX}:Fault"));

    fault
        .children
        .push(XMLNode::Element(crate::text_element("faultcode", fault_code)));
    fault
        .children
        .push(XMLNode::Element(crate::text_element("faultstring", fault_string)));

    if let Some(content) = detail {
        let mut detail_elem = Element::new("detail");
        detail_elem.children.push(XMLNode::Element(content));
        fault.children.push(XMLNode::Element(detail_elem));
    }

    let mut body = Element::new(&format!("{SOAP_PREFIX}:Body"));
    body.children.push(XMLNode::Element(fault));

    let mut envelope = Element::new(&format!("{SOAP_PREFIX}:Envelope"));
    envelope.attributes.insert(
        format!("xmlns:{SOAP_PREFIX}"),
        SOAP_ENVELOPE.to_string(),
    );
    envelope.children.push(XMLNode::Element(body));

    let mut buf = Vec::new();
    let config = xmltree::EmitterConfig::new()
        .perform_indent(true)
        .indent_string("  ");
    envelope.write_with_config(&mut buf, config)?;

    Ok(String::from_utf8(buf)?)
}
