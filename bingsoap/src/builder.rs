//! Construction des enveloppes de requête SOAP

use crate::namespaces::{SOAP_ENVELOPE, SOAP_PREFIX, XSI, XSI_PREFIX};
use xmltree::{Element, XMLNode};

/// Erreur de sérialisation d'une enveloppe
#[derive(Debug, thiserror::Error)]
pub enum SoapBuildError {
    #[error("XML write error: {0}")]
    Xml(#[from] xmltree::Error),

    #[error("Envelope is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("Envelope has no body")]
    MissingBody,
}

/// Builds a request envelope.
///
/// Elements are named with explicit prefixes (`ns0:AccountId`); every
/// namespace handed to [`EnvelopeBuilder::prefix_for`] is declared once on
/// the `s:Envelope` element.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    namespaces: Vec<(String, String)>,
    header: Vec<Element>,
    body: Option<Element>,
}

impl Default for EnvelopeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvelopeBuilder {
    pub fn new() -> Self {
        Self {
            namespaces: vec![
                (SOAP_PREFIX.to_string(), SOAP_ENVELOPE.to_string()),
                (XSI_PREFIX.to_string(), XSI.to_string()),
            ],
            header: Vec::new(),
            body: None,
        }
    }

    /// Returns the prefix bound to `namespace`, declaring a new `nsN` prefix
    /// on first use.
    pub fn prefix_for(&mut self, namespace: &str) -> String {
        if let Some((prefix, _)) = self.namespaces.iter().find(|(_, uri)| uri == namespace) {
            return prefix.clone();
        }
        // s: et i: sont toujours déclarés
        let prefix = format!("ns{}", self.namespaces.len() - 2);
        self.namespaces
            .push((prefix.clone(), namespace.to_string()));
        prefix
    }

    /// Appends an element to the SOAP header
    pub fn header_element(&mut self, element: Element) -> &mut Self {
        self.header.push(element);
        self
    }

    /// Sets the single body element, replacing any previous one
    pub fn body(&mut self, element: Element) -> &mut Self {
        self.body = Some(element);
        self
    }

    /// Serializes the envelope with an XML declaration
    pub fn build(self) -> Result<String, SoapBuildError> {
        let body_child = self.body.ok_or(SoapBuildError::MissingBody)?;

        let mut envelope = Element::new(&format!("{SOAP_PREFIX}:Envelope"));
        for (prefix, uri) in &self.namespaces {
            envelope
                .attributes
                .insert(format!("xmlns:{prefix}"), uri.clone());
        }

        if !self.header.is_empty() {
            let mut header = Element::new(&format!("{SOAP_PREFIX}:Header"));
            header
                .children
                .extend(self.header.into_iter().map(XMLNode::Element));
            envelope.children.push(XMLNode::Element(header));
        }

        let mut body = Element::new(&format!("{SOAP_PREFIX}:Body"));
        body.children.push(XMLNode::Element(body_child));
        envelope.children.push(XMLNode::Element(body));

        let mut buf = Vec::new();
        let config = xmltree::EmitterConfig::new()
            .write_document_declaration(true)
            .perform_indent(true)
            .indent_string("  ");
        envelope.write_with_config(&mut buf, config)?;

        Ok(String::from_utf8(buf)?)
    }
}

/// Element with a single text child
pub fn text_element(name: &str, text: &str) -> Element {
    let mut elem = Element::new(name);
    elem.children.push(XMLNode::Text(text.to_string()));
    elem
}
