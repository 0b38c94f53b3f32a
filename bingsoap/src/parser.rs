//! Parser d'enveloppes SOAP

use super::{SoapBody, SoapEnvelope, SoapHeader, local_name};
use std::io::BufReader;
use xmltree::{Element, XMLNode};

/// Erreur de parsing SOAP
#[derive(Debug, thiserror::Error)]
pub enum SoapParseError {
    #[error("XML parse error: {0}")]
    XmlError(#[from] xmltree::ParseError),

    #[error("Missing SOAP Envelope")]
    MissingEnvelope,

    #[error("Missing SOAP Body")]
    MissingBody,

    #[error("No element found in SOAP Body")]
    EmptyBody,
}

/// Parse une enveloppe SOAP complète
pub fn parse_soap_envelope(xml: &[u8]) -> Result<SoapEnvelope, SoapParseError> {
    let reader = BufReader::new(xml);
    let root = Element::parse(reader)?;

    if local_name(&root.name) != "Envelope" {
        return Err(SoapParseError::MissingEnvelope);
    }

    let header = find_child(&root, "Header").map(|e| SoapHeader { content: e.clone() });

    let body_elem = find_child(&root, "Body").ok_or(SoapParseError::MissingBody)?;

    let body = SoapBody {
        content: body_elem.clone(),
    };

    Ok(SoapEnvelope { header, body })
}

/// Extracts the element carried by the body of a serialized envelope.
///
/// The parsed element keeps every namespace in scope at its position, so the
/// declarations made on `s:Envelope` travel with it.
pub fn extract_body_element(xml: &[u8]) -> Result<Element, SoapParseError> {
    let envelope = parse_soap_envelope(xml)?;
    envelope
        .body
        .first_element()
        .cloned()
        .ok_or(SoapParseError::EmptyBody)
}

fn find_child<'a>(parent: &'a Element, name: &str) -> Option<&'a Element> {
    parent.children.iter().find_map(|node| match node {
        XMLNode::Element(elem) if local_name(&elem.name) == name => Some(elem),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let xml = r#"<?xml version="1.0"?>
<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/">
  <s:Header>
    <h:TrackingId xmlns:h="https://bingads.microsoft.com/CampaignManagement/v13">abc</h:TrackingId>
  </s:Header>
  <s:Body>
    <GetCampaignsByAccountIdResponse xmlns="https://bingads.microsoft.com/CampaignManagement/v13">
      <Campaigns/>
    </GetCampaignsByAccountIdResponse>
  </s:Body>
</s:Envelope>"#;

        let envelope = parse_soap_envelope(xml.as_bytes()).unwrap();
        assert!(envelope.header.is_some());

        let response = envelope.body.first_element().unwrap();
        assert_eq!(response.name, "GetCampaignsByAccountIdResponse");
        assert_eq!(
            response.namespace.as_deref(),
            Some("https://bingads.microsoft.com/CampaignManagement/v13")
        );
    }

    #[test]
    fn test_missing_envelope() {
        let xml = r#"<Body><Ping/></Body>"#;
        assert!(matches!(
            parse_soap_envelope(xml.as_bytes()),
            Err(SoapParseError::MissingEnvelope)
        ));
    }

    #[test]
    fn test_missing_body() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"/>"#;
        assert!(matches!(
            parse_soap_envelope(xml.as_bytes()),
            Err(SoapParseError::MissingBody)
        ));
    }

    #[test]
    fn test_extract_body_element() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/" xmlns:ns0="urn:test">
  <s:Body>
    <ns0:AddThingRequest><ns0:Name>x</ns0:Name></ns0:AddThingRequest>
  </s:Body>
</s:Envelope>"#;

        let body = extract_body_element(xml.as_bytes()).unwrap();
        assert_eq!(body.name, "AddThingRequest");
        assert_eq!(body.namespace.as_deref(), Some("urn:test"));
        assert_eq!(body.children.iter().filter_map(XMLNode::as_element).count(), 1);
    }

    #[test]
    fn test_empty_body() {
        let xml = r#"<s:Envelope xmlns:s="http://schemas.xmlsoap.org/soap/envelope/"><s:Body> </s:Body></s:Envelope>"#;
        assert!(matches!(
            extract_body_element(xml.as_bytes()),
            Err(SoapParseError::EmptyBody)
        ));
    }
}
