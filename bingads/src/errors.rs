use crate::validator::ValidationResult;
use crate::wsdl::{WsdlError, attribute};
use bingsoap::{SoapBuildError, SoapFault, SoapParseError, local_name, parse_soap_envelope};
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use xmltree::{Element, XMLNode};

#[derive(Error, Debug)]
pub enum BingAdsError {
    #[error("Service {service} has no operation {operation}")]
    UnknownOperation { service: String, operation: String },

    #[error("Request does not match the schema:\n{0}")]
    Validation(ValidationResult),

    #[error(transparent)]
    ServerFault(#[from] ServerFault),

    #[error("HTTP error when calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("Invalid SOAP response: {0}")]
    Soap(#[from] SoapParseError),

    #[error("Cannot build SOAP request: {0}")]
    Envelope(#[from] SoapBuildError),

    #[error(transparent)]
    Wsdl(#[from] WsdlError),

    #[error("Cannot load XML schema: {0}")]
    Schema(#[source] WsdlError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl BingAdsError {
    pub fn unknown_operation(service: &str, operation: &str) -> Self {
        BingAdsError::UnknownOperation {
            service: service.to_string(),
            operation: operation.to_string(),
        }
    }

    pub fn config(err: anyhow::Error) -> Self {
        BingAdsError::Config(format!("{err:#}"))
    }
}

/// HTTP response with a status >= 400.
///
/// The body is kept as is; `fault` is set when it holds a SOAP envelope with
/// a `Fault` element.
#[derive(Debug, Clone)]
pub struct ServerFault {
    pub status: u16,
    pub raw_body: String,
    pub fault: Option<SoapFault>,
}

impl ServerFault {
    pub fn new(status: u16, raw_body: String) -> Self {
        let fault = parse_soap_envelope(raw_body.as_bytes())
            .ok()
            .and_then(|envelope| SoapFault::from_envelope(&envelope));

        Self {
            status,
            raw_body,
            fault,
        }
    }

    pub fn fault_string(&self) -> Option<&str> {
        self.fault.as_ref().map(|f| f.fault_string.as_str())
    }

    /// API errors listed in the fault detail
    pub fn application_fault(&self) -> ApplicationFault {
        ApplicationFault::from_detail(self.fault.as_ref().and_then(|f| f.detail.as_ref()))
    }
}

impl fmt::Display for ServerFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.fault {
            Some(fault) => write!(
                f,
                "Server fault (HTTP status {}): {} {}",
                self.status, fault.fault_code, fault.fault_string
            )?,
            None => write!(
                f,
                "Server error (HTTP status {}): {}",
                self.status, self.raw_body
            )?,
        }

        let details = self.application_fault();
        if !details.errors.is_empty() {
            write!(f, " [{details}]")?;
        }
        Ok(())
    }
}

impl std::error::Error for ServerFault {}

/// One entry of an API fault detail
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiError {
    pub code: Option<String>,
    pub error_code: Option<String>,
    pub message: Option<String>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = self.code.as_deref().unwrap_or("?");
        match (&self.error_code, &self.message) {
            (Some(name), Some(message)) => write!(f, "{code} {name}: {message}"),
            (None, Some(message)) => write!(f, "{code}: {message}"),
            (Some(name), None) => write!(f, "{code} {name}"),
            (None, None) => write!(f, "{code}"),
        }
    }
}

/// Application level errors reported in a fault `detail`.
///
/// Bing Ads wraps them in `AdApiFaultDetail`, `ApiFaultDetail` or
/// `EditorialApiFaultDetail`, with lists named `Errors`, `OperationErrors`,
/// `BatchErrors` or `EditorialErrors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplicationFault {
    pub tracking_id: Option<String>,
    pub errors: Vec<ApiError>,
}

const FAULT_DETAILS: &[&str] = &["AdApiFaultDetail", "ApiFaultDetail", "EditorialApiFaultDetail"];
const ERROR_LISTS: &[&str] = &["Errors", "OperationErrors", "BatchErrors", "EditorialErrors"];

impl ApplicationFault {
    /// Never fails: a missing or unexpected detail gives an empty fault
    pub fn from_detail(detail: Option<&Element>) -> Self {
        let mut fault = Self::default();
        let Some(detail) = detail else {
            return fault;
        };

        for container in children(detail).filter(|e| FAULT_DETAILS.contains(&local_name(&e.name))) {
            if fault.tracking_id.is_none() {
                fault.tracking_id = text_of(container, "TrackingId");
            }
            for list in children(container).filter(|e| ERROR_LISTS.contains(&local_name(&e.name))) {
                fault.errors.extend(children(list).filter_map(api_error));
            }
        }

        fault
    }
}

impl fmt::Display for ApplicationFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.errors.is_empty() {
            return write!(f, "no error details");
        }
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

fn api_error(elem: &Element) -> Option<ApiError> {
    if attribute(elem, "nil") == Some("true") {
        return None;
    }
    Some(ApiError {
        code: text_of(elem, "Code"),
        error_code: text_of(elem, "ErrorCode"),
        message: text_of(elem, "Message"),
    })
}

fn children(parent: &Element) -> impl Iterator<Item = &Element> {
    parent.children.iter().filter_map(XMLNode::as_element)
}

fn text_of(parent: &Element, name: &str) -> Option<String> {
    children(parent)
        .find(|e| local_name(&e.name) == name)
        .and_then(|e| e.get_text())
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
