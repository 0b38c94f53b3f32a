use super::types::{TypeModel, elements, schema_locations};
use crate::utils::snakize;
use bingsoap::local_name;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use xmltree::Element;

#[derive(Debug, Error)]
pub enum WsdlError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("XML parsing error: {0}")]
    Xml(#[from] xmltree::ParseError),

    #[error("Expected a {expected} document, found <{found}>")]
    UnexpectedRoot { expected: &'static str, found: String },

    #[error("Operation {operation} refers to unknown message {message}")]
    UnknownMessage { operation: String, message: String },

    #[error("Operation {0} has no input message")]
    MissingInput(String),

    #[error("WSDL declares no service endpoint")]
    MissingEndpoint,
}

/// One operation of a SOAP port
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    /// `SOAPAction` header value, defaults to the operation name
    pub soap_action: String,
    /// Top level element carried by the request body
    pub input_element: String,
    /// Top level element carried by the response body
    pub output_element: Option<String>,
}

/// Parsed WSDL 1.1 service description
#[derive(Debug, Clone)]
pub struct Wsdl {
    pub target_namespace: Option<String>,
    /// `wsdl:service/@name`
    pub service_name: Option<String>,
    /// `soap:address/@location` of the first port
    pub endpoint: Option<String>,
    pub operations: Vec<Operation>,
    /// Schemas embedded in `wsdl:types`
    pub types: TypeModel,
}

impl Wsdl {
    pub fn from_file(path: &Path) -> Result<Self, WsdlError> {
        info!(wsdl = %path.display(), "Loading WSDL");
        let data = fs::read(path).map_err(|source| WsdlError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data)
    }

    pub fn parse(xml: &[u8]) -> Result<Self, WsdlError> {
        let root = Element::parse(BufReader::new(xml))?;
        if local_name(&root.name) != "definitions" {
            return Err(WsdlError::UnexpectedRoot {
                expected: "WSDL",
                found: root.name.clone(),
            });
        }

        let mut types = TypeModel::new();
        for section in children(&root, "types") {
            for schema in children(section, "schema") {
                types.add_schema(schema);
            }
        }

        // message name -> body element
        let messages: HashMap<&str, String> = children(&root, "message")
            .filter_map(|message| {
                let name = message.attributes.get("name")?;
                let parts: Vec<&Element> = children(message, "part").collect();
                let part = parts
                    .iter()
                    .find(|p| p.attributes.get("name").is_some_and(|n| n == "parameters"))
                    .or_else(|| parts.first())?;
                let element = part.attributes.get("element")?;
                Some((name.as_str(), local_name(element).to_string()))
            })
            .collect();

        let soap_actions: HashMap<&str, &str> = children(&root, "binding")
            .flat_map(|binding| children(binding, "operation"))
            .filter_map(|operation| {
                let name = operation.attributes.get("name")?;
                let action = children(operation, "operation")
                    .find_map(|soap_op| soap_op.attributes.get("soapAction"))?;
                Some((name.as_str(), action.as_str()))
            })
            .collect();

        let mut operations = Vec::new();
        for port_type in children(&root, "portType") {
            for operation in children(port_type, "operation") {
                let Some(name) = operation.attributes.get("name") else {
                    continue;
                };
                let message_of = |direction: &str| {
                    children(operation, direction)
                        .find_map(|io| io.attributes.get("message"))
                        .map(|message| local_name(message).to_string())
                };

                let input_message =
                    message_of("input").ok_or_else(|| WsdlError::MissingInput(name.clone()))?;
                let input_element = messages
                    .get(input_message.as_str())
                    .cloned()
                    .ok_or_else(|| WsdlError::UnknownMessage {
                        operation: name.clone(),
                        message: input_message.clone(),
                    })?;
                let output_element = message_of("output")
                    .and_then(|message| messages.get(message.as_str()).cloned());

                let soap_action = soap_actions
                    .get(name.as_str())
                    .filter(|action| !action.is_empty())
                    .map(|action| action.to_string())
                    .unwrap_or_else(|| name.clone());

                debug!(operation = %name, input = %input_element, "Found WSDL operation");
                operations.push(Operation {
                    name: name.clone(),
                    soap_action,
                    input_element,
                    output_element,
                });
            }
        }

        let service_name = children(&root, "service")
            .find_map(|service| service.attributes.get("name").cloned());
        let endpoint = children(&root, "service")
            .flat_map(|service| children(service, "port"))
            .flat_map(|port| children(port, "address"))
            .find_map(|address| address.attributes.get("location").cloned());

        Ok(Self {
            target_namespace: root.attributes.get("targetNamespace").cloned(),
            service_name,
            endpoint,
            operations,
            types,
        })
    }

    /// Looks an operation up by its WSDL name or its snake_case form
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.operations
            .iter()
            .find(|op| op.name == name)
            .or_else(|| self.operations.iter().find(|op| snakize(&op.name) == name))
    }
}

/// Loads an XSD file and every schema it imports or includes.
///
/// Locations are resolved relative to the including file; each file is read
/// once.
pub fn load_xsd(path: &Path) -> Result<TypeModel, WsdlError> {
    let mut model = TypeModel::new();
    let mut visited = HashSet::new();
    let mut pending = vec![path.to_path_buf()];

    while let Some(path) = pending.pop() {
        let path = fs::canonicalize(&path).map_err(|source| WsdlError::Io {
            path: path.clone(),
            source,
        })?;
        if !visited.insert(path.clone()) {
            continue;
        }
        debug!(xsd = %path.display(), "Loading schema");

        let data = fs::read(&path).map_err(|source| WsdlError::Io {
            path: path.clone(),
            source,
        })?;
        let schema = Element::parse(BufReader::new(data.as_slice()))?;
        if local_name(&schema.name) != "schema" {
            return Err(WsdlError::UnexpectedRoot {
                expected: "XSD",
                found: schema.name.clone(),
            });
        }

        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();
        pending.extend(
            schema_locations(&schema)
                .into_iter()
                .map(|location| base.join(location)),
        );
        model.add_schema(&schema);
    }

    info!(types = model.len(), xsd = %path.display(), "Loaded XML schema");
    Ok(model)
}

fn children<'a>(parent: &'a Element, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
    elements(parent).filter(move |e| local_name(&e.name) == name)
}
