//! One SOAP service of the API, as described by its WSDL.

use crate::client::Client;
use crate::errors::{BingAdsError, ServerFault};
use crate::hash_builder::HashBuilder;
use crate::hash_params::HashParams;
use crate::validator::{Validator, XsdValidator};
use crate::wsdl::{Operation, TypeModel, Wsdl, WsdlError};
use bingsoap::{EnvelopeBuilder, SoapFault, local_name, parse_soap_envelope};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Services published by the Bing Ads API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    CampaignManagement,
    CustomerManagement,
    Reporting,
    Bulk,
    AdInsight,
    CustomerBilling,
}

impl ServiceKind {
    pub const ALL: [ServiceKind; 6] = [
        ServiceKind::CampaignManagement,
        ServiceKind::CustomerManagement,
        ServiceKind::Reporting,
        ServiceKind::Bulk,
        ServiceKind::AdInsight,
        ServiceKind::CustomerBilling,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceKind::CampaignManagement => "CampaignManagement",
            ServiceKind::CustomerManagement => "CustomerManagement",
            ServiceKind::Reporting => "Reporting",
            ServiceKind::Bulk => "Bulk",
            ServiceKind::AdInsight => "AdInsight",
            ServiceKind::CustomerBilling => "CustomerBilling",
        }
    }

    /// File name of the service WSDL inside an environment directory
    pub fn wsdl_file_name(&self) -> String {
        format!("{}.wsdl", self.as_str())
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceKind {
    type Err = String;

    /// Accepts `CampaignManagement` as well as `campaign_management`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = crate::hooks::match_key(s);
        ServiceKind::ALL
            .into_iter()
            .find(|kind| crate::hooks::match_key(kind.as_str()) == key)
            .ok_or_else(|| format!("Unknown service: {s}"))
    }
}

/// A loaded service, ready to call its operations
pub struct Service {
    name: String,
    wsdl: Wsdl,
    endpoint: String,
    model: Arc<TypeModel>,
    validator: Option<Validator>,
    client: Client,
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("name", &self.name)
            .field("endpoint", &self.endpoint)
            .field("operations", &self.operations())
            .finish_non_exhaustive()
    }
}

impl Service {
    pub(crate) fn new(client: Client, wsdl: Wsdl) -> Result<Self, BingAdsError> {
        let endpoint = wsdl.endpoint.clone().ok_or(WsdlError::MissingEndpoint)?;
        let name = wsdl
            .service_name
            .clone()
            .unwrap_or_else(|| "Service".to_string());

        // Les types du WSDL complètent le schéma partagé du client
        let mut model = TypeModel::clone(client.schema());
        model.merge(wsdl.types.clone());
        let model = Arc::new(model);

        let validator = client.validation_enabled().then(|| {
            let schema = client
                .custom_validator()
                .unwrap_or_else(|| Arc::new(XsdValidator::new(model.clone())));
            Validator::new(schema, client.validation_bypass().to_vec())
        });

        info!(
            service = %name,
            endpoint = %endpoint,
            operations = wsdl.operations.len(),
            "Service ready"
        );
        for op in &wsdl.operations {
            debug!(service = %name, "Defining operation : {}", op.name);
        }

        Ok(Self {
            name,
            wsdl,
            endpoint,
            model,
            validator,
            client,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends requests to `endpoint` instead of the WSDL address
    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        self.endpoint = endpoint.into();
    }

    /// Operation names, as declared by the WSDL
    pub fn operations(&self) -> Vec<&str> {
        self.wsdl.operations.iter().map(|op| op.name.as_str()).collect()
    }

    /// Looks up an operation by WSDL name or snake_case name
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.wsdl.operation(name)
    }

    /// Schema types available to this service
    pub fn types(&self) -> &TypeModel {
        &self.model
    }

    /// Builds the request envelope of `operation` without sending it
    pub fn build_request(&self, operation: &str, body: &Value) -> Result<String, BingAdsError> {
        let op = self.find_operation(operation)?;
        self.envelope(op, body)
    }

    /// Calls `operation` with `body` and returns the decoded response body.
    ///
    /// `operation` is the WSDL name (`GetCampaignsByAccountId`) or its
    /// snake_case form (`get_campaigns_by_account_id`). A `null` body sends
    /// an empty request element.
    pub fn call(&self, operation: &str, body: Value) -> Result<Map<String, Value>, BingAdsError> {
        let op = self.find_operation(operation)?;

        let request = self.envelope(op, &body)?;
        debug!(operation = %op.name, "SOAP request:\n{}", request);

        if let Some(validator) = &self.validator {
            validator.validate(&request)?;
        }

        let response = self
            .client
            .transport()
            .post(&self.endpoint, &op.soap_action, &request)?;
        debug!(operation = %op.name, status = response.status, "SOAP response:\n{}", response.body);

        if response.status >= 400 {
            let fault = ServerFault::new(response.status, response.body);
            warn!(operation = %op.name, "{}", fault);
            return Err(fault.into());
        }

        self.decode(op, response.status, &response.body)
    }

    fn find_operation(&self, name: &str) -> Result<&Operation, BingAdsError> {
        self.wsdl
            .operation(name)
            .ok_or_else(|| BingAdsError::unknown_operation(&self.name, name))
    }

    fn envelope(&self, op: &Operation, body: &Value) -> Result<String, BingAdsError> {
        let body = match body {
            Value::Null => Value::Object(Map::new()),
            other => other.clone(),
        };
        let namespace = self.wsdl.target_namespace.as_deref();
        let callbacks = self.client.callbacks();

        let mut envelope = EnvelopeBuilder::new();
        self.client.header().apply(&mut envelope, namespace);
        let element = HashParams::new(&self.model, callbacks, &mut envelope).build(
            &op.input_element,
            &body,
            namespace,
        );
        envelope.body(element);

        Ok(envelope.build()?)
    }

    fn decode(
        &self,
        op: &Operation,
        status: u16,
        body: &str,
    ) -> Result<Map<String, Value>, BingAdsError> {
        let envelope = parse_soap_envelope(body.as_bytes())?;

        if let Some(fault) = SoapFault::from_envelope(&envelope) {
            warn!(operation = %op.name, fault = %fault.fault_string, "SOAP fault with HTTP status {}", status);
            return Err(ServerFault {
                status,
                raw_body: body.to_string(),
                fault: Some(fault),
            }
            .into());
        }

        let Some(element) = envelope.body.first_element() else {
            return Ok(Map::new());
        };

        let type_name = op
            .output_element
            .as_deref()
            .filter(|name| *name == local_name(&element.name))
            .and_then(|name| self.model.element(name))
            .and_then(|decl| decl.type_name.as_deref());

        let decoded = HashBuilder::new(&self.model, self.client.callbacks())
            .build_response(element, type_name);
        debug!(operation = %op.name, "Decoded response: {:?}", decoded);
        Ok(decoded)
    }
}
