//! Long-lived client: configuration, HTTP agent, schema and hooks.

use crate::errors::BingAdsError;
use crate::header::{AUTHENTICATION_TOKEN, SharedHeader};
use crate::hooks::{Callbacks, FieldRecord};
use crate::service::{Service, ServiceKind};
use crate::transport::{HttpSettings, Transport};
use crate::validator::{DEFAULT_BYPASS, SchemaValidator};
use crate::wsdl::{TypeModel, Wsdl, load_xsd};
use bingconfig::{Config, Environment};
use parking_lot::RwLock;
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Entry point of the SDK.
///
/// A client is cheap to clone: clones share the HTTP agent, the schema and
/// the header. Services created from it keep a handle on it.
///
/// ```no_run
/// use bingads::{Client, ServiceKind};
/// use serde_json::json;
///
/// let config = bingconfig::Config::load_config("")?;
/// let client = Client::from_config(&config)?;
/// client.set_authentication_token("...");
///
/// let campaigns = client.service(ServiceKind::CampaignManagement)?;
/// let response = campaigns.call("get_campaigns_by_account_id", json!({"account_id": 42}))?;
/// println!("{response:?}");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    environment: Environment,
    wsdl_dir: PathBuf,
    transport: Transport,
    schema: Arc<TypeModel>,
    callbacks: Callbacks,
    header: RwLock<SharedHeader>,
    validation: bool,
    validator: Option<Arc<dyn SchemaValidator>>,
    bypass: Vec<String>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("environment", &self.inner.environment)
            .field("wsdl_dir", &self.inner.wsdl_dir)
            .field("transport", &self.inner.transport)
            .field("callbacks", &self.inner.callbacks)
            .field("validation", &self.inner.validation)
            .finish_non_exhaustive()
    }
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Client with every setting taken from `config`
    pub fn from_config(config: &Config) -> Result<Self, BingAdsError> {
        ClientBuilder::from_config(config)?.build()
    }

    pub fn environment(&self) -> Environment {
        self.inner.environment
    }

    pub fn wsdl_dir(&self) -> &Path {
        &self.inner.wsdl_dir
    }

    /// Path of the WSDL file of `kind` for the client environment
    pub fn wsdl_path(&self, kind: ServiceKind) -> PathBuf {
        self.inner
            .wsdl_dir
            .join(self.inner.environment.as_str())
            .join(kind.wsdl_file_name())
    }

    /// Loads the WSDL of `kind` and returns the service
    pub fn service(&self, kind: ServiceKind) -> Result<Service, BingAdsError> {
        let wsdl = Wsdl::from_file(&self.wsdl_path(kind))?;
        Service::new(self.clone(), wsdl)
    }

    /// Service described by an arbitrary WSDL document
    pub fn service_from_wsdl(&self, xml: &[u8]) -> Result<Service, BingAdsError> {
        let wsdl = Wsdl::parse(xml)?;
        Service::new(self.clone(), wsdl)
    }

    /// Schema loaded from the XSD files, shared by all services
    pub fn schema(&self) -> &Arc<TypeModel> {
        &self.inner.schema
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.inner.callbacks
    }

    /// Snapshot of the SOAP header values
    pub fn header(&self) -> SharedHeader {
        self.inner.header.read().clone()
    }

    pub fn set_header(&self, name: &str, value: impl Into<String>) {
        self.inner.header.write().set(name, value);
    }

    /// OAuth access token sent as `AuthenticationToken`
    pub fn set_authentication_token(&self, token: impl Into<String>) {
        self.set_header(AUTHENTICATION_TOKEN, token);
    }

    /// Closes the pooled HTTP connections
    pub fn reset_connections(&self) {
        self.inner.transport.reset();
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    pub(crate) fn validation_enabled(&self) -> bool {
        self.inner.validation
    }

    pub(crate) fn custom_validator(&self) -> Option<Arc<dyn SchemaValidator>> {
        self.inner.validator.clone()
    }

    pub(crate) fn validation_bypass(&self) -> &[String] {
        &self.inner.bypass
    }
}

/// Builds a [`Client`].
///
/// Without configuration the client targets production with the default
/// HTTP settings, an empty schema (WSDL types only) and the default hooks.
pub struct ClientBuilder {
    environment: Environment,
    wsdl_dir: PathBuf,
    xsd_file: Option<PathBuf>,
    schema: Option<TypeModel>,
    http: HttpSettings,
    header: SharedHeader,
    callbacks: Callbacks,
    validation: bool,
    validator: Option<Arc<dyn SchemaValidator>>,
    bypass: Vec<String>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            environment: Environment::default(),
            wsdl_dir: PathBuf::from("vendor/wsdl"),
            xsd_file: None,
            schema: None,
            http: HttpSettings::default(),
            header: SharedHeader::new(),
            callbacks: Callbacks::default(),
            validation: true,
            validator: None,
            bypass: DEFAULT_BYPASS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Builder initialized from the `api`, `http` and `schema` sections.
    ///
    /// A configured XSD file that does not exist is skipped with a warning;
    /// requests are then checked against the WSDL types only.
    pub fn from_config(config: &Config) -> Result<Self, BingAdsError> {
        let xsd_file = config.get_xsd_file();
        let xsd_file = if xsd_file.is_file() {
            Some(xsd_file)
        } else {
            warn!(xsd = %xsd_file.display(), "XSD file not found, validating against WSDL types only");
            None
        };

        Ok(Self {
            environment: config.get_environment(),
            wsdl_dir: config.get_wsdl_dir(),
            xsd_file,
            http: HttpSettings::from_config(config),
            header: SharedHeader::from_config(config).map_err(BingAdsError::config)?,
            bypass: config.get_validation_bypass(),
            ..Self::new()
        })
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Directory holding one sub-directory of WSDL files per environment
    pub fn wsdl_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.wsdl_dir = dir.into();
        self
    }

    /// Entry XSD file, loaded with its imports when the client is built
    pub fn xsd_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.xsd_file = Some(path.into());
        self
    }

    /// Already loaded schema, used instead of the XSD file
    pub fn schema(mut self, schema: TypeModel) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn http(mut self, settings: HttpSettings) -> Self {
        self.http = settings;
        self
    }

    pub fn header(mut self, header: SharedHeader) -> Self {
        self.header = header;
        self
    }

    pub fn authentication_token(mut self, token: impl Into<String>) -> Self {
        self.header.set(AUTHENTICATION_TOKEN, token);
        self
    }

    /// Replaces every hook, the default normalizers included
    pub fn callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Adds a request hook, run after the ones already registered
    pub fn on_before_build<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Vec<FieldRecord>, &[String]) + Send + Sync + 'static,
    {
        self.callbacks.on_before_build(hook);
        self
    }

    /// Adds a response hook, run after the ones already registered
    pub fn on_after_children_hash<F>(mut self, hook: F) -> Self
    where
        F: Fn(Map<String, Value>) -> Map<String, Value> + Send + Sync + 'static,
    {
        self.callbacks.on_after_children_hash(hook);
        self
    }

    pub fn validation(mut self, enabled: bool) -> Self {
        self.validation = enabled;
        self
    }

    /// Replaces the XSD validator
    pub fn validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Request element names that are never validated
    pub fn validation_bypass(mut self, names: Vec<String>) -> Self {
        self.bypass = names;
        self
    }

    pub fn build(self) -> Result<Client, BingAdsError> {
        let schema = match (self.schema, &self.xsd_file) {
            (Some(schema), _) => schema,
            (None, Some(path)) => load_xsd(path).map_err(BingAdsError::Schema)?,
            (None, None) => TypeModel::new(),
        };

        info!(
            environment = %self.environment,
            wsdl_dir = %self.wsdl_dir.display(),
            types = schema.len(),
            "Bing Ads client ready"
        );

        Ok(Client {
            inner: Arc::new(ClientInner {
                environment: self.environment,
                wsdl_dir: self.wsdl_dir,
                transport: Transport::new(self.http),
                schema: Arc::new(schema),
                callbacks: self.callbacks,
                header: RwLock::new(self.header),
                validation: self.validation,
                validator: self.validator,
                bypass: self.bypass,
            }),
        })
    }
}
