use bingconfig::Config;
use bingsoap::{EnvelopeBuilder, text_element};

/// Header element names, in the order they are sent
pub const AUTHENTICATION_TOKEN: &str = "AuthenticationToken";
pub const CUSTOMER_ACCOUNT_ID: &str = "CustomerAccountId";
pub const CUSTOMER_ID: &str = "CustomerId";
pub const DEVELOPER_TOKEN: &str = "DeveloperToken";

/// Values sent in the SOAP header of every request.
///
/// Empty values are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SharedHeader {
    entries: Vec<(String, String)>,
}

impl SharedHeader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Developer token, customer and account ids from the `api` section
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut header = Self::new();
        header
            .set(CUSTOMER_ACCOUNT_ID, config.get_account_id()?)
            .set(CUSTOMER_ID, config.get_customer_id()?)
            .set(DEVELOPER_TOKEN, config.get_developer_token()?);
        Ok(header)
    }

    /// Sets `name`, keeping its position when already present
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
        self.sort();
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.entries.iter().position(|(n, _)| n == name)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Adds the non empty entries to an envelope header, qualified with
    /// `namespace`
    pub fn apply(&self, envelope: &mut EnvelopeBuilder, namespace: Option<&str>) {
        let prefix = namespace.map(|ns| envelope.prefix_for(ns));
        for (name, value) in self.iter().filter(|(_, v)| !v.is_empty()) {
            let name = match &prefix {
                Some(prefix) => format!("{prefix}:{name}"),
                None => name.to_string(),
            };
            envelope.header_element(text_element(&name, value));
        }
    }

    // Les entrées connues d'abord, dans l'ordre de l'API, puis les autres
    fn sort(&mut self) {
        const ORDER: [&str; 4] = [
            AUTHENTICATION_TOKEN,
            CUSTOMER_ACCOUNT_ID,
            CUSTOMER_ID,
            DEVELOPER_TOKEN,
        ];
        self.entries.sort_by_key(|(name, _)| {
            ORDER
                .iter()
                .position(|known| known == name)
                .unwrap_or(ORDER.len())
        });
    }
}
