//! Calls one operation of a Bing Ads service and prints the response.
//!
//! ```text
//! cargo run -p bingads --example call_service -- CampaignManagement get_campaigns_by_account_id '{"account_id": 42}'
//! ```
//!
//! The configuration is read from `$BINGADS_CONFIG`, `./.bingads` or
//! `~/.bingads`; the OAuth token from `BINGADS_AUTH_TOKEN`.

use anyhow::{Context, Result, bail};
use bingads::{BingAdsError, Client, Config, ServiceKind, logging::init_logging};
use serde_json::Value;
use std::env;
use tracing::{error, info};

fn main() -> Result<()> {
    let config = Config::load_config("")?;
    init_logging(&config)?;

    let args: Vec<String> = env::args().skip(1).collect();
    let (kind, operation, body) = match args.as_slice() {
        [kind, operation] => (kind, operation, Value::Null),
        [kind, operation, body] => (
            kind,
            operation,
            serde_json::from_str(body).context("Request body is not valid JSON")?,
        ),
        _ => bail!("usage: call_service <Service> <operation> [json body]"),
    };
    let kind: ServiceKind = kind.parse().map_err(anyhow::Error::msg)?;

    let client = Client::from_config(&config)?;
    if let Ok(token) = env::var("BINGADS_AUTH_TOKEN") {
        client.set_authentication_token(token);
    }

    let service = client.service(kind)?;
    info!(service = %service.name(), operations = service.operations().len(), "Service loaded");

    match service.call(operation, body) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(BingAdsError::ServerFault(fault)) => {
            error!("{}", fault);
            for api_error in fault.application_fault().errors {
                eprintln!("  {api_error}");
            }
            bail!("Server returned HTTP status {}", fault.status)
        }
        Err(err) => Err(err.into()),
    }
}
