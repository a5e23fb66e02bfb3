// HttpClientFactory: builds the reqwest clients used by the updater.

use crate::constants;
use crate::host_context::HostContext;
use anyhow::Result;
use reqwest::Client;
use starter_sdk::StringUtil;
use std::time::Duration;
use url::{Host, Url};

/// Connect timeout for release feed and download requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Creates properly configured HTTP clients.
pub struct HttpClientFactory;

impl HttpClientFactory {
    /// Create a new `reqwest::Client` for requests to `target`.
    ///
    /// - Proxy settings come from the standard `HTTP(S)_PROXY`/`NO_PROXY`
    ///   environment variables (reqwest reads them itself). Loopback
    ///   targets never go through a proxy.
    /// - If `SIM_STARTER_TLS_NO_VERIFY` is set, TLS certificate
    ///   verification is disabled (dangerous!).
    /// - Every request carries the starter's user agent.
    pub fn create_client_for(context: &HostContext, target: &Url) -> Result<Client> {
        Self::build(context, Self::is_loopback(target))
    }

    fn build(context: &HostContext, bypass_proxy: bool) -> Result<Client> {
        let mut builder = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(context.user_agent());

        if bypass_proxy {
            builder = builder.no_proxy();
        }

        if let Ok(val) = std::env::var(constants::variables::TLS_NO_VERIFY) {
            if StringUtil::convert_to_bool(&val) == Some(true) {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        let client = builder.build()?;
        Ok(client)
    }

    fn is_loopback(target: &Url) -> bool {
        match target.host() {
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            Some(Host::Domain(name)) => name.eq_ignore_ascii_case("localhost"),
            None => false,
        }
    }
}
