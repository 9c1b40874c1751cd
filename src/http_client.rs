use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Serialize;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("hoops_terminal/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceCell<Client> = OnceCell::new();

pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")
    })
}

/// POSTs `body` as JSON and hands back the status with the raw reply text.
/// Callers decide how to read error bodies, so non-2xx is not an error here.
pub fn post_json<B>(url: &str, token: Option<&str>, body: &B) -> Result<(StatusCode, String)>
where
    B: Serialize + ?Sized,
{
    let client = http_client()?;
    let mut req = client.post(url).json(body);
    if let Some(token) = token {
        req = req.bearer_auth(token);
    }
    let resp = req.send().with_context(|| format!("request failed: {url}"))?;
    let status = resp.status();
    let text = resp
        .text()
        .with_context(|| format!("read body failed: {url}"))?;
    Ok((status, text))
}

pub fn snippet(text: &str) -> String {
    text.chars().take(200).collect()
}
