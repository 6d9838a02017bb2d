use std::time::{Duration, SystemTime};

use reqwest::blocking::Client;
use reqwest::header::LAST_MODIFIED;
use url::Url;

use crate::config::ProxySettings;

use super::*;

/// [`ModificationSource`] of a resource behind a URL, reporting the `Last-Modified` header of a `HEAD` request.
///
/// Blocks until the server responds or the timeout elapses.
#[derive(Clone, Debug)]
pub struct Remote {
  url: Url,
  client: Client,
}

impl Remote {
  /// Creates a source for `url` using a client without proxy that times out after 30 seconds.
  pub fn new(url: Url) -> Result<Self, InspectionError> {
    Self::with_proxy(url, None, Duration::from_secs(30))
  }
  /// Creates a source for `url` using the active `http` proxy in `proxy_settings`, if any.
  pub fn with_proxy(
    url: Url,
    proxy_settings: Option<&ProxySettings>,
    timeout: Duration,
  ) -> Result<Self, InspectionError> {
    let mut builder = Client::builder().timeout(timeout);
    if let Some(proxy) = proxy_settings.and_then(|s| s.active_http_proxy()) {
      let mut proxy_config = reqwest::Proxy::http(format!("http://{}", proxy.to_proxy_string()))
        .map_err(|e| InspectionError::Remote(Box::new(e)))?;
      if let Some(hosts) = &proxy.non_proxy_hosts {
        proxy_config = proxy_config.no_proxy(reqwest::NoProxy::from_string(&hosts.replace('|', ",")));
      }
      builder = builder.proxy(proxy_config);
    }
    let client = builder.build().map_err(|e| InspectionError::Remote(Box::new(e)))?;
    Ok(Self { url, client })
  }

  #[inline]
  pub fn url(&self) -> &Url { &self.url }
}

impl ModificationSource for Remote {
  fn last_modified(&self) -> Result<Option<SystemTime>, InspectionError> {
    let response = self.client.head(self.url.clone()).send()
      .and_then(|r| r.error_for_status())
      .map_err(|e| InspectionError::Remote(Box::new(e)))?;
    let Some(value) = response.headers().get(LAST_MODIFIED) else {
      return Ok(None);
    };
    let value = value.to_str()
      .map_err(|_| InspectionError::InvalidTimestamp(String::from_utf8_lossy(value.as_bytes()).into_owned()))?;
    parse_http_date(value).map(Some)
  }
}

/// Parses an HTTP date such as `Sun, 06 Nov 1994 08:49:37 GMT`.
pub fn parse_http_date(value: &str) -> Result<SystemTime, InspectionError> {
  let date = chrono::DateTime::parse_from_rfc2822(value.trim())
    .map_err(|_| InspectionError::InvalidTimestamp(value.to_string()))?;
  Ok(SystemTime::from(date))
}


#[cfg(test)]
mod test {
  use assert_matches::assert_matches;

  use super::*;

  #[test]
  fn test_parse_http_date() {
    let time = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").expect("failed to parse date");
    assert_eq!(time, SystemTime::UNIX_EPOCH + Duration::from_secs(784111777));
    assert_matches!(parse_http_date("yesterday"), Err(InspectionError::InvalidTimestamp(v)) if v == "yesterday");
  }

  #[test]
  fn test_unreachable_server_is_an_inspection_error() -> Result<(), InspectionError> {
    let url = Url::parse("http://127.0.0.1:9/service?wsdl").expect("failed to parse URL");
    let remote = Remote::with_proxy(url, None, Duration::from_secs(2))?;
    assert_matches!(remote.last_modified(), Err(InspectionError::Remote(_)));
    Ok(())
  }
}
