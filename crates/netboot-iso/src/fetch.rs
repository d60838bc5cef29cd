//! Upstream fetch with bounded redirect following
//!
//! Redirects are followed by hand rather than by the HTTP client so the
//! hop limit is ours, each hop gets its own header timeout, and a `Range`
//! header survives a change of host.

use crate::config::IsoConfig;
use crate::error::{IsoError, Result};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP client for source ISOs
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    max_redirects: usize,
    header_timeout: Duration,
}

impl Fetcher {
    pub fn new(config: &IsoConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self {
            client,
            max_redirects: config.max_redirects,
            header_timeout: config.header_timeout,
        })
    }

    /// Send `method` to `url`, following up to `max_redirects` hops.
    /// Only a 2xx final response is returned.
    pub async fn fetch(
        &self,
        method: Method,
        url: Url,
        range: Option<&HeaderValue>,
    ) -> Result<reqwest::Response> {
        let mut current = url;
        let mut hops = 0;
        loop {
            let mut request = self.client.request(method.clone(), current.clone());
            if let Some(range) = range {
                request = request.header(header::RANGE, range.clone());
            }

            let response = tokio::time::timeout(self.header_timeout, request.send())
                .await
                .map_err(|_| IsoError::UpstreamTimeout(self.header_timeout))??;
            let status = response.status();

            if is_redirect(status) {
                if hops >= self.max_redirects {
                    return Err(IsoError::TooManyRedirects(self.max_redirects));
                }
                let next = redirect_target(&current, response.headers())?;
                hops += 1;
                debug!(from = %current, to = %next, status = %status, hop = hops, "Following redirect");
                current = next;
                continue;
            }

            if !status.is_success() {
                return Err(IsoError::UpstreamStatus(status));
            }
            debug!(url = %current, status = %status, hops, "Fetched source ISO");
            return Ok(response);
        }
    }
}

fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Resolve the `Location` header against the URL that returned it
fn redirect_target(current: &Url, headers: &HeaderMap) -> Result<Url> {
    let bad = |reason: &str| IsoError::BadRedirect {
        url: current.to_string(),
        reason: reason.to_string(),
    };
    let location = headers
        .get(header::LOCATION)
        .ok_or_else(|| bad("missing Location header"))?
        .to_str()
        .map_err(|_| bad("Location header is not valid text"))?;
    let next = current
        .join(location)
        .map_err(|e| bad(&format!("invalid Location '{location}': {e}")))?;
    match next.scheme() {
        "http" | "https" => Ok(next),
        other => Err(bad(&format!("unsupported scheme '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::response::{IntoResponse, Redirect};
    use axum::routing::get;
    use axum::Router;
    use std::net::SocketAddr;

    async fn spawn_upstream(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    /// `/hop/{n}` redirects to `/hop/{n-1}`; `/hop/0` serves the body
    async fn chain_upstream() -> SocketAddr {
        let router = Router::new().route(
            "/hop/{n}",
            get(|Path(n): Path<u32>| async move {
                if n == 0 {
                    "payload".into_response()
                } else {
                    Redirect::temporary(&format!("/hop/{}", n - 1)).into_response()
                }
            }),
        );
        spawn_upstream(router).await
    }

    fn fetcher(max_redirects: usize) -> Fetcher {
        Fetcher::new(&IsoConfig::new("MAGIC").with_max_redirects(max_redirects)).unwrap()
    }

    #[test]
    fn test_redirect_target_relative() {
        let current = Url::parse("http://a.example/dir/file.iso").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::LOCATION, HeaderValue::from_static("../other.iso"));
        assert_eq!(
            redirect_target(&current, &headers).unwrap().as_str(),
            "http://a.example/other.iso"
        );

        headers.insert(header::LOCATION, HeaderValue::from_static("ftp://b.example/x.iso"));
        assert!(redirect_target(&current, &headers).is_err());

        assert!(redirect_target(&current, &HeaderMap::new()).is_err());
    }

    #[tokio::test]
    async fn test_follows_redirect_chain() {
        let addr = chain_upstream().await;
        let url = Url::parse(&format!("http://{addr}/hop/3")).unwrap();

        let response = fetcher(10).fetch(Method::GET, url, None).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.text().await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn test_redirect_limit() {
        let addr = chain_upstream().await;
        let url = Url::parse(&format!("http://{addr}/hop/4")).unwrap();

        let err = fetcher(3).fetch(Method::GET, url.clone(), None).await.unwrap_err();
        assert!(matches!(err, IsoError::TooManyRedirects(3)));

        assert!(fetcher(4).fetch(Method::GET, url, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_redirect_loop_terminates() {
        let router = Router::new().route("/loop", get(|| async { Redirect::to("/loop") }));
        let addr = spawn_upstream(router).await;
        let url = Url::parse(&format!("http://{addr}/loop")).unwrap();

        let err = fetcher(5).fetch(Method::GET, url, None).await.unwrap_err();
        assert!(matches!(err, IsoError::TooManyRedirects(5)));
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let addr = spawn_upstream(Router::new()).await;
        let url = Url::parse(&format!("http://{addr}/missing.iso")).unwrap();

        let err = fetcher(10).fetch(Method::GET, url, None).await.unwrap_err();
        assert!(matches!(err, IsoError::UpstreamStatus(StatusCode::NOT_FOUND)));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let url = Url::parse(&format!("http://{addr}/hook.iso")).unwrap();

        let err = fetcher(10).fetch(Method::GET, url, None).await.unwrap_err();
        assert!(matches!(err, IsoError::Request(_)));
        assert_eq!(err.status(), StatusCode::BAD_GATEWAY);
    }
}
