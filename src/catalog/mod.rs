use std::time::Duration;

use futures_util::future::BoxFuture;
use log::{debug, error, info, warn};
use reqwest::Client;

pub mod filter;
pub mod models;

use self::models::Game;

pub const CATALOG_URL: &str =
    "https://raw.githubusercontent.com/antrachhuynh/retrogames/main/src/data.json";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
const CLIENT_USER_AGENT: &str = concat!("retro-popup/", env!("CARGO_PKG_VERSION"));

/// Anything the popup can pull a catalog from.
///
/// The popup spawns the returned future on its runtime, so it must own
/// everything it touches.
pub trait CatalogSource: Send + Sync + 'static {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Game>, String>>;
}

#[derive(Clone)]
pub struct CatalogFetcher {
    client: Client,
    url: String,
}

impl CatalogFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!("catalog: falling back to default HTTP client configuration ({err})");
                Client::new()
            });
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Download and parse the catalog.
    ///
    /// # Errors
    /// Returns an error string if the request fails, the server answers with a
    /// non-success status, or the body is not a JSON array of games.
    pub async fn fetch_catalog(&self) -> Result<Vec<Game>, String> {
        debug!("catalog: GET {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|err| format!("catalog request failed: {err}"))?;

        if !response.status().is_success() {
            return Err(format!(
                "catalog request returned status: {}",
                response.status()
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|err| format!("failed to read catalog body: {err}"))?;
        parse_catalog(&body)
    }

    /// Fetch the catalog, degrading to an empty list on any failure.
    pub async fn load_catalog(&self) -> Vec<Game> {
        catalog_or_empty(self.fetch_catalog().await)
    }
}

impl CatalogSource for CatalogFetcher {
    fn fetch(&self) -> BoxFuture<'static, Result<Vec<Game>, String>> {
        let fetcher = self.clone();
        Box::pin(async move { fetcher.fetch_catalog().await })
    }
}

/// Parse a catalog document. The whole payload is rejected if any entry is
/// missing a field or carries the wrong type.
pub fn parse_catalog(body: &str) -> Result<Vec<Game>, String> {
    serde_json::from_str::<Vec<Game>>(body)
        .map_err(|err| format!("failed to parse catalog: {err}"))
}

/// Failures are logged and never reach the user; they show up as an empty
/// catalog.
pub fn catalog_or_empty(result: Result<Vec<Game>, String>) -> Vec<Game> {
    match result {
        Ok(games) => {
            info!("catalog: loaded {} games", games.len());
            games
        }
        Err(err) => {
            error!("catalog: error fetching data: {err}");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    const TWO_GAMES: &str = r#"[
        {"id": 7, "name": "Tetris", "description": "Blocks", "thumb": "https://t/7.png", "link": "https://g/7"},
        {"id": 3, "name": "Pac-Man", "description": "Dots", "thumb": "https://t/3.png", "link": "https://g/3"}
    ]"#;

    /// Answer exactly one request with the given status line and body.
    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind test listener");
        let addr = listener.local_addr().expect("listener addr");
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 4096];
                let mut request = Vec::new();
                while let Ok(n) = stream.read(&mut buf) {
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    if request.windows(4).any(|w| w == b"\r\n\r\n") {
                        break;
                    }
                }
                let response = format!(
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });
        format!("http://{addr}/data.json")
    }

    fn fetcher(url: String) -> CatalogFetcher {
        // Local responders must not be routed through an ambient proxy.
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("test client");
        CatalogFetcher { client, url }
    }

    #[test]
    fn parses_catalog_in_document_order() {
        let games = parse_catalog(TWO_GAMES).expect("valid catalog");
        let ids: Vec<i64> = games.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![7, 3]);
        assert_eq!(games[1].name, "Pac-Man");
        assert_eq!(games[1].link, "https://g/3");
    }

    #[test]
    fn parses_empty_array() {
        assert_eq!(parse_catalog("[]"), Ok(Vec::new()));
    }

    #[test]
    fn rejects_non_array_bodies() {
        assert!(parse_catalog(r#"{"games": []}"#).is_err());
        assert!(parse_catalog("42").is_err());
        assert!(parse_catalog("null").is_err());
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(parse_catalog("[{\"id\": 1,").is_err());
        assert!(parse_catalog("<html>404</html>").is_err());
    }

    #[test]
    fn rejects_entries_with_missing_or_mistyped_fields() {
        let missing_link = r#"[{"id": 1, "name": "A", "description": "", "thumb": ""}]"#;
        assert!(parse_catalog(missing_link).is_err());

        let string_id = r#"[{"id": "1", "name": "A", "description": "", "thumb": "", "link": ""}]"#;
        assert!(parse_catalog(string_id).is_err());
    }

    #[test]
    fn failures_collapse_to_empty_catalog() {
        assert!(catalog_or_empty(Err("boom".into())).is_empty());
        let games = parse_catalog(TWO_GAMES).expect("valid catalog");
        assert_eq!(catalog_or_empty(Ok(games.clone())), games);
    }

    #[tokio::test]
    async fn fetches_catalog_over_http() {
        let url = serve_once("200 OK", TWO_GAMES);
        let games = fetcher(url).fetch_catalog().await.expect("fetch ok");
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].name, "Tetris");
    }

    #[tokio::test]
    async fn server_error_status_loads_empty_catalog() {
        let url = serve_once("500 Internal Server Error", "oops");
        let err = fetcher(url).fetch_catalog().await.expect_err("status error");
        assert!(err.contains("500"));

        let url = serve_once("404 Not Found", "[]");
        assert!(fetcher(url).load_catalog().await.is_empty());
    }

    #[tokio::test]
    async fn non_array_body_loads_empty_catalog() {
        let url = serve_once("200 OK", r#"{"id": 1}"#);
        assert!(fetcher(url).load_catalog().await.is_empty());
    }

    #[tokio::test]
    async fn unreachable_host_loads_empty_catalog() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let url = format!("http://127.0.0.1:{port}/data.json");
        assert!(fetcher(url).load_catalog().await.is_empty());
    }

    #[tokio::test]
    async fn source_trait_delegates_to_fetch() {
        let url = serve_once("200 OK", TWO_GAMES);
        let source: Box<dyn CatalogSource> = Box::new(fetcher(url));
        let games = source.fetch().await.expect("fetch ok");
        assert_eq!(games[1].id, 3);
    }
}
