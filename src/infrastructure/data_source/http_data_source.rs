use reqwest::Client;

use crate::domain::{DataSource, Endpoint, FetchError, Payload};

/// GETs a JSON document from an HTTP endpoint.
#[derive(Debug, Clone)]
pub struct HttpDataSource {
    client: Client,
    endpoint: Option<Endpoint>,
}

impl HttpDataSource {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            endpoint: None,
        }
    }

    pub fn configure(&mut self, endpoint: Endpoint) {
        self.endpoint = Some(endpoint);
    }

    pub fn with_endpoint(mut self, endpoint: Endpoint) -> Self {
        self.configure(endpoint);
        self
    }
}

#[async_trait::async_trait]
impl DataSource for HttpDataSource {
    async fn fetch(&self) -> Result<Payload, FetchError> {
        let endpoint = self.endpoint.as_ref().ok_or(FetchError::NotConfigured)?;
        fetch(&self.client, endpoint).await
    }

    fn describe(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.url.to_string(),
            None => String::from("unconfigured http source"),
        }
    }
}

async fn fetch(client: &Client, endpoint: &Endpoint) -> Result<Payload, FetchError> {
    let mut request = client.get(endpoint.url.as_str()).query(&endpoint.query);
    for (name, value) in endpoint.headers.iter() {
        request = request.header(name.as_str(), value.as_str());
    }
    if let Some(timeout) = endpoint.timeout() {
        request = request.timeout(timeout);
    }

    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status(status.as_u16()));
    }

    let body = response.bytes().await.map_err(transport)?;
    serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
}

fn transport(e: reqwest::Error) -> FetchError {
    FetchError::Transport(Box::new(e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Url;
    use axum::{
        extract::Query,
        http::{HeaderMap, StatusCode},
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve() -> String {
        let app = Router::new()
            .route("/status", get(|| async { Json(json!({"ok": true})) }))
            .route(
                "/echo",
                get(
                    |Query(query): Query<HashMap<String, String>>, headers: HeaderMap| async move {
                        let token = headers
                            .get("x-token")
                            .and_then(|x| x.to_str().ok())
                            .unwrap_or_default()
                            .to_owned();
                        Json(json!({"query": query, "token": token}))
                    },
                ),
            )
            .route("/broken", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
            .route("/text", get(|| async { "plain text" }));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn source(base: &str, path: &str) -> HttpDataSource {
        let url = Url::new(format!("{base}{path}")).unwrap();
        HttpDataSource::new(Client::new()).with_endpoint(Endpoint::new(url))
    }

    #[tokio::test]
    async fn unconfigured_source_refuses_to_fetch() {
        let source = HttpDataSource::new(Client::new());
        assert!(matches!(source.fetch().await, Err(FetchError::NotConfigured)));
    }

    #[tokio::test]
    async fn fetches_json() {
        let base = serve().await;
        let payload = source(&base, "/status").fetch().await.unwrap();
        assert_eq!(payload, json!({"ok": true}));
    }

    #[tokio::test]
    async fn sends_query_and_headers() {
        let base = serve().await;
        let mut endpoint = Endpoint::new(Url::new(format!("{base}/echo")).unwrap());
        let _ = endpoint.query.insert("page".to_owned(), "2".to_owned());
        let _ = endpoint.headers.insert("x-token".to_owned(), "secret".to_owned());
        endpoint.timeout_secs = Some(5);

        let source = HttpDataSource::new(Client::new()).with_endpoint(endpoint);
        let payload = source.fetch().await.unwrap();

        assert_eq!(payload, json!({"query": {"page": "2"}, "token": "secret"}));
    }

    #[tokio::test]
    async fn maps_failures() {
        let base = serve().await;

        let err = source(&base, "/broken").fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Status(500)));

        let err = source(&base, "/text").fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));

        let err = source("http://127.0.0.1:9", "/").fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
