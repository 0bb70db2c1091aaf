//! The Movies API client.
//!
//! Every operation returns `Ok(ApiResponse)` as soon as the server answered,
//! whatever the status. `Err(ClientError)` is reserved for calls that never got
//! a response (bad URL, connection refused, DNS, timeout). There are no
//! built-in retries; wrap calls externally if you need them.

use reqwest::{Method, RequestBuilder, StatusCode, Url};
use tracing::field::Empty;
use tracing::{Span, debug, instrument, warn};

use movies_core::{Movie, MovieDraft, MovieId, MovieUpdate};

use crate::config::ClientConfig;
use crate::envelope::{self, ApiResponse, DeleteConfirmation};
use crate::error::ClientError;

const COLLECTION: &str = "movies";

/// Stateless, cheaply cloneable client for the `/movies` resource.
#[derive(Debug, Clone)]
pub struct MoviesClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MoviesClient {
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Setup)?;
        Self::with_http_client(&config.base_url, http)
    }

    /// Use an existing `reqwest::Client` (shared connection pool, custom TLS, ...).
    pub fn with_http_client(base_url: &str, http: reqwest::Client) -> Result<Self, ClientError> {
        Ok(Self {
            http,
            base_url: parse_base_url(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET /movies`
    #[instrument(skip(self), fields(base_url = %self.base_url, status = Empty))]
    pub async fn list(&self) -> Result<ApiResponse<Vec<Movie>>, ClientError> {
        let url = self.endpoint(COLLECTION)?;
        self.execute(self.http.get(url.clone()), Method::GET, url, envelope::decode_data)
            .await
    }

    /// `GET /movies/{id}`
    #[instrument(skip(self), fields(base_url = %self.base_url, status = Empty))]
    pub async fn get_by_id(&self, id: MovieId) -> Result<ApiResponse<Movie>, ClientError> {
        let url = self.movie_url(id)?;
        self.execute(self.http.get(url.clone()), Method::GET, url, envelope::decode_data)
            .await
    }

    /// `GET /movies?name={name}`; the name is percent-encoded as a query value.
    #[instrument(skip(self), fields(base_url = %self.base_url, status = Empty))]
    pub async fn get_by_name(&self, name: &str) -> Result<ApiResponse<Movie>, ClientError> {
        let mut url = self.endpoint(COLLECTION)?;
        url.query_pairs_mut().append_pair("name", name);
        self.execute(self.http.get(url.clone()), Method::GET, url, envelope::decode_data)
            .await
    }

    /// `POST /movies`
    #[instrument(
        skip(self, draft),
        fields(base_url = %self.base_url, name = %draft.name, status = Empty)
    )]
    pub async fn create(&self, draft: &MovieDraft) -> Result<ApiResponse<Movie>, ClientError> {
        let url = self.endpoint(COLLECTION)?;
        let request = self.http.post(url.clone()).json(draft);
        self.execute(request, Method::POST, url, envelope::decode_data)
            .await
    }

    /// `PUT /movies/{id}` with only the supplied fields.
    #[instrument(skip(self, update), fields(base_url = %self.base_url, status = Empty))]
    pub async fn update(
        &self,
        id: MovieId,
        update: &MovieUpdate,
    ) -> Result<ApiResponse<Movie>, ClientError> {
        let url = self.movie_url(id)?;
        let request = self.http.put(url.clone()).json(update);
        self.execute(request, Method::PUT, url, envelope::decode_data)
            .await
    }

    /// `DELETE /movies/{id}`
    #[instrument(skip(self), fields(base_url = %self.base_url, status = Empty))]
    pub async fn delete_by_id(
        &self,
        id: MovieId,
    ) -> Result<ApiResponse<DeleteConfirmation>, ClientError> {
        let url = self.movie_url(id)?;
        self.execute(
            self.http.delete(url.clone()),
            Method::DELETE,
            url,
            envelope::decode_confirmation,
        )
        .await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::invalid_url(format!("{}{}", self.base_url, path), e))
    }

    fn movie_url(&self, id: MovieId) -> Result<Url, ClientError> {
        self.endpoint(&format!("{COLLECTION}/{id}"))
    }

    async fn execute<T>(
        &self,
        request: RequestBuilder,
        method: Method,
        url: Url,
        decode: fn(StatusCode, &[u8]) -> ApiResponse<T>,
    ) -> Result<ApiResponse<T>, ClientError> {
        let transport = |source: reqwest::Error| ClientError::Transport {
            method: method.clone(),
            url: url.to_string(),
            source,
        };

        let response = match request.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(%method, %url, error = %e, "no response from movies api");
                return Err(transport(e));
            }
        };

        let status = response.status();
        Span::current().record("status", status.as_u16());

        let body = match response.bytes().await {
            Ok(b) => b,
            Err(e) => {
                warn!(
                    %method,
                    %url,
                    status = status.as_u16(),
                    error = %e,
                    "failed to read response body"
                );
                return Err(transport(e));
            }
        };

        let result = decode(status, &body);
        match &result {
            ApiResponse::Success(_) => {
                debug!(%method, %url, status = status.as_u16(), "request succeeded")
            }
            ApiResponse::Failure(err) => debug!(
                %method,
                %url,
                status = err.status,
                error = %err.error,
                "movies api reported failure"
            ),
        }
        Ok(result)
    }
}

/// Parse the base URL and make sure relative joins append to its path.
fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let mut url = Url::parse(raw.trim()).map_err(|e| ClientError::invalid_url(raw, e))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::invalid_url(raw, "scheme must be http or https"));
    }
    if url.cannot_be_a_base() {
        return Err(ClientError::invalid_url(raw, "url cannot be used as a base"));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}
