use anyhow::anyhow;
use async_trait::async_trait;
use hex::FromHex;
use hyper::client::HttpConnector;
use hyper::header::USER_AGENT;
use hyper::{Body, Client, Request, StatusCode, Uri};
use hyper_tls::HttpsConnector;
use tracing::trace;

use crate::engine::resource::{ExternalResourceAccessor, ResourceError};
use crate::util::blob::Blob;
use crate::util::validating_http_body::{
    HttpBodyValidator, Md5BodyValidator, Sha1BodyValidator, ValidatingHttpBody,
};

/// Retrieves and probes resources over HTTP(S), checking body integrity against
///  checksums announced in response headers.
///
/// Instances do HTTP connection caching internally, so keeping them alive has
///  performance benefits.
pub struct HttpResourceAccessor {
    client: Client<HttpsConnector<HttpConnector>>,
}

impl HttpResourceAccessor {
    pub fn new() -> HttpResourceAccessor {
        HttpResourceAccessor {
            client: Client::builder().build::<_, Body>(HttpsConnector::new()),
        }
    }

    fn request(&self, method: &str, location: &str) -> Result<Request<Body>, ResourceError> {
        let uri = Uri::try_from(location).map_err(|e| ResourceError::Access(e.into()))?;
        Request::builder()
            .method(method)
            .uri(uri)
            // Maven Central returns a 403 for requests without a user agent
            .header(USER_AGENT, "arti-resolve")
            .body(Body::empty())
            .map_err(|e| ResourceError::Access(e.into()))
    }
}

#[async_trait]
impl ExternalResourceAccessor for HttpResourceAccessor {
    async fn get(&self, location: &str) -> Result<Blob, ResourceError> {
        let request = self.request("GET", location)?;
        trace!("getting {}", location);

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ResourceError::Access(e.into()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(ResourceError::NotFound);
        }
        if !response.status().is_success() {
            return Err(ResourceError::Access(anyhow!(
                "request for {} failed: {}",
                location,
                response.status()
            )));
        }

        let sha1_string = response
            .headers()
            .get("x-checksum-sha1")
            .or_else(|| response.headers().get("x-goog-meta-checksum-sha1"))
            .or_else(|| response.headers().get("etag"))
            .and_then(|h| h.to_str().ok())
            .map(|s| if s.len() == 42 { &s[1..41] } else { s });
        let md5_string = response
            .headers()
            .get("x-checksum-md5")
            .or_else(|| response.headers().get("x-goog-meta-checksum-md5"))
            .and_then(|h| h.to_str().ok());

        let mut expected_sha1 = None;
        let mut expected_md5 = None;
        let mut validators: Vec<Box<dyn HttpBodyValidator>> = vec![];

        // an etag need not be a hash at all, so unparseable header values are skipped
        if let Some(expected_hash) = sha1_string.and_then(|s| <[u8; 20]>::from_hex(s).ok()) {
            expected_sha1 = Some(expected_hash);
            validators.push(Box::new(Sha1BodyValidator::new(expected_hash)));
        }
        if let Some(expected_hash) = md5_string.and_then(|s| <[u8; 16]>::from_hex(s).ok()) {
            expected_md5 = Some(expected_hash);
            validators.push(Box::new(Md5BodyValidator::new(expected_hash)));
        }

        Ok(Blob {
            data: Box::pin(ValidatingHttpBody::new(response.into_body(), validators)),
            md5: expected_md5,
            sha1: expected_sha1,
        })
    }

    async fn exists(&self, location: &str) -> Result<bool, ResourceError> {
        let request = self.request("HEAD", location)?;
        trace!("probing {}", location);

        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ResourceError::Access(e.into()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if response.status().is_success() {
            return Ok(true);
        }
        Err(ResourceError::Access(anyhow!(
            "probe for {} failed: {}",
            location,
            response.status()
        )))
    }
}
