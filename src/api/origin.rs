use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};

use crate::db::Listing;

/// Public path the upload directory is served under.
pub const UPLOADS_PATH: &str = "/uploads";

/// `scheme://host` the client used to reach us, honouring reverse-proxy headers.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOrigin {
    base: String,
}

impl RequestOrigin {
    pub fn from_parts(headers: &HeaderMap, authority: Option<&str>) -> Self {
        let scheme = first_value(headers, "x-forwarded-proto").unwrap_or("http");
        let host = first_value(headers, "x-forwarded-host")
            .or_else(|| first_value(headers, header::HOST.as_str()))
            .or(authority)
            .unwrap_or("localhost");

        Self {
            base: format!("{}://{}", scheme, host),
        }
    }

    pub fn image_url(&self, filename: &str) -> String {
        format!("{}{}/{}", self.base, UPLOADS_PATH, filename)
    }

    /// Rewrite a stored image filename into an absolute URL.
    pub fn materialize(&self, mut listing: Listing) -> Listing {
        listing.image = listing.image.map(|filename| self.image_url(&filename));
        listing
    }
}

fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

impl<S: Send + Sync> FromRequestParts<S> for RequestOrigin {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let authority = parts.uri.authority().map(|a| a.as_str());
        Ok(Self::from_parts(&parts.headers, authority))
    }
}
