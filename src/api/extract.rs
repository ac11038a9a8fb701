use axum::{
    async_trait,
    body::{Bytes, HttpBody},
    extract::{FromRequest, FromRequestParts, Json as AxumJson, Path as AxumPath},
    http::{header, request::Parts, HeaderMap, Request},
    response::{IntoResponse, Response},
    BoxError,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

use super::Error;

pub struct Json<T>(pub T);

#[derive(Debug, Error)]
pub enum JsonError {
    #[error("Invalid mime type, expected application/json")]
    Mime,
    #[error("Could not read body bytes: {}", .0)]
    BodyRead(#[from] axum::extract::rejection::BytesRejection),
    #[error("Invalid JSON structure: {}", .0)]
    Data(String),
    #[error("Invalid JSON syntax: {}", .0)]
    Syntax(String),
    #[error("IO error")]
    Io,
}

impl From<JsonError> for Error {
    fn from(value: JsonError) -> Self {
        match value {
            JsonError::Io | JsonError::BodyRead(_) => Error::BadRequest(value.to_string()),
            JsonError::Mime | JsonError::Data(_) | JsonError::Syntax(_) => {
                Error::Unprocessable(value.to_string())
            }
        }
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        Error::from(self).into_response()
    }
}

#[async_trait]
impl<S, B, T> FromRequest<S, B> for Json<T>
where
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
    T: for<'de> Deserialize<'de> + Send,
{
    type Rejection = JsonError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        if !json_content_type(req.headers()) {
            return Err(JsonError::Mime);
        }
        let bytes = Bytes::from_request(req, state).await?;
        let deserializer = &mut serde_json::Deserializer::from_slice(&bytes);

        let value = match serde_path_to_error::deserialize(deserializer) {
            Ok(value) => value,
            Err(err) => {
                let rejection = match err.inner().classify() {
                    serde_json::error::Category::Data => JsonError::Data(err.to_string()),
                    serde_json::error::Category::Syntax | serde_json::error::Category::Eof => {
                        JsonError::Syntax(err.path().to_string())
                    }
                    serde_json::error::Category::Io => JsonError::Io,
                };
                return Err(rejection);
            }
        };

        Ok(Json(value))
    }
}

fn json_content_type(headers: &HeaderMap) -> bool {
    let content_type = if let Some(content_type) = headers.get(header::CONTENT_TYPE) {
        content_type
    } else {
        return false;
    };

    let content_type = if let Ok(content_type) = content_type.to_str() {
        content_type
    } else {
        return false;
    };

    let mime = if let Ok(mime) = content_type.parse::<mime::Mime>() {
        mime
    } else {
        return false;
    };

    mime.type_() == mime::APPLICATION
        && (mime.subtype() == mime::JSON
            || mime.suffix().map_or(false, |suffix| suffix == mime::JSON))
}

impl<T> IntoResponse for Json<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

/// Path parameters that fail to parse (e.g. `/drinks/abc`) address nothing.
pub struct Path<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AxumPath(t) = AxumPath::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Invalid URL path");
                Error::NotFound
            })?;
        Ok(Self(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn accepts_json_mime_types() {
        assert!(json_content_type(&headers("application/json")));
        assert!(json_content_type(&headers("application/json; charset=utf-8")));
        assert!(json_content_type(&headers("application/problem+json")));
    }

    #[test]
    fn rejects_other_mime_types() {
        assert!(!json_content_type(&HeaderMap::new()));
        assert!(!json_content_type(&headers("text/plain")));
        assert!(!json_content_type(&headers(
            "application/x-www-form-urlencoded"
        )));
    }
}
