use axum::{
    async_trait,
    body::{Bytes, HttpBody},
    extract::{FromRequest, FromRequestParts, Path as AxumPath},
    http::{request::Parts, Request},
    BoxError,
};
use serde::de::DeserializeOwned;
use serde_json::{map::Entry, Map, Value};
use thiserror::Error;

use super::error::PageError;

/// An urlencoded form body. Repeated keys (multi-selects) become lists.
pub struct Form<T>(pub T);

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Could not read body bytes: {}", .0)]
    BodyRead(#[from] axum::extract::rejection::BytesRejection),
    #[error("Invalid form data: {}", .0)]
    Data(String),
}

pub fn collect_fields(body: &[u8]) -> Map<String, Value> {
    let mut fields = Map::new();
    for (key, value) in url::form_urlencoded::parse(body) {
        let key = key.trim_end_matches("[]").to_owned();
        let value = Value::String(value.into_owned());
        match fields.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::Array(values) => values.push(value),
                existing => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
            },
        }
    }
    fields
}

#[async_trait]
impl<S, B, T> FromRequest<S, B> for Form<T>
where
    B: HttpBody + Send + 'static,
    B::Data: Send,
    B::Error: Into<BoxError>,
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = PageError;

    async fn from_request(req: Request<B>, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(FormError::from)?;
        let fields = Value::Object(collect_fields(&bytes));
        serde_path_to_error::deserialize(fields)
            .map(Form)
            .map_err(|e| FormError::Data(e.to_string()).into())
    }
}

/// Unparsable path parameters render the not found page.
pub struct Path<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = PageError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AxumPath(t) = AxumPath::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| {
                tracing::debug!(error = %e, "Invalid URL path");
                PageError::NotFound
            })?;
        Ok(Self(t))
    }
}
