//! Extractors whose rejections render as the JSON error envelope.
//!
//! axum's own `Json` and `Path` reject with plain-text bodies; these wrappers
//! run the same extraction and turn the rejection into an [`ApiError`].

use std::marker::PhantomData;

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, OptionalFromRequest, Path, Request,
        rejection::{JsonRejection, PathRejection},
    },
    http::{StatusCode, request::Parts},
};
use serde::de::DeserializeOwned;

use super::ApiError;

/// JSON request body.
pub struct ApiJson<T>(pub T);

fn json_rejection(rejection: &JsonRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(rejection.body_text())
    } else {
        ApiError::validation(rejection.body_text())
    }
}

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match <Json<T> as FromRequest<S>>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(json_rejection(&rejection)),
        }
    }
}

/// `Option<ApiJson<T>>` is `None` when the request carries no JSON body at all.
impl<S, T> OptionalFromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        match <Json<T> as OptionalFromRequest<S>>::from_request(req, state).await {
            Ok(value) => Ok(value.map(|Json(value)| Self(value))),
            Err(rejection) => Err(json_rejection(&rejection)),
        }
    }
}

/// Kind of row an `{id}` segment points at, used for the 404 message.
pub trait Resource {
    const NAME: &'static str;
}

pub enum ItemResource {}

impl Resource for ItemResource {
    const NAME: &'static str = "Item";
}

pub enum ClaimResource {}

impl Resource for ClaimResource {
    const NAME: &'static str = "Claim";
}

pub enum NotificationResource {}

impl Resource for NotificationResource {
    const NAME: &'static str = "Notification";
}

/// Raw `{id}` path segment, for routes that also accept keywords such as `all`.
pub struct IdSegment<R> {
    pub raw: String,
    resource: PhantomData<fn() -> R>,
}

impl<S, R> FromRequestParts<S> for IdSegment<R>
where
    R: Resource,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = <Path<String> as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| path_rejection::<R>(&rejection))?;

        Ok(Self {
            raw,
            resource: PhantomData,
        })
    }
}

/// Numeric `{id}` path segment. A segment that is not a number names no row,
/// so it is answered like a missing one.
pub struct IdPath<R> {
    pub id: i32,
    resource: PhantomData<fn() -> R>,
}

impl<S, R> FromRequestParts<S> for IdPath<R>
where
    R: Resource,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let segment = IdSegment::<R>::from_request_parts(parts, state).await?;

        Ok(Self {
            id: parse_id::<R>(&segment.raw)?,
            resource: PhantomData,
        })
    }
}

fn path_rejection<R: Resource>(rejection: &PathRejection) -> ApiError {
    match rejection {
        PathRejection::FailedToDeserializePathParams(_) => ApiError::not_found(R::NAME),
        _ => ApiError::internal(rejection.body_text()),
    }
}

/// Parses an id segment, reporting `<Resource> not found` for anything that
/// is not a positive integer.
pub fn parse_id<R: Resource>(raw: &str) -> Result<i32, ApiError> {
    raw.parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| ApiError::not_found(R::NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_ids_read_as_missing_rows() {
        assert_eq!(parse_id::<ItemResource>("17").unwrap(), 17);

        for raw in ["abc", "-3", "0", "1.5", "99999999999"] {
            let err = parse_id::<ClaimResource>(raw).unwrap_err();
            assert!(
                matches!(&err, ApiError::NotFound(msg) if msg == "Claim not found"),
                "{raw}: {err}"
            );
        }
    }
}
