//! Wire operations for one resource type.

use crate::client::{Accepted, ApiClient, decode_envelope};
use mealdesk_core::{ApiError, EntityId, Resource, ResourceKind, Validate};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// List, get, create, update and delete for resource `R`.
///
/// Drafts and patches are validated before anything is sent.
pub struct ResourceApi<R> {
    client: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R: Resource> ResourceApi<R> {
    /// Access `R` through `client`
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self {
            client,
            _resource: PhantomData,
        }
    }

    /// Which resource this accesses
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        R::KIND
    }

    /// Underlying HTTP client
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// `GET /{resource}`
    ///
    /// # Errors
    ///
    /// Returns any [`ApiError`] from the request.
    pub async fn list(&self) -> Result<Vec<R::Entity>, ApiError> {
        self.client
            .request(Method::GET, R::KIND.api_path(), None)
            .await
    }

    /// `GET /{resource}/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] on 404, or any other [`ApiError`].
    pub async fn get(&self, id: &EntityId) -> Result<R::Entity, ApiError> {
        self.client
            .request(Method::GET, &item_path(R::KIND, id), None)
            .await
    }

    /// `POST /{resource}`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending if the draft is
    /// invalid, [`ApiError::Conflict`] on 409, or any other [`ApiError`].
    pub async fn create(&self, draft: &R::Draft) -> Result<R::Entity, ApiError> {
        self.create_accepted(draft).await?
    }

    /// [`create`](Self::create), separating rejection from an unreadable
    /// response to an accepted request
    ///
    /// # Errors
    ///
    /// Same as [`create`](Self::create); a body that is not an entity
    /// envelope comes back inside `Ok`.
    pub async fn create_accepted(
        &self,
        draft: &R::Draft,
    ) -> Result<Accepted<R::Entity>, ApiError> {
        draft.validate()?;
        let body = to_body(draft)?;
        let payload = self
            .client
            .submit(Method::POST, R::KIND.api_path(), Some(&body))
            .await?;
        Ok(payload.and_then(decode_envelope))
    }

    /// `PATCH /{resource}/{id}` with only the fields present in `patch`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] without sending if the patch is
    /// invalid, or any [`ApiError`] from the request.
    pub async fn update(&self, id: &EntityId, patch: &R::Patch) -> Result<R::Entity, ApiError> {
        self.update_accepted(id, patch).await?
    }

    /// [`update`](Self::update), separating rejection from an unreadable
    /// response to an accepted request
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update); a body that is not an entity
    /// envelope comes back inside `Ok`.
    pub async fn update_accepted(
        &self,
        id: &EntityId,
        patch: &R::Patch,
    ) -> Result<Accepted<R::Entity>, ApiError> {
        patch.validate()?;
        let body = to_body(patch)?;
        let payload = self
            .client
            .submit(Method::PATCH, &item_path(R::KIND, id), Some(&body))
            .await?;
        Ok(payload.and_then(decode_envelope))
    }

    /// `DELETE /{resource}/{id}`; any 2xx counts, whatever the body
    ///
    /// # Errors
    ///
    /// Returns any [`ApiError`] from the request.
    pub async fn delete(&self, id: &EntityId) -> Result<(), ApiError> {
        self.client
            .submit(Method::DELETE, &item_path(R::KIND, id), None)
            .await
            .map(|_| ())
    }
}

impl<R> Clone for ResourceApi<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            _resource: PhantomData,
        }
    }
}

impl<R: Resource> fmt::Debug for ResourceApi<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceApi")
            .field("resource", &R::KIND)
            .field("client", &self.client)
            .finish()
    }
}

fn item_path(kind: ResourceKind, id: &EntityId) -> String {
    format!("{}/{}", kind.api_path(), urlencoding::encode(id.as_str()))
}

fn to_body(payload: &impl Serialize) -> Result<Value, ApiError> {
    serde_json::to_value(payload).map_err(|e| ApiError::Decode(format!("request body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_paths_escape_ids() {
        assert_eq!(item_path(ResourceKind::Meals, &EntityId::from(4)), "/meals/4");
        assert_eq!(
            item_path(ResourceKind::AppUsers, &EntityId::from("a/b c")),
            "/app-users/a%2Fb%20c"
        );
    }
}
