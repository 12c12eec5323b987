//! Resource types served by the REST API.

use crate::id::EntityId;
use crate::route::Route;
use crate::validation::Validate;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt;

/// The three managed resource types
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// `/app-users`
    AppUsers,
    /// `/meals`
    Meals,
    /// `/recipes`
    Recipes,
}

/// Operations a view can perform on a resource
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Fetch the list
    List,
    /// Fetch one entity
    Get,
    /// Create an entity
    Create,
    /// Patch an entity
    Update,
    /// Delete an entity
    Delete,
}

impl ResourceKind {
    /// Stable short name, used in cache keys, logs and metric labels
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AppUsers => "app-users",
            Self::Meals => "meals",
            Self::Recipes => "recipes",
        }
    }

    /// API collection path
    #[must_use]
    pub const fn api_path(self) -> &'static str {
        match self {
            Self::AppUsers => "/app-users",
            Self::Meals => "/meals",
            Self::Recipes => "/recipes",
        }
    }

    /// Route of the resource's table view
    #[must_use]
    pub const fn list_route(self) -> Route {
        match self {
            Self::AppUsers => Route::AppUsers,
            Self::Meals => Route::Meals,
            Self::Recipes => Route::Recipes,
        }
    }

    /// Route of one entity's detail view
    #[must_use]
    pub fn detail_route(self, id: EntityId) -> Route {
        match self {
            Self::AppUsers => Route::AppUser(id),
            Self::Meals => Route::Meal(id),
            Self::Recipes => Route::Recipe(id),
        }
    }

    /// Message for a duplicate on create/update
    #[must_use]
    pub const fn conflict_message(self) -> &'static str {
        match self {
            Self::AppUsers => "A user with this name already exists.",
            Self::Meals => "A meal with this name already exists.",
            Self::Recipes => "A recipe with this data already exists.",
        }
    }

    /// Message for a 404 on create/update
    #[must_use]
    pub const fn missing_reference_message(self) -> &'static str {
        match self {
            Self::AppUsers => "App user not found.",
            Self::Meals => "Meal not found.",
            Self::Recipes => "User or Meal not found. Check IDs.",
        }
    }

    /// Message for a detail view that could not be loaded
    #[must_use]
    pub const fn load_failed_message(self) -> &'static str {
        match self {
            Self::AppUsers => "App user not found or failed to load.",
            Self::Meals => "Meal not found or failed to load.",
            Self::Recipes => "Recipe not found or failed to load.",
        }
    }

    /// Question asked before deleting
    #[must_use]
    pub const fn delete_prompt(self) -> &'static str {
        match self {
            Self::AppUsers => "Are you sure you want to delete this app user?",
            Self::Meals => "Are you sure you want to delete this meal?",
            Self::Recipes => "Are you sure you want to delete this recipe?",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entities that carry a server-assigned id
pub trait Identified {
    /// The entity's id
    fn id(&self) -> &EntityId;
}

/// A resource type: its entity, its create payload and its patch payload
///
/// Draft and patch types serialize straight to the wire format; the field
/// renames on those types are the translation boundary between client and
/// wire field names.
pub trait Resource: Send + Sync + 'static {
    /// Which resource this is
    const KIND: ResourceKind;

    /// Entity as returned by the API
    type Entity: Identified + Clone + fmt::Debug + PartialEq + DeserializeOwned + Send + Sync + 'static;

    /// Every field except the id
    type Draft: Validate + Serialize + fmt::Debug + Send + Sync;

    /// Sparse update; absent fields are not serialized
    type Patch: Validate + Serialize + fmt::Debug + Send + Sync;
}
