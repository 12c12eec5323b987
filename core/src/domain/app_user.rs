//! App users.
//!
//! The client calls the display name `userName`; the API calls it `name`.

use crate::id::EntityId;
use crate::validation::{Validate, ValidationErrors, char_len};
use serde::{Deserialize, Serialize};

const NAME_TOO_SHORT: &str = "Name is too short";

/// An app user as returned by the API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUser {
    /// Server-assigned id
    pub id: EntityId,
    /// Display name
    #[serde(alias = "name")]
    pub user_name: String,
    /// Whether the user finished registration
    pub is_registered: bool,
    /// Recipes authored by the user, when the API embeds them
    #[serde(default)]
    pub recipes: Vec<AppUserRecipe>,
}

/// Recipe summary embedded in an app user
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUserRecipe {
    /// Recipe id
    pub id: EntityId,
    /// Recipe description
    pub description: String,
    /// Cooking time in minutes
    pub cooking_time: u32,
    /// Meal the recipe belongs to
    #[serde(default)]
    pub meal: Option<AppUserRecipeMeal>,
}

/// Meal summary embedded in an app user's recipe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUserRecipeMeal {
    /// Meal id
    pub id: EntityId,
    /// Meal name
    pub name: String,
    /// Meal category label
    #[serde(alias = "mealName")]
    pub meal_type: String,
}

/// Create payload: `POST /app-users {name, isRegistered}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppUserDraft {
    /// Display name
    #[serde(rename = "name")]
    pub user_name: String,
    /// Whether the user finished registration
    #[serde(rename = "isRegistered")]
    pub is_registered: bool,
}

impl AppUserDraft {
    /// New draft
    pub fn new(user_name: impl Into<String>, is_registered: bool) -> Self {
        Self {
            user_name: user_name.into(),
            is_registered,
        }
    }
}

impl Validate for AppUserDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(char_len(&self.user_name) >= 2, "userName", NAME_TOO_SHORT);
        errors.into_result()
    }
}

/// Sparse update: `PATCH /app-users/{id} {name?, isRegistered?}`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct AppUserPatch {
    /// New display name
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    /// New registration flag
    #[serde(rename = "isRegistered", skip_serializing_if = "Option::is_none")]
    pub is_registered: Option<bool>,
}

impl AppUserPatch {
    /// Builder: set the display name
    #[must_use]
    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Builder: set the registration flag
    #[must_use]
    pub const fn with_registered(mut self, is_registered: bool) -> Self {
        self.is_registered = Some(is_registered);
        self
    }
}

impl Validate for AppUserPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.user_name {
            errors.check(char_len(name) >= 2, "userName", NAME_TOO_SHORT);
        }
        errors.into_result()
    }
}
