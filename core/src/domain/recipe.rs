//! Recipes.

use super::is_valid_reference;
use crate::id::EntityId;
use crate::validation::{Validate, ValidationErrors, char_len};
use serde::{Deserialize, Serialize};

const DESCRIPTION_TOO_SHORT: &str = "Description is too short";
const COOKING_TIME_NOT_POSITIVE: &str = "Cooking time must be positive";
const MEAL_ID_REQUIRED: &str = "Meal ID is required";
const USER_ID_REQUIRED: &str = "User ID is required";

/// A recipe as returned by the API, with denormalized author and meal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Server-assigned id
    pub id: EntityId,
    /// Recipe text
    pub description: String,
    /// Cooking time in minutes
    pub cooking_time: u32,
    /// Author
    pub user: RecipeAuthor,
    /// Meal the recipe belongs to
    pub meal: RecipeMeal,
}

/// Author fields embedded in a recipe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeAuthor {
    /// User id
    pub id: EntityId,
    /// User display name
    pub name: String,
    /// Whether the user finished registration
    #[serde(default)]
    pub is_registered: bool,
}

/// Meal fields embedded in a recipe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeMeal {
    /// Meal id
    pub id: EntityId,
    /// Meal name
    pub name: String,
    /// Category label, as sent by the API
    #[serde(alias = "mealType")]
    pub meal_name: String,
}

/// Create payload: `POST /recipes {description, cookingTime, mealId, userId}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    /// Recipe text
    pub description: String,
    /// Cooking time in minutes
    pub cooking_time: u32,
    /// Meal the recipe belongs to
    pub meal_id: EntityId,
    /// Author
    pub user_id: EntityId,
}

impl Validate for RecipeDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(
            char_len(&self.description) >= 10,
            "description",
            DESCRIPTION_TOO_SHORT,
        );
        errors.check(self.cooking_time > 0, "cookingTime", COOKING_TIME_NOT_POSITIVE);
        errors.check(is_valid_reference(&self.meal_id), "mealId", MEAL_ID_REQUIRED);
        errors.check(is_valid_reference(&self.user_id), "userId", USER_ID_REQUIRED);
        errors.into_result()
    }
}

/// Sparse update: `PATCH /recipes/{id}`
///
/// The author is fixed at creation, so there is no user field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePatch {
    /// New text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New cooking time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cooking_time: Option<u32>,
    /// Move the recipe to another meal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_id: Option<EntityId>,
}

impl RecipePatch {
    /// Builder: set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set the cooking time
    #[must_use]
    pub const fn with_cooking_time(mut self, minutes: u32) -> Self {
        self.cooking_time = Some(minutes);
        self
    }

    /// Builder: move to another meal
    #[must_use]
    pub fn with_meal_id(mut self, meal_id: impl Into<EntityId>) -> Self {
        self.meal_id = Some(meal_id.into());
        self
    }
}

impl Validate for RecipePatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(description) = &self.description {
            errors.check(char_len(description) >= 10, "description", DESCRIPTION_TOO_SHORT);
        }
        if let Some(minutes) = self.cooking_time {
            errors.check(minutes > 0, "cookingTime", COOKING_TIME_NOT_POSITIVE);
        }
        if let Some(meal_id) = &self.meal_id {
            errors.check(is_valid_reference(meal_id), "mealId", MEAL_ID_REQUIRED);
        }
        errors.into_result()
    }
}
