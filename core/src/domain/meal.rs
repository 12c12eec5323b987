//! Meals.
//!
//! The client calls the category `mealType`; the API calls it `mealName` and
//! expects the category label (`Сніданок`, `Обід`, ...), not the English key.

use crate::id::EntityId;
use crate::validation::{Validate, ValidationErrors, char_len};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const NAME_TOO_SHORT: &str = "Name is too short";

/// Fixed set of meal categories
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealType {
    /// Сніданок
    #[serde(rename = "Сніданок", alias = "breakfast")]
    Breakfast,
    /// Обід
    #[serde(rename = "Обід", alias = "lunch")]
    Lunch,
    /// Перекус
    #[serde(rename = "Перекус", alias = "snack")]
    Snack,
    /// Вечеря
    #[serde(rename = "Вечеря", alias = "dinner")]
    Dinner,
}

impl MealType {
    /// Every category, in menu order
    pub const ALL: [Self; 4] = [Self::Breakfast, Self::Lunch, Self::Snack, Self::Dinner];

    /// Label sent to and shown by the API
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Breakfast => "Сніданок",
            Self::Lunch => "Обід",
            Self::Snack => "Перекус",
            Self::Dinner => "Вечеря",
        }
    }

    /// English key
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Breakfast => "breakfast",
            Self::Lunch => "lunch",
            Self::Snack => "snack",
            Self::Dinner => "dinner",
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A meal type string matched neither a key nor a label
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Please select a meal type")]
pub struct ParseMealTypeError;

impl FromStr for MealType {
    type Err = ParseMealTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label() == s || t.as_str().eq_ignore_ascii_case(s))
            .ok_or(ParseMealTypeError)
    }
}

/// A meal as returned by the API
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    /// Server-assigned id
    pub id: EntityId,
    /// Meal name
    pub name: String,
    /// Category
    #[serde(alias = "mealName")]
    pub meal_type: MealType,
    /// Photo URL
    #[serde(default)]
    pub photo: Option<String>,
    /// Recipes for this meal, when the API embeds them
    #[serde(default)]
    pub recipes: Vec<MealRecipe>,
}

/// Recipe summary embedded in a meal
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRecipe {
    /// Recipe id
    pub id: EntityId,
    /// Recipe description
    pub description: String,
    /// Cooking time in minutes
    pub cooking_time: u32,
    /// Recipe author
    #[serde(default)]
    pub user: Option<MealRecipeAuthor>,
}

/// Author summary embedded in a meal's recipe
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealRecipeAuthor {
    /// User id
    pub id: EntityId,
    /// User display name
    pub name: String,
}

/// Create payload: `POST /meals {name, mealName, photo}`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MealDraft {
    /// Meal name
    pub name: String,
    /// Category
    #[serde(rename = "mealName")]
    pub meal_type: MealType,
    /// Photo URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
}

impl MealDraft {
    /// New draft without a photo
    pub fn new(name: impl Into<String>, meal_type: MealType) -> Self {
        Self {
            name: name.into(),
            meal_type,
            photo: None,
        }
    }

    /// Builder: attach a photo URL
    #[must_use]
    pub fn with_photo(mut self, photo: impl Into<String>) -> Self {
        self.photo = Some(photo.into());
        self
    }
}

impl Validate for MealDraft {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check(char_len(&self.name) >= 2, "name", NAME_TOO_SHORT);
        errors.into_result()
    }
}

/// Sparse update: `PATCH /meals/{id} {name?, mealName?, photo?}`
///
/// `photo: Some(None)` sends an explicit `null` to remove the photo;
/// `photo: None` leaves it untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MealPatch {
    /// New name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New category
    #[serde(rename = "mealName", skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    /// New photo, or removal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Option<String>>,
}

impl MealPatch {
    /// Builder: set the name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder: set the category
    #[must_use]
    pub const fn with_meal_type(mut self, meal_type: MealType) -> Self {
        self.meal_type = Some(meal_type);
        self
    }

    /// Builder: replace or remove the photo
    #[must_use]
    pub fn with_photo(mut self, photo: Option<String>) -> Self {
        self.photo = Some(photo);
        self
    }
}

impl Validate for MealPatch {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            errors.check(char_len(name) >= 2, "name", NAME_TOO_SHORT);
        }
        errors.into_result()
    }
}
