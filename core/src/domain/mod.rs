//! Domain entities and their wire payloads.

mod app_user;
mod credentials;
mod meal;
mod recipe;

pub use app_user::{AppUser, AppUserDraft, AppUserPatch, AppUserRecipe, AppUserRecipeMeal};
pub use credentials::LoginCredentials;
pub use meal::{Meal, MealDraft, MealPatch, MealRecipe, MealRecipeAuthor, MealType, ParseMealTypeError};
pub use recipe::{Recipe, RecipeAuthor, RecipeDraft, RecipeMeal, RecipePatch};

use crate::id::EntityId;
use crate::resource::{Identified, Resource, ResourceKind};

/// Marker for the app-users resource
#[derive(Clone, Copy, Debug, Default)]
pub struct AppUsers;

/// Marker for the meals resource
#[derive(Clone, Copy, Debug, Default)]
pub struct Meals;

/// Marker for the recipes resource
#[derive(Clone, Copy, Debug, Default)]
pub struct Recipes;

impl Resource for AppUsers {
    const KIND: ResourceKind = ResourceKind::AppUsers;
    type Entity = AppUser;
    type Draft = AppUserDraft;
    type Patch = AppUserPatch;
}

impl Resource for Meals {
    const KIND: ResourceKind = ResourceKind::Meals;
    type Entity = Meal;
    type Draft = MealDraft;
    type Patch = MealPatch;
}

impl Resource for Recipes {
    const KIND: ResourceKind = ResourceKind::Recipes;
    type Entity = Recipe;
    type Draft = RecipeDraft;
    type Patch = RecipePatch;
}

impl Identified for AppUser {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Identified for Meal {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

impl Identified for Recipe {
    fn id(&self) -> &EntityId {
        &self.id
    }
}

/// A reference to another entity must be non-empty and, when numeric, positive
pub(crate) fn is_valid_reference(id: &EntityId) -> bool {
    let raw = id.as_str().trim();
    if raw.is_empty() {
        return false;
    }
    raw.parse::<i64>().map_or(true, |n| n > 0)
}
