//! Client-side routes of the admin front-end.

use crate::id::EntityId;
use std::fmt;

/// A view the host application can navigate to
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// Login form
    Login,
    /// Recipe table
    Recipes,
    /// Recipe creation form
    RecipeNew,
    /// Recipe detail/edit form
    Recipe(EntityId),
    /// Meal table
    Meals,
    /// Meal creation form
    MealNew,
    /// Meal detail/edit form
    Meal(EntityId),
    /// App user table
    AppUsers,
    /// App user creation form
    AppUserNew,
    /// App user detail/edit form
    AppUser(EntityId),
}

impl Route {
    /// Render the route as a URL path
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Login => "/login".to_string(),
            Self::Recipes => "/recipes".to_string(),
            Self::RecipeNew => "/recipes/new".to_string(),
            Self::Recipe(id) => format!("/recipes/{id}"),
            Self::Meals => "/meals".to_string(),
            Self::MealNew => "/meals/new".to_string(),
            Self::Meal(id) => format!("/meals/{id}"),
            Self::AppUsers => "/appUsers".to_string(),
            Self::AppUserNew => "/appUsers/new".to_string(),
            Self::AppUser(id) => format!("/appUsers/{id}"),
        }
    }

    /// Map a URL path back to a route
    ///
    /// Trailing slashes are ignored. Returns `None` for unknown paths.
    #[must_use]
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match segments.as_slice() {
            ["login"] => Some(Self::Login),
            ["recipes"] => Some(Self::Recipes),
            ["recipes", "new"] => Some(Self::RecipeNew),
            ["recipes", id] => Some(Self::Recipe(EntityId::from(*id))),
            ["meals"] => Some(Self::Meals),
            ["meals", "new"] => Some(Self::MealNew),
            ["meals", id] => Some(Self::Meal(EntityId::from(*id))),
            ["appUsers"] => Some(Self::AppUsers),
            ["appUsers", "new"] => Some(Self::AppUserNew),
            ["appUsers", id] => Some(Self::AppUser(EntityId::from(*id))),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_round_trip_through_parse() {
        let routes = [
            Route::Login,
            Route::Recipes,
            Route::RecipeNew,
            Route::Recipe(EntityId::from("r-1")),
            Route::Meals,
            Route::MealNew,
            Route::Meal(EntityId::from(3)),
            Route::AppUsers,
            Route::AppUserNew,
            Route::AppUser(EntityId::from(9)),
        ];

        for route in routes {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
    }

    #[test]
    fn parse_ignores_trailing_slash_and_rejects_unknown_paths() {
        assert_eq!(Route::parse("/meals/"), Some(Route::Meals));
        assert_eq!(Route::parse("/"), None);
        assert_eq!(Route::parse("/meals/1/edit"), None);
        assert_eq!(Route::parse("/app-users"), None);
    }
}
