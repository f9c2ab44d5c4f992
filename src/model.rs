use serde::{Deserialize, Serialize};
use std::fmt;

pub const COOKING_TIME_MIN: u32 = 1;
pub const COOKING_TIME_MAX: u32 = 4320;
pub const AMOUNT_MIN: u32 = 1;
pub const AMOUNT_MAX: u32 = 10000;

pub const RECIPE_NAME_MAX_LEN: usize = 255;
pub const TAG_NAME_MAX_LEN: usize = 50;
pub const TAG_COLOR_MAX_LEN: usize = 7;
pub const INGREDIENT_NAME_MAX_LEN: usize = 100;
pub const MEASUREMENT_UNIT_MAX_LEN: usize = 50;

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(UserId);
id_type!(RecipeId);
id_type!(TagId);
id_type!(IngredientId);
id_type!(
    /// Primary key of a recipe/ingredient amount row
    RecipeIngredientId
);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: String,
    pub slug: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTag {
    pub name: String,
    pub color: String,
    pub slug: String,
}

/// Static reference data: a named ingredient and the unit it is measured in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

/// Scalar columns of a recipe. Tags and ingredient amounts live in their own
/// association tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: RecipeId,
    pub author: UserId,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: u32,
}

#[derive(Debug, Clone)]
pub struct NewRecipe {
    pub author: UserId,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: u32,
}

/// Association row binding a recipe to an ingredient with an amount.
///
/// (recipe, ingredient) is not unique: a recipe submitted with the same
/// ingredient twice keeps two rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub id: RecipeIngredientId,
    pub recipe: RecipeId,
    pub ingredient: IngredientId,
    pub amount: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct NewRecipeIngredient {
    pub recipe: RecipeId,
    pub ingredient: IngredientId,
    pub amount: u32,
}
