pub mod catalog;
pub mod config;
pub mod error;
pub mod media;
pub mod model;
pub mod recipes;
pub mod relations;
pub mod shopping_list;
pub mod store;
pub mod views;

pub use config::{AppConfig, UnknownTags, UnresolvedIngredients};
pub use error::RecipeError;
pub use media::{ImageStorage, MemoryImageStorage};
pub use model::{
    Ingredient, IngredientId, NewIngredient, NewTag, NewUser, Recipe, RecipeId, Tag, TagId, User,
    UserId,
};
pub use recipes::{IngredientLine, RecipeDraft, RecipeFilter, RecipePatch, RecipeWriter};
pub use shopping_list::{render, summarize, CartLine, ShoppingListFile, ShoppingSummary};
pub use store::{MemoryStore, Store, StoreTransaction};
pub use views::{AuthorView, IngredientLineView, RecipeView, ShortRecipeView, UserView};

use serde::Deserialize;

/// Recipe as accepted by the shopping list command line: only the
/// ingredient lines matter.
#[derive(Debug, Clone, Deserialize)]
pub struct CartRecipe {
    pub ingredients: Vec<CartLine>,
}

impl shopping_list::IngredientSource for CartRecipe {
    type Item = CartLine;

    fn ingredient_lines(&self) -> &[CartLine] {
        &self.ingredients
    }
}

/// Render the shopping list for a JSON array of recipes with nested
/// `{name, amount, measurement_unit}` ingredient lines. Extra keys such as
/// `id` are ignored.
///
/// # Example
/// ```
/// let json = r#"[
///     {"ingredients": [{"name": "flour", "amount": 200, "measurement_unit": "g"}]},
///     {"ingredients": [{"name": "flour", "amount": 100, "measurement_unit": "g"}]}
/// ]"#;
/// let text = recipe_share::shopping_list_from_json(json, "To buy").unwrap();
/// assert_eq!(text, "To buy\n\nFlour (g) — 300\n");
/// ```
pub fn shopping_list_from_json(json: &str, header: &str) -> Result<String, RecipeError> {
    let recipes: Vec<CartRecipe> = serde_json::from_str(json)?;
    Ok(render(&summarize(&recipes), header))
}
