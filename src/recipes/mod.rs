mod draft;
mod query;
mod tags;
mod writer;

pub use draft::{IngredientLine, RecipeDraft, RecipeDraftBuilder, RecipePatch};
pub use query::{get_recipe, list_recipes, RecipeFilter};
pub use writer::RecipeWriter;
