use crate::config::MediaConfig;
use crate::error::{RecipeError, Result};
use crate::model::{RecipeId, UserId};
use crate::store::Store;
use crate::views::{recipe_view, RecipeView};
use serde::Deserialize;

/// Recipe listing filter. All present conditions must hold.
///
/// `is_favorited` and `is_in_shopping_cart` only narrow the list when set to
/// `true` and a viewer is known.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipeFilter {
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
    /// Tag slugs; a recipe matches when it carries any of them
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Option<UserId>,
}

/// List recipes matching `filter`, newest first
pub async fn list_recipes(
    store: &dyn Store,
    filter: &RecipeFilter,
    viewer: Option<UserId>,
    media: &MediaConfig,
) -> Result<Vec<RecipeView>> {
    let mut tx = store.begin().await?;
    let mut recipes = tx.list_recipes().await?;
    recipes.reverse();

    let mut views = Vec::new();
    for recipe in recipes {
        if filter.author.is_some_and(|author| author != recipe.author) {
            continue;
        }
        if let Some(viewer) = viewer {
            if filter.is_favorited == Some(true) && !tx.is_favorite(viewer, recipe.id).await? {
                continue;
            }
            if filter.is_in_shopping_cart == Some(true) && !tx.in_cart(viewer, recipe.id).await? {
                continue;
            }
        }
        if !filter.tags.is_empty() {
            let tags = tx.recipe_tags(recipe.id).await?;
            if !tags.iter().any(|tag| filter.tags.contains(&tag.slug)) {
                continue;
            }
        }
        views.push(recipe_view(tx.as_mut(), recipe, viewer, media).await?);
    }
    Ok(views)
}

pub async fn get_recipe(
    store: &dyn Store,
    id: RecipeId,
    viewer: Option<UserId>,
    media: &MediaConfig,
) -> Result<RecipeView> {
    let mut tx = store.begin().await?;
    let recipe = tx
        .find_recipe(id)
        .await?
        .ok_or_else(|| RecipeError::not_found("Recipe", id))?;
    recipe_view(tx.as_mut(), recipe, viewer, media).await
}
