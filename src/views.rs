//! Serialized representations returned to clients.
//!
//! Derived flags (`is_favorited`, `is_in_shopping_cart`, `is_subscribed`) are
//! always computed for an explicit `viewer`; `None` is an anonymous visitor and
//! sees every flag as `false`.

use crate::config::MediaConfig;
use crate::error::{RecipeError, Result};
use crate::media::media_url;
use crate::model::{IngredientId, Recipe, RecipeId, Tag, User, UserId};
use crate::store::StoreTransaction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub email: String,
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

/// One ingredient line of a recipe as shown to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLineView {
    pub id: IngredientId,
    pub name: String,
    pub amount: u32,
    pub measurement_unit: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeView {
    pub id: RecipeId,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<IngredientLineView>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: u32,
}

/// Compact recipe used in favorites, cart and author listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortRecipeView {
    pub id: RecipeId,
    pub name: String,
    pub image: String,
    pub cooking_time: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorView {
    pub email: String,
    pub id: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
    pub recipes: Vec<ShortRecipeView>,
    pub recipes_count: usize,
}

pub async fn user_view(
    tx: &mut dyn StoreTransaction,
    user: User,
    viewer: Option<UserId>,
) -> Result<UserView> {
    let is_subscribed = match viewer {
        Some(viewer) => tx.is_subscribed(viewer, user.id).await?,
        None => false,
    };
    Ok(UserView {
        email: user.email,
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        is_subscribed,
    })
}

pub async fn recipe_view(
    tx: &mut dyn StoreTransaction,
    recipe: Recipe,
    viewer: Option<UserId>,
    media: &MediaConfig,
) -> Result<RecipeView> {
    let author = tx
        .find_user(recipe.author)
        .await?
        .ok_or_else(|| RecipeError::not_found("User", recipe.author))?;
    let author = user_view(tx, author, viewer).await?;
    let tags = tx.recipe_tags(recipe.id).await?;

    let rows = tx.recipe_ingredients(recipe.id).await?;
    let mut ingredients = Vec::with_capacity(rows.len());
    for row in rows {
        let ingredient = tx
            .find_ingredient(row.ingredient)
            .await?
            .ok_or_else(|| RecipeError::not_found("Ingredient", row.ingredient))?;
        ingredients.push(IngredientLineView {
            id: ingredient.id,
            name: ingredient.name,
            amount: row.amount,
            measurement_unit: ingredient.measurement_unit,
        });
    }

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer) => (
            tx.is_favorite(viewer, recipe.id).await?,
            tx.in_cart(viewer, recipe.id).await?,
        ),
        None => (false, false),
    };

    Ok(RecipeView {
        id: recipe.id,
        tags,
        author,
        ingredients,
        is_favorited,
        is_in_shopping_cart,
        name: recipe.name,
        image: media_url(media, &recipe.image),
        text: recipe.text,
        cooking_time: recipe.cooking_time,
    })
}

pub fn short_recipe_view(recipe: &Recipe, media: &MediaConfig) -> ShortRecipeView {
    ShortRecipeView {
        id: recipe.id,
        name: recipe.name.clone(),
        image: media_url(media, &recipe.image),
        cooking_time: recipe.cooking_time,
    }
}

pub async fn author_view(
    tx: &mut dyn StoreTransaction,
    author: User,
    viewer: Option<UserId>,
    media: &MediaConfig,
) -> Result<AuthorView> {
    let recipes: Vec<ShortRecipeView> = tx
        .recipes_by_author(author.id)
        .await?
        .iter()
        .map(|recipe| short_recipe_view(recipe, media))
        .collect();
    let user = user_view(tx, author, viewer).await?;

    Ok(AuthorView {
        email: user.email,
        id: user.id,
        username: user.username,
        first_name: user.first_name,
        last_name: user.last_name,
        is_subscribed: user.is_subscribed,
        recipes_count: recipes.len(),
        recipes,
    })
}
