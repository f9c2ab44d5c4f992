//! Per-user relations: favorites, the shopping cart and author subscriptions.

use crate::config::MediaConfig;
use crate::error::{RecipeError, Result};
use crate::model::{Recipe, RecipeId, User, UserId};
use crate::store::{Store, StoreTransaction};
use crate::views::{author_view, short_recipe_view, AuthorView, ShortRecipeView};
use log::info;

async fn require_recipe(tx: &mut dyn StoreTransaction, id: RecipeId) -> Result<Recipe> {
    tx.find_recipe(id)
        .await?
        .ok_or_else(|| RecipeError::not_found("Recipe", id))
}

async fn require_user(tx: &mut dyn StoreTransaction, id: UserId) -> Result<User> {
    tx.find_user(id)
        .await?
        .ok_or_else(|| RecipeError::not_found("User", id))
}

pub async fn add_favorite(
    store: &dyn Store,
    user: UserId,
    recipe: RecipeId,
    media: &MediaConfig,
) -> Result<ShortRecipeView> {
    let mut tx = store.begin().await?;
    require_user(tx.as_mut(), user).await?;
    let recipe = require_recipe(tx.as_mut(), recipe).await?;
    if !tx.insert_favorite(user, recipe.id).await? {
        return Err(RecipeError::Conflict("Recipe is already in favorites".into()));
    }
    tx.commit().await?;
    info!("User {} favorited recipe {}", user, recipe.id);
    Ok(short_recipe_view(&recipe, media))
}

pub async fn remove_favorite(store: &dyn Store, user: UserId, recipe: RecipeId) -> Result<()> {
    let mut tx = store.begin().await?;
    let recipe = require_recipe(tx.as_mut(), recipe).await?;
    if !tx.delete_favorite(user, recipe.id).await? {
        return Err(RecipeError::Conflict("Recipe is not in favorites".into()));
    }
    tx.commit().await
}

pub async fn add_to_cart(
    store: &dyn Store,
    user: UserId,
    recipe: RecipeId,
    media: &MediaConfig,
) -> Result<ShortRecipeView> {
    let mut tx = store.begin().await?;
    require_user(tx.as_mut(), user).await?;
    let recipe = require_recipe(tx.as_mut(), recipe).await?;
    if !tx.insert_cart_entry(user, recipe.id).await? {
        return Err(RecipeError::Conflict(
            "Recipe is already in the shopping cart".into(),
        ));
    }
    tx.commit().await?;
    info!("User {} added recipe {} to the cart", user, recipe.id);
    Ok(short_recipe_view(&recipe, media))
}

pub async fn remove_from_cart(store: &dyn Store, user: UserId, recipe: RecipeId) -> Result<()> {
    let mut tx = store.begin().await?;
    let recipe = require_recipe(tx.as_mut(), recipe).await?;
    if !tx.delete_cart_entry(user, recipe.id).await? {
        return Err(RecipeError::Conflict(
            "Recipe is not in the shopping cart".into(),
        ));
    }
    tx.commit().await
}

/// Follow `author`. Returns the author as seen by `user` afterwards.
pub async fn subscribe(
    store: &dyn Store,
    user: UserId,
    author: UserId,
    media: &MediaConfig,
) -> Result<AuthorView> {
    if user == author {
        return Err(RecipeError::validation(
            "author",
            "You cannot subscribe to yourself",
        ));
    }

    let mut tx = store.begin().await?;
    require_user(tx.as_mut(), user).await?;
    let author = require_user(tx.as_mut(), author).await?;
    if !tx.insert_subscription(user, author.id).await? {
        return Err(RecipeError::Conflict(
            "Already subscribed to this author".into(),
        ));
    }
    let view = author_view(tx.as_mut(), author, Some(user), media).await?;
    tx.commit().await?;
    info!("User {} subscribed to {}", user, view.id);
    Ok(view)
}

pub async fn unsubscribe(store: &dyn Store, user: UserId, author: UserId) -> Result<()> {
    let mut tx = store.begin().await?;
    let author = require_user(tx.as_mut(), author).await?;
    if !tx.delete_subscription(user, author.id).await? {
        return Err(RecipeError::Conflict("Not subscribed to this author".into()));
    }
    tx.commit().await
}

/// Authors `user` follows, ordered by author id
pub async fn subscriptions(
    store: &dyn Store,
    user: UserId,
    media: &MediaConfig,
) -> Result<Vec<AuthorView>> {
    let mut tx = store.begin().await?;
    let mut views = Vec::new();
    for id in tx.subscribed_authors(user).await? {
        let author = require_user(tx.as_mut(), id).await?;
        views.push(author_view(tx.as_mut(), author, Some(user), media).await?);
    }
    Ok(views)
}
