mod aggregate;
mod render;

pub use aggregate::{
    summarize, CartLine, IngredientSource, ShoppingItem, ShoppingSummary, SummaryEntry,
};
pub use render::{capitalize, render};

use crate::config::AppConfig;
use crate::error::{RecipeError, Result};
use crate::model::UserId;
use crate::store::Store;
use crate::views::recipe_view;
use log::info;

/// A rendered shopping list ready to be sent as a download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: Vec<u8>,
}

impl ShoppingListFile {
    /// Value for the `Content-Disposition` header
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}

/// Aggregate every recipe in `user`'s cart into a downloadable text file
pub async fn download_shopping_cart(
    store: &dyn Store,
    user: UserId,
    config: &AppConfig,
) -> Result<ShoppingListFile> {
    let mut tx = store.begin().await?;
    if tx.find_user(user).await?.is_none() {
        return Err(RecipeError::not_found("User", user));
    }

    let mut recipes = Vec::new();
    for id in tx.cart_recipes(user).await? {
        let recipe = tx
            .find_recipe(id)
            .await?
            .ok_or_else(|| RecipeError::not_found("Recipe", id))?;
        recipes.push(recipe_view(tx.as_mut(), recipe, Some(user), &config.media).await?);
    }

    let summary = summarize(&recipes);
    info!(
        "Shopping list for user {}: {} recipes, {} ingredients",
        user,
        recipes.len(),
        summary.len()
    );

    Ok(ShoppingListFile {
        filename: config.shopping_list.filename.clone(),
        content_type: "text/plain",
        body: render(&summary, &config.shopping_list.header).into_bytes(),
    })
}
