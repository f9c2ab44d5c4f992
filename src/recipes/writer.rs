use super::draft::{RecipeDraft, RecipePatch};
use super::tags::resolve_tags;
use crate::config::{AppConfig, UnresolvedIngredients};
use crate::error::{RecipeError, Result};
use crate::media::{ImageStorage, PendingImage};
use crate::model::{IngredientId, NewRecipe, NewRecipeIngredient, Recipe, RecipeId, UserId};
use crate::store::{Store, StoreTransaction};
use log::{debug, info, warn};
use std::collections::HashSet;

/// Creates, updates and deletes recipes together with their tag set and
/// ingredient rows. Each call runs in a single store transaction.
pub struct RecipeWriter<'a> {
    store: &'a dyn Store,
    images: &'a dyn ImageStorage,
    config: &'a AppConfig,
}

impl<'a> RecipeWriter<'a> {
    pub fn new(store: &'a dyn Store, images: &'a dyn ImageStorage, config: &'a AppConfig) -> Self {
        Self {
            store,
            images,
            config,
        }
    }

    /// Create a recipe authored by `author`.
    ///
    /// Order of work inside the transaction:
    /// 1. Insert the recipe row
    /// 2. Insert one ingredient row per requested line (repeats kept)
    /// 3. Resolve the tags and attach the full set
    ///
    /// # Errors
    /// - `Validation` for out-of-range or missing fields, before anything is written
    /// - `NotFound` for an unknown author, ingredient, or (by default) tag
    ///
    /// Nothing is persisted when an error is returned. An inline image is
    /// decoded up front but only written to the image storage once every
    /// row is in place.
    pub async fn create(&self, author: UserId, draft: RecipeDraft) -> Result<Recipe> {
        let lines = draft.validate()?;
        warn_on_repeated_ingredients(lines.iter().map(|(id, _)| *id));

        let image = PendingImage::parse(&draft.image)?;

        let mut tx = self.store.begin().await?;

        // 1. Recipe row, image reference filled in before commit
        let mut recipe = tx
            .insert_recipe(NewRecipe {
                author,
                name: draft.name,
                image: String::new(),
                text: draft.text,
                cooking_time: draft.cooking_time,
            })
            .await?;

        // 2. Ingredient rows
        let mut rows = Vec::with_capacity(lines.len());
        for (ingredient, amount) in lines {
            if tx.find_ingredient(ingredient).await?.is_none() {
                return Err(RecipeError::not_found("Ingredient", ingredient));
            }
            rows.push(NewRecipeIngredient {
                recipe: recipe.id,
                ingredient,
                amount,
            });
        }
        let rows = tx.insert_recipe_ingredients(rows).await?;

        // 3. Tags
        let tags = resolve_tags(tx.as_mut(), &draft.tags, self.config.writer.unknown_tags).await?;
        tx.set_recipe_tags(recipe.id, &tags).await?;

        recipe.image = image.store(self.images, &self.config.media).await?;
        tx.save_recipe(&recipe).await?;

        tx.commit().await?;
        info!(
            "Created recipe {} '{}' by user {} ({} ingredient rows, {} tags)",
            recipe.id,
            recipe.name,
            author,
            rows.len(),
            tags.len()
        );
        Ok(recipe)
    }

    /// Apply `patch` to recipe `id` on behalf of `actor`, who must be its author.
    ///
    /// Scalar fields are changed only when present. The tag set and the
    /// ingredient rows are replaced wholesale by what the patch carries. Lines
    /// missing an id or an amount are skipped; lines whose ingredient does not
    /// exist are rejected or skipped according to
    /// `writer.unresolved_ingredients`.
    pub async fn update(&self, actor: UserId, id: RecipeId, patch: RecipePatch) -> Result<Recipe> {
        patch.validate()?;
        let image = patch.image.as_deref().map(PendingImage::parse).transpose()?;
        warn_on_repeated_ingredients(patch.ingredients.iter().filter_map(|line| line.id));

        let mut tx = self.store.begin().await?;
        let mut recipe = find_owned(tx.as_mut(), actor, id).await?;

        if let Some(name) = patch.name {
            recipe.name = name;
        }
        if let Some(text) = patch.text {
            recipe.text = text;
        }
        if let Some(cooking_time) = patch.cooking_time {
            recipe.cooking_time = cooking_time;
        }

        let tags = resolve_tags(tx.as_mut(), &patch.tags, self.config.writer.unknown_tags).await?;
        tx.set_recipe_tags(recipe.id, &tags).await?;

        let removed = tx.delete_recipe_ingredients(recipe.id).await?;
        debug!("Removed {} ingredient rows from recipe {}", removed, recipe.id);

        let mut rows = Vec::with_capacity(patch.ingredients.len());
        for (index, line) in patch.ingredients.iter().enumerate() {
            let (ingredient, amount) = match (line.id, line.amount) {
                (Some(ingredient), Some(amount)) => (ingredient, amount),
                _ => {
                    debug!("Skipping incomplete ingredient line {}", index);
                    continue;
                }
            };
            if tx.find_ingredient(ingredient).await?.is_none() {
                match self.config.writer.unresolved_ingredients {
                    UnresolvedIngredients::Reject => {
                        return Err(RecipeError::not_found("Ingredient", ingredient));
                    }
                    UnresolvedIngredients::Skip => {
                        warn!(
                            "Skipping unknown ingredient {} on recipe {}",
                            ingredient, recipe.id
                        );
                        continue;
                    }
                }
            }
            rows.push(NewRecipeIngredient {
                recipe: recipe.id,
                ingredient,
                amount,
            });
        }
        let rows = tx.insert_recipe_ingredients(rows).await?;

        if let Some(image) = image {
            recipe.image = image.store(self.images, &self.config.media).await?;
        }
        tx.save_recipe(&recipe).await?;

        tx.commit().await?;
        info!(
            "Updated recipe {} ({} ingredient rows, {} tags)",
            recipe.id,
            rows.len(),
            tags.len()
        );
        Ok(recipe)
    }

    /// Delete recipe `id` with all of its rows, favorites and cart entries
    pub async fn delete(&self, actor: UserId, id: RecipeId) -> Result<()> {
        let mut tx = self.store.begin().await?;
        find_owned(tx.as_mut(), actor, id).await?;
        tx.delete_recipe(id).await?;
        tx.commit().await?;
        info!("Deleted recipe {}", id);
        Ok(())
    }
}

async fn find_owned(tx: &mut dyn StoreTransaction, actor: UserId, id: RecipeId) -> Result<Recipe> {
    let recipe = tx
        .find_recipe(id)
        .await?
        .ok_or_else(|| RecipeError::not_found("Recipe", id))?;
    if recipe.author != actor {
        return Err(RecipeError::Forbidden(format!(
            "user {} is not the author of recipe {}",
            actor, id
        )));
    }
    Ok(recipe)
}

// Repeated ids are stored as separate rows and counted twice in the shopping list
fn warn_on_repeated_ingredients(ids: impl IntoIterator<Item = IngredientId>) {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            warn!("Ingredient {} appears more than once in the same recipe", id);
        }
    }
}
