use super::{Store, StoreTransaction};
use crate::error::{RecipeError, Result};
use crate::model::{
    Ingredient, IngredientId, NewIngredient, NewRecipe, NewRecipeIngredient, NewTag, NewUser,
    Recipe, RecipeId, RecipeIngredient, RecipeIngredientId, Tag, TagId, User, UserId,
};
use async_trait::async_trait;
use log::debug;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone)]
struct Sequences {
    user: u64,
    ingredient: u64,
    tag: u64,
    recipe: u64,
    recipe_ingredient: u64,
}

impl Default for Sequences {
    fn default() -> Self {
        Self {
            user: 1,
            ingredient: 1,
            tag: 1,
            recipe: 1,
            recipe_ingredient: 1,
        }
    }
}

fn next(seq: &mut u64) -> u64 {
    let id = *seq;
    *seq += 1;
    id
}

#[derive(Debug, Clone, Default)]
struct Tables {
    seq: Sequences,
    users: BTreeMap<UserId, User>,
    ingredients: BTreeMap<IngredientId, Ingredient>,
    tags: BTreeMap<TagId, Tag>,
    recipes: BTreeMap<RecipeId, Recipe>,
    recipe_ingredients: Vec<RecipeIngredient>,
    recipe_tags: BTreeMap<RecipeId, Vec<TagId>>,
    favorites: BTreeSet<(UserId, RecipeId)>,
    cart: BTreeSet<(UserId, RecipeId)>,
    subscriptions: BTreeSet<(UserId, UserId)>,
}

/// In-process [`Store`] backed by ordered maps.
///
/// Transactions are serialized: `begin` takes an owned lock on the tables and
/// works on a copy, which replaces the shared state only on commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTransaction + 'a>> {
        let guard = self.tables.clone().lock_owned().await;
        let work = guard.clone();
        Ok(Box::new(MemoryTransaction { guard, work }))
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<Tables>,
    work: Tables,
}

#[async_trait]
impl StoreTransaction for MemoryTransaction {
    async fn insert_user(&mut self, user: NewUser) -> Result<User> {
        let user = User {
            id: UserId(next(&mut self.work.seq.user)),
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
        };
        self.work.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&mut self, id: UserId) -> Result<Option<User>> {
        Ok(self.work.users.get(&id).cloned())
    }

    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>> {
        Ok(self.work.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>> {
        Ok(self
            .work
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn list_users(&mut self) -> Result<Vec<User>> {
        Ok(self.work.users.values().cloned().collect())
    }

    async fn insert_ingredient(&mut self, ingredient: NewIngredient) -> Result<Ingredient> {
        let ingredient = Ingredient {
            id: IngredientId(next(&mut self.work.seq.ingredient)),
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        };
        self.work
            .ingredients
            .insert(ingredient.id, ingredient.clone());
        Ok(ingredient)
    }

    async fn find_ingredient(&mut self, id: IngredientId) -> Result<Option<Ingredient>> {
        Ok(self.work.ingredients.get(&id).cloned())
    }

    async fn list_ingredients(&mut self) -> Result<Vec<Ingredient>> {
        Ok(self.work.ingredients.values().cloned().collect())
    }

    async fn insert_tag(&mut self, tag: NewTag) -> Result<Tag> {
        if self.work.tags.values().any(|t| t.slug == tag.slug) {
            return Err(RecipeError::Conflict(format!(
                "Tag with slug '{}' already exists",
                tag.slug
            )));
        }
        let tag = Tag {
            id: TagId(next(&mut self.work.seq.tag)),
            name: tag.name,
            color: tag.color,
            slug: tag.slug,
        };
        self.work.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn insert_placeholder_tag(&mut self, id: TagId) -> Result<Tag> {
        if self.work.tags.contains_key(&id) {
            return Err(RecipeError::Conflict(format!("Tag {} already exists", id)));
        }
        let after = id.0.checked_add(1).ok_or_else(|| {
            RecipeError::validation("tags", format!("Tag id {} is out of range", id))
        })?;
        let tag = Tag {
            id,
            name: String::new(),
            color: String::new(),
            slug: String::new(),
        };
        self.work.seq.tag = self.work.seq.tag.max(after);
        self.work.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn find_tag(&mut self, id: TagId) -> Result<Option<Tag>> {
        Ok(self.work.tags.get(&id).cloned())
    }

    async fn find_tag_by_slug(&mut self, slug: &str) -> Result<Option<Tag>> {
        Ok(self.work.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn list_tags(&mut self) -> Result<Vec<Tag>> {
        Ok(self.work.tags.values().cloned().collect())
    }

    async fn insert_recipe(&mut self, recipe: NewRecipe) -> Result<Recipe> {
        if !self.work.users.contains_key(&recipe.author) {
            return Err(RecipeError::not_found("User", recipe.author));
        }
        let recipe = Recipe {
            id: RecipeId(next(&mut self.work.seq.recipe)),
            author: recipe.author,
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        };
        self.work.recipes.insert(recipe.id, recipe.clone());
        Ok(recipe)
    }

    async fn save_recipe(&mut self, recipe: &Recipe) -> Result<()> {
        match self.work.recipes.get_mut(&recipe.id) {
            Some(row) => {
                *row = recipe.clone();
                Ok(())
            }
            None => Err(RecipeError::not_found("Recipe", recipe.id)),
        }
    }

    async fn find_recipe(&mut self, id: RecipeId) -> Result<Option<Recipe>> {
        Ok(self.work.recipes.get(&id).cloned())
    }

    async fn delete_recipe(&mut self, id: RecipeId) -> Result<bool> {
        if self.work.recipes.remove(&id).is_none() {
            return Ok(false);
        }
        self.work.recipe_ingredients.retain(|row| row.recipe != id);
        self.work.recipe_tags.remove(&id);
        self.work.favorites.retain(|(_, recipe)| *recipe != id);
        self.work.cart.retain(|(_, recipe)| *recipe != id);
        Ok(true)
    }

    async fn list_recipes(&mut self) -> Result<Vec<Recipe>> {
        Ok(self.work.recipes.values().cloned().collect())
    }

    async fn recipes_by_author(&mut self, author: UserId) -> Result<Vec<Recipe>> {
        Ok(self
            .work
            .recipes
            .values()
            .filter(|r| r.author == author)
            .cloned()
            .collect())
    }

    async fn insert_recipe_ingredients(
        &mut self,
        rows: Vec<NewRecipeIngredient>,
    ) -> Result<Vec<RecipeIngredient>> {
        let mut inserted = Vec::with_capacity(rows.len());
        for row in rows {
            if !self.work.recipes.contains_key(&row.recipe) {
                return Err(RecipeError::not_found("Recipe", row.recipe));
            }
            if !self.work.ingredients.contains_key(&row.ingredient) {
                return Err(RecipeError::not_found("Ingredient", row.ingredient));
            }
            let row = RecipeIngredient {
                id: RecipeIngredientId(next(&mut self.work.seq.recipe_ingredient)),
                recipe: row.recipe,
                ingredient: row.ingredient,
                amount: row.amount,
            };
            self.work.recipe_ingredients.push(row.clone());
            inserted.push(row);
        }
        debug!("Inserted {} recipe ingredient rows", inserted.len());
        Ok(inserted)
    }

    async fn recipe_ingredients(&mut self, recipe: RecipeId) -> Result<Vec<RecipeIngredient>> {
        Ok(self
            .work
            .recipe_ingredients
            .iter()
            .filter(|row| row.recipe == recipe)
            .cloned()
            .collect())
    }

    async fn delete_recipe_ingredients(&mut self, recipe: RecipeId) -> Result<usize> {
        let before = self.work.recipe_ingredients.len();
        self.work
            .recipe_ingredients
            .retain(|row| row.recipe != recipe);
        Ok(before - self.work.recipe_ingredients.len())
    }

    async fn set_recipe_tags(&mut self, recipe: RecipeId, tags: &[TagId]) -> Result<()> {
        if !self.work.recipes.contains_key(&recipe) {
            return Err(RecipeError::not_found("Recipe", recipe));
        }
        // Set semantics: repeated ids collapse, first position wins
        let mut set = Vec::with_capacity(tags.len());
        for tag in tags {
            if !self.work.tags.contains_key(tag) {
                return Err(RecipeError::not_found("Tag", *tag));
            }
            if !set.contains(tag) {
                set.push(*tag);
            }
        }
        self.work.recipe_tags.insert(recipe, set);
        Ok(())
    }

    async fn recipe_tags(&mut self, recipe: RecipeId) -> Result<Vec<Tag>> {
        let ids = self.work.recipe_tags.get(&recipe).cloned().unwrap_or_default();
        Ok(ids
            .iter()
            .filter_map(|id| self.work.tags.get(id).cloned())
            .collect())
    }

    async fn insert_favorite(&mut self, user: UserId, recipe: RecipeId) -> Result<bool> {
        Ok(self.work.favorites.insert((user, recipe)))
    }

    async fn delete_favorite(&mut self, user: UserId, recipe: RecipeId) -> Result<bool> {
        Ok(self.work.favorites.remove(&(user, recipe)))
    }

    async fn is_favorite(&mut self, user: UserId, recipe: RecipeId) -> Result<bool> {
        Ok(self.work.favorites.contains(&(user, recipe)))
    }

    async fn insert_cart_entry(&mut self, user: UserId, recipe: RecipeId) -> Result<bool> {
        Ok(self.work.cart.insert((user, recipe)))
    }

    async fn delete_cart_entry(&mut self, user: UserId, recipe: RecipeId) -> Result<bool> {
        Ok(self.work.cart.remove(&(user, recipe)))
    }

    async fn in_cart(&mut self, user: UserId, recipe: RecipeId) -> Result<bool> {
        Ok(self.work.cart.contains(&(user, recipe)))
    }

    async fn cart_recipes(&mut self, user: UserId) -> Result<Vec<RecipeId>> {
        Ok(self
            .work
            .cart
            .iter()
            .filter(|(owner, _)| *owner == user)
            .map(|(_, recipe)| *recipe)
            .collect())
    }

    async fn insert_subscription(&mut self, user: UserId, author: UserId) -> Result<bool> {
        Ok(self.work.subscriptions.insert((user, author)))
    }

    async fn delete_subscription(&mut self, user: UserId, author: UserId) -> Result<bool> {
        Ok(self.work.subscriptions.remove(&(user, author)))
    }

    async fn is_subscribed(&mut self, user: UserId, author: UserId) -> Result<bool> {
        Ok(self.work.subscriptions.contains(&(user, author)))
    }

    async fn subscribed_authors(&mut self, user: UserId) -> Result<Vec<UserId>> {
        Ok(self
            .work
            .subscriptions
            .iter()
            .filter(|(follower, _)| *follower == user)
            .map(|(_, author)| *author)
            .collect())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let MemoryTransaction { mut guard, work } = *self;
        *guard = work;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            email: format!("{}@example.com", name),
            username: name.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        }
    }

    #[tokio::test]
    async fn test_commit_makes_changes_visible() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user(new_user("alice")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.find_user(user.id).await.unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let store = MemoryStore::new();

        {
            let mut tx = store.begin().await.unwrap();
            tx.insert_user(new_user("alice")).await.unwrap();
        }

        let mut tx = store.begin().await.unwrap();
        assert!(tx.find_user(UserId(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_slug_conflicts() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let tag = NewTag {
            name: "Breakfast".to_string(),
            color: "#E26C2D".to_string(),
            slug: "breakfast".to_string(),
        };

        tx.insert_tag(tag.clone()).await.unwrap();
        let result = tx.insert_tag(tag).await;
        assert!(matches!(result, Err(RecipeError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_placeholder_tag_advances_sequence() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let placeholder = tx.insert_placeholder_tag(TagId(7)).await.unwrap();
        assert_eq!(placeholder.slug, "");

        let tag = tx
            .insert_tag(NewTag {
                name: "Lunch".to_string(),
                color: "#49B64E".to_string(),
                slug: "lunch".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(tag.id, TagId(8));
    }

    #[tokio::test]
    async fn test_placeholder_tag_at_max_id_is_rejected() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();

        let result = tx.insert_placeholder_tag(TagId(u64::MAX)).await;
        assert!(matches!(
            result,
            Err(RecipeError::Validation { ref field, .. }) if field == "tags"
        ));
        assert!(tx.find_tag(TagId(u64::MAX)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_recipe_cascades() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let user = tx.insert_user(new_user("alice")).await.unwrap();
        let flour = tx
            .insert_ingredient(NewIngredient {
                name: "flour".to_string(),
                measurement_unit: "g".to_string(),
            })
            .await
            .unwrap();
        let recipe = tx
            .insert_recipe(NewRecipe {
                author: user.id,
                name: "Bread".to_string(),
                image: "recipes/images/bread.png".to_string(),
                text: "Bake it".to_string(),
                cooking_time: 60,
            })
            .await
            .unwrap();
        tx.insert_recipe_ingredients(vec![NewRecipeIngredient {
            recipe: recipe.id,
            ingredient: flour.id,
            amount: 500,
        }])
        .await
        .unwrap();
        tx.insert_favorite(user.id, recipe.id).await.unwrap();
        tx.insert_cart_entry(user.id, recipe.id).await.unwrap();

        assert!(tx.delete_recipe(recipe.id).await.unwrap());
        assert!(tx.recipe_ingredients(recipe.id).await.unwrap().is_empty());
        assert!(!tx.is_favorite(user.id, recipe.id).await.unwrap());
        assert!(tx.cart_recipes(user.id).await.unwrap().is_empty());
        assert!(!tx.delete_recipe(recipe.id).await.unwrap());
    }
}
