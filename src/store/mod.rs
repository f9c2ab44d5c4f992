mod memory;

pub use memory::MemoryStore;

use crate::error::Result;
use crate::model::{
    Ingredient, IngredientId, NewIngredient, NewRecipe, NewRecipeIngredient, NewTag, NewUser,
    Recipe, RecipeId, RecipeIngredient, Tag, TagId, User, UserId,
};
use async_trait::async_trait;

/// Persistence capability for the recipe domain.
///
/// Every read and write happens inside a transaction obtained from
/// [`Store::begin`]. Changes become visible to other transactions only after
/// [`StoreTransaction::commit`]; dropping a transaction rolls it back.
#[async_trait]
pub trait Store: Send + Sync {
    async fn begin<'a>(&'a self) -> Result<Box<dyn StoreTransaction + 'a>>;
}

#[async_trait]
pub trait StoreTransaction: Send {
    // Users
    async fn insert_user(&mut self, user: NewUser) -> Result<User>;
    async fn find_user(&mut self, id: UserId) -> Result<Option<User>>;
    async fn find_user_by_email(&mut self, email: &str) -> Result<Option<User>>;
    async fn find_user_by_username(&mut self, username: &str) -> Result<Option<User>>;
    /// All users ordered by id
    async fn list_users(&mut self) -> Result<Vec<User>>;

    // Ingredients
    async fn insert_ingredient(&mut self, ingredient: NewIngredient) -> Result<Ingredient>;
    async fn find_ingredient(&mut self, id: IngredientId) -> Result<Option<Ingredient>>;
    /// All ingredients ordered by id
    async fn list_ingredients(&mut self) -> Result<Vec<Ingredient>>;

    // Tags
    async fn insert_tag(&mut self, tag: NewTag) -> Result<Tag>;
    /// Insert an empty tag under a caller-chosen id
    async fn insert_placeholder_tag(&mut self, id: TagId) -> Result<Tag>;
    async fn find_tag(&mut self, id: TagId) -> Result<Option<Tag>>;
    async fn find_tag_by_slug(&mut self, slug: &str) -> Result<Option<Tag>>;
    async fn list_tags(&mut self) -> Result<Vec<Tag>>;

    // Recipes
    async fn insert_recipe(&mut self, recipe: NewRecipe) -> Result<Recipe>;
    async fn save_recipe(&mut self, recipe: &Recipe) -> Result<()>;
    async fn find_recipe(&mut self, id: RecipeId) -> Result<Option<Recipe>>;
    /// Removes the recipe and everything that references it
    async fn delete_recipe(&mut self, id: RecipeId) -> Result<bool>;
    /// All recipes ordered by id
    async fn list_recipes(&mut self) -> Result<Vec<Recipe>>;
    async fn recipes_by_author(&mut self, author: UserId) -> Result<Vec<Recipe>>;

    // Recipe ingredient rows
    async fn insert_recipe_ingredients(
        &mut self,
        rows: Vec<NewRecipeIngredient>,
    ) -> Result<Vec<RecipeIngredient>>;
    /// Rows in insertion order
    async fn recipe_ingredients(&mut self, recipe: RecipeId) -> Result<Vec<RecipeIngredient>>;
    async fn delete_recipe_ingredients(&mut self, recipe: RecipeId) -> Result<usize>;

    // Recipe tags
    async fn set_recipe_tags(&mut self, recipe: RecipeId, tags: &[TagId]) -> Result<()>;
    async fn recipe_tags(&mut self, recipe: RecipeId) -> Result<Vec<Tag>>;

    // Favorites
    /// Returns false when the pair already existed
    async fn insert_favorite(&mut self, user: UserId, recipe: RecipeId) -> Result<bool>;
    /// Returns false when there was nothing to delete
    async fn delete_favorite(&mut self, user: UserId, recipe: RecipeId) -> Result<bool>;
    async fn is_favorite(&mut self, user: UserId, recipe: RecipeId) -> Result<bool>;

    // Shopping cart
    async fn insert_cart_entry(&mut self, user: UserId, recipe: RecipeId) -> Result<bool>;
    async fn delete_cart_entry(&mut self, user: UserId, recipe: RecipeId) -> Result<bool>;
    async fn in_cart(&mut self, user: UserId, recipe: RecipeId) -> Result<bool>;
    async fn cart_recipes(&mut self, user: UserId) -> Result<Vec<RecipeId>>;

    // Subscriptions
    async fn insert_subscription(&mut self, user: UserId, author: UserId) -> Result<bool>;
    async fn delete_subscription(&mut self, user: UserId, author: UserId) -> Result<bool>;
    async fn is_subscribed(&mut self, user: UserId, author: UserId) -> Result<bool>;
    async fn subscribed_authors(&mut self, user: UserId) -> Result<Vec<UserId>>;

    async fn commit(self: Box<Self>) -> Result<()>;
}
