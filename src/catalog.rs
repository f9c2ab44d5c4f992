//! Reference data and accounts: ingredients, tags and users.

use crate::error::{RecipeError, Result};
use crate::model::{
    Ingredient, IngredientId, NewIngredient, NewTag, NewUser, Tag, TagId, UserId,
    INGREDIENT_NAME_MAX_LEN, MEASUREMENT_UNIT_MAX_LEN, TAG_COLOR_MAX_LEN, TAG_NAME_MAX_LEN,
};
use crate::store::Store;
use crate::views::{user_view, UserView};
use log::info;
use serde::Serialize;

/// Ingredients whose name contains `name` (case-insensitive), ordered by id.
/// `None` returns every ingredient.
pub async fn search_ingredients(store: &dyn Store, name: Option<&str>) -> Result<Vec<Ingredient>> {
    let mut tx = store.begin().await?;
    let ingredients = tx.list_ingredients().await?;
    let needle = match name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(needle) => needle.to_lowercase(),
        None => return Ok(ingredients),
    };
    Ok(ingredients
        .into_iter()
        .filter(|i| i.name.to_lowercase().contains(&needle))
        .collect())
}

pub async fn get_ingredient(store: &dyn Store, id: IngredientId) -> Result<Ingredient> {
    let mut tx = store.begin().await?;
    tx.find_ingredient(id)
        .await?
        .ok_or_else(|| RecipeError::not_found("Ingredient", id))
}

fn validate_ingredient(index: usize, ingredient: &NewIngredient) -> Result<()> {
    let name = ingredient.name.trim();
    if name.is_empty() || name.chars().count() > INGREDIENT_NAME_MAX_LEN {
        return Err(RecipeError::validation(
            format!("[{}].name", index),
            format!("Must be 1 to {} characters", INGREDIENT_NAME_MAX_LEN),
        ));
    }
    let unit = ingredient.measurement_unit.trim();
    if unit.is_empty() || unit.chars().count() > MEASUREMENT_UNIT_MAX_LEN {
        return Err(RecipeError::validation(
            format!("[{}].measurement_unit", index),
            format!("Must be 1 to {} characters", MEASUREMENT_UNIT_MAX_LEN),
        ));
    }
    Ok(())
}

/// Bulk-load ingredients from a JSON array of `{name, measurement_unit}`.
///
/// All rows are inserted in one transaction; returns how many were loaded.
pub async fn load_ingredients(store: &dyn Store, json: &str) -> Result<usize> {
    let ingredients: Vec<NewIngredient> = serde_json::from_str(json)?;
    for (index, ingredient) in ingredients.iter().enumerate() {
        validate_ingredient(index, ingredient)?;
    }

    let mut tx = store.begin().await?;
    let count = ingredients.len();
    for ingredient in ingredients {
        tx.insert_ingredient(ingredient).await?;
    }
    tx.commit().await?;

    info!("Loaded {} ingredients", count);
    Ok(count)
}

#[derive(Debug, Serialize)]
pub struct FixtureRecord {
    pub model: &'static str,
    pub pk: u64,
    pub fields: NewIngredient,
}

/// Turn a JSON array of `{name, measurement_unit}` into fixture records with
/// sequential primary keys starting at 1.
pub fn ingredient_fixture(json: &str) -> Result<Vec<FixtureRecord>> {
    let ingredients: Vec<NewIngredient> = serde_json::from_str(json)?;
    Ok(ingredients
        .into_iter()
        .zip(1u64..)
        .map(|(fields, pk)| FixtureRecord {
            model: "recipes.ingredient",
            pk,
            fields,
        })
        .collect())
}

pub async fn list_tags(store: &dyn Store) -> Result<Vec<Tag>> {
    let mut tx = store.begin().await?;
    tx.list_tags().await
}

pub async fn get_tag(store: &dyn Store, id: TagId) -> Result<Tag> {
    let mut tx = store.begin().await?;
    tx.find_tag(id)
        .await?
        .ok_or_else(|| RecipeError::not_found("Tag", id))
}

fn is_hex_color(color: &str) -> bool {
    color.len() == TAG_COLOR_MAX_LEN
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn is_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Create a tag. This is the only way tags with content come into existence.
pub async fn create_tag(store: &dyn Store, tag: NewTag) -> Result<Tag> {
    let name = tag.name.trim();
    if name.is_empty() || name.chars().count() > TAG_NAME_MAX_LEN {
        return Err(RecipeError::validation(
            "name",
            format!("Must be 1 to {} characters", TAG_NAME_MAX_LEN),
        ));
    }
    if !is_hex_color(&tag.color) {
        return Err(RecipeError::validation("color", "Expected a #RRGGBB color"));
    }
    if !is_slug(&tag.slug) {
        return Err(RecipeError::validation(
            "slug",
            "Only letters, numbers, underscores or hyphens are allowed",
        ));
    }

    let mut tx = store.begin().await?;
    let tag = tx.insert_tag(tag).await?;
    tx.commit().await?;
    info!("Created tag {} '{}'", tag.id, tag.slug);
    Ok(tag)
}

/// Register a user account. Email and username must be unique.
pub async fn register_user(store: &dyn Store, user: NewUser) -> Result<UserView> {
    for (field, value) in [
        ("email", &user.email),
        ("username", &user.username),
        ("first_name", &user.first_name),
        ("last_name", &user.last_name),
    ] {
        if value.trim().is_empty() {
            return Err(RecipeError::validation(field, "This field is required"));
        }
    }
    if !user.email.contains('@') {
        return Err(RecipeError::validation("email", "Enter a valid email address"));
    }

    let mut tx = store.begin().await?;
    if tx.find_user_by_email(&user.email).await?.is_some() {
        return Err(RecipeError::Conflict(format!(
            "A user with email '{}' already exists",
            user.email
        )));
    }
    if tx.find_user_by_username(&user.username).await?.is_some() {
        return Err(RecipeError::Conflict(format!(
            "A user with username '{}' already exists",
            user.username
        )));
    }
    let user = tx.insert_user(user).await?;
    let view = user_view(tx.as_mut(), user, None).await?;
    tx.commit().await?;

    info!("Registered user {} '{}'", view.id, view.username);
    Ok(view)
}

pub async fn get_user(store: &dyn Store, id: UserId, viewer: Option<UserId>) -> Result<UserView> {
    let mut tx = store.begin().await?;
    let user = tx
        .find_user(id)
        .await?
        .ok_or_else(|| RecipeError::not_found("User", id))?;
    user_view(tx.as_mut(), user, viewer).await
}

/// Every registered user ordered by id, with `is_subscribed` set for `viewer`
pub async fn list_users(store: &dyn Store, viewer: Option<UserId>) -> Result<Vec<UserView>> {
    let mut tx = store.begin().await?;
    let users = tx.list_users().await?;
    let mut views = Vec::with_capacity(users.len());
    for user in users {
        views.push(user_view(tx.as_mut(), user, viewer).await?);
    }
    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const INGREDIENTS: &str = r#"[
        {"name": "абрикосовое варенье", "measurement_unit": "г"},
        {"name": "Flour", "measurement_unit": "g"},
        {"name": "cauliflower", "measurement_unit": "pcs"}
    ]"#;

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let store = MemoryStore::new();
        assert_eq!(load_ingredients(&store, INGREDIENTS).await.unwrap(), 3);

        let found = search_ingredients(&store, Some("FLO")).await.unwrap();
        let names: Vec<_> = found.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Flour", "cauliflower"]);

        let all = search_ingredients(&store, None).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn test_load_rejects_blank_unit_atomically() {
        let store = MemoryStore::new();
        let json = r#"[
            {"name": "salt", "measurement_unit": "g"},
            {"name": "pepper", "measurement_unit": " "}
        ]"#;

        let err = load_ingredients(&store, json).await.unwrap_err();
        assert!(matches!(err, RecipeError::Validation { ref field, .. } if field == "[1].measurement_unit"));
        assert!(search_ingredients(&store, None).await.unwrap().is_empty());
    }

    #[test]
    fn test_fixture_numbers_from_one() {
        let records = ingredient_fixture(INGREDIENTS).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].pk, 1);
        assert_eq!(records[2].pk, 3);

        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json[1]["model"], "recipes.ingredient");
        assert_eq!(json[1]["fields"]["name"], "Flour");
        assert_eq!(json[1]["fields"]["measurement_unit"], "g");
    }

    #[tokio::test]
    async fn test_create_tag_validation() {
        let store = MemoryStore::new();
        let tag = |color: &str, slug: &str| NewTag {
            name: "Breakfast".to_string(),
            color: color.to_string(),
            slug: slug.to_string(),
        };

        assert!(create_tag(&store, tag("#E26C2D", "breakfast")).await.is_ok());
        assert!(matches!(
            create_tag(&store, tag("orange", "brunch")).await,
            Err(RecipeError::Validation { .. })
        ));
        assert!(matches!(
            create_tag(&store, tag("#E26C2D", "no spaces")).await,
            Err(RecipeError::Validation { .. })
        ));
        assert!(matches!(
            create_tag(&store, tag("#000000", "breakfast")).await,
            Err(RecipeError::Conflict(_))
        ));
        assert_eq!(list_tags(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_register_user_unique() {
        let store = MemoryStore::new();
        let user = || NewUser {
            email: "cook@example.com".to_string(),
            username: "cook".to_string(),
            first_name: "Jamie".to_string(),
            last_name: "Oliver".to_string(),
        };

        let view = register_user(&store, user()).await.unwrap();
        assert!(!view.is_subscribed);
        assert_eq!(get_user(&store, view.id, None).await.unwrap(), view);

        let err = register_user(&store, user()).await.unwrap_err();
        assert!(matches!(err, RecipeError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_list_users_flags_subscriptions() {
        let store = MemoryStore::new();
        let mut ids = Vec::new();
        for name in ["ann", "ben", "cat"] {
            let user = NewUser {
                email: format!("{}@example.com", name),
                username: name.to_string(),
                first_name: name.to_string(),
                last_name: "Lee".to_string(),
            };
            ids.push(register_user(&store, user).await.unwrap().id);
        }
        let mut tx = store.begin().await.unwrap();
        tx.insert_subscription(ids[0], ids[2]).await.unwrap();
        tx.commit().await.unwrap();

        let users = list_users(&store, Some(ids[0])).await.unwrap();
        let names: Vec<&str> = users.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["ann", "ben", "cat"]);
        let flags: Vec<bool> = users.iter().map(|u| u.is_subscribed).collect();
        assert_eq!(flags, vec![false, false, true]);

        let anonymous = list_users(&store, None).await.unwrap();
        assert!(anonymous.iter().all(|u| !u.is_subscribed));
    }
}
