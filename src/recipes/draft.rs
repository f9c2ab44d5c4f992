use crate::error::{RecipeError, Result};
use crate::model::{
    IngredientId, TagId, AMOUNT_MAX, AMOUNT_MIN, COOKING_TIME_MAX, COOKING_TIME_MIN,
    RECIPE_NAME_MAX_LEN,
};
use serde::Deserialize;

/// A requested `{id, amount}` ingredient line.
///
/// Both fields are optional on the wire: creation rejects incomplete lines,
/// updates skip them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct IngredientLine {
    pub id: Option<IngredientId>,
    pub amount: Option<u32>,
}

impl IngredientLine {
    pub fn new(id: IngredientId, amount: u32) -> Self {
        Self {
            id: Some(id),
            amount: Some(amount),
        }
    }
}

/// Everything needed to create a recipe
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeDraft {
    pub name: String,
    /// Inline `data:image/...;base64,` upload or an existing image reference
    pub image: String,
    pub text: String,
    pub cooking_time: u32,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub ingredients: Vec<IngredientLine>,
}

/// Partial update. Absent scalar fields are left untouched; `tags` and
/// `ingredients` always replace the current sets, so leaving them empty
/// clears them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<u32>,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub ingredients: Vec<IngredientLine>,
}

pub(crate) fn validate_name(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecipeError::validation("name", "Name cannot be empty"));
    }
    if value.chars().count() > RECIPE_NAME_MAX_LEN {
        return Err(RecipeError::validation(
            "name",
            format!("Ensure this field has no more than {} characters", RECIPE_NAME_MAX_LEN),
        ));
    }
    Ok(())
}

pub(crate) fn validate_text(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecipeError::validation("text", "Text cannot be empty"));
    }
    Ok(())
}

pub(crate) fn validate_image(value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RecipeError::validation("image", "Image is required"));
    }
    Ok(())
}

pub(crate) fn validate_cooking_time(value: u32) -> Result<()> {
    if !(COOKING_TIME_MIN..=COOKING_TIME_MAX).contains(&value) {
        return Err(RecipeError::validation(
            "cooking_time",
            format!(
                "Must be between {} and {}, got {}",
                COOKING_TIME_MIN, COOKING_TIME_MAX, value
            ),
        ));
    }
    Ok(())
}

fn validate_amount(index: usize, value: u32) -> Result<()> {
    if !(AMOUNT_MIN..=AMOUNT_MAX).contains(&value) {
        return Err(RecipeError::validation(
            format!("ingredients[{}].amount", index),
            format!("Must be between {} and {}, got {}", AMOUNT_MIN, AMOUNT_MAX, value),
        ));
    }
    Ok(())
}

impl RecipeDraft {
    pub fn builder() -> RecipeDraftBuilder {
        RecipeDraftBuilder::default()
    }

    /// Check every field and return the ingredient lines as `(id, amount)`
    /// pairs, in request order.
    pub fn validate(&self) -> Result<Vec<(IngredientId, u32)>> {
        validate_name(&self.name)?;
        validate_image(&self.image)?;
        validate_text(&self.text)?;
        validate_cooking_time(self.cooking_time)?;

        self.ingredients
            .iter()
            .enumerate()
            .map(|(index, line)| {
                let id = line.id.ok_or_else(|| {
                    RecipeError::validation(format!("ingredients[{}].id", index), "Required")
                })?;
                let amount = line.amount.ok_or_else(|| {
                    RecipeError::validation(format!("ingredients[{}].amount", index), "Required")
                })?;
                validate_amount(index, amount)?;
                Ok((id, amount))
            })
            .collect()
    }
}

impl RecipePatch {
    /// Check the fields that are present. Incomplete ingredient lines pass,
    /// the writer skips them.
    pub fn validate(&self) -> Result<()> {
        if let Some(ref name) = self.name {
            validate_name(name)?;
        }
        if let Some(ref image) = self.image {
            validate_image(image)?;
        }
        if let Some(ref text) = self.text {
            validate_text(text)?;
        }
        if let Some(cooking_time) = self.cooking_time {
            validate_cooking_time(cooking_time)?;
        }
        for (index, line) in self.ingredients.iter().enumerate() {
            if let Some(amount) = line.amount {
                validate_amount(index, amount)?;
            }
        }
        Ok(())
    }
}

/// Builder for assembling a [`RecipeDraft`] in code
#[derive(Debug, Default)]
pub struct RecipeDraftBuilder {
    name: Option<String>,
    image: Option<String>,
    text: Option<String>,
    cooking_time: Option<u32>,
    tags: Vec<TagId>,
    ingredients: Vec<IngredientLine>,
}

impl RecipeDraftBuilder {
    /// Set the recipe name
    ///
    /// # Example
    /// ```
    /// use recipe_share::RecipeDraft;
    ///
    /// let builder = RecipeDraft::builder().name("Pancakes");
    /// ```
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the image, either a `data:image/...;base64,` URI or a stored reference
    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the cooking time in minutes
    pub fn cooking_time(mut self, minutes: u32) -> Self {
        self.cooking_time = Some(minutes);
        self
    }

    pub fn tag(mut self, id: TagId) -> Self {
        self.tags.push(id);
        self
    }

    /// Append an ingredient line
    ///
    /// # Example
    /// ```
    /// use recipe_share::{IngredientId, RecipeDraft};
    ///
    /// let builder = RecipeDraft::builder()
    ///     .ingredient(IngredientId(5), 3)
    ///     .ingredient(IngredientId(8), 200);
    /// ```
    pub fn ingredient(mut self, id: IngredientId, amount: u32) -> Self {
        self.ingredients.push(IngredientLine::new(id, amount));
        self
    }

    /// Build and validate the draft
    ///
    /// # Errors
    /// Returns `RecipeError::Validation` if a required field is missing or any
    /// field is out of range.
    pub fn build(self) -> Result<RecipeDraft> {
        let draft = RecipeDraft {
            name: self.name.ok_or_else(|| required("name"))?,
            image: self.image.ok_or_else(|| required("image"))?,
            text: self.text.ok_or_else(|| required("text"))?,
            cooking_time: self.cooking_time.ok_or_else(|| required("cooking_time"))?,
            tags: self.tags,
            ingredients: self.ingredients,
        };
        draft.validate()?;
        Ok(draft)
    }
}

fn required(field: &str) -> RecipeError {
    RecipeError::validation(field, "This field is required")
}
