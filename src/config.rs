use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main application configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Recipe writer resolution policies
    #[serde(default)]
    pub writer: WriterConfig,
    /// Shopping list export settings
    #[serde(default)]
    pub shopping_list: ShoppingListConfig,
    /// Image reference settings
    #[serde(default)]
    pub media: MediaConfig,
}

/// What the recipe writer does with an ingredient id that does not exist
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedIngredients {
    /// Fail the whole write with a not-found error
    #[default]
    Reject,
    /// Drop the line on update; creation still rejects
    Skip,
}

/// What the recipe writer does with a tag id that does not exist
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UnknownTags {
    /// Fail the whole write with a not-found error
    #[default]
    Reject,
    /// Insert an empty tag carrying only the requested id
    CreatePlaceholder,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct WriterConfig {
    #[serde(default)]
    pub unresolved_ingredients: UnresolvedIngredients,
    #[serde(default)]
    pub unknown_tags: UnknownTags,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ShoppingListConfig {
    /// First line of the exported file
    #[serde(default = "default_header")]
    pub header: String,
    /// Attachment file name
    #[serde(default = "default_filename")]
    pub filename: String,
}

impl Default for ShoppingListConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            filename: default_filename(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct MediaConfig {
    /// Public URL prefix prepended to stored image references
    #[serde(default = "default_media_url")]
    pub url: String,
    /// Directory (relative to the media root) uploaded recipe images go to
    #[serde(default = "default_upload_to")]
    pub upload_to: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            url: default_media_url(),
            upload_to: default_upload_to(),
        }
    }
}

// Default value functions
fn default_header() -> String {
    "Shopping list".to_string()
}

fn default_filename() -> String {
    "shopping_list.txt".to_string()
}

fn default_media_url() -> String {
    "/media/".to_string()
}

fn default_upload_to() -> String {
    "recipes/images/".to_string()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with FOODGRAM__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: FOODGRAM__WRITER__UNKNOWN_TAGS
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the source priority.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: FOODGRAM__SHOPPING_LIST__HEADER
        .add_source(
            Environment::with_prefix("FOODGRAM")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_values() {
        assert_eq!(default_header(), "Shopping list");
        assert_eq!(default_filename(), "shopping_list.txt");
        assert_eq!(default_media_url(), "/media/");
        assert_eq!(default_upload_to(), "recipes/images/");
    }

    #[test]
    fn test_writer_config_defaults_to_strict() {
        let writer = WriterConfig::default();
        assert_eq!(writer.unresolved_ingredients, UnresolvedIngredients::Reject);
        assert_eq!(writer.unknown_tags, UnknownTags::Reject);
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str("", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.shopping_list.filename, "shopping_list.txt");
        assert_eq!(config.media.url, "/media/");
        assert_eq!(config.writer.unknown_tags, UnknownTags::Reject);
    }

    #[test]
    fn test_toml_overrides_policies() {
        let toml = r#"
            [writer]
            unresolved_ingredients = "skip"
            unknown_tags = "create_placeholder"

            [shopping_list]
            header = "To buy"
        "#;

        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(
            config.writer.unresolved_ingredients,
            UnresolvedIngredients::Skip
        );
        assert_eq!(config.writer.unknown_tags, UnknownTags::CreatePlaceholder);
        assert_eq!(config.shopping_list.header, "To buy");
        assert_eq!(config.shopping_list.filename, "shopping_list.txt");
    }
}
