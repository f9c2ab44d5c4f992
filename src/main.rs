use log::{debug, error};
use recipe_share::catalog::ingredient_fixture;
use recipe_share::config::load_config;
use recipe_share::shopping_list_from_json;
use std::env;

const USAGE: &str = "Usage:
  recipe-share shopping-list <recipes.json>
  recipe-share ingredient-fixture <ingredients.json> <out.json>";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let command = args.get(1).ok_or(USAGE)?;

    match command.as_str() {
        "shopping-list" => {
            let path = args.get(2).ok_or(USAGE)?;
            let config = load_config()?;
            let json = tokio::fs::read_to_string(path).await?;
            let text = shopping_list_from_json(&json, &config.shopping_list.header)?;
            print!("{}", text);
        }
        "ingredient-fixture" => {
            let (input, output) = match (args.get(2), args.get(3)) {
                (Some(input), Some(output)) => (input, output),
                _ => return Err(USAGE.into()),
            };
            let json = tokio::fs::read_to_string(input).await?;
            let records = ingredient_fixture(&json)?;
            debug!("Writing {} fixture records to {}", records.len(), output);
            tokio::fs::write(output, serde_json::to_string(&records)?).await?;
        }
        other => {
            error!("Unknown command: {}", other);
            return Err(USAGE.into());
        }
    }

    Ok(())
}
