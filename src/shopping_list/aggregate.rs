use crate::views::{IngredientLineView, RecipeView};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single line the aggregator can count
pub trait ShoppingItem {
    fn name(&self) -> &str;
    fn amount(&self) -> u32;
    fn measurement_unit(&self) -> &str;
}

impl ShoppingItem for IngredientLineView {
    fn name(&self) -> &str {
        &self.name
    }

    fn amount(&self) -> u32 {
        self.amount
    }

    fn measurement_unit(&self) -> &str {
        &self.measurement_unit
    }
}

/// Ingredient line without a catalog id, as read from plain JSON input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub name: String,
    pub amount: u32,
    pub measurement_unit: String,
}

impl ShoppingItem for CartLine {
    fn name(&self) -> &str {
        &self.name
    }

    fn amount(&self) -> u32 {
        self.amount
    }

    fn measurement_unit(&self) -> &str {
        &self.measurement_unit
    }
}

/// Anything that carries an ordered list of ingredient lines
pub trait IngredientSource {
    type Item: ShoppingItem;

    fn ingredient_lines(&self) -> &[Self::Item];
}

impl IngredientSource for RecipeView {
    type Item = IngredientLineView;

    fn ingredient_lines(&self) -> &[IngredientLineView] {
        &self.ingredients
    }
}

impl<T: ShoppingItem> IngredientSource for [T] {
    type Item = T;

    fn ingredient_lines(&self) -> &[T] {
        self
    }
}

impl<T: ShoppingItem> IngredientSource for Vec<T> {
    type Item = T;

    fn ingredient_lines(&self) -> &[T] {
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryEntry {
    pub amount: u64,
    pub unit: String,
}

/// Total amount per ingredient name, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ShoppingSummary(IndexMap<String, SummaryEntry>);

impl ShoppingSummary {
    pub fn get(&self, name: &str) -> Option<&SummaryEntry> {
        self.0.get(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SummaryEntry)> {
        self.0.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Sum ingredient amounts by name across `recipes`.
///
/// Names are compared verbatim, so "Flour" and "flour " stay separate. The
/// unit recorded for a name is the one seen first; later lines add their
/// amount without checking it.
pub fn summarize<'a, R, I>(recipes: I) -> ShoppingSummary
where
    R: IngredientSource + ?Sized + 'a,
    I: IntoIterator<Item = &'a R>,
{
    let mut data: IndexMap<String, SummaryEntry> = IndexMap::new();

    for recipe in recipes {
        for line in recipe.ingredient_lines() {
            let amount = u64::from(line.amount());
            match data.get_mut(line.name()) {
                Some(entry) => entry.amount += amount,
                None => {
                    data.insert(
                        line.name().to_string(),
                        SummaryEntry {
                            amount,
                            unit: line.measurement_unit().to_string(),
                        },
                    );
                }
            }
        }
    }

    ShoppingSummary(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IngredientId;

    fn line(id: u64, name: &str, amount: u32, unit: &str) -> IngredientLineView {
        IngredientLineView {
            id: IngredientId(id),
            name: name.to_string(),
            amount,
            measurement_unit: unit.to_string(),
        }
    }

    #[test]
    fn test_empty_input() {
        let recipes: Vec<Vec<IngredientLineView>> = Vec::new();
        assert!(summarize(&recipes).is_empty());
    }

    #[test]
    fn test_flour_and_sugar() {
        let recipes = vec![
            vec![line(1, "Flour", 200, "g"), line(2, "Sugar", 50, "g")],
            vec![line(1, "Flour", 100, "g")],
        ];

        let summary = summarize(&recipes);

        assert_eq!(summary.len(), 2);
        assert_eq!(
            summary.get("Flour"),
            Some(&SummaryEntry {
                amount: 300,
                unit: "g".to_string()
            })
        );
        assert_eq!(summary.get("Sugar").map(|e| e.amount), Some(50));
        assert_eq!(summary.names().collect::<Vec<_>>(), vec!["Flour", "Sugar"]);
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let recipes = vec![vec![
            line(1, "salt", 1, "g"),
            line(2, "Salt", 2, "g"),
            line(3, "salt ", 3, "g"),
        ]];

        let summary = summarize(&recipes);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary.get("salt").map(|e| e.amount), Some(1));
    }

    #[test]
    fn test_first_unit_wins() {
        let recipes = vec![vec![line(1, "milk", 200, "ml")], vec![line(9, "milk", 1, "cup")]];

        let summary = summarize(&recipes);
        let milk = summary.get("milk").unwrap();
        assert_eq!(milk.amount, 201);
        assert_eq!(milk.unit, "ml");
    }

    #[test]
    fn test_order_follows_first_occurrence() {
        let recipes = vec![
            vec![line(3, "eggs", 2, "pcs")],
            vec![line(1, "butter", 10, "g"), line(3, "eggs", 1, "pcs")],
            vec![line(2, "apples", 4, "pcs"), line(1, "butter", 5, "g")],
        ];

        let summary = summarize(&recipes);
        assert_eq!(
            summary.names().collect::<Vec<_>>(),
            vec!["eggs", "butter", "apples"]
        );
    }

    #[test]
    fn test_large_totals_do_not_overflow() {
        let recipes: Vec<Vec<IngredientLineView>> = (0..500_000)
            .map(|_| vec![line(1, "water", 10000, "ml")])
            .collect();

        let summary = summarize(&recipes);
        assert_eq!(summary.get("water").unwrap().amount, 5_000_000_000);
    }

    #[test]
    fn test_serializes_as_map() {
        let recipes = vec![vec![line(1, "Flour", 200, "g")]];
        let json = serde_json::to_value(summarize(&recipes)).unwrap();
        assert_eq!(json["Flour"]["amount"], 200);
        assert_eq!(json["Flour"]["unit"], "g");
    }
}
