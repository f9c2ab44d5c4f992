use super::ShoppingSummary;

/// Uppercase the first character and lowercase the rest
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Render a summary as a plain-text shopping list:
///
/// ```text
/// <header>
///
/// Flour (g) — 300
/// Sugar (g) — 50
/// ```
pub fn render(summary: &ShoppingSummary, header: &str) -> String {
    let mut output = String::new();
    output.push_str(header);
    output.push_str("\n\n");
    for (name, entry) in summary.iter() {
        output.push_str(&format!(
            "{} ({}) — {}\n",
            capitalize(name),
            entry.unit,
            entry.amount
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IngredientId;
    use crate::shopping_list::summarize;
    use crate::views::IngredientLineView;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("flour"), "Flour");
        assert_eq!(capitalize("BROWN SUGAR"), "Brown sugar");
        assert_eq!(capitalize("яйца куриные"), "Яйца куриные");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn test_render_lines() {
        let recipes = vec![vec![
            IngredientLineView {
                id: IngredientId(1),
                name: "flour".to_string(),
                amount: 300,
                measurement_unit: "g".to_string(),
            },
            IngredientLineView {
                id: IngredientId(2),
                name: "milk".to_string(),
                amount: 250,
                measurement_unit: "ml".to_string(),
            },
        ]];

        let text = render(&summarize(&recipes), "Shopping list");
        assert_eq!(text, "Shopping list\n\nFlour (g) — 300\nMilk (ml) — 250\n");
    }

    #[test]
    fn test_render_empty_summary() {
        let text = render(&ShoppingSummary::default(), "Nothing to buy");
        assert_eq!(text, "Nothing to buy\n\n");
    }
}
