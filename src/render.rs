use crate::recipe::{Category, Recipe};

/// Telegram rejects captions longer than this.
pub const CAPTION_LIMIT: usize = 1024;
pub const MESSAGE_LIMIT: usize = 4096;

static SPECIAL_CHARACTERS: [char; 19] = [
    '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
];

pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if SPECIAL_CHARACTERS.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c)
    }
    escaped
}

/// Cuts already-escaped MarkdownV2 text to at most `max` chars without
/// leaving a dangling escape.
pub fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut clipped: String = text.chars().take(max.saturating_sub(1)).collect();
    let trailing = clipped.chars().rev().take_while(|&c| c == '\\').count();
    if trailing % 2 == 1 {
        clipped.pop();
    }
    clipped.push('…');
    clipped
}

pub fn recipe_list(title: &str, recipes: &[Recipe]) -> String {
    let mut text = format!("*{}*\n", escape_markdown(title));
    if recipes.is_empty() {
        text.push_str("\nNo recipes found\\.");
        return text;
    }
    for recipe in recipes {
        text.push_str(&format!(
            "\n• {}\n  /recipe {}",
            escape_markdown(&recipe.name),
            escape_markdown(&recipe.id)
        ));
    }
    clip(&text, MESSAGE_LIMIT)
}

pub fn category_list(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories available\\.".to_string();
    }
    let mut text = String::from("*Categories*\n");
    for category in categories {
        text.push_str(&format!(
            "\n• /category {}",
            escape_markdown(&category.str_category)
        ));
    }
    clip(&text, MESSAGE_LIMIT)
}

pub fn recipe_caption(recipe: &Recipe, favorite: bool) -> String {
    let heart = if favorite { " ♥" } else { "" };
    let room = CAPTION_LIMIT - 2 - heart.chars().count();
    let name = clip(&escape_markdown(&recipe.name), room);
    format!("*{}*{}", name, heart)
}

pub fn recipe_details(recipe: &Recipe, favorite: bool) -> String {
    let mut text = recipe_caption(recipe, favorite);

    let meta: Vec<String> = [&recipe.category, &recipe.area]
        .into_iter()
        .flatten()
        .filter(|value| !value.trim().is_empty())
        .map(|value| escape_markdown(value))
        .collect();
    if !meta.is_empty() {
        text.push_str(&format!("\n_{}_", meta.join(" • ")));
    }

    if let Some(youtube) = recipe.youtube.as_deref().filter(|url| !url.is_empty()) {
        text.push_str(&format!("\n\n▶ {}", escape_markdown(youtube)));
    }

    let ingredients: Vec<String> = recipe
        .ingredient_list()
        .map(|item| {
            let measure = item.measure.trim();
            if measure.is_empty() {
                format!("• {}", escape_markdown(item.ingredient.trim()))
            } else {
                format!(
                    "• {}: {}",
                    escape_markdown(item.ingredient.trim()),
                    escape_markdown(measure)
                )
            }
        })
        .collect();
    if !ingredients.is_empty() {
        text.push_str("\n\n*Ingredients*\n");
        text.push_str(&ingredients.join("\n"));
    }

    if let Some(instructions) = recipe.instructions.as_deref().map(str::trim) {
        if !instructions.is_empty() {
            text.push_str("\n\n*Instructions*\n");
            text.push_str(&escape_markdown(instructions));
        }
    }

    text.push_str(&format!(
        "\n\n{} {}",
        if favorite { "/unfav" } else { "/fav" },
        escape_markdown(&recipe.id)
    ));
    clip(&text, MESSAGE_LIMIT)
}
