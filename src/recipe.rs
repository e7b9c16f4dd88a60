use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Number of numbered `strIngredientN`/`strMeasureN` pairs a recipe can carry.
pub const INGREDIENT_SLOTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ingredient {
    pub ingredient: String,
    pub measure: String,
}

/// A meal as returned by TheMealDB. Unknown keys are kept in `extra` so a
/// favorite written back to storage keeps everything the API sent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub thumb: String,
    pub category: Option<String>,
    pub area: Option<String>,
    pub instructions: Option<String>,
    pub youtube: Option<String>,
    pub ingredients: [Option<Ingredient>; INGREDIENT_SLOTS],
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id_category: String,
    pub str_category: String,
    pub str_category_thumb: String,
    pub str_category_description: String,
}

impl Recipe {
    pub fn new(id: impl Into<String>, name: impl Into<String>, thumb: impl Into<String>) -> Self {
        Recipe {
            id: id.into(),
            name: name.into(),
            thumb: thumb.into(),
            category: None,
            area: None,
            instructions: None,
            youtube: None,
            ingredients: Default::default(),
            extra: Map::new(),
        }
    }

    /// Ingredients with a non-blank name, in slot order.
    pub fn ingredient_list(&self) -> impl Iterator<Item = &Ingredient> {
        self.ingredients
            .iter()
            .flatten()
            .filter(|item| !item.ingredient.trim().is_empty())
    }
}

/// Converts each entry on its own; entries that are not valid recipes are
/// logged and skipped so one bad record does not hide the rest.
pub fn recipes_from_values(values: Vec<Value>) -> Vec<Recipe> {
    values
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<Recipe>(value) {
            Ok(recipe) => Some(recipe),
            Err(e) => {
                log::error!("Skipping malformed recipe entry: {}", e);
                None
            }
        })
        .collect()
}

fn ingredient_key(slot: usize) -> String {
    format!("strIngredient{}", slot + 1)
}

fn measure_key(slot: usize) -> String {
    format!("strMeasure{}", slot + 1)
}

/// Takes `key` out of `map` when it holds a string or null. Values of any
/// other type stay in the map and end up in `extra`.
fn take_string(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        Some(Value::String(_)) | Some(Value::Null) => {}
        _ => return None,
    }
    match map.remove(key) {
        Some(Value::String(s)) => Some(s),
        _ => None,
    }
}

impl TryFrom<Map<String, Value>> for Recipe {
    type Error = String;

    fn try_from(mut map: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match take_string(&mut map, "idMeal") {
            Some(id) => id,
            None => return Err("recipe is missing a string idMeal".to_string()),
        };
        let name = take_string(&mut map, "strMeal").unwrap_or_default();
        let thumb = take_string(&mut map, "strMealThumb").unwrap_or_default();
        let category = take_string(&mut map, "strCategory");
        let area = take_string(&mut map, "strArea");
        let instructions = take_string(&mut map, "strInstructions");
        let youtube = take_string(&mut map, "strYoutube");

        let mut ingredients: [Option<Ingredient>; INGREDIENT_SLOTS] = Default::default();
        for (slot, entry) in ingredients.iter_mut().enumerate() {
            let ingredient = take_string(&mut map, &ingredient_key(slot));
            let measure = take_string(&mut map, &measure_key(slot));
            if ingredient.is_some() || measure.is_some() {
                *entry = Some(Ingredient {
                    ingredient: ingredient.unwrap_or_default(),
                    measure: measure.unwrap_or_default(),
                });
            }
        }

        Ok(Recipe {
            id,
            name,
            thumb,
            category,
            area,
            instructions,
            youtube,
            ingredients,
            extra: map,
        })
    }
}

impl From<Recipe> for Map<String, Value> {
    fn from(recipe: Recipe) -> Self {
        let mut map = recipe.extra;
        map.insert("idMeal".into(), Value::String(recipe.id));
        map.insert("strMeal".into(), Value::String(recipe.name));
        map.insert("strMealThumb".into(), Value::String(recipe.thumb));

        let optional = [
            ("strCategory", recipe.category),
            ("strArea", recipe.area),
            ("strInstructions", recipe.instructions),
            ("strYoutube", recipe.youtube),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                map.insert(key.into(), Value::String(value));
            }
        }

        for (slot, entry) in recipe.ingredients.into_iter().enumerate() {
            if let Some(item) = entry {
                map.insert(ingredient_key(slot), Value::String(item.ingredient));
                map.insert(measure_key(slot), Value::String(item.measure));
            }
        }
        map
    }
}
