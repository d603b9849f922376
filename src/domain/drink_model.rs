use serde::Deserialize;
use serde::Serialize;
use serde_json::Number;

// Domain types
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RecipeComponent {
    pub name: String,
    pub color: String,
    // any JSON number, e.g. half parts
    pub parts: Number,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<RecipeComponent>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Projection {
    Short,
    Long,
}

// Output types
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShortRecipeComponent {
    pub color: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ShortDrink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<ShortRecipeComponent>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LongDrink {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<RecipeComponent>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DrinkView {
    Short(ShortDrink),
    Long(LongDrink),
}

#[derive(Debug, Serialize)]
pub struct DrinksOutput<T> {
    pub success: bool,
    pub drinks: T,
}

impl<T> DrinksOutput<T> {
    pub fn new(drinks: T) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteDrinkOutput {
    pub success: bool,
    pub delete: i64,
}

impl Drink {
    pub fn short(&self) -> ShortDrink {
        ShortDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .iter()
                .map(|component| ShortRecipeComponent {
                    color: component.color.clone(),
                })
                .collect(),
        }
    }

    pub fn long(&self) -> LongDrink {
        LongDrink {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.clone(),
        }
    }

    pub fn project(&self, projection: Projection) -> DrinkView {
        match projection {
            Projection::Short => DrinkView::Short(self.short()),
            Projection::Long => DrinkView::Long(self.long()),
        }
    }
}

// Input types
//
// Recipes stay untyped until the store validates them, so a malformed
// recipe is reported as unprocessable rather than as a bad request body.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct CreateDrinkInput {
    pub title: Option<String>,
    pub recipe: Option<serde_json::Value>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct UpdateDrinkInput {
    pub title: Option<String>,
    pub recipe: Option<serde_json::Value>,
}

// SQL types
#[derive(Clone, Debug, sqlx::FromRow)]
pub struct DrinkRow {
    pub id: i64,
    pub title: String,
    pub recipe: String,
}

// Transformation between types
pub fn parse_recipe(value: serde_json::Value) -> Result<Vec<RecipeComponent>, serde_json::Error> {
    serde_json::from_value(value)
}

pub fn serialize_recipe(recipe: &[RecipeComponent]) -> Result<String, serde_json::Error> {
    serde_json::to_string(recipe)
}

impl TryFrom<&DrinkRow> for Drink {
    type Error = serde_json::Error;

    fn try_from(row: &DrinkRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            title: row.title.clone(),
            recipe: serde_json::from_str(&row.recipe)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn margarita() -> Drink {
        Drink {
            id: 7,
            title: "Margarita".to_string(),
            recipe: vec![
                RecipeComponent {
                    name: "tequila".to_string(),
                    color: "yellow".to_string(),
                    parts: 2.into(),
                },
                RecipeComponent {
                    name: "lime".to_string(),
                    color: "green".to_string(),
                    parts: 1.into(),
                },
            ],
        }
    }

    #[test]
    fn short_and_long_agree_on_shared_fields() {
        let drink = margarita();
        let short = drink.short();
        let long = drink.long();

        assert_eq!(short.id, long.id);
        assert_eq!(short.title, long.title);
        assert_eq!(short.recipe.len(), long.recipe.len());
        for (s, l) in short.recipe.iter().zip(long.recipe.iter()) {
            assert_eq!(s.color, l.color);
        }
    }

    #[test]
    fn short_hides_name_and_parts() {
        let value = serde_json::to_value(margarita().project(Projection::Short)).unwrap();
        assert_eq!(
            value,
            json!({
                "id": 7,
                "title": "Margarita",
                "recipe": [{"color": "yellow"}, {"color": "green"}]
            })
        );
    }

    #[test]
    fn long_exposes_full_components() {
        let value = serde_json::to_value(margarita().project(Projection::Long)).unwrap();
        assert_eq!(
            value["recipe"][0],
            json!({"name": "tequila", "color": "yellow", "parts": 2})
        );
    }

    #[test]
    fn malformed_recipes_are_rejected() {
        assert!(parse_recipe(json!([{"name": "water", "color": "blue", "parts": 1}])).is_ok());
        assert!(parse_recipe(json!({"name": "water", "color": "blue", "parts": 1})).is_err());
        assert!(parse_recipe(json!([{"name": "water", "color": "blue"}])).is_err());
        assert!(parse_recipe(json!([{"name": "water", "color": "blue", "parts": "two"}])).is_err());
        assert!(parse_recipe(json!("water")).is_err());
    }

    #[test]
    fn fractional_parts_are_kept() {
        let recipe = parse_recipe(json!([{"name": "lime", "color": "green", "parts": 0.5}])).unwrap();

        assert_eq!(recipe[0].parts.as_f64(), Some(0.5));
        assert_eq!(
            serde_json::to_value(&recipe).unwrap(),
            json!([{"name": "lime", "color": "green", "parts": 0.5}])
        );
    }

    #[test]
    fn stored_rows_read_back_as_drinks() {
        let row = DrinkRow {
            id: 1,
            title: "water".to_string(),
            recipe: r#"[{"name":"water","color":"blue","parts":1}]"#.to_string(),
        };
        let drink = Drink::try_from(&row).unwrap();
        assert_eq!(drink.recipe[0].color, "blue");

        let broken = DrinkRow {
            recipe: "not json".to_string(),
            ..row
        };
        assert!(Drink::try_from(&broken).is_err());
    }
}
