/*
 * Responsibility
 * - Drink / Ingredient のドメイン型
 * - recipe の正規化 (単一オブジェクト → 1 要素の配列)
 * - summary / detail の 2 つの view への射影 (保存はしない)
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub name: String,
    pub color: String,
    // 入力の数値表現 (1 / 1.5) をそのまま保持する。旧フロントエンドは `parts` で送ってくる
    #[serde(alias = "parts")]
    pub quantity: serde_json::Number,
}

/// 常に配列として保存される recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipe(Vec<Ingredient>);

impl Recipe {
    pub fn new(ingredients: Vec<Ingredient>) -> Self {
        Self(ingredients)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.0
    }

    /// Serialized form stored in the `recipe` column.
    pub fn to_stored(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.0)
    }

    pub fn from_stored(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<Ingredient>>(raw).map(Self)
    }
}

/// Request 側の recipe: 単一オブジェクトも配列も受け付ける
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecipeInput {
    Many(Vec<Ingredient>),
    One(Ingredient),
}

impl From<RecipeInput> for Recipe {
    fn from(input: RecipeInput) -> Self {
        match input {
            RecipeInput::Many(items) => Recipe(items),
            RecipeInput::One(item) => Recipe(vec![item]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Drink {
    pub id: i64,
    pub title: String,
    pub recipe: Recipe,
}

#[derive(Debug, Serialize)]
pub struct IngredientSummary {
    pub color: String,
    pub quantity: serde_json::Number,
}

/// Public view: ingredient names are withheld.
#[derive(Debug, Serialize)]
pub struct DrinkSummary {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<IngredientSummary>,
}

#[derive(Debug, Serialize)]
pub struct DrinkDetail {
    pub id: i64,
    pub title: String,
    pub recipe: Vec<Ingredient>,
}

impl Drink {
    pub fn summary(&self) -> DrinkSummary {
        DrinkSummary {
            id: self.id,
            title: self.title.clone(),
            recipe: self
                .recipe
                .ingredients()
                .iter()
                .map(|i| IngredientSummary {
                    color: i.color.clone(),
                    quantity: i.quantity.clone(),
                })
                .collect(),
        }
    }

    pub fn detail(&self) -> DrinkDetail {
        DrinkDetail {
            id: self.id,
            title: self.title.clone(),
            recipe: self.recipe.ingredients().to_vec(),
        }
    }
}
