/*
 * Responsibility
 * - Drinks の request/response DTO
 * - validation (形式チェック) 用の validate()
 * - recipe は RecipeInput で受けて Recipe (常に配列) に正規化する
 */
use serde::{Deserialize, Deserializer, Serialize};

use crate::models::RecipeInput;

#[derive(Debug, Deserialize)]
pub struct CreateDrinkRequest {
    pub title: String,
    pub recipe: RecipeInput,
}

impl CreateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.title.trim().is_empty() {
            return Err("title is required");
        }
        Ok(())
    }
}

// key があれば Some(..)、値が null なら Some(None)
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize)]
pub struct UpdateDrinkRequest {
    // None: field missing (do not update)
    // Some(None): explicit null (rejected by validate)
    #[serde(default, deserialize_with = "present")]
    pub title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub recipe: Option<Option<RecipeInput>>,
}

impl UpdateDrinkRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        match &self.title {
            Some(None) => return Err("title cannot be null"),
            Some(Some(title)) if title.trim().is_empty() => return Err("title cannot be empty"),
            _ => {}
        }
        if matches!(self.recipe, Some(None)) {
            return Err("recipe cannot be null");
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct DrinksResponse<T> {
    pub success: bool,
    pub drinks: Vec<T>,
}

impl<T> DrinksResponse<T> {
    pub fn new(drinks: Vec<T>) -> Self {
        Self {
            success: true,
            drinks,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UpdatedResponse {
    pub success: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub success: bool,
    pub deleted: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn create_request_requires_title_and_recipe() {
        assert!(serde_json::from_value::<CreateDrinkRequest>(json!({"title": "x"})).is_err());
        assert!(
            serde_json::from_value::<CreateDrinkRequest>(json!({
                "recipe": {"name": "a", "color": "b", "quantity": 1}
            }))
            .is_err()
        );

        let req: CreateDrinkRequest = serde_json::from_value(json!({
            "title": "  ",
            "recipe": {"name": "a", "color": "b", "quantity": 1}
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_fields_are_optional() {
        let req: UpdateDrinkRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.title.is_none() && req.recipe.is_none());
        assert!(req.validate().is_ok());

        let req: UpdateDrinkRequest = serde_json::from_value(json!({"title": ""})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn explicit_null_is_supplied_and_rejected() {
        let req: UpdateDrinkRequest = serde_json::from_value(json!({"title": null})).unwrap();
        assert!(matches!(req.title, Some(None)));
        assert_eq!(req.validate(), Err("title cannot be null"));

        let req: UpdateDrinkRequest = serde_json::from_value(json!({"recipe": null})).unwrap();
        assert!(req.title.is_none());
        assert_eq!(req.validate(), Err("recipe cannot be null"));
    }

    #[test]
    fn padded_title_is_valid_as_given() {
        let req: UpdateDrinkRequest =
            serde_json::from_value(json!({"title": "  Flat White  "})).unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.title, Some(Some("  Flat White  ".to_string())));
    }
}
