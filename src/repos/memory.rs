//! In-memory `DrinkStore` doubles used by router tests.
//!
//! Mirrors the Postgres semantics the handlers rely on:
//! ids are assigned monotonically and never reused, `list` is id-ascending,
//! titles are unique.
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::models::{Drink, Recipe};
use crate::repos::drink_repo::{DrinkStore, SEED_TITLE, seed_recipe};
use crate::repos::error::{RepoError, RepoResult};

#[derive(Debug, Default)]
struct Inner {
    next_id: i64,
    rows: BTreeMap<i64, Drink>,
}

#[derive(Debug, Default)]
pub struct MemoryDrinkStore {
    inner: Mutex<Inner>,
}

impl MemoryDrinkStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Inner {
    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.rows
            .values()
            .any(|d| d.title == title && Some(d.id) != except)
    }

    fn insert(&mut self, title: &str, recipe: &Recipe) -> RepoResult<Drink> {
        if title.chars().count() > 80 {
            return Err(RepoError::Constraint("title too long".into()));
        }
        if self.title_taken(title, None) {
            return Err(RepoError::Constraint("duplicate title".into()));
        }

        self.next_id += 1;
        let drink = Drink {
            id: self.next_id,
            title: title.to_string(),
            recipe: recipe.clone(),
        };
        self.rows.insert(drink.id, drink.clone());
        Ok(drink)
    }
}

#[async_trait]
impl DrinkStore for MemoryDrinkStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn list(&self) -> RepoResult<Vec<Drink>> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> RepoResult<Option<Drink>> {
        let inner = self.inner.lock().await;
        Ok(inner.rows.get(&id).cloned())
    }

    async fn create(&self, title: &str, recipe: &Recipe) -> RepoResult<Drink> {
        let mut inner = self.inner.lock().await;
        inner.insert(title, recipe)
    }

    async fn update(
        &self,
        id: i64,
        title: Option<&str>,
        recipe: Option<&Recipe>,
    ) -> RepoResult<Drink> {
        let mut inner = self.inner.lock().await;

        if let Some(title) = title
            && inner.title_taken(title, Some(id))
        {
            return Err(RepoError::Constraint("duplicate title".into()));
        }

        let drink = inner.rows.get_mut(&id).ok_or(RepoError::NotFound)?;
        if let Some(title) = title {
            drink.title = title.to_string();
        }
        if let Some(recipe) = recipe {
            drink.recipe = recipe.clone();
        }
        Ok(drink.clone())
    }

    async fn delete(&self, id: i64) -> RepoResult<bool> {
        let mut inner = self.inner.lock().await;
        Ok(inner.rows.remove(&id).is_some())
    }

    async fn reset_with_seed(&self) -> RepoResult<Drink> {
        let mut inner = self.inner.lock().await;
        inner.rows.clear();
        inner.insert(SEED_TITLE, &seed_recipe())
    }
}

/// Store whose every operation fails, for exercising the error translation
/// in handlers.
#[derive(Debug, Default)]
pub struct FailingDrinkStore;

impl FailingDrinkStore {
    fn failure() -> RepoError {
        RepoError::Constraint("store unavailable".into())
    }
}

#[async_trait]
impl DrinkStore for FailingDrinkStore {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn list(&self) -> RepoResult<Vec<Drink>> {
        Err(Self::failure())
    }

    async fn get(&self, _id: i64) -> RepoResult<Option<Drink>> {
        Err(Self::failure())
    }

    async fn create(&self, _title: &str, _recipe: &Recipe) -> RepoResult<Drink> {
        Err(Self::failure())
    }

    async fn update(
        &self,
        _id: i64,
        _title: Option<&str>,
        _recipe: Option<&Recipe>,
    ) -> RepoResult<Drink> {
        Err(Self::failure())
    }

    async fn delete(&self, _id: i64) -> RepoResult<bool> {
        Err(Self::failure())
    }

    async fn reset_with_seed(&self) -> RepoResult<Drink> {
        Err(Self::failure())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;

    fn recipe(name: &str) -> Recipe {
        Recipe::new(vec![Ingredient {
            name: name.into(),
            color: "brown".into(),
            quantity: 1.into(),
        }])
    }

    #[tokio::test]
    async fn ids_are_ascending_and_not_reused() {
        let store = MemoryDrinkStore::new();
        let a = store.create("latte", &recipe("milk")).await.unwrap();
        let b = store.create("mocha", &recipe("cocoa")).await.unwrap();
        assert!(store.delete(b.id).await.unwrap());
        let c = store.create("flat white", &recipe("milk")).await.unwrap();

        assert!(a.id < c.id);
        assert_ne!(b.id, c.id);
        let ids: Vec<i64> = store.list().await.unwrap().iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![a.id, c.id]);
    }

    #[tokio::test]
    async fn duplicate_title_is_a_constraint_error() {
        let store = MemoryDrinkStore::new();
        store.create("latte", &recipe("milk")).await.unwrap();
        let err = store.create("latte", &recipe("milk")).await.unwrap_err();
        assert!(matches!(err, RepoError::Constraint(_)));
    }

    #[tokio::test]
    async fn update_of_missing_row_is_not_found() {
        let store = MemoryDrinkStore::new();
        let err = store.update(42, Some("x"), None).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound));
    }

    #[tokio::test]
    async fn reset_leaves_only_the_seed_drink() {
        let store = MemoryDrinkStore::new();
        store.create("latte", &recipe("milk")).await.unwrap();
        let seed = store.reset_with_seed().await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all, vec![seed]);
        assert_eq!(all[0].title, SEED_TITLE);
    }
}
