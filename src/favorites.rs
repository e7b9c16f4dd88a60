use std::sync::Arc;

use crate::db::KeyValueStore;
use crate::error::FavoritesError;
use crate::recipe::{recipes_from_values, Recipe};
use serde_json::Value;

pub const FAVORITES_KEY: &str = "@recipes_favorites";

/// Favorites persisted as one JSON array under [`FAVORITES_KEY`].
///
/// Every mutation rewrites the whole array. There is no locking: two
/// overlapping mutations race and the last write wins.
///
/// The `try_*` methods report failures; the plain methods log them and fall
/// back to an empty list or `false`.
#[derive(Clone)]
pub struct FavoritesRepository {
    store: Arc<dyn KeyValueStore>,
}

impl FavoritesRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        FavoritesRepository { store }
    }

    pub async fn try_get_favorites(&self) -> Result<Vec<Recipe>, FavoritesError> {
        match self.store.get_item(FAVORITES_KEY).await? {
            Some(data) => {
                let entries: Vec<Value> =
                    serde_json::from_str(&data).map_err(FavoritesError::Decode)?;
                Ok(recipes_from_values(entries))
            }
            None => Ok(Vec::new()),
        }
    }

    /// Returns `Ok(false)` without writing when a favorite with the same id exists.
    pub async fn try_add_favorite(&self, recipe: &Recipe) -> Result<bool, FavoritesError> {
        let mut favorites = self.get_favorites().await;
        if favorites.iter().any(|fav| fav.id == recipe.id) {
            log::debug!("Recipe {} is already a favorite", recipe.id);
            return Ok(false);
        }
        favorites.push(recipe.clone());
        self.write(&favorites).await?;
        log::info!("Added recipe {} to favorites", recipe.id);
        Ok(true)
    }

    pub async fn try_remove_favorite(&self, recipe_id: &str) -> Result<(), FavoritesError> {
        let mut favorites = self.get_favorites().await;
        favorites.retain(|fav| fav.id != recipe_id);
        self.write(&favorites).await?;
        log::info!("Removed recipe {} from favorites", recipe_id);
        Ok(())
    }

    pub async fn try_is_favorite(&self, recipe_id: &str) -> Result<bool, FavoritesError> {
        let favorites = self.try_get_favorites().await?;
        Ok(favorites.iter().any(|fav| fav.id == recipe_id))
    }

    pub async fn get_favorites(&self) -> Vec<Recipe> {
        match self.try_get_favorites().await {
            Ok(favorites) => favorites,
            Err(e) => {
                log::error!("Failed to read favorites: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn add_favorite(&self, recipe: &Recipe) -> bool {
        match self.try_add_favorite(recipe).await {
            Ok(added) => added,
            Err(e) => {
                log::error!("Failed to add favorite {}: {}", recipe.id, e);
                false
            }
        }
    }

    /// Removing an id that is not stored still succeeds.
    pub async fn remove_favorite(&self, recipe_id: &str) -> bool {
        match self.try_remove_favorite(recipe_id).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("Failed to remove favorite {}: {}", recipe_id, e);
                false
            }
        }
    }

    pub async fn is_favorite(&self, recipe_id: &str) -> bool {
        match self.try_is_favorite(recipe_id).await {
            Ok(found) => found,
            Err(e) => {
                log::error!("Failed to check favorite {}: {}", recipe_id, e);
                false
            }
        }
    }

    async fn write(&self, favorites: &[Recipe]) -> Result<(), FavoritesError> {
        let data = serde_json::to_string(favorites).map_err(FavoritesError::Encode)?;
        self.store.set_item(FAVORITES_KEY, &data).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::db::SqliteStore;
    use crate::error::StoreError;
    use async_trait::async_trait;

    /// Store whose reads return `stored` and whose writes always fail.
    pub(crate) struct ReadOnlyStore {
        pub stored: Option<String>,
        pub fail_reads: bool,
    }

    #[async_trait]
    impl KeyValueStore for ReadOnlyStore {
        async fn get_item(&self, _key: &str) -> Result<Option<String>, StoreError> {
            if self.fail_reads {
                return Err(StoreError::Poisoned);
            }
            Ok(self.stored.clone())
        }

        async fn set_item(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }

        async fn remove_item(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }

        async fn clear(&self) -> Result<(), StoreError> {
            Err(StoreError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    pub(crate) fn teriyaki() -> Recipe {
        let mut recipe = Recipe::new(
            "52772",
            "Teriyaki Chicken Casserole",
            "https://www.themealdb.com/images/media/meals/wvpsxx1468256321.jpg",
        );
        recipe.category = Some("Chicken".into());
        recipe.area = Some("Japanese".into());
        recipe
    }

    pub(crate) fn sushi() -> Recipe {
        Recipe::new(
            "52959",
            "Sushi",
            "https://www.themealdb.com/images/media/meals/g046bb1663960946.jpg",
        )
    }

    fn memory_repo() -> (Arc<SqliteStore>, FavoritesRepository) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        let repo = FavoritesRepository::new(store.clone());
        (store, repo)
    }

    #[tokio::test]
    async fn add_then_remove_round_trip() {
        let (_, repo) = memory_repo();
        assert!(repo.get_favorites().await.is_empty());

        assert!(repo.add_favorite(&teriyaki()).await);
        let favorites = repo.get_favorites().await;
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, "52772");
        assert_eq!(favorites[0], teriyaki());

        assert!(repo.remove_favorite("52772").await);
        assert!(repo.get_favorites().await.is_empty());
    }

    #[tokio::test]
    async fn duplicate_add_is_rejected() {
        let (_, repo) = memory_repo();
        assert!(repo.add_favorite(&teriyaki()).await);

        let mut renamed = teriyaki();
        renamed.name = "Another name".into();
        assert!(!repo.add_favorite(&renamed).await);

        let favorites = repo.get_favorites().await;
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].name, "Teriyaki Chicken Casserole");
    }

    #[tokio::test]
    async fn favorites_keep_append_order() {
        let (_, repo) = memory_repo();
        repo.add_favorite(&sushi()).await;
        repo.add_favorite(&teriyaki()).await;
        let ids: Vec<String> = repo.get_favorites().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["52959", "52772"]);
    }

    #[tokio::test]
    async fn removing_unknown_id_is_a_successful_no_op() {
        let (_, repo) = memory_repo();
        repo.add_favorite(&sushi()).await;

        assert!(repo.remove_favorite("00000").await);
        assert!(!repo.is_favorite("00000").await);
        assert_eq!(repo.get_favorites().await.len(), 1);
    }

    #[tokio::test]
    async fn is_favorite_tracks_membership() {
        let (_, repo) = memory_repo();
        assert!(!repo.is_favorite("52772").await);
        repo.add_favorite(&teriyaki()).await;
        assert!(repo.is_favorite("52772").await);
        repo.remove_favorite("52772").await;
        assert!(!repo.is_favorite("52772").await);
    }

    #[tokio::test]
    async fn invalid_json_reads_as_empty() {
        let (store, repo) = memory_repo();
        store
            .set_item(FAVORITES_KEY, "invalid json data")
            .await
            .unwrap();

        assert!(repo.get_favorites().await.is_empty());
        assert!(!repo.is_favorite("52772").await);
        assert!(matches!(
            repo.try_get_favorites().await,
            Err(FavoritesError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn add_replaces_unreadable_blob() {
        let (store, repo) = memory_repo();
        store
            .set_item(FAVORITES_KEY, "invalid json data")
            .await
            .unwrap();

        assert!(repo.add_favorite(&sushi()).await);
        assert_eq!(repo.try_get_favorites().await.unwrap(), vec![sushi()]);
    }

    #[tokio::test]
    async fn one_bad_entry_does_not_drop_the_others() {
        let (store, repo) = memory_repo();
        let stored = serde_json::json!([
            { "idMeal": "52959", "strMeal": "Sushi", "strMealThumb": "" },
            { "idMeal": 52772, "strMeal": "Teriyaki Chicken Casserole" }
        ]);
        store
            .set_item(FAVORITES_KEY, &stored.to_string())
            .await
            .unwrap();

        let favorites = repo.get_favorites().await;
        assert_eq!(favorites.len(), 1);
        assert_eq!(favorites[0].id, "52959");
        assert!(repo.is_favorite("52959").await);

        assert!(repo.add_favorite(&teriyaki()).await);
        let ids: Vec<String> = repo.get_favorites().await.into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["52959", "52772"]);
    }

    #[tokio::test]
    async fn non_array_json_reads_as_empty() {
        let (store, repo) = memory_repo();
        store
            .set_item(FAVORITES_KEY, r#"{"idMeal":"52959"}"#)
            .await
            .unwrap();
        assert!(repo.get_favorites().await.is_empty());
        assert!(matches!(
            repo.try_get_favorites().await,
            Err(FavoritesError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn write_failures_return_false() {
        let stored = serde_json::to_string(&vec![sushi()]).unwrap();
        let repo = FavoritesRepository::new(Arc::new(ReadOnlyStore {
            stored: Some(stored),
            fail_reads: false,
        }));

        assert!(!repo.add_favorite(&teriyaki()).await);
        assert!(!repo.remove_favorite("52959").await);
        assert!(matches!(
            repo.try_remove_favorite("52959").await,
            Err(FavoritesError::Store(_))
        ));
        assert!(repo.is_favorite("52959").await);
    }

    #[tokio::test]
    async fn read_failures_degrade_to_defaults() {
        let repo = FavoritesRepository::new(Arc::new(ReadOnlyStore {
            stored: None,
            fail_reads: true,
        }));

        assert!(repo.get_favorites().await.is_empty());
        assert!(!repo.is_favorite("52772").await);
        assert!(repo.try_get_favorites().await.is_err());
    }
}
