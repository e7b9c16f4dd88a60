use tokio::sync::watch;

use crate::favorites::FavoritesRepository;
use crate::recipe::Recipe;

#[derive(Debug, Clone, PartialEq)]
pub struct FavoritesSnapshot {
    pub favorites: Vec<Recipe>,
    pub loading: bool,
}

/// Observable favorites state backed by the repository.
///
/// Mutations go to storage first and the list is reloaded afterwards, so the
/// published snapshot always reflects what was persisted. Reloads are not
/// serialized: when two overlap, whichever resolves last is published.
pub struct FavoritesState {
    repo: FavoritesRepository,
    state: watch::Sender<FavoritesSnapshot>,
}

impl FavoritesState {
    /// Starts in the loading state with an empty list; the owner triggers the
    /// first [`refresh`](Self::refresh).
    pub fn new(repo: FavoritesRepository) -> Self {
        let (state, _) = watch::channel(FavoritesSnapshot {
            favorites: Vec::new(),
            loading: true,
        });
        FavoritesState { repo, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<FavoritesSnapshot> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FavoritesSnapshot {
        self.state.borrow().clone()
    }

    pub async fn refresh(&self) {
        self.state.send_modify(|snapshot| snapshot.loading = true);
        let favorites = self.repo.get_favorites().await;
        log::debug!("Loaded {} favorites", favorites.len());
        self.state.send_replace(FavoritesSnapshot {
            favorites,
            loading: false,
        });
    }

    pub async fn add_favorite(&self, recipe: &Recipe) -> bool {
        let added = self.repo.add_favorite(recipe).await;
        if added {
            self.refresh().await;
        }
        added
    }

    pub async fn remove_favorite(&self, recipe_id: &str) -> bool {
        let removed = self.repo.remove_favorite(recipe_id).await;
        if removed {
            self.refresh().await;
        }
        removed
    }

    pub async fn is_favorite(&self, recipe_id: &str) -> bool {
        self.repo.is_favorite(recipe_id).await
    }
}
