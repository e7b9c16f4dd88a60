use async_trait::async_trait;
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use crate::error::ApiError;
use crate::recipe::{recipes_from_values, Category, Recipe};

pub const DEFAULT_CATEGORY: &str = "Seafood";
/// Shorter queries are answered with an empty list without hitting the API.
pub const MIN_SEARCH_LEN: usize = 2;

/// Issues a GET and decodes the body as JSON.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get_json(&self, url: &Url) -> Result<Value, ApiError>;
}

pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("recipe-fetch/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpTransport { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &Url) -> Result<Value, ApiError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[derive(Deserialize)]
struct MealsResponse {
    meals: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct CategoriesResponse {
    categories: Option<Vec<Category>>,
}

/// Read-only client for TheMealDB.
///
/// A missing or `null` payload field comes back as `Ok` with an empty value;
/// the non-`try_` methods additionally turn every failure into that same
/// empty value after logging it.
pub struct RecipeApi {
    base: String,
    transport: Arc<dyn Transport>,
}

impl RecipeApi {
    pub fn new(base: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        RecipeApi {
            base: base.into(),
            transport,
        }
    }

    fn endpoint(&self, path: &str, query: Option<(&str, &str)>) -> Result<Url, ApiError> {
        let raw = format!("{}/{}", self.base, path);
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        if let Some((name, value)) = query {
            url.query_pairs_mut().append_pair(name, value);
        }
        Ok(url)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<(&str, &str)>,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path, query)?;
        log::debug!("GET {}", url);
        let body = self.transport.get_json(&url).await?;
        Ok(serde_json::from_value(body)?)
    }

    pub async fn try_recipes_by_category(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<Recipe>, ApiError> {
        let category = category.unwrap_or(DEFAULT_CATEGORY);
        let data: MealsResponse = self.fetch("filter.php", Some(("c", category))).await?;
        Ok(recipes_from_values(data.meals.unwrap_or_default()))
    }

    pub async fn try_recipe_details(&self, id: &str) -> Result<Option<Recipe>, ApiError> {
        let data: MealsResponse = self.fetch("lookup.php", Some(("i", id))).await?;
        let meals = recipes_from_values(data.meals.unwrap_or_default());
        Ok(meals.into_iter().next())
    }

    pub async fn try_categories(&self) -> Result<Vec<Category>, ApiError> {
        let data: CategoriesResponse = self.fetch("categories.php", None).await?;
        Ok(data.categories.unwrap_or_default())
    }

    pub async fn try_search_recipes(&self, query: &str) -> Result<Vec<Recipe>, ApiError> {
        if query.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }
        let data: MealsResponse = self.fetch("search.php", Some(("s", query))).await?;
        Ok(recipes_from_values(data.meals.unwrap_or_default()))
    }

    /// Recipes of `category`, or of [`DEFAULT_CATEGORY`] when `None`.
    pub async fn recipes_by_category(&self, category: Option<&str>) -> Vec<Recipe> {
        self.try_recipes_by_category(category)
            .await
            .unwrap_or_else(|e| {
                log::error!("Failed to fetch recipes for category {:?}: {}", category, e);
                Vec::new()
            })
    }

    pub async fn recipe_details(&self, id: &str) -> Option<Recipe> {
        self.try_recipe_details(id).await.unwrap_or_else(|e| {
            log::error!("Failed to fetch details for recipe {}: {}", id, e);
            None
        })
    }

    pub async fn categories(&self) -> Vec<Category> {
        self.try_categories().await.unwrap_or_else(|e| {
            log::error!("Failed to fetch categories: {}", e);
            Vec::new()
        })
    }

    pub async fn search_recipes(&self, query: &str) -> Vec<Recipe> {
        self.try_search_recipes(query).await.unwrap_or_else(|e| {
            log::error!("Failed to search recipes for {:?}: {}", query, e);
            Vec::new()
        })
    }
}
