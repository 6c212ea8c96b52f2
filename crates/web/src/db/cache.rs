//! Read-through cache for ingredient reference data.
//!
//! Ingredients change only when the seed command runs, so reads are cached
//! using `moka` (5-minute TTL). A save through this repository clears the cache.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use taco_cloud_core::{Ingredient, IngredientId};

use super::{IngredientRepository, RepositoryError};

/// Cache key for ingredient lookups.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    All,
    One(IngredientId),
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    All(Vec<Ingredient>),
    One(Ingredient),
}

/// Caching wrapper around another ingredient repository.
pub struct CachedIngredientRepository<R> {
    inner: R,
    cache: Cache<CacheKey, CacheValue>,
}

impl<R: IngredientRepository> CachedIngredientRepository<R> {
    /// Wrap `inner` with a 5-minute cache.
    #[must_use]
    pub fn new(inner: R) -> Self {
        Self::with_ttl(inner, Duration::from_secs(300))
    }

    /// Wrap `inner` with a cache of the given time to live.
    #[must_use]
    pub fn with_ttl(inner: R, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(ttl)
            .build();

        Self { inner, cache }
    }
}

#[async_trait]
impl<R: IngredientRepository> IngredientRepository for CachedIngredientRepository<R> {
    async fn find_all(&self) -> Result<Vec<Ingredient>, RepositoryError> {
        if let Some(CacheValue::All(ingredients)) = self.cache.get(&CacheKey::All).await {
            debug!("Cache hit for ingredients");
            return Ok(ingredients);
        }

        let ingredients = self.inner.find_all().await?;
        self.cache
            .insert(CacheKey::All, CacheValue::All(ingredients.clone()))
            .await;
        Ok(ingredients)
    }

    async fn find_by_id(&self, id: &IngredientId) -> Result<Option<Ingredient>, RepositoryError> {
        let key = CacheKey::One(id.clone());
        if let Some(CacheValue::One(ingredient)) = self.cache.get(&key).await {
            debug!(ingredient_id = %id, "Cache hit for ingredient");
            return Ok(Some(ingredient));
        }

        let ingredient = self.inner.find_by_id(id).await?;
        // Misses are not cached so a freshly seeded ingredient shows up at once
        if let Some(ref found) = ingredient {
            self.cache.insert(key, CacheValue::One(found.clone())).await;
        }
        Ok(ingredient)
    }

    async fn save(&self, ingredient: &Ingredient) -> Result<(), RepositoryError> {
        self.inner.save(ingredient).await?;
        self.cache.invalidate_all();
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use taco_cloud_core::IngredientType;

    use super::*;
    use crate::db::memory::{InMemoryIngredientRepository, default_ingredients};

    /// Counts calls that reach the wrapped repository.
    struct Counting {
        inner: InMemoryIngredientRepository,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl IngredientRepository for Counting {
        async fn find_all(&self) -> Result<Vec<Ingredient>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_all().await
        }

        async fn find_by_id(
            &self,
            id: &IngredientId,
        ) -> Result<Option<Ingredient>, RepositoryError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_by_id(id).await
        }

        async fn save(&self, ingredient: &Ingredient) -> Result<(), RepositoryError> {
            self.inner.save(ingredient).await
        }
    }

    fn cached() -> (CachedIngredientRepository<Counting>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let repo = CachedIngredientRepository::new(Counting {
            inner: InMemoryIngredientRepository::new(default_ingredients()),
            calls: Arc::clone(&calls),
        });
        (repo, calls)
    }

    #[tokio::test]
    async fn test_find_all_is_cached() {
        let (repo, calls) = cached();

        let first = repo.find_all().await.unwrap();
        let second = repo.find_all().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let (repo, calls) = cached();
        let id = IngredientId::parse("NOPE").unwrap();

        assert!(repo.find_by_id(&id).await.unwrap().is_none());
        assert!(repo.find_by_id(&id).await.unwrap().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_save_invalidates() {
        let (repo, _) = cached();
        let before = repo.find_all().await.unwrap().len();

        let queso = Ingredient::new(
            IngredientId::parse("QSO").unwrap(),
            "Queso Fresco",
            IngredientType::Cheese,
        );
        repo.save(&queso).await.unwrap();

        assert_eq!(repo.find_all().await.unwrap().len(), before + 1);
    }
}
