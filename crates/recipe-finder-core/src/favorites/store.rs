use std::collections::HashSet;

use tracing::{debug, warn};

use crate::models::Recipe;
use crate::storage::KeyValueStore;

use super::FavoritesError;

/// Storage key holding the serialized favorites array.
pub const FAVORITES_KEY: &str = "favorites";

pub struct FavoritesStore<S> {
    storage: S,
}

impl<S: KeyValueStore> FavoritesStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// All saved recipes in insertion order.
    ///
    /// Never fails: absent, unreadable or corrupt data reads as empty.
    pub fn get_all(&self) -> Vec<Recipe> {
        let raw = match self.storage.get_item(FAVORITES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "Favorites storage unreadable, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Recipe>>(&raw) {
            Ok(recipes) => recipes,
            Err(e) => {
                warn!(
                    error = %e,
                    bytes = raw.len(),
                    "Stored favorites are malformed, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Overwrite the whole collection in one write.
    ///
    /// Later entries repeating an earlier id are dropped so the stored
    /// collection never holds duplicates. Non-finite calories are rejected
    /// since JSON would store them as `null` and the collection would no
    /// longer read back.
    pub fn save(&self, recipes: &[Recipe]) -> Result<(), FavoritesError> {
        if let Some(bad) = recipes.iter().find(|r| !r.calories.is_finite()) {
            return Err(FavoritesError::InvalidCalories { id: bad.id.clone() });
        }

        let mut seen = HashSet::new();
        let unique: Vec<&Recipe> = recipes
            .iter()
            .filter(|r| seen.insert(r.id.as_str()))
            .collect();

        if unique.len() != recipes.len() {
            warn!(
                dropped = recipes.len() - unique.len(),
                "Dropping duplicate favorites before saving"
            );
        }

        let json = serde_json::to_string(&unique)?;
        self.storage.set_item(FAVORITES_KEY, &json)?;
        debug!(count = unique.len(), "Saved favorites");
        Ok(())
    }

    /// Remove the recipe with `id`. Removing an absent id leaves storage untouched.
    pub fn remove(&self, id: &str) -> Result<(), FavoritesError> {
        let mut recipes = self.get_all();
        let before = recipes.len();
        recipes.retain(|r| !same_recipe(r, id));

        if recipes.len() == before {
            debug!(id, "Favorite not present, nothing to remove");
            return Ok(());
        }
        self.save(&recipes)
    }

    /// Flip the saved state of `recipe` and return the new state
    /// (`true` = now saved).
    pub fn toggle(&self, recipe: &Recipe) -> Result<bool, FavoritesError> {
        let mut recipes = self.get_all();

        let saved = match recipes.iter().position(|r| same_recipe(r, &recipe.id)) {
            Some(pos) => {
                recipes.remove(pos);
                false
            }
            None => {
                recipes.push(recipe.clone());
                true
            }
        };

        self.save(&recipes)?;
        debug!(id = %recipe.id, saved, "Toggled favorite");
        Ok(saved)
    }

    pub fn is_saved(&self, id: &str) -> bool {
        self.get_all().iter().any(|r| same_recipe(r, id))
    }

    /// Ids of every saved recipe, for marking search results.
    pub fn saved_ids(&self) -> HashSet<String> {
        self.get_all().into_iter().map(|r| r.id).collect()
    }

    /// Forget every favorite.
    pub fn clear(&self) -> Result<(), FavoritesError> {
        self.storage.remove_item(FAVORITES_KEY)?;
        Ok(())
    }
}

/// Identity comparison shared by every mutation.
fn same_recipe(recipe: &Recipe, id: &str) -> bool {
    recipe.id == id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageError};

    fn recipe(id: &str) -> Recipe {
        Recipe {
            id: id.to_string(),
            label: format!("Recipe {}", id),
            image: format!("https://img.example/{}.jpg", id),
            url: format!("https://example.com/{}", id),
            ingredient_lines: vec!["salt".to_string(), "pepper".to_string()],
            calories: 320.0,
            cook_time: "25 min".to_string(),
        }
    }

    fn soup() -> Recipe {
        Recipe {
            id: "r1".to_string(),
            label: "Soup".to_string(),
            image: "i.jpg".to_string(),
            url: "u".to_string(),
            ingredient_lines: vec!["salt".to_string()],
            calories: 200.0,
            cook_time: "10 min".to_string(),
        }
    }

    #[test]
    fn test_empty_store_reads_empty() {
        let store = FavoritesStore::new(MemoryStore::new());
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn test_save_then_list() {
        let store = FavoritesStore::new(MemoryStore::new());

        assert!(store.toggle(&soup()).unwrap());
        let all = store.get_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0], soup());
    }

    #[test]
    fn test_toggle_off() {
        let store = FavoritesStore::new(MemoryStore::new());
        assert!(store.toggle(&soup()).unwrap());

        assert!(!store.toggle(&soup()).unwrap());
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn test_toggle_twice_restores_membership() {
        let store = FavoritesStore::new(MemoryStore::new());
        store.save(&[recipe("a"), recipe("b")]).unwrap();

        // Starting saved: false then true
        assert!(!store.toggle(&recipe("a")).unwrap());
        assert!(store.toggle(&recipe("a")).unwrap());
        assert!(store.is_saved("a"));

        // Starting unsaved: true then false
        assert!(store.toggle(&recipe("c")).unwrap());
        assert!(!store.toggle(&recipe("c")).unwrap());
        assert!(!store.is_saved("c"));
    }

    #[test]
    fn test_toggle_appends_in_insertion_order() {
        let store = FavoritesStore::new(MemoryStore::new());
        for id in ["c", "a", "b"] {
            store.toggle(&recipe(id)).unwrap();
        }
        let ids: Vec<String> = store.get_all().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_toggle_matches_by_id_only() {
        let store = FavoritesStore::new(MemoryStore::new());
        store.toggle(&recipe("a")).unwrap();

        // Same id, different display fields: still the same favorite
        let mut renamed = recipe("a");
        renamed.label = "Renamed".to_string();
        assert!(!store.toggle(&renamed).unwrap());
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn test_ids_stay_unique_across_toggle_sequences() {
        let store = FavoritesStore::new(MemoryStore::new());
        let ids = ["a", "b", "c", "d"];

        // Deterministic pseudo-random walk over the ids
        let mut state: u32 = 7;
        for _ in 0..200 {
            state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            let id = ids[(state >> 16) as usize % ids.len()];
            store.toggle(&recipe(id)).unwrap();

            let all = store.get_all();
            let unique: HashSet<&str> = all.iter().map(|r| r.id.as_str()).collect();
            assert_eq!(unique.len(), all.len());
        }
    }

    #[test]
    fn test_remove_nonexistent_on_empty() {
        let store = FavoritesStore::new(MemoryStore::new());
        store.remove("ghost").unwrap();
        assert!(store.get_all().is_empty());
        // Nothing was written
        assert_eq!(store.storage().get_item(FAVORITES_KEY).unwrap(), None);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = FavoritesStore::new(MemoryStore::new());
        store.save(&[recipe("a"), recipe("b")]).unwrap();

        store.remove("a").unwrap();
        let after_first = store.get_all();
        store.remove("a").unwrap();
        assert_eq!(store.get_all(), after_first);
        assert_eq!(after_first, vec![recipe("b")]);
    }

    #[test]
    fn test_round_trip() {
        let store = FavoritesStore::new(MemoryStore::new());
        let mut special = recipe("x");
        special.label = "Crème brûlée \"deluxe\"".to_string();
        special.ingredient_lines = vec![];
        special.cook_time = "N/A".to_string();
        let collection = vec![recipe("a"), special, recipe("b")];

        store.save(&collection).unwrap();
        assert_eq!(store.get_all(), collection);
    }

    #[test]
    fn test_save_drops_duplicate_ids() {
        let store = FavoritesStore::new(MemoryStore::new());
        let mut dup = recipe("a");
        dup.label = "Second".to_string();

        store.save(&[recipe("a"), dup, recipe("b")]).unwrap();
        let all = store.get_all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].label, "Recipe a");
    }

    #[test]
    fn test_non_finite_calories_rejected_and_collection_kept() {
        let store = FavoritesStore::new(MemoryStore::new());
        store.toggle(&recipe("a")).unwrap();
        store.toggle(&recipe("b")).unwrap();

        let mut broken = recipe("c");
        broken.calories = f64::INFINITY;
        let err = store.toggle(&broken).unwrap_err();
        assert!(matches!(err, FavoritesError::InvalidCalories { ref id } if id == "c"));

        broken.calories = f64::NAN;
        assert!(store.save(&[recipe("a"), broken]).is_err());

        assert_eq!(store.get_all(), vec![recipe("a"), recipe("b")]);
    }

    #[test]
    fn test_corrupt_data_reads_empty() {
        let storage = MemoryStore::new().with_item(FAVORITES_KEY, "{not json");
        let store = FavoritesStore::new(storage);
        assert!(store.get_all().is_empty());

        // The next toggle starts from an empty collection and repairs storage
        assert!(store.toggle(&soup()).unwrap());
        assert_eq!(store.get_all(), vec![soup()]);
    }

    #[test]
    fn test_wrong_shape_reads_empty() {
        let storage = MemoryStore::new().with_item(FAVORITES_KEY, r#"{"id": "r1"}"#);
        let store = FavoritesStore::new(storage);
        assert!(store.get_all().is_empty());
    }

    #[test]
    fn test_reads_persisted_layout() {
        let raw = r#"[{"id":"r1","label":"Soup","image":"i.jpg","url":"u",
            "ingredientLines":["salt"],"calories":200,"cookTime":"10 min"}]"#;
        let store = FavoritesStore::new(MemoryStore::new().with_item(FAVORITES_KEY, raw));
        assert_eq!(store.get_all(), vec![soup()]);
    }

    #[test]
    fn test_unavailable_storage_reads_empty_and_write_fails() {
        let store = FavoritesStore::new(MemoryStore::unavailable());
        assert!(store.get_all().is_empty());

        let err = store.toggle(&soup()).unwrap_err();
        assert!(matches!(
            err,
            FavoritesError::Storage(StorageError::Unavailable(_))
        ));
    }

    #[test]
    fn test_quota_exceeded_propagates_and_keeps_previous() {
        let store = FavoritesStore::new(MemoryStore::with_quota(400));
        assert!(store.toggle(&recipe("a")).unwrap());

        let mut big = recipe("big");
        big.ingredient_lines = vec!["x".repeat(500)];
        let err = store.toggle(&big).unwrap_err();
        assert!(matches!(
            err,
            FavoritesError::Storage(StorageError::QuotaExceeded { .. })
        ));
        assert_eq!(store.get_all(), vec![recipe("a")]);
    }

    #[test]
    fn test_saved_ids_and_clear() {
        let store = FavoritesStore::new(MemoryStore::new());
        store.save(&[recipe("a"), recipe("b")]).unwrap();

        let ids = store.saved_ids();
        assert!(ids.contains("a") && ids.contains("b"));

        store.clear().unwrap();
        assert!(store.get_all().is_empty());
        assert!(store.saved_ids().is_empty());
    }

    #[test]
    fn test_shared_storage_between_stores() {
        let storage = std::sync::Arc::new(MemoryStore::new());
        let search_page = FavoritesStore::new(std::sync::Arc::clone(&storage));
        let favorites_page = FavoritesStore::new(std::sync::Arc::clone(&storage));

        search_page.toggle(&soup()).unwrap();
        assert_eq!(favorites_page.get_all(), vec![soup()]);

        favorites_page.remove("r1").unwrap();
        assert!(!search_page.is_saved("r1"));
    }
}
