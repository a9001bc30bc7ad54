//! Track catalog backed by a flat JSON file
//!
//! Every call re-reads the store from disk. Lookups scan the whole array;
//! an index would sit behind `Catalog` if catalogs grow large.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::error::ApiError;

/// A single catalog entry. Fields other than `id`, `artist` and `track`
/// are passed through untouched.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Track {
    pub id: String,
    pub artist: String,
    pub track: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Track {
    /// Case-insensitive substring match on artist or track name.
    /// `needle` must already be lowercased.
    fn matches(&self, needle: &str) -> bool {
        self.artist.to_lowercase().contains(needle) || self.track.to_lowercase().contains(needle)
    }
}

/// Read-only accessor for the backing store
#[derive(Debug, Clone)]
pub struct Catalog {
    path: PathBuf,
}

impl Catalog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// All tracks in random order, narrowed by the `search` parameter when present
    pub async fn list(&self, params: &HashMap<String, String>) -> Result<Vec<Track>, ApiError> {
        let mut tracks = self.load().await?;

        if let Some(search) = params.get("search").filter(|s| !s.is_empty()) {
            let needle = search.trim().to_lowercase();
            tracks.retain(|t| t.matches(&needle));
        }

        tracks.shuffle(&mut rand::rng());
        Ok(tracks)
    }

    /// The track whose `id` equals `id`
    pub async fn get(&self, id: &str) -> Result<Track, ApiError> {
        self.load()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or_else(ApiError::item_not_found)
    }

    async fn load(&self) -> Result<Vec<Track>, ApiError> {
        let raw = fs::read(&self.path).await.map_err(|source| ApiError::StoreRead {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_slice(&raw).map_err(|source| ApiError::StoreParse {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use serde_json::json;

    pub fn sample_store() -> serde_json::Value {
        json!([
            { "id": "1", "artist": "Daft Punk", "track": "Harder, Better", "img": "img/1.jpg" },
            { "id": "2", "artist": "Portishead", "track": "Roads", "mp3": "mp3/2.mp3" },
            { "id": "3", "artist": "Massive Attack", "track": "Teardrop" },
            { "id": "4", "artist": "PUNK Collective", "track": "Noise" }
        ])
    }

    pub fn write_store(dir: &Path, value: &serde_json::Value) -> PathBuf {
        let path = dir.join("db.json");
        std::fs::write(&path, serde_json::to_vec(value).unwrap()).unwrap();
        path
    }

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn sorted_ids(tracks: &[Track]) -> Vec<String> {
        let mut ids: Vec<String> = tracks.iter().map(|t| t.id.clone()).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_list_returns_every_track() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(write_store(dir.path(), &sample_store()));

        let first = catalog.list(&HashMap::new()).await.unwrap();
        let second = catalog.list(&HashMap::new()).await.unwrap();
        assert_eq!(sorted_ids(&first), vec!["1", "2", "3", "4"]);
        assert_eq!(sorted_ids(&first), sorted_ids(&second));
    }

    #[tokio::test]
    async fn test_list_order_is_shuffled() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(write_store(dir.path(), &sample_store()));

        // 4 tracks: 50 identical orders in a row has probability 24^-49
        let mut orders = std::collections::HashSet::new();
        for _ in 0..50 {
            let tracks = catalog.list(&HashMap::new()).await.unwrap();
            assert_eq!(sorted_ids(&tracks), vec!["1", "2", "3", "4"]);
            orders.insert(tracks.iter().map(|t| t.id.clone()).collect::<Vec<_>>());
        }
        assert!(orders.len() > 1, "list order never changed across 50 calls");
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(write_store(dir.path(), &sample_store()));

        let found = catalog.list(&params(&[("search", "  punk ")])).await.unwrap();
        assert_eq!(sorted_ids(&found), vec!["1", "4"]);

        let by_track = catalog.list(&params(&[("search", "ROADS")])).await.unwrap();
        assert_eq!(sorted_ids(&by_track), vec!["2"]);

        let none = catalog.list(&params(&[("search", "zzz")])).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_empty_search_lists_all() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(write_store(dir.path(), &sample_store()));

        let all = catalog.list(&params(&[("search", "")])).await.unwrap();
        assert_eq!(all.len(), 4);
    }

    #[tokio::test]
    async fn test_get_keeps_extra_fields() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(write_store(dir.path(), &sample_store()));

        let track = catalog.get("1").await.unwrap();
        assert_eq!(track.artist, "Daft Punk");
        assert_eq!(
            serde_json::to_value(&track).unwrap(),
            json!({ "id": "1", "artist": "Daft Punk", "track": "Harder, Better", "img": "img/1.jpg" })
        );
    }

    #[tokio::test]
    async fn test_get_missing_id() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = Catalog::new(write_store(dir.path(), &sample_store()));

        let err = catalog.get("42").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound { ref message } if message == "Item Not Found"));
    }

    #[tokio::test]
    async fn test_store_is_reread_per_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_store(dir.path(), &sample_store());
        let catalog = Catalog::new(&path);
        assert!(catalog.get("5").await.is_err());

        write_store(
            dir.path(),
            &json!([{ "id": "5", "artist": "Boards of Canada", "track": "Roygbiv" }]),
        );
        assert_eq!(catalog.get("5").await.unwrap().track, "Roygbiv");
    }

    #[tokio::test]
    async fn test_broken_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = Catalog::new(&path).list(&HashMap::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::StoreParse { .. }));

        let missing = Catalog::new(dir.path().join("nope.json"));
        assert!(matches!(
            missing.get("1").await.unwrap_err(),
            ApiError::StoreRead { .. }
        ));
    }
}
