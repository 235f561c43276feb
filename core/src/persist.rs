use crate::session::{InteractionHistory, User, UserCarts};
use crate::snapshot::CatalogState;
use crate::{Catalog, DataError};
use anyhow::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UsersFile {
    #[serde(default)]
    pub users: Vec<User>,
}

pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn products(&self) -> PathBuf { self.root.join("products.json") }
    pub fn users(&self) -> PathBuf { self.root.join("users.json") }
    pub fn carts(&self) -> PathBuf { self.root.join("carts.json") }
    pub fn interactions(&self) -> PathBuf { self.root.join("interactions.json") }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let display = path.display().to_string();
    let mut f = File::open(path).map_err(|source| DataError::Io { path: display.clone(), source })?;
    let mut buf = String::new();
    f.read_to_string(&mut buf).map_err(|source| DataError::Io { path: display.clone(), source })?;
    serde_json::from_str(&buf).map_err(|source| DataError::Malformed { path: display, source })
}

/// Like `read_json`, but a missing file means "nothing recorded yet".
fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, DataError> {
    match read_json(path) {
        Err(DataError::Io { source, .. }) if source.kind() == ErrorKind::NotFound => Ok(T::default()),
        other => other,
    }
}

fn write_json<T: Serialize>(root: &Path, path: &Path, value: &T) -> Result<()> {
    create_dir_all(root)?;
    let mut f = File::create(path)?;
    let json = serde_json::to_string_pretty(value)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

/// Reads and validates `products.json`.
pub fn load_catalog(paths: &DataPaths) -> Result<Catalog, DataError> {
    let catalog: Catalog = read_json(&paths.products())?;
    catalog.validate()?;
    Ok(catalog)
}

/// Loads and vectorizes the catalog. Failures are logged and reported as `CatalogState::Failed`.
pub fn load_catalog_state(paths: &DataPaths) -> CatalogState {
    CatalogState::from_result(load_catalog(paths))
}

pub fn load_users(paths: &DataPaths) -> Result<Vec<User>, DataError> {
    let file: UsersFile = read_json_or_default(&paths.users())?;
    Ok(file.users)
}

pub fn load_carts(paths: &DataPaths) -> Result<UserCarts, DataError> {
    read_json_or_default(&paths.carts())
}

pub fn load_interactions(paths: &DataPaths) -> Result<HashMap<String, InteractionHistory>, DataError> {
    read_json_or_default(&paths.interactions())
}

pub fn save_catalog(paths: &DataPaths, catalog: &Catalog) -> Result<()> {
    write_json(&paths.root, &paths.products(), catalog)
}

pub fn save_users(paths: &DataPaths, users: &[User]) -> Result<()> {
    write_json(&paths.root, &paths.users(), &UsersFile { users: users.to_vec() })
}

pub fn save_carts(paths: &DataPaths, carts: &UserCarts) -> Result<()> {
    write_json(&paths.root, &paths.carts(), carts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn missing_optional_files_load_empty() {
        let dir = tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        assert!(load_carts(&paths).unwrap().is_empty());
        assert!(load_interactions(&paths).unwrap().is_empty());
        assert!(load_users(&paths).unwrap().is_empty());
        assert!(matches!(load_catalog(&paths), Err(DataError::Io { .. })));
    }

    #[test]
    fn malformed_catalog_is_reported() {
        let dir = tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        fs::write(paths.products(), "{ not json").unwrap();
        assert!(matches!(load_catalog(&paths), Err(DataError::Malformed { .. })));
        assert!(!load_catalog_state(&paths).is_loaded());
    }

    #[test]
    fn duplicate_ids_fail_validation() {
        let dir = tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        fs::write(
            paths.products(),
            r#"{"categories":[{"name":"a","products":[{"id":1,"name":"x","description":""},{"id":1,"name":"y","description":""}]}]}"#,
        )
        .unwrap();
        assert!(matches!(load_catalog(&paths), Err(DataError::DuplicateProduct(1))));
    }
}
