//! Local profile registry.
//!
//! Stands in for the identity provider: resolves an email to a stable
//! `AuthenticatedUser` from a JSON registry on disk. Loads take a shared
//! lock; saves go through a temp file and an atomic rename so a crashed
//! writer can never leave a torn registry behind.

use crate::types::AuthenticatedUser;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use uuid::Uuid;

/// One locally known user
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Profile> for AuthenticatedUser {
    fn from(profile: &Profile) -> Self {
        AuthenticatedUser {
            id: profile.id,
            email: profile.email.clone(),
            name: profile.name.clone(),
        }
    }
}

/// Registry of profiles keyed by email
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct ProfileRegistry {
    pub profiles: HashMap<String, Profile>,
}

impl ProfileRegistry {
    /// Load the registry with shared locking
    ///
    /// Returns an empty registry if the file doesn't exist. If the file is
    /// corrupted, logs a warning and returns an empty registry.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No profile registry at {:?}, starting empty", path);
            return Ok(Self::default());
        }

        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                tracing::warn!(
                    "Unable to open profile registry {:?}: {}. Starting empty.",
                    path,
                    e
                );
                return Ok(Self::default());
            }
        };

        if let Err(e) = file.lock_shared() {
            tracing::warn!(
                "Unable to lock profile registry {:?}: {}. Starting empty.",
                path,
                e
            );
            return Ok(Self::default());
        }

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        if let Err(e) = reader.read_to_string(&mut contents) {
            let _ = file.unlock();
            tracing::warn!(
                "Failed to read profile registry {:?}: {}. Starting empty.",
                path,
                e
            );
            return Ok(Self::default());
        }

        file.unlock()?;

        match serde_json::from_str::<ProfileRegistry>(&contents) {
            Ok(registry) => {
                tracing::debug!("Loaded {} profiles from {:?}", registry.profiles.len(), path);
                Ok(registry)
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse profile registry {:?}: {}. Starting empty.",
                    path,
                    e
                );
                Ok(Self::default())
            }
        }
    }

    /// Save the registry with exclusive locking
    ///
    /// Atomically writes by:
    /// 1. Writing to a temp file in the same directory
    /// 2. Syncing to disk
    /// 3. Renaming over the original
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let temp = NamedTempFile::new_in(path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "registry path missing parent")
        })?)?;

        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(self)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(path).map_err(|e| Error::Io(e.error))?;

        tracing::debug!("Saved {} profiles to {:?}", self.profiles.len(), path);
        Ok(())
    }

    /// Resolve an email to its authenticated user, creating a profile on
    /// first use
    ///
    /// The same email always resolves to the same id across invocations.
    pub fn resolve(path: &Path, email: &str) -> Result<AuthenticatedUser> {
        let mut registry = Self::load(path)?;

        if let Some(profile) = registry.profiles.get(email) {
            return Ok(AuthenticatedUser::from(profile));
        }

        let profile = Profile {
            id: Uuid::new_v4(),
            email: email.to_string(),
            name: None,
            created_at: Utc::now(),
        };
        let user = AuthenticatedUser::from(&profile);
        registry.profiles.insert(email.to_string(), profile);
        registry.save(path)?;

        tracing::info!("Created profile for {}", email);
        Ok(user)
    }
}
