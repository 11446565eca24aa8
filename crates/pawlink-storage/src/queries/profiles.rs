// SPDX-FileCopyrightText: 2026 Pawlink Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Profile CRUD operations.

use pawlink_core::types::{Profile, UserId};
use pawlink_core::PawlinkError;
use rusqlite::params;

use crate::database::{map_tr_err, Database};

/// Insert or replace a profile row.
pub async fn upsert_profile(db: &Database, profile: &Profile) -> Result<(), PawlinkError> {
    let profile = profile.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO profiles (id, first_name, last_name, photo_url)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    profile.id.0,
                    profile.first_name,
                    profile.last_name,
                    profile.photo_url,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Look up a profile by id.
pub async fn get_profile(db: &Database, id: &UserId) -> Result<Option<Profile>, PawlinkError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, first_name, last_name, photo_url FROM profiles WHERE id = ?1",
            )?;
            let mut rows = stmt.query_map(params![id.0], |row| {
                Ok(Profile {
                    id: UserId(row.get(0)?),
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    photo_url: row.get(3)?,
                })
            })?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::Database;
    use tempfile::tempdir;

    #[tokio::test]
    async fn upsert_and_get_round_trip() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("profiles.db");
        let db = Database::open(db_path.to_str().unwrap(), true).await.unwrap();

        let profile = Profile {
            id: UserId("alice".into()),
            first_name: Some("Alice".into()),
            last_name: None,
            photo_url: Some("/alice.png".into()),
        };
        upsert_profile(&db, &profile).await.unwrap();

        let fetched = get_profile(&db, &UserId("alice".into())).await.unwrap();
        assert_eq!(fetched, Some(profile.clone()));

        // Upsert replaces in place.
        let renamed = Profile {
            first_name: Some("Alicia".into()),
            ..profile
        };
        upsert_profile(&db, &renamed).await.unwrap();
        let fetched = get_profile(&db, &UserId("alice".into())).await.unwrap();
        assert_eq!(fetched.unwrap().first_name.as_deref(), Some("Alicia"));

        assert!(get_profile(&db, &UserId("ghost".into()))
            .await
            .unwrap()
            .is_none());

        db.close().await.unwrap();
    }
}
