//! SQLite-backed credential and medical-record storage.
//!
//! The auth core consumes this as a collaborator: it maps emails to
//! salted password hashes and profile fields, and keeps per-user
//! medical records. The pool is the one shared resource in the
//! server; connectivity failures surface as [`Error::StoreUnavailable`]
//! through the `From<sqlx::Error>` conversion, never as an
//! authentication outcome.
//!
//! [`Error::StoreUnavailable`]: crate::error::Error::StoreUnavailable

use std::path::Path;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;
use uuid::Uuid;

use crate::error::Error;

/// Credential record. The hash never leaves the server.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub systolic: Option<i64>,
    pub diastolic: Option<i64>,
    pub heart_rate: Option<i64>,
    pub analysis: Option<String>,
    pub created_at: String,
}

pub struct Store {
    pool: SqlitePool,
}

impl Store {
    pub async fn open(path: &Path) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!(
            "sqlite://{}",
            path.to_string_lossy().replace('\\', "/")
        ))?
        .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                name TEXT,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS medical_records (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                kind TEXT NOT NULL,
                systolic INTEGER,
                diastolic INTEGER,
                heart_rate INTEGER,
                analysis TEXT,
                created_at TEXT NOT NULL,
                FOREIGN KEY (user_id) REFERENCES users(id)
            )
            "#,
        )
        .execute(&pool)
        .await?;

        info!("[Store] Initialized at {:?}", path);

        Ok(Self { pool })
    }

    /// Close the underlying pool. Every later query fails as
    /// [`Error::StoreUnavailable`] instead of hanging on a dead
    /// connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    pub async fn find_user_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserRecord>, Error> {
        let row: Option<(String, String, Option<String>, String, String)> = sqlx::query_as(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(id, email, name, password_hash, created_at)| UserRecord {
            id,
            email,
            name,
            password_hash,
            created_at,
        }))
    }

    pub async fn create_user(
        &self,
        email: &str,
        name: Option<&str>,
        password_hash: &str,
    ) -> Result<UserRecord, Error> {
        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            name: name.map(str::to_string),
            password_hash: password_hash.to_string(),
            created_at: Utc::now().to_rfc3339(),
        };

        sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            // Backstop for a registration race; the handler's lookup
            // already caught the common case.
            sqlx::Error::Database(db) if db.is_unique_violation() => Error::DuplicateAccount,
            _ => Error::from(err),
        })?;

        Ok(user)
    }

    pub async fn insert_record(
        &self,
        user_id: &str,
        kind: &str,
        systolic: Option<i64>,
        diastolic: Option<i64>,
        heart_rate: Option<i64>,
        analysis: Option<&str>,
    ) -> Result<MedicalRecord, Error> {
        let record = MedicalRecord {
            id: Uuid::new_v4().to_string(),
            kind: kind.to_string(),
            systolic,
            diastolic,
            heart_rate,
            analysis: analysis.map(str::to_string),
            created_at: Utc::now().to_rfc3339(),
        };

        sqlx::query(
            "INSERT INTO medical_records (id, user_id, kind, systolic, diastolic, heart_rate, analysis, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(user_id)
        .bind(&record.kind)
        .bind(record.systolic)
        .bind(record.diastolic)
        .bind(record.heart_rate)
        .bind(&record.analysis)
        .bind(&record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    /// Records for one user, newest first.
    pub async fn records_for_user(&self, user_id: &str) -> Result<Vec<MedicalRecord>, Error> {
        let rows: Vec<(
            String,
            String,
            Option<i64>,
            Option<i64>,
            Option<i64>,
            Option<String>,
            String,
        )> = sqlx::query_as(
            "SELECT id, kind, systolic, diastolic, heart_rate, analysis, created_at FROM medical_records WHERE user_id = ? ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(
                |(id, kind, systolic, diastolic, heart_rate, analysis, created_at)| {
                    MedicalRecord {
                        id,
                        kind,
                        systolic,
                        diastolic,
                        heart_rate,
                        analysis,
                        created_at,
                    }
                },
            )
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn store() -> (tempfile::TempDir, Store) {
        let dir = tempdir().unwrap();
        let store = Store::open(&dir.path().join("test.sqlite")).await.unwrap();
        (dir, store)
    }

    #[tokio::test]
    async fn create_and_find_user() {
        let (_dir, store) = store().await;
        let created = store
            .create_user("a@b.com", Some("Ada"), "hash")
            .await
            .unwrap();

        let found = store.find_user_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.name.as_deref(), Some("Ada"));
        assert_eq!(found.password_hash, "hash");

        assert!(store.find_user_by_email("x@y.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let (_dir, store) = store().await;
        store.create_user("a@b.com", None, "hash").await.unwrap();
        let err = store.create_user("a@b.com", None, "hash2").await.unwrap_err();
        assert!(matches!(err, Error::DuplicateAccount));
    }

    #[tokio::test]
    async fn records_are_scoped_and_newest_first() {
        let (_dir, store) = store().await;
        let u1 = store.create_user("u1@b.com", None, "hash").await.unwrap();
        let u2 = store.create_user("u2@b.com", None, "hash").await.unwrap();
        store
            .insert_record(&u1.id, "blood_pressure", Some(120), Some(80), None, None)
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store
            .insert_record(&u1.id, "heart_rate", None, None, Some(64), Some("resting"))
            .await
            .unwrap();
        store
            .insert_record(&u2.id, "heart_rate", None, None, Some(80), None)
            .await
            .unwrap();

        let records = store.records_for_user(&u1.id).await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, "heart_rate");
        assert_eq!(records[1].kind, "blood_pressure");
        assert_eq!(store.records_for_user(&u2.id).await.unwrap().len(), 1);
    }
}
