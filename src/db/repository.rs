//! Database repository for all case data operations.
//!
//! Uses prepared statements; single-row updates are the unit of atomicity.

use chrono::Utc;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{
    description_crc32, AccessLevel, Activity, ActivityEntry, Case, CaseStatus, CaseUser, User,
};

/// Database repository for all data operations.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    // ==================== CASE OPERATIONS ====================

    /// Check whether a case exists.
    pub async fn case_exists(&self, case_id: i64) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM cases WHERE id = ?")
            .bind(case_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// Get a case by ID.
    pub async fn get_case(&self, case_id: i64) -> Result<Option<Case>, AppError> {
        let row = sqlx::query(
            "SELECT id, name, description, status_id, owner_id, created_at, updated_at
             FROM cases WHERE id = ?",
        )
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(case_from_row))
    }

    /// Create a new case owned by `owner_id`, granting the owner full access.
    pub async fn create_case(&self, name: &str, owner_id: i64) -> Result<Case, AppError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO cases (name, description, status_id, owner_id, created_at, updated_at)
             VALUES (?, '', ?, ?, ?, ?)",
        )
        .bind(name)
        .bind(CaseStatus::Unknown.as_id())
        .bind(owner_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let case_id = result.last_insert_rowid();
        self.grant_access(case_id, owner_id, AccessLevel::FullAccess)
            .await?;

        Ok(Case {
            id: case_id,
            name: name.to_string(),
            description: String::new(),
            status_id: CaseStatus::Unknown.as_id(),
            owner_id,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Get the current description and its CRC32 checksum.
    pub async fn get_desc_crc(&self, case_id: i64) -> Result<Option<(String, u32)>, AppError> {
        let row = sqlx::query("SELECT description FROM cases WHERE id = ?")
            .bind(case_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| {
            let description: String = r.get("description");
            let crc = description_crc32(&description);
            (description, crc)
        }))
    }

    /// Replace the case description, returning the new checksum.
    pub async fn set_description(
        &self,
        case_id: i64,
        description: &str,
    ) -> Result<u32, AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query("UPDATE cases SET description = ?, updated_at = ? WHERE id = ?")
            .bind(description)
            .bind(&now)
            .bind(case_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Validation("Invalid case ID".to_string()));
        }

        Ok(description_crc32(description))
    }

    /// Set the case status.
    pub async fn set_status(&self, case_id: i64, status: CaseStatus) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query("UPDATE cases SET status_id = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_id())
            .bind(&now)
            .bind(case_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Validation("Invalid case ID".to_string()));
        }

        Ok(())
    }

    // ==================== ACTIVITY OPERATIONS ====================

    /// Append an activity record for a case.
    pub async fn track_activity(
        &self,
        case_id: i64,
        user_id: i64,
        description: &str,
        user_input: bool,
        is_from_api: bool,
    ) -> Result<Activity, AppError> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "INSERT INTO activities (case_id, user_id, activity_date, activity_desc, user_input, is_from_api)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(case_id)
        .bind(user_id)
        .bind(&now)
        .bind(description)
        .bind(user_input as i32)
        .bind(is_from_api as i32)
        .execute(&self.pool)
        .await?;

        Ok(Activity {
            id: result.last_insert_rowid(),
            case_id,
            user_id,
            activity_date: now,
            activity_desc: description.to_string(),
            user_input,
            is_from_api,
        })
    }

    /// List the 40 most recent activity records for a case, newest first.
    pub async fn list_activities(&self, case_id: i64) -> Result<Vec<ActivityEntry>, AppError> {
        let rows = sqlx::query(
            "SELECT a.activity_date, u.name, a.activity_desc, a.is_from_api
             FROM activities a
             JOIN users u ON u.id = a.user_id
             WHERE a.case_id = ?
             ORDER BY a.activity_date DESC, a.id DESC
             LIMIT 40",
        )
        .bind(case_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let is_from_api: i32 = row.get("is_from_api");
                ActivityEntry {
                    activity_date: row.get("activity_date"),
                    name: row.get("name"),
                    activity_desc: row.get("activity_desc"),
                    is_from_api: is_from_api != 0,
                }
            })
            .collect())
    }

    // ==================== USER / ACCESS OPERATIONS ====================

    /// Create a user. `api_key` enables machine access for that user.
    pub async fn create_user(
        &self,
        login: &str,
        name: &str,
        api_key: Option<&str>,
    ) -> Result<User, AppError> {
        let result = sqlx::query("INSERT INTO users (login, name, api_key) VALUES (?, ?, ?)")
            .bind(login)
            .bind(name)
            .bind(api_key)
            .execute(&self.pool)
            .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            login: login.to_string(),
            name: name.to_string(),
            api_key: api_key.map(|k| k.to_string()),
        })
    }

    /// Whether any user exists yet (drives bootstrap admin seeding).
    pub async fn has_users(&self) -> Result<bool, AppError> {
        let row = sqlx::query("SELECT 1 FROM users LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    /// All users holding an API key, for constant-time key matching.
    pub async fn users_with_api_keys(&self) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query(
            "SELECT id, login, name, api_key FROM users WHERE api_key IS NOT NULL",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    /// Resolve a browser session token to its user.
    pub async fn user_by_session(&self, token: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query(
            "SELECT u.id, u.login, u.name, u.api_key
             FROM sessions s JOIN users u ON u.id = s.user_id
             WHERE s.token = ?",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    /// Open a browser session for a user, returning the session token.
    pub async fn create_session(&self, user_id: i64) -> Result<String, AppError> {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&token)
            .bind(user_id)
            .bind(&now)
            .execute(&self.pool)
            .await?;

        Ok(token)
    }

    /// Grant (or replace) a user's access level on a case.
    pub async fn grant_access(
        &self,
        case_id: i64,
        user_id: i64,
        level: AccessLevel,
    ) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO case_access (case_id, user_id, access_level) VALUES (?, ?, ?)
             ON CONFLICT (case_id, user_id) DO UPDATE SET access_level = excluded.access_level",
        )
        .bind(case_id)
        .bind(user_id)
        .bind(level.as_value())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// A user's access level on a case, if any grant exists.
    pub async fn access_level(
        &self,
        case_id: i64,
        user_id: i64,
    ) -> Result<Option<AccessLevel>, AppError> {
        let row = sqlx::query(
            "SELECT access_level FROM case_access WHERE case_id = ? AND user_id = ?",
        )
        .bind(case_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(|r| AccessLevel::from_value(r.get("access_level"))))
    }

    /// List the users with access to a case (excluding deny-all grants).
    pub async fn list_case_users(&self, case_id: i64) -> Result<Vec<CaseUser>, AppError> {
        let rows = sqlx::query(
            "SELECT u.id, u.login, u.name, ca.access_level
             FROM case_access ca JOIN users u ON u.id = ca.user_id
             WHERE ca.case_id = ? AND ca.access_level != ?
             ORDER BY u.name",
        )
        .bind(case_id)
        .bind(AccessLevel::DenyAll.as_value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| CaseUser {
                user_id: row.get("id"),
                user_login: row.get("login"),
                user_name: row.get("name"),
                access_level: row.get("access_level"),
            })
            .collect())
    }

    // ==================== EXPORT ====================

    /// Assemble the full export document for a case: the case record, its
    /// activity log, and the users holding access.
    pub async fn export_case_json(
        &self,
        case_id: i64,
    ) -> Result<Option<serde_json::Value>, AppError> {
        let Some(case) = self.get_case(case_id).await? else {
            return Ok(None);
        };

        let activities = self.list_activities(case_id).await?;
        let users = self.list_case_users(case_id).await?;
        let crc = description_crc32(&case.description);

        Ok(Some(serde_json::json!({
            "case": case,
            "crc32": crc,
            "activities": activities,
            "users": users,
        })))
    }
}

// Helper functions for row conversion

fn case_from_row(row: &sqlx::sqlite::SqliteRow) -> Case {
    Case {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        status_id: row.get("status_id"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

fn user_from_row(row: &sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        login: row.get("login"),
        name: row.get("name"),
        api_key: row.get("api_key"),
    }
}
