use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::profile::dto::UpdateProfileRequest;

/// User record. Demographic and training-preference fields feed the
/// personalization prompt; all of them start out null after registration.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub birthday: Option<Date>,
    pub height: Option<f64>,
    pub height_unit: Option<String>,
    pub weight: Option<f64>,
    pub weight_unit: Option<String>,
    pub background: Option<String>,
    pub training_goal: Option<String>,
    pub training_experience: Option<String>,
    pub injury_caution_area: Option<String>,
    pub created_at: OffsetDateTime,
}

const ALL_COLUMNS: &str = r#"
    id, name, email, password_hash, birthday, height, height_unit,
    weight, weight_unit, background, training_goal, training_experience,
    injury_caution_area, created_at
"#;

impl UserProfile {
    pub async fn find_by_email(db: &PgPool, email: &str) -> anyhow::Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {ALL_COLUMNS} FROM user_profile WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            "SELECT {ALL_COLUMNS} FROM user_profile WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn create(
        db: &PgPool,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<UserProfile> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            INSERT INTO user_profile (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {ALL_COLUMNS}
            "#
        ))
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .fetch_one(db)
        .await?;
        Ok(user)
    }

    /// True when another user already owns the email.
    pub async fn email_taken_by_other(
        db: &PgPool,
        email: &str,
        user_id: Uuid,
    ) -> anyhow::Result<bool> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM user_profile WHERE email = $1 AND id <> $2")
                .bind(email)
                .bind(user_id)
                .fetch_optional(db)
                .await?;
        Ok(row.is_some())
    }

    /// Partial update: absent fields keep their current value.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        changes: &UpdateProfileRequest,
    ) -> anyhow::Result<Option<UserProfile>> {
        let user = sqlx::query_as::<_, UserProfile>(&format!(
            r#"
            UPDATE user_profile SET
                name = COALESCE($2, name),
                email = COALESCE($3, email),
                birthday = COALESCE($4, birthday),
                height = COALESCE($5, height),
                height_unit = COALESCE($6, height_unit),
                weight = COALESCE($7, weight),
                weight_unit = COALESCE($8, weight_unit),
                background = COALESCE($9, background),
                training_goal = COALESCE($10, training_goal),
                training_experience = COALESCE($11, training_experience),
                injury_caution_area = COALESCE($12, injury_caution_area)
            WHERE id = $1
            RETURNING {ALL_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(changes.name.as_deref())
        .bind(changes.email.as_deref())
        .bind(changes.birthday)
        .bind(changes.height)
        .bind(changes.height_unit.as_deref())
        .bind(changes.weight)
        .bind(changes.weight_unit.as_deref())
        .bind(changes.background.as_deref())
        .bind(changes.training_goal.as_deref())
        .bind(changes.training_experience.as_deref())
        .bind(changes.injury_caution_area.as_deref())
        .fetch_optional(db)
        .await?;
        Ok(user)
    }
}
