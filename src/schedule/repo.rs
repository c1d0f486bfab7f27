use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Per-user override row. Two layers live here: the personalized values
/// written in bulk by the plan engine, and the manually-modified values
/// layered on top by ad-hoc edits.
#[derive(Debug, Clone, FromRow)]
pub struct OverrideRow {
    pub day: String,
    pub workout_id: i64,
    pub sets: i32,
    pub reps: i32,
    pub weight_value: f64,
    pub weight_unit: String,
    pub sets_modified: Option<i32>,
    pub reps_modified: Option<i32>,
    pub weight_modified: Option<f64>,
    pub is_modified: bool,
}

/// The values currently in effect for a row.
#[derive(Debug, Clone, PartialEq)]
pub struct Prescription {
    pub sets: i32,
    pub reps: i32,
    pub weight_value: f64,
    pub weight_unit: String,
}

impl OverrideRow {
    /// Single precedence chain: a manually-modified field wins over the
    /// personalized value; anything unmodified falls back per field.
    pub fn resolve(&self) -> Prescription {
        if self.is_modified {
            Prescription {
                sets: self.sets_modified.unwrap_or(self.sets),
                reps: self.reps_modified.unwrap_or(self.reps),
                weight_value: self.weight_modified.unwrap_or(self.weight_value),
                weight_unit: self.weight_unit.clone(),
            }
        } else {
            Prescription {
                sets: self.sets,
                reps: self.reps,
                weight_value: self.weight_value,
                weight_unit: self.weight_unit.clone(),
            }
        }
    }
}

/// Freshly personalized values ready for the bulk insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOverrideRow {
    pub day: String,
    pub workout_id: i64,
    pub sets: i32,
    pub reps: i32,
    pub weight_value: f64,
    pub weight_unit: String,
}

const OVERRIDE_COLUMNS: &str = r#"
    day, workout_id, sets, reps, weight_value, weight_unit,
    sets_modified, reps_modified, weight_modified, is_modified
"#;

pub async fn list_overrides(
    db: &PgPool,
    user_id: Uuid,
    program_id: i64,
) -> anyhow::Result<Vec<OverrideRow>> {
    let rows = sqlx::query_as::<_, OverrideRow>(&format!(
        r#"
        SELECT {OVERRIDE_COLUMNS}
        FROM user_program_schedule
        WHERE user_id = $1 AND program_id = $2
        "#
    ))
    .bind(user_id)
    .bind(program_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_override(
    db: &PgPool,
    user_id: Uuid,
    program_id: i64,
    day: &str,
    workout_id: i64,
) -> anyhow::Result<Option<OverrideRow>> {
    let row = sqlx::query_as::<_, OverrideRow>(&format!(
        r#"
        SELECT {OVERRIDE_COLUMNS}
        FROM user_program_schedule
        WHERE user_id = $1 AND program_id = $2 AND day = $3 AND workout_id = $4
        "#
    ))
    .bind(user_id)
    .bind(program_id)
    .bind(day)
    .bind(workout_id)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn has_overrides(db: &PgPool, user_id: Uuid, program_id: i64) -> anyhow::Result<bool> {
    let (count,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM user_program_schedule WHERE user_id = $1 AND program_id = $2",
    )
    .bind(user_id)
    .bind(program_id)
    .fetch_one(db)
    .await?;
    Ok(count > 0)
}

pub async fn insert_personalized(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    program_id: i64,
    rows: &[NewOverrideRow],
) -> sqlx::Result<()> {
    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO user_program_schedule
                (user_id, program_id, day, workout_id, sets, reps, weight_value, weight_unit)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user_id)
        .bind(program_id)
        .bind(&row.day)
        .bind(row.workout_id)
        .bind(row.sets)
        .bind(row.reps)
        .bind(row.weight_value)
        .bind(&row.weight_unit)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn delete_for_user(
    db: &PgPool,
    user_id: Uuid,
    program_id: i64,
) -> anyhow::Result<u64> {
    let result =
        sqlx::query("DELETE FROM user_program_schedule WHERE user_id = $1 AND program_id = $2")
            .bind(user_id)
            .bind(program_id)
            .execute(db)
            .await?;
    Ok(result.rows_affected())
}

/// Writes the modified layer. The unit, when given, replaces the row's unit
/// outright since a row carries a single unit for both layers.
#[allow(clippy::too_many_arguments)]
pub async fn apply_modification(
    db: &PgPool,
    user_id: Uuid,
    program_id: i64,
    day: &str,
    workout_id: i64,
    sets_modified: Option<i32>,
    reps_modified: Option<i32>,
    weight_modified: Option<f64>,
    weight_unit: Option<&str>,
    modification_type: &str,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE user_program_schedule SET
            sets_modified = COALESCE($5, sets_modified),
            reps_modified = COALESCE($6, reps_modified),
            weight_modified = COALESCE($7, weight_modified),
            weight_unit = COALESCE($8, weight_unit),
            is_modified = TRUE,
            modification_type = $9,
            updated_at = NOW()
        WHERE user_id = $1 AND program_id = $2 AND day = $3 AND workout_id = $4
        "#,
    )
    .bind(user_id)
    .bind(program_id)
    .bind(day)
    .bind(workout_id)
    .bind(sets_modified)
    .bind(reps_modified)
    .bind(weight_modified)
    .bind(weight_unit)
    .bind(modification_type)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}

/// Drops the modified layer, returning the row to its personalized values.
pub async fn reset_modification(
    db: &PgPool,
    user_id: Uuid,
    program_id: i64,
    day: &str,
    workout_id: i64,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE user_program_schedule SET
            sets_modified = NULL,
            reps_modified = NULL,
            weight_modified = NULL,
            is_modified = FALSE,
            modification_type = NULL,
            updated_at = NOW()
        WHERE user_id = $1 AND program_id = $2 AND day = $3 AND workout_id = $4
          AND is_modified
        "#,
    )
    .bind(user_id)
    .bind(program_id)
    .bind(day)
    .bind(workout_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected())
}
