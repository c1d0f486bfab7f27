use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::Date;

/// Active (or just-created) program window.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ProgramMetadata {
    pub id: i64,
    pub start_date: Date,
    pub end_date: Date,
    pub status: i16,
}

/// One default-schedule entry joined with its catalog row.
#[derive(Debug, Clone, FromRow)]
pub struct DefaultScheduleRow {
    pub day: String,
    pub workout_id: i64,
    pub name: String,
    pub category: String,
    pub kind: String,
}

pub async fn find_active(db: &PgPool) -> anyhow::Result<Option<ProgramMetadata>> {
    let meta = sqlx::query_as::<_, ProgramMetadata>(
        "SELECT id, start_date, end_date, status FROM program_metadata WHERE status = 1 LIMIT 1",
    )
    .fetch_optional(db)
    .await?;
    Ok(meta)
}

/// Expires active windows that have run out. The date filter matters: a
/// concurrent request that already created the next window must not have it
/// expired from under it.
pub async fn expire_outdated(
    tx: &mut Transaction<'_, Postgres>,
    today: Date,
) -> anyhow::Result<u64> {
    let result =
        sqlx::query("UPDATE program_metadata SET status = 0 WHERE status = 1 AND end_date < $1")
            .bind(today)
            .execute(&mut **tx)
            .await?;
    Ok(result.rows_affected())
}

pub async fn insert_program(
    tx: &mut Transaction<'_, Postgres>,
    start_date: Date,
    end_date: Date,
) -> sqlx::Result<ProgramMetadata> {
    sqlx::query_as::<_, ProgramMetadata>(
        r#"
        INSERT INTO program_metadata (start_date, end_date, status)
        VALUES ($1, $2, 1)
        RETURNING id, start_date, end_date, status
        "#,
    )
    .bind(start_date)
    .bind(end_date)
    .fetch_one(&mut **tx)
    .await
}

/// Uniform sample of catalog ids for a category, optionally filtered by type.
pub async fn sample_workout_ids(
    tx: &mut Transaction<'_, Postgres>,
    category: &str,
    kind: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<i64>> {
    let rows: Vec<(i64,)> = match kind {
        Some(kind) => {
            sqlx::query_as(
                r#"
                SELECT id FROM workouts
                WHERE category = $1 AND type = $2
                ORDER BY RANDOM() LIMIT $3
                "#,
            )
            .bind(category)
            .bind(kind)
            .bind(limit)
            .fetch_all(&mut **tx)
            .await?
        }
        None => {
            sqlx::query_as(
                "SELECT id FROM workouts WHERE category = $1 ORDER BY RANDOM() LIMIT $2",
            )
            .bind(category)
            .bind(limit)
            .fetch_all(&mut **tx)
            .await?
        }
    };
    Ok(rows.into_iter().map(|(id,)| id).collect())
}

pub async fn insert_schedule_row(
    tx: &mut Transaction<'_, Postgres>,
    program_id: i64,
    day: &str,
    workout_id: i64,
) -> anyhow::Result<()> {
    sqlx::query("INSERT INTO program_schedule (program_id, day, workout_id) VALUES ($1, $2, $3)")
        .bind(program_id)
        .bind(day)
        .bind(workout_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Default schedule joined with the catalog, unordered; callers sort by the
/// weekly template.
pub async fn load_default_rows(
    db: &PgPool,
    program_id: i64,
) -> anyhow::Result<Vec<DefaultScheduleRow>> {
    let rows = sqlx::query_as::<_, DefaultScheduleRow>(
        r#"
        SELECT ps.day, ps.workout_id, w.name, w.category, w.type AS kind
        FROM program_schedule ps
        JOIN workouts w ON w.id = ps.workout_id
        WHERE ps.program_id = $1
        "#,
    )
    .bind(program_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

/// Distinct workouts of a program with the days each occurs on, used to
/// build the personalization prompt and to expand the reply back into rows.
#[derive(Debug, Clone)]
pub struct ProgramWorkout {
    pub workout_id: i64,
    pub name: String,
    pub days: Vec<String>,
}

pub async fn load_program_workouts(
    db: &PgPool,
    program_id: i64,
) -> anyhow::Result<Vec<ProgramWorkout>> {
    let rows = load_default_rows(db, program_id).await?;
    Ok(group_by_workout(rows))
}

/// Groups schedule rows per workout, preserving template day order and
/// first-seen workout order.
pub fn group_by_workout(mut rows: Vec<DefaultScheduleRow>) -> Vec<ProgramWorkout> {
    use crate::program::template::day_position;

    rows.sort_by_key(|r| day_position(&r.day).unwrap_or(usize::MAX));

    let mut grouped: Vec<ProgramWorkout> = Vec::new();
    for row in rows {
        match grouped.iter_mut().find(|w| w.workout_id == row.workout_id) {
            Some(w) => {
                if !w.days.contains(&row.day) {
                    w.days.push(row.day);
                }
            }
            None => grouped.push(ProgramWorkout {
                workout_id: row.workout_id,
                name: row.name,
                days: vec![row.day],
            }),
        }
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(day: &str, id: i64, name: &str) -> DefaultScheduleRow {
        DefaultScheduleRow {
            day: day.into(),
            workout_id: id,
            name: name.into(),
            category: "Chest".into(),
            kind: "Compound".into(),
        }
    }

    #[test]
    fn grouping_collects_days_in_template_order() {
        let rows = vec![
            row("Friday", 7, "Burpee"),
            row("Monday", 7, "Burpee"),
            row("Tuesday", 3, "Row"),
        ];
        let grouped = group_by_workout(rows);
        assert_eq!(grouped.len(), 2);
        let burpee = grouped.iter().find(|w| w.workout_id == 7).unwrap();
        assert_eq!(burpee.days, vec!["Monday".to_string(), "Friday".to_string()]);
    }

    #[test]
    fn grouping_dedupes_same_day_repeats() {
        let rows = vec![row("Monday", 1, "Bench"), row("Monday", 1, "Bench")];
        let grouped = group_by_workout(rows);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[0].days, vec!["Monday".to_string()]);
    }
}
