use sqlx::PgPool;
use time::{Duration, OffsetDateTime};
use tracing::{info, instrument};

use crate::program::repo::{self, ProgramMetadata};
use crate::program::template::{ACCESSORY, COMPOUND, SPECIAL_SAMPLE, SPLIT_SAMPLE, WEEKLY_PLAN};

/// Returns the current 7-day program window, creating and seeding one when
/// none is active or the active one has expired. Safe to call on every
/// schedule read; only the first call after expiry writes.
#[instrument(skip(db))]
pub async fn ensure_active_program(db: &PgPool) -> anyhow::Result<ProgramMetadata> {
    let today = OffsetDateTime::now_utc().date();

    if let Some(meta) = repo::find_active(db).await? {
        if meta.end_date >= today {
            return Ok(meta);
        }
    }

    create_program(db, today).await
}

/// Expire-and-create inside one transaction. The partial unique index on
/// active rows turns a concurrent create into a unique violation, which we
/// resolve by reading the winner's row instead of failing the request.
async fn create_program(
    db: &PgPool,
    today: time::Date,
) -> anyhow::Result<ProgramMetadata> {
    let start_date = today;
    let end_date = today + Duration::days(7);

    let mut tx = db.begin().await?;
    repo::expire_outdated(&mut tx, today).await?;

    let meta = match repo::insert_program(&mut tx, start_date, end_date).await {
        Ok(meta) => meta,
        Err(e) => {
            let lost_race = e
                .as_database_error()
                .map(|db_err| db_err.is_unique_violation())
                .unwrap_or(false);
            if lost_race {
                drop(tx);
                let winner = repo::find_active(db)
                    .await?
                    .ok_or_else(|| anyhow::anyhow!("active program vanished after lost race"))?;
                return Ok(winner);
            }
            return Err(e.into());
        }
    };

    seed_schedule(&mut tx, meta.id).await?;
    tx.commit().await?;

    info!(program_id = meta.id, %start_date, %end_date, "new weekly program generated");
    Ok(meta)
}

/// Seeds the default schedule per the weekly template: special days sample
/// per category without a type filter, split days take compounds first then
/// accessories.
async fn seed_schedule(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    program_id: i64,
) -> anyhow::Result<()> {
    for day in WEEKLY_PLAN {
        for category in day.categories {
            let workout_ids = if day.is_special() {
                repo::sample_workout_ids(tx, category, None, SPECIAL_SAMPLE).await?
            } else {
                let mut ids =
                    repo::sample_workout_ids(tx, category, Some(COMPOUND), SPLIT_SAMPLE).await?;
                ids.extend(
                    repo::sample_workout_ids(tx, category, Some(ACCESSORY), SPLIT_SAMPLE).await?,
                );
                ids
            };
            for workout_id in workout_ids {
                repo::insert_schedule_row(tx, program_id, day.day, workout_id).await?;
            }
        }
    }
    Ok(())
}
