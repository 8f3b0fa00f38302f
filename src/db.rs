use anyhow::Context;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use sqlx::{PgPool, Row};
use tracing::{debug, info};
use uuid::Uuid;

use crate::aggregate;
use crate::models::{ContentInventory, DailyMetric, Profile, ProfileSnapshot};

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Loads everything a report needs, or `None` when the handle is unknown.
pub async fn load_snapshot(
    pool: &PgPool,
    handle: &str,
    window_days: u32,
    now: DateTime<Utc>,
) -> anyhow::Result<Option<ProfileSnapshot>> {
    let Some(profile) = fetch_profile(pool, handle).await? else {
        return Ok(None);
    };

    let (first_day, last_day) = aggregate::window_bounds(now.date_naive(), window_days);
    let metrics = fetch_daily_metrics(pool, profile.id, first_day, last_day).await?;
    let clicks = count_clicks(
        pool,
        profile.id,
        now - Duration::days(i64::from(window_days)),
        now,
    )
    .await?;
    let inventory = fetch_inventory(pool, profile.id).await?;

    debug!(
        handle,
        days = metrics.len(),
        clicks,
        content = inventory.total(),
        "snapshot loaded"
    );

    Ok(Some(ProfileSnapshot {
        profile,
        metrics,
        inventory,
        clicks,
    }))
}

pub async fn fetch_profile(pool: &PgPool, handle: &str) -> anyhow::Result<Option<Profile>> {
    let row = sqlx::query(
        "SELECT id, handle, display_name FROM creator_diagnostics.profiles WHERE handle = $1",
    )
    .bind(handle)
    .fetch_optional(pool)
    .await
    .context("failed to look up profile")?;

    Ok(row.map(|row| Profile {
        id: row.get("id"),
        handle: row.get("handle"),
        display_name: row.get("display_name"),
    }))
}

/// Daily buckets between `first_day` and `last_day` inclusive, oldest first.
pub async fn fetch_daily_metrics(
    pool: &PgPool,
    profile_id: Uuid,
    first_day: NaiveDate,
    last_day: NaiveDate,
) -> anyhow::Result<Vec<DailyMetric>> {
    let rows = sqlx::query(
        r#"
        SELECT metric_date, views, unique_views
        FROM creator_diagnostics.daily_metrics
        WHERE profile_id = $1 AND metric_date BETWEEN $2 AND $3
        ORDER BY metric_date
        "#,
    )
    .bind(profile_id)
    .bind(first_day)
    .bind(last_day)
    .fetch_all(pool)
    .await
    .context("failed to fetch daily metrics")?;

    Ok(rows
        .into_iter()
        .map(|row| DailyMetric {
            date: row.get("metric_date"),
            views: row.get("views"),
            unique_views: row.get("unique_views"),
        })
        .collect())
}

/// Clicks on any of the profile's links in `[since, until)`.
pub async fn count_clicks(
    pool: &PgPool,
    profile_id: Uuid,
    since: DateTime<Utc>,
    until: DateTime<Utc>,
) -> anyhow::Result<u64> {
    let clicks: i64 = sqlx::query(
        r#"
        SELECT COUNT(*) AS clicks
        FROM creator_diagnostics.link_clicks c
        JOIN creator_diagnostics.links l ON l.id = c.link_id
        WHERE l.profile_id = $1 AND c.clicked_at >= $2 AND c.clicked_at < $3
        "#,
    )
    .bind(profile_id)
    .bind(since)
    .bind(until)
    .fetch_one(pool)
    .await
    .context("failed to count link clicks")?
    .get("clicks");

    Ok(aggregate::sanitize(Some(clicks)))
}

pub async fn fetch_inventory(pool: &PgPool, profile_id: Uuid) -> anyhow::Result<ContentInventory> {
    let row = sqlx::query(
        r#"
        SELECT
            (SELECT COUNT(*) FROM creator_diagnostics.links
             WHERE profile_id = $1 AND is_active) AS links_count,
            (SELECT COUNT(*) FROM creator_diagnostics.races WHERE profile_id = $1) AS races_count,
            (SELECT COUNT(*) FROM creator_diagnostics.sponsors WHERE profile_id = $1) AS sponsors_count,
            (SELECT COUNT(*) FROM creator_diagnostics.media WHERE profile_id = $1) AS media_count
        "#,
    )
    .bind(profile_id)
    .fetch_one(pool)
    .await
    .context("failed to count content inventory")?;

    let count = |column: &str| aggregate::sanitize(row.get::<Option<i64>, _>(column));

    Ok(ContentInventory {
        links_count: count("links_count"),
        races_count: count("races_count"),
        sponsors_count: count("sponsors_count"),
        media_count: count("media_count"),
    })
}

async fn upsert_profile(
    pool: &PgPool,
    id: Uuid,
    handle: &str,
    display_name: &str,
) -> anyhow::Result<Uuid> {
    let id: Uuid = sqlx::query(
        r#"
        INSERT INTO creator_diagnostics.profiles (id, handle, display_name)
        VALUES ($1, $2, $3)
        ON CONFLICT (handle) DO UPDATE
        SET display_name = EXCLUDED.display_name
        RETURNING id
        "#,
    )
    .bind(id)
    .bind(handle)
    .bind(display_name)
    .fetch_one(pool)
    .await?
    .get("id");

    Ok(id)
}

async fn upsert_metric(
    pool: &PgPool,
    profile_id: Uuid,
    date: NaiveDate,
    views: Option<i64>,
    unique_views: Option<i64>,
) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        INSERT INTO creator_diagnostics.daily_metrics (profile_id, metric_date, views, unique_views)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (profile_id, metric_date) DO UPDATE
        SET views = EXCLUDED.views, unique_views = EXCLUDED.unique_views
        "#,
    )
    .bind(profile_id)
    .bind(date)
    .bind(views)
    .bind(unique_views)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

async fn insert_named(
    pool: &PgPool,
    table: &str,
    column: &str,
    id: Uuid,
    profile_id: Uuid,
    name: &str,
) -> anyhow::Result<()> {
    // Table and column names come from the fixed seed catalog below.
    let query = format!(
        "INSERT INTO creator_diagnostics.{table} (id, profile_id, {column}) \
         VALUES ($1, $2, $3) ON CONFLICT (id) DO NOTHING"
    );
    sqlx::query(&query)
        .bind(id)
        .bind(profile_id)
        .bind(name)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let now = Utc::now();
    let today = now.date_naive();

    // A steadily growing profile with a full month of history.
    let maya = upsert_profile(
        pool,
        Uuid::parse_str("6f1c2a9e-2b3d-4c1e-9a47-1d2e3f405a61")?,
        "maya.runs",
        "Maya Ortiz",
    )
    .await?;

    for offset in 0..30i64 {
        let views = 40 + (29 - offset) * 3;
        upsert_metric(
            pool,
            maya,
            today - Duration::days(offset),
            Some(views),
            Some(views * 6 / 10),
        )
        .await?;
    }

    let links = [
        (0x11u128, "Race results", "https://example.com/results", true),
        (0x12, "Training log", "https://example.com/training", true),
        (0x13, "Shop", "https://example.com/shop", true),
        (0x14, "Newsletter", "https://example.com/newsletter", true),
        (0x15, "Old fundraiser", "https://example.com/fundraiser", false),
    ];
    for (suffix, title, url, is_active) in links {
        sqlx::query(
            r#"
            INSERT INTO creator_diagnostics.links (id, profile_id, title, url, is_active)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(Uuid::from_u128(suffix))
        .bind(maya)
        .bind(title)
        .bind(url)
        .bind(is_active)
        .execute(pool)
        .await?;
    }

    for n in 0..120u128 {
        let link = Uuid::from_u128(0x11 + n % 4);
        let clicked_at = now - Duration::hours(6 * n as i64 + 1);
        sqlx::query(
            r#"
            INSERT INTO creator_diagnostics.link_clicks (id, link_id, clicked_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(Uuid::from_u128(0x1000 + n))
        .bind(link)
        .bind(clicked_at)
        .execute(pool)
        .await?;
    }

    for (suffix, name) in [(0x21u128, "City Marathon"), (0x22, "Trail 50K"), (0x23, "Harbor 10K")] {
        insert_named(pool, "races", "name", Uuid::from_u128(suffix), maya, name).await?;
    }
    for (suffix, name) in [(0x31u128, "Stride Shoes"), (0x32, "Peak Nutrition")] {
        insert_named(pool, "sponsors", "name", Uuid::from_u128(suffix), maya, name).await?;
    }
    for suffix in 0x41u128..0x46 {
        let title = format!("Race photo {}", suffix - 0x40);
        insert_named(pool, "media", "title", Uuid::from_u128(suffix), maya, &title).await?;
    }

    // A brand-new profile with only a few days of data.
    let sam = upsert_profile(
        pool,
        Uuid::parse_str("a83d7c51-0f6e-4b92-8d1a-5e6f7a8b9c02")?,
        "sam.trails",
        "Sam Keller",
    )
    .await?;

    for (offset, views, unique_views) in [(2i64, 6i64, 5i64), (1, 9, 7), (0, 4, 4)] {
        upsert_metric(pool, sam, today - Duration::days(offset), Some(views), Some(unique_views))
            .await?;
    }

    info!("seeded profiles maya.runs and sam.trails");
    Ok(())
}

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    handle: String,
    display_name: String,
    date: NaiveDate,
    views: Option<i64>,
    unique_views: Option<i64>,
}

/// Empty count cells deserialize as `None` and are stored as NULL.
fn parse_rows(source: impl std::io::Read) -> anyhow::Result<Vec<CsvRow>> {
    let mut reader = csv::Reader::from_reader(source);
    let mut rows = Vec::new();
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        rows.push(result.with_context(|| format!("invalid CSV record {}", index + 1))?);
    }
    Ok(rows)
}

pub async fn import_csv(pool: &PgPool, csv_path: &std::path::Path) -> anyhow::Result<usize> {
    let file = std::fs::File::open(csv_path)
        .with_context(|| format!("failed to open {}", csv_path.display()))?;
    let rows = parse_rows(file)?;
    let mut imported = 0usize;

    for row in rows {
        let profile_id =
            upsert_profile(pool, Uuid::new_v4(), &row.handle, &row.display_name).await?;

        if upsert_metric(pool, profile_id, row.date, row.views, row.unique_views).await? > 0 {
            imported += 1;
        }
    }

    info!(imported, path = %csv_path.display(), "daily metrics imported");
    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
handle,display_name,date,views,unique_views
maya.runs,Maya Ortiz,2026-10-13,120,70
jo.climbs,Jo Park,2026-10-14,,
jo.climbs,Jo Park,2026-10-15,18,
";

    #[test]
    fn empty_count_cells_parse_as_missing() {
        let rows = parse_rows(SAMPLE.as_bytes()).unwrap();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].handle, "maya.runs");
        assert_eq!(rows[0].views, Some(120));
        assert_eq!(rows[0].unique_views, Some(70));

        assert_eq!(rows[1].display_name, "Jo Park");
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2026, 10, 14).unwrap());
        assert_eq!(rows[1].views, None);
        assert_eq!(rows[1].unique_views, None);

        assert_eq!(rows[2].views, Some(18));
        assert_eq!(rows[2].unique_views, None);
    }

    #[test]
    fn imported_gaps_count_as_zero_in_summary() {
        let metrics: Vec<DailyMetric> = parse_rows(SAMPLE.as_bytes())
            .unwrap()
            .into_iter()
            .filter(|row| row.handle == "jo.climbs")
            .map(|row| DailyMetric {
                date: row.date,
                views: row.views,
                unique_views: row.unique_views,
            })
            .collect();

        let summary = aggregate::summarize(&metrics, 0, 7).unwrap();
        assert_eq!(summary.total_views, 18);
        assert_eq!(summary.total_unique_views, 0);
    }

    #[test]
    fn malformed_count_is_rejected() {
        let source = "handle,display_name,date,views,unique_views\njo.climbs,Jo Park,2026-10-14,lots,\n";
        let error = parse_rows(source.as_bytes()).unwrap_err();
        assert!(format!("{error:#}").contains("invalid CSV record 1"));
    }
}
