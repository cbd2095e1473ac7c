use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

/// One normalized job ad, as stored in `postings`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Posting {
    pub id: i32,
    pub title: String,
    pub company_name: String,
    /// Carried for logging and filtering only; not a table column.
    #[sqlx(default)]
    pub category: Option<String>,
    pub job_type: String,
    pub salary: String,
    pub publication_date: Option<NaiveDate>,
    pub url: String,
}

/// Row count per job type, most frequent first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct JobTypeCount {
    pub job_type: String,
    pub postings: i64,
}

impl Posting {
    /// Create the `postings` table if it does not exist yet.
    pub async fn ensure_table(conn: &mut PgConnection) -> sqlx::Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS postings (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                company_name TEXT NOT NULL,
                job_type TEXT NOT NULL,
                salary TEXT NOT NULL,
                publication_date DATE,
                url TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *conn)
        .await?;
        Ok(())
    }

    /// Insert unless a posting with the same id exists.
    ///
    /// Returns `true` if a row was written, `false` if the id was already present.
    pub async fn insert_ignore(&self, conn: &mut PgConnection) -> sqlx::Result<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO postings (id, title, company_name, job_type, salary, publication_date, url)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(self.id)
        .bind(&self.title)
        .bind(&self.company_name)
        .bind(&self.job_type)
        .bind(&self.salary)
        .bind(self.publication_date)
        .bind(&self.url)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Newest postings first; undated ones last.
    pub async fn list(limit: i64, conn: &mut PgConnection) -> sqlx::Result<Vec<Posting>> {
        sqlx::query_as::<_, Posting>(
            r#"
            SELECT id, title, company_name, job_type, salary, publication_date, url
            FROM postings
            ORDER BY publication_date DESC NULLS LAST, id
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn find_by_id(id: i32, conn: &mut PgConnection) -> sqlx::Result<Option<Posting>> {
        sqlx::query_as::<_, Posting>(
            r#"
            SELECT id, title, company_name, job_type, salary, publication_date, url
            FROM postings
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn count(conn: &mut PgConnection) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM postings")
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn top_job_types(
        limit: i64,
        conn: &mut PgConnection,
    ) -> sqlx::Result<Vec<JobTypeCount>> {
        sqlx::query_as::<_, JobTypeCount>(
            r#"
            SELECT job_type, COUNT(*) AS postings
            FROM postings
            GROUP BY job_type
            ORDER BY postings DESC, job_type
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
    }
}
