//! Parameter (settings) repository.

use sqlx::PgPool;

use super::RepositoryError;
use crate::models::Parameter;

/// Repository for the key/value `parameters` table.
pub struct ParameterRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ParameterRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All parameters ordered by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Parameter>, RepositoryError> {
        let rows = sqlx::query_as::<_, Parameter>("SELECT key, value FROM parameters ORDER BY key")
            .fetch_all(self.pool)
            .await?;
        Ok(rows)
    }

    /// Value for `key`, if set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError> {
        let value = sqlx::query_scalar::<_, String>("SELECT value FROM parameters WHERE key = $1")
            .bind(key)
            .fetch_optional(self.pool)
            .await?;
        Ok(value)
    }

    /// Insert or replace a parameter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, key: &str, value: &str) -> Result<Parameter, RepositoryError> {
        let row = sqlx::query_as::<_, Parameter>(
            r"
            INSERT INTO parameters (key, value)
            VALUES ($1, $2)
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value
            RETURNING key, value
            ",
        )
        .bind(key)
        .bind(value)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }

    /// Values of every `<prefix><n>` key, in numeric order of `n`.
    ///
    /// `cold_2` sorts before `cold_10`. Keys whose suffix is not a number
    /// sort last, by key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_prefixed(&self, prefix: &str) -> Result<Vec<String>, RepositoryError> {
        let rows = sqlx::query_as::<_, Parameter>(
            "SELECT key, value FROM parameters WHERE starts_with(key, $1)",
        )
        .bind(prefix)
        .fetch_all(self.pool)
        .await?;

        Ok(sort_by_suffix(rows, prefix))
    }
}

fn sort_by_suffix(mut rows: Vec<Parameter>, prefix: &str) -> Vec<String> {
    rows.sort_by_cached_key(|p| {
        let n = p
            .key
            .strip_prefix(prefix)
            .and_then(|suffix| suffix.parse::<u32>().ok());
        (n.is_none(), n, p.key.clone())
    });
    rows.into_iter().map(|p| p.value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param(key: &str, value: &str) -> Parameter {
        Parameter {
            key: key.to_owned(),
            value: value.to_owned(),
        }
    }

    #[test]
    fn test_sort_by_suffix_is_numeric() {
        let rows = vec![
            param("bread_10", "Zacht Bruin"),
            param("bread_2", "Ciabatta"),
            param("bread_1", "Italiaanse Bol"),
            param("bread_extra", "Mystery"),
        ];
        assert_eq!(
            sort_by_suffix(rows, "bread_"),
            vec!["Italiaanse Bol", "Ciabatta", "Zacht Bruin", "Mystery"]
        );
    }
}
