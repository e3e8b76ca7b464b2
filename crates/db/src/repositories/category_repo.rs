//! Repository for the `categories` table.

use catalog_core::category::{CategoryRank, ParentRefs};
use catalog_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::category::Category;

/// Column list for the `categories` table.
const COLUMNS: &str = "id, name, category_type, parent_primary_id, parent_secondary_id, \
    parent_tertiary_id, created_at, updated_at";

/// Tables that carry a four-column category path.
const PATH_TABLES: &[&str] = &["products", "brands"];

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a category with already-derived parent references.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        rank: CategoryRank,
        parents: &ParentRefs,
    ) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories \
                (name, category_type, parent_primary_id, parent_secondary_id, parent_tertiary_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(name)
            .bind(rank.as_str())
            .bind(parents.parent_primary_id)
            .bind(parents.parent_secondary_id)
            .bind(parents.parent_tertiary_id)
            .fetch_one(pool)
            .await
    }

    /// Find a category by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch every category among `ids`. Missing ids are simply absent.
    pub async fn find_many(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = ANY($1)");
        sqlx::query_as::<_, Category>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List categories, optionally of one rank and/or under one parent.
    ///
    /// With a rank, `parent_id` filters on that rank's immediate-parent
    /// column. Without a rank it matches categories whose immediate parent
    /// is `parent_id`, whatever their rank.
    pub async fn list(
        pool: &PgPool,
        rank: Option<CategoryRank>,
        parent_id: Option<DbId>,
    ) -> Result<Vec<Category>, sqlx::Error> {
        let parent_clause = match rank.and_then(|r| r.parent()) {
            Some(parent_rank) => format!("parent_{}_id = $2", parent_rank.as_str()),
            None => "((category_type = 'secondary' AND parent_primary_id = $2) \
                  OR (category_type = 'tertiary' AND parent_secondary_id = $2) \
                  OR (category_type = 'quaternary' AND parent_tertiary_id = $2))"
                .to_string(),
        };
        let query = format!(
            "SELECT {COLUMNS} FROM categories \
             WHERE ($1::TEXT IS NULL OR category_type = $1) \
               AND ($2::BIGINT IS NULL OR {parent_clause}) \
             ORDER BY name, id"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(rank.map(|r| r.as_str()))
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// Rename and/or re-parent a category.
    ///
    /// When the ancestors change, descendant categories and every product
    /// or brand path running through this category are rewritten to the
    /// new chain in the same transaction. Returns `None` if no row with the
    /// given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        rank: CategoryRank,
        name: Option<&str>,
        parents: &ParentRefs,
    ) -> Result<Option<Category>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE categories SET \
                name = COALESCE($2, name), \
                parent_primary_id = $3, \
                parent_secondary_id = $4, \
                parent_tertiary_id = $5 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let category = sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .bind(name)
            .bind(parents.parent_primary_id)
            .bind(parents.parent_secondary_id)
            .bind(parents.parent_tertiary_id)
            .fetch_optional(&mut *tx)
            .await?;

        if category.is_some() && rank != CategoryRank::Primary {
            Self::cascade_ancestors(&mut tx, id, rank, parents).await?;
        }

        tx.commit().await?;
        Ok(category)
    }

    /// Delete a category.
    ///
    /// Fails with a foreign-key violation while children, products, or
    /// brands reference it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    /// Copy the ancestors above `rank` onto everything hanging below `id`.
    async fn cascade_ancestors(
        tx: &mut Transaction<'_, Postgres>,
        id: DbId,
        rank: CategoryRank,
        parents: &ParentRefs,
    ) -> Result<(), sqlx::Error> {
        let ancestors: Vec<CategoryRank> = CategoryRank::ALL
            .into_iter()
            .filter(|r| *r < rank)
            .collect();

        // Descendant categories reference `id` through their parent column
        // for this rank; quaternary categories have no descendants.
        if rank != CategoryRank::Quaternary {
            let assignments = set_clause(&ancestors, |r| format!("parent_{}_id", r.as_str()));
            let query = format!(
                "UPDATE categories SET {assignments} WHERE parent_{}_id = $1",
                rank.as_str()
            );
            bind_ancestors(sqlx::query(&query).bind(id), &ancestors, parents)
                .execute(&mut **tx)
                .await?;
        }

        for table in PATH_TABLES {
            let assignments = set_clause(&ancestors, |r| format!("{}_category_id", r.as_str()));
            let query = format!(
                "UPDATE {table} SET {assignments} WHERE {}_category_id = $1",
                rank.as_str()
            );
            bind_ancestors(sqlx::query(&query).bind(id), &ancestors, parents)
                .execute(&mut **tx)
                .await?;
        }

        Ok(())
    }
}

/// `col_a = $2, col_b = $3, ...` for the given ranks.
fn set_clause(ranks: &[CategoryRank], column: impl Fn(CategoryRank) -> String) -> String {
    ranks
        .iter()
        .enumerate()
        .map(|(i, r)| format!("{} = ${}", column(*r), i + 2))
        .collect::<Vec<_>>()
        .join(", ")
}

fn bind_ancestors<'q>(
    mut query: sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments>,
    ranks: &[CategoryRank],
    parents: &ParentRefs,
) -> sqlx::query::Query<'q, Postgres, sqlx::postgres::PgArguments> {
    for rank in ranks {
        query = query.bind(parents.get(*rank));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_clause_numbers_from_two() {
        let ranks = [CategoryRank::Primary, CategoryRank::Secondary];
        assert_eq!(
            set_clause(&ranks, |r| format!("parent_{}_id", r.as_str())),
            "parent_primary_id = $2, parent_secondary_id = $3"
        );
    }
}
