use crate::error::Result;
use crate::models::category::Category;
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Clone)]
pub struct CategoryService {
    pool: PgPool,
}

impl CategoryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"SELECT * FROM categories ORDER BY sort_order ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn get(&self, id: Uuid) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(r#"SELECT * FROM categories WHERE id = $1"#)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(category)
    }
}
