use crate::error::{Error, Result};
use crate::models::user::User;
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::jwt::issue_token;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// 99.00, the one-time Pro price recorded on the order row.
pub const PRO_UPGRADE_PRICE: Decimal = Decimal::from_parts(9900, 0, 0, false, 2);

#[derive(Debug, Serialize)]
pub struct AuthenticatedUser {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProgressReport {
    pub overall: OverallProgress,
    pub categories: Vec<CategoryProgress>,
}

#[derive(Debug, Serialize)]
pub struct OverallProgress {
    pub total_questions: i64,
    pub answered_questions: i64,
    pub correct_answers: i64,
    /// Percentage of answered questions solved correctly, one decimal place.
    pub accuracy: f64,
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CategoryProgress {
    pub id: Uuid,
    pub name: String,
    pub icon: Option<String>,
    pub total_questions: i64,
    pub answered_questions: i64,
    pub correct_answers: i64,
}

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        nickname: Option<String>,
    ) -> Result<AuthenticatedUser> {
        let existing: Option<Uuid> =
            sqlx::query_scalar(r#"SELECT id FROM users WHERE email = $1"#)
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Err(Error::BadRequest("Email already registered".to_string()));
        }

        let password_hash = hash_password(password)?;
        let nickname = nickname
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.split('@').next().unwrap_or(email).to_string());

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, nickname, role)
            VALUES ($1, $2, $3, 'user')
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(&password_hash)
        .bind(&nickname)
        .fetch_one(&self.pool)
        .await?;

        let token = issue_token(user.id, &user.role)?;
        Ok(AuthenticatedUser { user, token })
    }

    /// Unknown email and wrong password fail with the same message so the
    /// endpoint cannot be used to probe which emails exist.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthenticatedUser> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE email = $1"#)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::Unauthorized("Invalid email or password".to_string()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(Error::Unauthorized("Invalid email or password".to_string()));
        }

        let token = issue_token(user.id, &user.role)?;
        Ok(AuthenticatedUser { user, token })
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User> {
        let user = sqlx::query_as::<_, User>(r#"SELECT * FROM users WHERE id = $1"#)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(user)
    }

    pub async fn update_nickname(&self, user_id: Uuid, nickname: &str) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET nickname = $1, updated_at = NOW()
            WHERE id = $2
            RETURNING *
            "#,
        )
        .bind(nickname)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    pub async fn progress(&self, user_id: Uuid) -> Result<ProgressReport> {
        let row: (i64, i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(DISTINCT q.id),
                   COUNT(DISTINCT qa.question_id),
                   COUNT(DISTINCT CASE WHEN qa.is_correct THEN qa.question_id END)
            FROM questions q
            LEFT JOIN question_attempts qa ON q.id = qa.question_id AND qa.user_id = $1
            WHERE q.is_active = true
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let (total_questions, answered_questions, correct_answers) = row;
        let accuracy = if answered_questions > 0 {
            let pct = correct_answers as f64 / answered_questions as f64 * 100.0;
            (pct * 10.0).round() / 10.0
        } else {
            0.0
        };

        let categories = sqlx::query_as::<_, CategoryProgress>(
            r#"
            SELECT c.id, c.name, c.icon,
                   COUNT(DISTINCT q.id) AS total_questions,
                   COUNT(DISTINCT qa.question_id) AS answered_questions,
                   COUNT(DISTINCT CASE WHEN qa.is_correct THEN qa.question_id END) AS correct_answers
            FROM categories c
            LEFT JOIN questions q ON c.id = q.category_id AND q.is_active = true
            LEFT JOIN question_attempts qa ON q.id = qa.question_id AND qa.user_id = $1
            GROUP BY c.id, c.name, c.icon
            ORDER BY c.sort_order
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ProgressReport {
            overall: OverallProgress {
                total_questions,
                answered_questions,
                correct_answers,
                accuracy,
            },
            categories,
        })
    }

    /// Flips the Pro flag and appends the order row that records the
    /// purchase; both writes land together or not at all.
    pub async fn upgrade(&self, user_id: Uuid) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET is_pro = true, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO orders (user_id, amount, status)
            VALUES ($1, $2, 'completed')
            "#,
        )
        .bind(user_id)
        .bind(PRO_UPGRADE_PRICE)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(user)
    }
}
