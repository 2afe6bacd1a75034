use crate::error::Result;
use crate::models::question::{Difficulty, QuestionType};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

/// Number of questions in a daily challenge.
pub const DAILY_QUESTION_COUNT: usize = 3;

/// Deterministic 32-bit generator (mulberry32 family) used so every request
/// for the same day sees the same question order. Seeded once; each draw
/// remixes and stores the state, yielding floats in [0, 1).
pub struct SeededRng {
    state: u32,
}

impl SeededRng {
    pub fn new(seed: u32) -> Self {
        Self {
            state: seed.wrapping_add(0x6D2B_79F5),
        }
    }

    pub fn next_f64(&mut self) -> f64 {
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        self.state = t;
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }
}

/// Fisher-Yates, walking the index down from the last element. Empty and
/// one-element slices are left untouched.
pub fn shuffle<T>(rng: &mut SeededRng, items: &mut [T]) {
    for i in (1..items.len()).rev() {
        let j = (rng.next_f64() * (i as f64 + 1.0)) as usize;
        items.swap(i, j);
    }
}

/// Seed for a calendar day: the digits of YYYYMMDD read as one integer.
pub fn daily_seed(date: NaiveDate) -> u32 {
    date.year() as u32 * 10_000 + date.month() * 100 + date.day()
}

/// Stable per-day selection: shuffle the full ID list with the date seed and
/// keep the prefix. Fewer than `DAILY_QUESTION_COUNT` IDs means everything is
/// selected; an empty list selects nothing.
pub fn select_daily(date: NaiveDate, mut ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut rng = SeededRng::new(daily_seed(date));
    shuffle(&mut rng, &mut ids);
    ids.truncate(DAILY_QUESTION_COUNT);
    ids
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyQuestion {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub question_type: QuestionType,
    pub difficulty: Difficulty,
    pub category_id: Option<Uuid>,
    pub is_premium: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyChallenge {
    pub date: NaiveDate,
    pub questions: Vec<DailyQuestion>,
    pub completed_count: i64,
    pub total: i64,
}

#[derive(Clone)]
pub struct DailyService {
    pool: PgPool,
}

impl DailyService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn challenge(
        &self,
        date: NaiveDate,
        user_id: Option<Uuid>,
    ) -> Result<DailyChallenge> {
        let selected = select_daily(date, self.list_active_ids().await?);

        let rows = sqlx::query_as::<_, DailyQuestion>(
            r#"
            SELECT id, title, type, difficulty, category_id, is_premium
            FROM questions
            WHERE id = ANY($1)
            "#,
        )
        .bind(&selected)
        .fetch_all(&self.pool)
        .await?;

        // ANY() does not preserve order; put the rows back in selection order.
        let mut by_id: HashMap<Uuid, DailyQuestion> =
            rows.into_iter().map(|q| (q.id, q)).collect();
        let questions: Vec<DailyQuestion> = selected
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        let completed_count = match user_id {
            Some(user_id) if !questions.is_empty() => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    SELECT COUNT(DISTINCT question_id) FROM question_attempts
                    WHERE user_id = $1 AND question_id = ANY($2)
                    "#,
                )
                .bind(user_id)
                .bind(&selected)
                .fetch_one(&self.pool)
                .await?
            }
            _ => 0,
        };

        let total = questions.len() as i64;
        Ok(DailyChallenge {
            date,
            questions,
            completed_count,
            total,
        })
    }

    /// Active question IDs in a deterministic order; the shuffle depends on
    /// the input order being stable between requests.
    async fn list_active_ids(&self) -> Result<Vec<Uuid>> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id FROM questions
            WHERE is_active = true
            ORDER BY created_at DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn seed_is_yyyymmdd() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(daily_seed(date), 20_240_315);
        let next = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        assert_eq!(daily_seed(next), 20_240_316);
    }

    #[test]
    fn generator_is_deterministic() {
        let mut a = SeededRng::new(20_240_315);
        let mut b = SeededRng::new(20_240_315);
        for _ in 0..100 {
            assert_eq!(a.next_f64(), b.next_f64());
        }
    }

    #[test]
    fn generator_yields_unit_interval() {
        let mut rng = SeededRng::new(7);
        for _ in 0..1000 {
            let x = rng.next_f64();
            assert!((0.0..1.0).contains(&x));
        }
    }

    #[test]
    fn different_seeds_diverge() {
        let mut a = SeededRng::new(20_240_315);
        let mut b = SeededRng::new(20_240_316);
        let sa: Vec<f64> = (0..8).map(|_| a.next_f64()).collect();
        let sb: Vec<f64> = (0..8).map(|_| b.next_f64()).collect();
        assert_ne!(sa, sb);
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let original = ids(50);
        let mut shuffled = original.clone();
        let mut rng = SeededRng::new(42);
        shuffle(&mut rng, &mut shuffled);

        assert_eq!(shuffled.len(), original.len());
        let a: HashSet<_> = original.iter().collect();
        let b: HashSet<_> = shuffled.iter().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_leaves_trivial_inputs_alone() {
        let mut empty: Vec<Uuid> = Vec::new();
        shuffle(&mut SeededRng::new(1), &mut empty);
        assert!(empty.is_empty());

        let single = ids(1);
        let mut shuffled = single.clone();
        shuffle(&mut SeededRng::new(1), &mut shuffled);
        assert_eq!(shuffled, single);
    }

    #[test]
    fn same_day_same_selection() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let pool = ids(10);
        let first = select_daily(date, pool.clone());
        let second = select_daily(date, pool.clone());
        assert_eq!(first, second);
        assert_eq!(first.len(), DAILY_QUESTION_COUNT);
        for id in &first {
            assert!(pool.contains(id));
        }
    }

    #[test]
    fn different_days_usually_differ() {
        // With 10 candidates a collision across two days is possible but
        // wildly unlikely for these fixed seeds.
        let pool = ids(10);
        let a = select_daily(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), pool.clone());
        let b = select_daily(NaiveDate::from_ymd_opt(2024, 3, 16).unwrap(), pool.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn small_pools_select_everything() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let two = ids(2);
        let selected = select_daily(date, two.clone());
        assert_eq!(selected.len(), 2);
        let a: HashSet<_> = two.iter().collect();
        let b: HashSet<_> = selected.iter().collect();
        assert_eq!(a, b);

        assert!(select_daily(date, Vec::new()).is_empty());
    }
}
