use serde::{Deserialize, Serialize};

/// 默认满分
pub const DEFAULT_MAX_SCORE: f64 = 20.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,
    pub school_id: i64,
    pub class_id: i64,
    pub subject_id: i64,
    pub title: String,
    // 学期 1..=3
    pub term: i32,
    // 考试日期 YYYY-MM-DD
    pub exam_date: Option<String>,
    pub max_score: f64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
