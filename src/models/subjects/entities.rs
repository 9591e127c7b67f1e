use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    pub id: i64,
    pub school_id: i64,
    pub class_id: i64,
    pub name: String,
    // 科目系数，用于加权平均
    pub coefficient: f64,
    // 任课教师档案ID
    pub teacher_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
