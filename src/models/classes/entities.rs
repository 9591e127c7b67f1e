use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Class {
    // 班级ID
    pub id: i64,
    pub school_id: i64,
    // 班级名称
    pub name: String,
    // 年级，例如 "6e"、"Terminale"
    pub level: Option<String>,
    // 学年，格式 YYYY-YYYY
    pub academic_year: String,
    // 班主任档案ID
    pub homeroom_teacher_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
