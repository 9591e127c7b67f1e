use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    pub id: i64,
    pub school_id: i64,
    pub exam_id: i64,
    // 学生档案ID
    pub student_id: i64,
    // 分数，None 表示缺考或未评分，不计入平均分
    pub score: Option<f64>,
    pub comment: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
