use serde::{Deserialize, Serialize};

/// 参与汇总的一条成绩行
#[derive(Debug, Clone, PartialEq)]
pub struct GradeRow {
    pub student_id: i64,
    pub subject_id: i64,
    pub score: Option<f64>,
    pub max_score: f64,
}

/// 科目及其系数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectWeight {
    pub subject_id: i64,
    pub name: String,
    pub coefficient: f64,
}

/// 学生在某科目的平均分
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubjectAverage {
    pub subject_id: i64,
    pub subject_name: String,
    pub coefficient: f64,
    // 无有效成绩时为空
    pub average: Option<f64>,
}

/// 学生学期成绩
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentResult {
    pub student_id: i64,
    pub matricule: Option<String>,
    pub full_name: String,
    pub subjects: Vec<SubjectAverage>,
    pub average: Option<f64>,
    pub rank: Option<usize>,
}

/// 班级统计（只统计有排名的学生）
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ClassStatistics {
    pub ranked: usize,
    pub unranked: usize,
    pub average: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassResults {
    pub class_id: i64,
    pub class_name: String,
    pub academic_year: String,
    pub term: i32,
    pub subjects: Vec<SubjectWeight>,
    pub students: Vec<StudentResult>,
    pub statistics: ClassStatistics,
}

/// 学生学年成绩
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnnualStudentResult {
    pub student_id: i64,
    pub matricule: Option<String>,
    pub full_name: String,
    // 下标 0..3 对应第 1..3 学期
    pub term_averages: Vec<Option<f64>>,
    pub annual_average: Option<f64>,
    pub rank: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnualResults {
    pub class_id: i64,
    pub class_name: String,
    pub academic_year: String,
    pub students: Vec<AnnualStudentResult>,
    pub statistics: ClassStatistics,
}
