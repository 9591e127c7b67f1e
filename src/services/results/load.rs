//! 从存储读取汇总所需数据

use std::collections::HashMap;

use super::aggregate::{self, TERMS};
use crate::errors::Result;
use crate::models::classes::entities::Class;
use crate::models::exams::entities::Exam;
use crate::models::results::entities::{AnnualResults, ClassResults, GradeRow, SubjectWeight};
use crate::storage::Storage;

async fn subject_weights(storage: &dyn Storage, class_id: i64) -> Result<Vec<SubjectWeight>> {
    Ok(storage
        .list_class_subjects(class_id)
        .await?
        .into_iter()
        .map(|subject| SubjectWeight {
            subject_id: subject.id,
            name: subject.name,
            coefficient: subject.coefficient,
        })
        .collect())
}

/// 某学期的成绩行，考试决定科目与满分
async fn grade_rows(storage: &dyn Storage, class_id: i64, term: i32) -> Result<Vec<GradeRow>> {
    let exams: HashMap<i64, Exam> = storage
        .list_class_exams(class_id, Some(term))
        .await?
        .into_iter()
        .map(|exam| (exam.id, exam))
        .collect();
    if exams.is_empty() {
        return Ok(Vec::new());
    }

    let exam_ids: Vec<i64> = exams.keys().copied().collect();
    let grades = storage.list_grades_for_exams(&exam_ids).await?;

    Ok(grades
        .into_iter()
        .filter_map(|grade| {
            exams.get(&grade.exam_id).map(|exam| GradeRow {
                student_id: grade.student_id,
                subject_id: exam.subject_id,
                score: grade.score,
                max_score: exam.max_score,
            })
        })
        .collect())
}

pub async fn load_term_results(
    storage: &dyn Storage,
    class: &Class,
    term: i32,
) -> Result<ClassResults> {
    let subjects = subject_weights(storage, class.id).await?;
    let students = storage.list_class_students(class.id).await?;
    let rows = grade_rows(storage, class.id, term).await?;

    let (students, statistics) = aggregate::term_results(&students, &subjects, &rows);

    Ok(ClassResults {
        class_id: class.id,
        class_name: class.name.clone(),
        academic_year: class.academic_year.clone(),
        term,
        subjects,
        students,
        statistics,
    })
}

pub async fn load_annual_results(storage: &dyn Storage, class: &Class) -> Result<AnnualResults> {
    let subjects = subject_weights(storage, class.id).await?;
    let students = storage.list_class_students(class.id).await?;
    let ids: Vec<i64> = students.iter().map(|s| s.id).collect();

    let mut term_averages = Vec::with_capacity(TERMS);
    for term in 1..=TERMS as i32 {
        let rows = grade_rows(storage, class.id, term).await?;
        let means = aggregate::subject_means(&rows);
        term_averages.push(aggregate::overall_averages(&ids, &subjects, &means));
    }

    let (students, statistics) = aggregate::annual_results(&students, &term_averages);

    Ok(AnnualResults {
        class_id: class.id,
        class_name: class.name.clone(),
        academic_year: class.academic_year.clone(),
        students,
        statistics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::exams::requests::CreateExamRequest;
    use crate::models::subjects::requests::CreateSubjectRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::tests::{memory_storage, seed_member, seed_school};

    async fn grade(
        storage: &dyn Storage,
        school_id: i64,
        exam_id: i64,
        student_id: i64,
        score: Option<f64>,
    ) {
        storage
            .upsert_grade(school_id, exam_id, student_id, score, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_term_and_annual_results_from_storage() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "lycee.sn").await;
        let class = storage
            .create_class(
                school.id,
                CreateClassRequest {
                    name: "3e B".to_string(),
                    level: Some("3e".to_string()),
                    academic_year: "2025-2026".to_string(),
                    homeroom_teacher_id: None,
                },
            )
            .await
            .unwrap();

        let a = seed_member(&storage, &school, UserRole::Student, Some(class.id)).await;
        let b = seed_member(&storage, &school, UserRole::Student, Some(class.id)).await;
        let c = seed_member(&storage, &school, UserRole::Student, Some(class.id)).await;
        // 班级外的学生不参与
        let outsider = seed_member(&storage, &school, UserRole::Student, None).await;

        let maths = storage
            .create_subject(
                school.id,
                CreateSubjectRequest {
                    class_id: class.id,
                    name: "Maths".to_string(),
                    coefficient: 3.0,
                    teacher_id: None,
                },
            )
            .await
            .unwrap();
        let french = storage
            .create_subject(
                school.id,
                CreateSubjectRequest {
                    class_id: class.id,
                    name: "Français".to_string(),
                    coefficient: 1.0,
                    teacher_id: None,
                },
            )
            .await
            .unwrap();

        let exam = |subject_id: i64, term: i32, max_score: f64| CreateExamRequest {
            class_id: class.id,
            subject_id,
            title: "Devoir".to_string(),
            term,
            exam_date: None,
            max_score: Some(max_score),
        };
        let maths_t1 = storage.create_exam(school.id, exam(maths.id, 1, 20.0)).await.unwrap();
        let french_t1 = storage.create_exam(school.id, exam(french.id, 1, 40.0)).await.unwrap();
        let maths_t2 = storage.create_exam(school.id, exam(maths.id, 2, 20.0)).await.unwrap();

        // a: maths 12, français 32/40 = 16 -> (36 + 16) / 4 = 13
        grade(&storage, school.id, maths_t1.id, a.id, Some(12.0)).await;
        grade(&storage, school.id, french_t1.id, a.id, Some(32.0)).await;
        // b: maths 16 -> 16
        grade(&storage, school.id, maths_t1.id, b.id, Some(16.0)).await;
        // c: 缺考
        grade(&storage, school.id, maths_t1.id, c.id, None).await;
        grade(&storage, school.id, maths_t1.id, outsider.id, Some(20.0)).await;

        grade(&storage, school.id, maths_t2.id, a.id, Some(17.0)).await;
        grade(&storage, school.id, maths_t2.id, c.id, Some(10.0)).await;

        let term1 = load_term_results(&storage, &class, 1).await.unwrap();
        assert_eq!(term1.subjects.len(), 2);
        assert_eq!(term1.students.len(), 3);
        assert_eq!(term1.students[0].student_id, b.id);
        assert_eq!(term1.students[0].average, Some(16.0));
        assert_eq!(term1.students[0].rank, Some(1));
        assert_eq!(term1.students[1].student_id, a.id);
        assert_eq!(term1.students[1].average, Some(13.0));
        assert_eq!(term1.students[2].student_id, c.id);
        assert_eq!(term1.students[2].rank, None);
        assert_eq!(term1.statistics.ranked, 2);
        assert_eq!(term1.statistics.unranked, 1);

        let annual = load_annual_results(&storage, &class).await.unwrap();
        // a: (13 + 17) / 2 = 15, b: 16, c: 10
        assert_eq!(annual.students[0].student_id, b.id);
        assert_eq!(annual.students[1].student_id, a.id);
        assert_eq!(annual.students[1].annual_average, Some(15.0));
        assert_eq!(
            annual.students[1].term_averages,
            vec![Some(13.0), Some(17.0), None]
        );
        assert_eq!(annual.students[2].student_id, c.id);
        assert_eq!(annual.students[2].rank, Some(3));
    }

    #[tokio::test]
    async fn test_term_without_exams_is_all_unranked() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "college.sn").await;
        let class = storage
            .create_class(
                school.id,
                CreateClassRequest {
                    name: "6e A".to_string(),
                    level: None,
                    academic_year: "2025-2026".to_string(),
                    homeroom_teacher_id: None,
                },
            )
            .await
            .unwrap();
        seed_member(&storage, &school, UserRole::Student, Some(class.id)).await;

        let results = load_term_results(&storage, &class, 3).await.unwrap();
        assert_eq!(results.students.len(), 1);
        assert_eq!(results.students[0].average, None);
        assert_eq!(results.statistics.average, None);
    }
}
