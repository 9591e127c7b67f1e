//! 成绩录入
//!
//! 单个录入与批量录入走同一条路径：先校验全部条目（分数范围、学生是否
//! 在考试所属班级、是否重复），全部通过后再逐条写入。

use std::collections::HashSet;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{GradeService, validate_score};
use crate::errors::{Result, SchoolHubError};
use crate::models::{
    ApiResponse,
    exams::entities::Exam,
    grades::{
        entities::Grade,
        requests::{BulkGradeEntry, BulkUpsertGradesRequest, UpsertGradeRequest},
        responses::BulkGradeResponse,
    },
};
use crate::services::exams::authorize_exam_writer;
use crate::services::{bad_request, error_response, school_context, try_response};
use crate::storage::Storage;

pub async fn upsert_grade(
    service: &GradeService,
    request: &HttpRequest,
    grade_data: UpsertGradeRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    let (exam, _) = try_response!(
        authorize_exam_writer(storage.as_ref(), &ctx, grade_data.exam_id).await
    );

    let entry = BulkGradeEntry {
        student_id: grade_data.student_id,
        score: grade_data.score,
        comment: grade_data.comment,
    };
    match record_grades(storage.as_ref(), &exam, vec![entry]).await {
        Ok(mut grades) => match grades.pop() {
            Some(grade) => Ok(HttpResponse::Ok().json(ApiResponse::success(
                grade,
                "Grade saved successfully",
            ))),
            None => Ok(bad_request("No grade saved")),
        },
        Err(e) => Ok(error_response("Failed to save grade", &e)),
    }
}

pub async fn bulk_upsert_grades(
    service: &GradeService,
    request: &HttpRequest,
    bulk: BulkUpsertGradesRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    let (exam, _) =
        try_response!(authorize_exam_writer(storage.as_ref(), &ctx, bulk.exam_id).await);
    if bulk.grades.is_empty() {
        return Ok(bad_request("Grade list cannot be empty"));
    }

    match record_grades(storage.as_ref(), &exam, bulk.grades).await {
        Ok(items) => {
            info!(
                "{} grades saved for exam {} in school {}",
                items.len(),
                exam.id,
                ctx.school_id
            );
            Ok(HttpResponse::Ok().json(ApiResponse::success(
                BulkGradeResponse {
                    exam_id: exam.id,
                    saved: items.len(),
                    items,
                },
                "Grades saved successfully",
            )))
        }
        Err(e) => Ok(error_response("Failed to save grades", &e)),
    }
}

/// 校验并写入一次考试的成绩，按 (考试, 学生) 覆盖已有记录
pub async fn record_grades(
    storage: &dyn Storage,
    exam: &Exam,
    entries: Vec<BulkGradeEntry>,
) -> Result<Vec<Grade>> {
    let roster: HashSet<i64> = storage
        .list_class_students(exam.class_id)
        .await?
        .into_iter()
        .map(|student| student.id)
        .collect();

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in &entries {
        validate_score(entry.score, exam.max_score).map_err(SchoolHubError::validation)?;
        if !roster.contains(&entry.student_id) {
            return Err(SchoolHubError::validation(format!(
                "Student {} is not enrolled in class {}",
                entry.student_id, exam.class_id
            )));
        }
        if !seen.insert(entry.student_id) {
            return Err(SchoolHubError::validation(format!(
                "Student {} appears more than once",
                entry.student_id
            )));
        }
    }

    let entries = entries
        .into_iter()
        .map(|entry| BulkGradeEntry {
            comment: entry
                .comment
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            ..entry
        })
        .collect();
    storage
        .upsert_grades(exam.school_id, exam.id, entries)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        classes::requests::CreateClassRequest, exams::requests::CreateExamRequest,
        grades::requests::GradeListQuery, subjects::requests::CreateSubjectRequest,
        users::entities::UserRole,
    };
    use crate::storage::sea_orm_storage::SeaOrmStorage;
    use crate::storage::sea_orm_storage::tests::{memory_storage, seed_member, seed_school};

    async fn seed_exam(storage: &SeaOrmStorage, school_id: i64) -> Exam {
        let class = storage
            .create_class(
                school_id,
                CreateClassRequest {
                    name: "5e B".to_string(),
                    level: None,
                    academic_year: "2025-2026".to_string(),
                    homeroom_teacher_id: None,
                },
            )
            .await
            .unwrap();
        let subject = storage
            .create_subject(
                school_id,
                CreateSubjectRequest {
                    class_id: class.id,
                    name: "Histoire".to_string(),
                    coefficient: 2.0,
                    teacher_id: None,
                },
            )
            .await
            .unwrap();
        storage
            .create_exam(
                school_id,
                CreateExamRequest {
                    class_id: class.id,
                    subject_id: subject.id,
                    title: "Devoir 1".to_string(),
                    term: 1,
                    exam_date: None,
                    max_score: Some(20.0),
                },
            )
            .await
            .unwrap()
    }

    fn entry(student_id: i64, score: Option<f64>) -> BulkGradeEntry {
        BulkGradeEntry {
            student_id,
            score,
            comment: None,
        }
    }

    async fn count_grades(storage: &SeaOrmStorage, school_id: i64, exam_id: i64) -> i64 {
        storage
            .list_grades_with_pagination(
                school_id,
                GradeListQuery {
                    exam_id: Some(exam_id),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .pagination
            .total
    }

    #[tokio::test]
    async fn test_bulk_is_all_or_nothing() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "lycee.sn").await;
        let exam = seed_exam(&storage, school.id).await;
        let a = seed_member(&storage, &school, UserRole::Student, Some(exam.class_id)).await;
        let b = seed_member(&storage, &school, UserRole::Student, Some(exam.class_id)).await;
        let outsider = seed_member(&storage, &school, UserRole::Student, None).await;

        let err = record_grades(
            &storage,
            &exam,
            vec![entry(a.id, Some(12.0)), entry(b.id, Some(21.0))],
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E007");

        let err = record_grades(
            &storage,
            &exam,
            vec![entry(a.id, Some(12.0)), entry(outsider.id, Some(10.0))],
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E007");

        let err = record_grades(
            &storage,
            &exam,
            vec![entry(a.id, Some(12.0)), entry(a.id, Some(13.0))],
        )
        .await
        .unwrap_err();
        assert_eq!(err.code(), "E007");

        assert_eq!(count_grades(&storage, school.id, exam.id).await, 0);
    }

    #[tokio::test]
    async fn test_upsert_overwrites_existing_grade() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "lycee.sn").await;
        let exam = seed_exam(&storage, school.id).await;
        let a = seed_member(&storage, &school, UserRole::Student, Some(exam.class_id)).await;
        let b = seed_member(&storage, &school, UserRole::Student, Some(exam.class_id)).await;

        let first = record_grades(
            &storage,
            &exam,
            vec![entry(a.id, Some(12.0)), entry(b.id, None)],
        )
        .await
        .unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[1].score, None);

        let second = record_grades(&storage, &exam, vec![entry(a.id, Some(15.5))])
            .await
            .unwrap();
        assert_eq!(second[0].id, first[0].id);
        assert_eq!(second[0].score, Some(15.5));
        assert_eq!(count_grades(&storage, school.id, exam.id).await, 2);
    }
}
