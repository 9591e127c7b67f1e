use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::LessonLogService;
use crate::errors::{Result, SchoolHubError};
use crate::middlewares::SchoolContext;
use crate::models::{ApiResponse, lesson_logs::requests::CreateLessonLogRequest};
use crate::services::access::{can_teach, ensure_subject_of_class, ensure_teacher};
use crate::services::{error_response, forbidden, school_context, try_response};
use crate::storage::Storage;
use crate::utils::validate::validate_date;

pub async fn create_lesson_log(
    service: &LessonLogService,
    request: &HttpRequest,
    log: CreateLessonLogRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    if !ctx.role().is_staff() {
        return Ok(forbidden("Only staff can record lessons"));
    }

    let (teacher_id, log) = match prepare_lesson_log(storage.as_ref(), &ctx, log).await {
        Ok(prepared) => prepared,
        Err(e) => return Ok(error_response("Invalid lesson log", &e)),
    };

    match storage
        .create_lesson_log(ctx.school_id, teacher_id, log)
        .await
    {
        Ok(log) => {
            info!(
                "Lesson log {} recorded for class {} on {} by teacher {}",
                log.id, log.class_id, log.lesson_date, log.teacher_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                log,
                "Lesson log recorded successfully",
            )))
        }
        Err(e) => Ok(error_response("Failed to record lesson log", &e)),
    }
}

/// 校验日志内容并确定授课教师
async fn prepare_lesson_log(
    storage: &dyn Storage,
    ctx: &SchoolContext,
    mut log: CreateLessonLogRequest,
) -> Result<(i64, CreateLessonLogRequest)> {
    validate_date(&log.lesson_date).map_err(SchoolHubError::validation)?;
    log.topic = log.topic.trim().to_string();
    if log.topic.is_empty() {
        return Err(SchoolHubError::validation("Lesson topic cannot be empty"));
    }
    log.homework = log
        .homework
        .map(|h| h.trim().to_string())
        .filter(|h| !h.is_empty());

    let subject =
        ensure_subject_of_class(storage, ctx.school_id, log.class_id, log.subject_id).await?;

    let teacher_id = if ctx.is_admin() {
        let teacher_id = log.teacher_id.or(subject.teacher_id).ok_or_else(|| {
            SchoolHubError::validation("teacher_id is required when recording for a teacher")
        })?;
        ensure_teacher(storage, ctx.school_id, teacher_id).await?;
        teacher_id
    } else {
        let own_id = ctx
            .profile_id()
            .ok_or_else(|| SchoolHubError::authorization("Teacher profile required"))?;
        if log.teacher_id.is_some_and(|id| id != own_id) {
            return Err(SchoolHubError::authorization(
                "Teachers can only record their own lessons",
            ));
        }
        if !can_teach(ctx, &subject) {
            return Err(SchoolHubError::authorization(
                "You do not teach this subject",
            ));
        }
        own_id
    };

    Ok((teacher_id, log))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        classes::requests::CreateClassRequest, subjects::requests::CreateSubjectRequest,
        users::entities::UserRole,
    };
    use crate::storage::sea_orm_storage::tests::{memory_storage, seed_member, seed_school};

    async fn context_for(
        storage: &crate::storage::sea_orm_storage::SeaOrmStorage,
        profile_id: i64,
        school_id: i64,
    ) -> SchoolContext {
        let profile = storage.get_profile_by_id(profile_id).await.unwrap().unwrap();
        let user = storage.get_user_by_id(profile.user_id).await.unwrap().unwrap();
        SchoolContext {
            school_id,
            user,
            profile: Some(profile),
        }
    }

    #[tokio::test]
    async fn test_teacher_records_own_subject_only() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "lycee.sn").await;
        let owner = seed_member(&storage, &school, UserRole::Teacher, None).await;
        let other = seed_member(&storage, &school, UserRole::Teacher, None).await;
        let admin = seed_member(&storage, &school, UserRole::Admin, None).await;
        let class = storage
            .create_class(
                school.id,
                CreateClassRequest {
                    name: "3e A".to_string(),
                    level: None,
                    academic_year: "2025-2026".to_string(),
                    homeroom_teacher_id: None,
                },
            )
            .await
            .unwrap();
        let subject = storage
            .create_subject(
                school.id,
                CreateSubjectRequest {
                    class_id: class.id,
                    name: "SVT".to_string(),
                    coefficient: 2.0,
                    teacher_id: Some(owner.id),
                },
            )
            .await
            .unwrap();

        let log = || CreateLessonLogRequest {
            class_id: class.id,
            subject_id: subject.id,
            teacher_id: None,
            lesson_date: "2025-10-06".to_string(),
            topic: " La cellule ".to_string(),
            homework: Some(String::new()),
        };

        let ctx = context_for(&storage, owner.id, school.id).await;
        let (teacher_id, prepared) = prepare_lesson_log(&storage, &ctx, log()).await.unwrap();
        assert_eq!(teacher_id, owner.id);
        assert_eq!(prepared.topic, "La cellule");
        assert_eq!(prepared.homework, None);

        let ctx = context_for(&storage, other.id, school.id).await;
        let err = prepare_lesson_log(&storage, &ctx, log()).await.unwrap_err();
        assert_eq!(err.code(), "E012");

        // 管理员未指定教师时沿用科目的任课教师
        let ctx = context_for(&storage, admin.id, school.id).await;
        let (teacher_id, _) = prepare_lesson_log(&storage, &ctx, log()).await.unwrap();
        assert_eq!(teacher_id, owner.id);

        let mut bad_date = log();
        bad_date.lesson_date = "2025-13-01".to_string();
        assert!(prepare_lesson_log(&storage, &ctx, bad_date).await.is_err());
    }
}
