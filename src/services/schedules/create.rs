use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ScheduleService;
use crate::errors::{Result, SchoolHubError};
use crate::models::{ApiResponse, schedules::requests::CreateScheduleRequest};
use crate::services::access::{ensure_subject_of_class, ensure_teacher, require_admin};
use crate::services::{error_response, school_context, try_response};
use crate::storage::Storage;
use crate::utils::validate::{validate_time_range, validate_weekday};

pub async fn create_schedule(
    service: &ScheduleService,
    request: &HttpRequest,
    schedule: CreateScheduleRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    try_response!(require_admin(&ctx, "manage schedules"));

    let schedule = match normalize_schedule(storage.as_ref(), ctx.school_id, schedule).await {
        Ok(schedule) => schedule,
        Err(e) => return Ok(error_response("Invalid schedule", &e)),
    };

    match storage.create_schedule(ctx.school_id, schedule).await {
        Ok(schedule) => {
            info!(
                "Schedule {} created for class {} (day {} {}-{})",
                schedule.id,
                schedule.class_id,
                schedule.weekday,
                schedule.start_time,
                schedule.end_time
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(
                schedule,
                "Schedule created successfully",
            )))
        }
        Err(e) => Ok(error_response("Schedule creation failed", &e)),
    }
}

/// 校验时段，并在未指定教师时沿用科目的任课教师
async fn normalize_schedule(
    storage: &dyn Storage,
    school_id: i64,
    mut schedule: CreateScheduleRequest,
) -> Result<CreateScheduleRequest> {
    validate_weekday(schedule.weekday).map_err(SchoolHubError::validation)?;
    validate_time_range(&schedule.start_time, &schedule.end_time)
        .map_err(SchoolHubError::validation)?;
    let subject =
        ensure_subject_of_class(storage, school_id, schedule.class_id, schedule.subject_id)
            .await?;
    match schedule.teacher_id {
        Some(teacher_id) => ensure_teacher(storage, school_id, teacher_id).await?,
        None => schedule.teacher_id = subject.teacher_id,
    }
    schedule.room = schedule
        .room
        .map(|room| room.trim().to_string())
        .filter(|room| !room.is_empty());
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        classes::requests::CreateClassRequest, subjects::requests::CreateSubjectRequest,
        users::entities::UserRole,
    };
    use crate::storage::sea_orm_storage::tests::{memory_storage, seed_member, seed_school};

    #[tokio::test]
    async fn test_schedule_inherits_subject_teacher() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "lycee.sn").await;
        let teacher = seed_member(&storage, &school, UserRole::Teacher, None).await;
        let class = storage
            .create_class(
                school.id,
                CreateClassRequest {
                    name: "4e C".to_string(),
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
                    name: "Anglais".to_string(),
                    coefficient: 1.0,
                    teacher_id: Some(teacher.id),
                },
            )
            .await
            .unwrap();

        let request = |start: &str, end: &str| CreateScheduleRequest {
            class_id: class.id,
            subject_id: subject.id,
            teacher_id: None,
            weekday: 2,
            start_time: start.to_string(),
            end_time: end.to_string(),
            room: Some("  ".to_string()),
        };

        let schedule = normalize_schedule(&storage, school.id, request("08:00", "10:00"))
            .await
            .unwrap();
        assert_eq!(schedule.teacher_id, Some(teacher.id));
        assert_eq!(schedule.room, None);

        let err = normalize_schedule(&storage, school.id, request("10:00", "08:00"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "E007");
    }
}
