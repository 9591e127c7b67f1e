use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::{SubjectService, validate_coefficient};
use crate::errors::{Result, SchoolHubError};
use crate::models::{ApiResponse, subjects::requests::CreateSubjectRequest};
use crate::services::access::{ensure_class, ensure_teacher, require_admin};
use crate::services::{error_response, school_context, try_response};
use crate::storage::Storage;
use crate::utils::validate::validate_name;

pub async fn create_subject(
    service: &SubjectService,
    request: &HttpRequest,
    subject_data: CreateSubjectRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    try_response!(require_admin(&ctx, "create subjects"));

    let subject_data = match normalize_subject(storage.as_ref(), ctx.school_id, subject_data).await
    {
        Ok(data) => data,
        Err(e) => return Ok(error_response("Invalid subject", &e)),
    };

    match storage.create_subject(ctx.school_id, subject_data).await {
        Ok(subject) => {
            info!(
                "Subject {} created for class {} in school {}",
                subject.name, subject.class_id, ctx.school_id
            );
            Ok(HttpResponse::Created()
                .json(ApiResponse::success(subject, "Subject created successfully")))
        }
        Err(e) => Ok(error_response("Subject creation failed", &e)),
    }
}

async fn normalize_subject(
    storage: &dyn Storage,
    school_id: i64,
    mut subject_data: CreateSubjectRequest,
) -> Result<CreateSubjectRequest> {
    subject_data.name = subject_data.name.trim().to_string();
    validate_name(&subject_data.name).map_err(SchoolHubError::validation)?;
    validate_coefficient(subject_data.coefficient).map_err(SchoolHubError::validation)?;
    ensure_class(storage, school_id, subject_data.class_id).await?;
    if let Some(teacher_id) = subject_data.teacher_id {
        ensure_teacher(storage, school_id, teacher_id).await?;
    }
    Ok(subject_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::classes::requests::CreateClassRequest;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::tests::{memory_storage, seed_member, seed_school};

    #[tokio::test]
    async fn test_subject_must_use_local_class_and_teacher() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "one.sn").await;
        let other = seed_school(&storage, "two.sn").await;
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
        let teacher = seed_member(&storage, &school, UserRole::Teacher, None).await;

        let data = |class_id, teacher_id, coefficient| CreateSubjectRequest {
            class_id,
            name: " Maths ".to_string(),
            coefficient,
            teacher_id,
        };

        let ok = normalize_subject(&storage, school.id, data(class.id, Some(teacher.id), 4.0))
            .await
            .unwrap();
        assert_eq!(ok.name, "Maths");

        // 其他学校看不到本校班级
        assert!(
            normalize_subject(&storage, other.id, data(class.id, None, 4.0))
                .await
                .is_err()
        );
        assert!(
            normalize_subject(&storage, school.id, data(class.id, None, 0.0))
                .await
                .is_err()
        );
    }
}
