use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ClassService;
use crate::errors::{Result, SchoolHubError};
use crate::models::{ApiResponse, classes::requests::CreateClassRequest};
use crate::services::access::{ensure_teacher, require_admin};
use crate::services::{error_response, school_context, try_response};
use crate::storage::Storage;
use crate::utils::validate::{validate_academic_year, validate_name};

pub async fn create_class(
    service: &ClassService,
    request: &HttpRequest,
    class_data: CreateClassRequest,
) -> ActixResult<HttpResponse> {
    let storage = service.get_storage(request)?;
    let ctx = try_response!(school_context(request));
    try_response!(require_admin(&ctx, "create classes"));

    let class_data = match normalize_class(storage.as_ref(), ctx.school_id, class_data).await {
        Ok(data) => data,
        Err(e) => return Ok(error_response("Invalid class", &e)),
    };

    match storage.create_class(ctx.school_id, class_data).await {
        Ok(class) => {
            info!(
                "Class {} ({}) created in school {}",
                class.name, class.academic_year, ctx.school_id
            );
            Ok(HttpResponse::Created().json(ApiResponse::success(class, "Class created successfully")))
        }
        Err(e) => Ok(error_response("Class creation failed", &e)),
    }
}

/// 校验名称、学年与班主任
async fn normalize_class(
    storage: &dyn Storage,
    school_id: i64,
    mut class_data: CreateClassRequest,
) -> Result<CreateClassRequest> {
    class_data.name = class_data.name.trim().to_string();
    validate_name(&class_data.name).map_err(SchoolHubError::validation)?;
    validate_academic_year(&class_data.academic_year).map_err(SchoolHubError::validation)?;
    if let Some(teacher_id) = class_data.homeroom_teacher_id {
        ensure_teacher(storage, school_id, teacher_id).await?;
    }
    Ok(class_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::users::entities::UserRole;
    use crate::storage::sea_orm_storage::tests::{memory_storage, seed_member, seed_school};

    fn class_data(homeroom_teacher_id: Option<i64>) -> CreateClassRequest {
        CreateClassRequest {
            name: "  6e A ".to_string(),
            level: Some("6e".to_string()),
            academic_year: "2025-2026".to_string(),
            homeroom_teacher_id,
        }
    }

    #[tokio::test]
    async fn test_homeroom_teacher_must_teach_in_school() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "one.sn").await;
        let other = seed_school(&storage, "two.sn").await;
        let teacher = seed_member(&storage, &school, UserRole::Teacher, None).await;
        let foreign = seed_member(&storage, &other, UserRole::Teacher, None).await;
        let student = seed_member(&storage, &school, UserRole::Student, None).await;

        let data = normalize_class(&storage, school.id, class_data(Some(teacher.id)))
            .await
            .unwrap();
        assert_eq!(data.name, "6e A");

        for id in [foreign.id, student.id] {
            let err = normalize_class(&storage, school.id, class_data(Some(id)))
                .await
                .unwrap_err();
            assert_eq!(err.code(), "E007");
        }
    }

    #[tokio::test]
    async fn test_rejects_bad_academic_year() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "one.sn").await;
        let mut data = class_data(None);
        data.academic_year = "2025-2027".to_string();
        assert!(normalize_class(&storage, school.id, data).await.is_err());
    }

    #[tokio::test]
    async fn test_duplicate_class_is_conflict() {
        let storage = memory_storage().await;
        let school = seed_school(&storage, "one.sn").await;
        let first = normalize_class(&storage, school.id, class_data(None))
            .await
            .unwrap();
        storage.create_class(school.id, first).await.unwrap();

        let again = normalize_class(&storage, school.id, class_data(None))
            .await
            .unwrap();
        let err = storage.create_class(school.id, again).await.unwrap_err();
        assert_eq!(err.code(), "E013");
    }
}
