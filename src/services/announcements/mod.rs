pub mod create;
pub mod detail;
pub mod list;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use crate::middlewares::SchoolContext;
use crate::models::announcements::{
    entities::{Announcement, Audience},
    requests::{AnnouncementQueryParams, CreateAnnouncementRequest, UpdateAnnouncementRequest},
};

crate::services::define_service!(AnnouncementService);

impl AnnouncementService {
    // 按调用者角色与班级过滤公告
    pub async fn list_announcements(
        &self,
        request: &HttpRequest,
        query: AnnouncementQueryParams,
    ) -> ActixResult<HttpResponse> {
        list::list_announcements(self, request, query).await
    }

    pub async fn create_announcement(
        &self,
        request: &HttpRequest,
        announcement: CreateAnnouncementRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_announcement(self, request, announcement).await
    }

    pub async fn get_announcement(
        &self,
        request: &HttpRequest,
        announcement_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_announcement(self, request, announcement_id).await
    }

    pub async fn update_announcement(
        &self,
        request: &HttpRequest,
        announcement_id: i64,
        update: UpdateAnnouncementRequest,
    ) -> ActixResult<HttpResponse> {
        detail::update_announcement(self, request, announcement_id, update).await
    }

    pub async fn delete_announcement(
        &self,
        request: &HttpRequest,
        announcement_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::delete_announcement(self, request, announcement_id).await
    }
}

/// 受众匹配角色，且班级公告只对该班级成员可见
pub(crate) fn can_view_announcement(
    ctx: &SchoolContext,
    announcement: &Announcement,
    member_classes: &[i64],
) -> bool {
    let role = ctx.role();
    if !Audience::visible_to(&role).contains(&announcement.audience) {
        return false;
    }
    if role.is_staff() {
        return true;
    }
    announcement
        .class_id
        .is_none_or(|class_id| member_classes.contains(&class_id))
}

/// 管理员或发布者本人
pub(crate) fn can_edit_announcement(ctx: &SchoolContext, announcement: &Announcement) -> bool {
    ctx.is_admin() || announcement.author_id == ctx.user.id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profiles::entities::Profile;
    use crate::models::users::entities::{User, UserRole, UserStatus};

    fn context(role: UserRole, user_id: i64) -> SchoolContext {
        let now = chrono::Utc::now();
        SchoolContext {
            school_id: 1,
            user: User {
                id: user_id,
                login: format!("user{user_id}"),
                email: None,
                password_hash: String::new(),
                role,
                status: UserStatus::Active,
                school_id: Some(1),
                last_login: None,
                created_at: now,
                updated_at: now,
            },
            profile: Some(Profile {
                id: user_id,
                user_id,
                school_id: 1,
                role,
                matricule: None,
                first_name: "Fatou".to_string(),
                last_name: "Sow".to_string(),
                phone: None,
                class_id: None,
                parent_id: None,
                created_at: now,
                updated_at: now,
            }),
        }
    }

    fn announcement(audience: Audience, class_id: Option<i64>) -> Announcement {
        let now = chrono::Utc::now();
        Announcement {
            id: 1,
            school_id: 1,
            author_id: 7,
            title: "Réunion".to_string(),
            body: "Vendredi 10h".to_string(),
            audience,
            class_id,
            pinned: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_visibility_follows_audience_and_class() {
        let student = context(UserRole::Student, 3);
        assert!(can_view_announcement(&student, &announcement(Audience::All, None), &[]));
        assert!(!can_view_announcement(
            &student,
            &announcement(Audience::Teachers, None),
            &[]
        ));
        assert!(can_view_announcement(
            &student,
            &announcement(Audience::Students, Some(4)),
            &[4]
        ));
        assert!(!can_view_announcement(
            &student,
            &announcement(Audience::Students, Some(5)),
            &[4]
        ));

        let teacher = context(UserRole::Teacher, 8);
        assert!(can_view_announcement(
            &teacher,
            &announcement(Audience::Teachers, Some(5)),
            &[]
        ));
        assert!(!can_view_announcement(
            &teacher,
            &announcement(Audience::Parents, None),
            &[]
        ));
    }

    #[test]
    fn test_only_admin_or_author_edits() {
        let item = announcement(Audience::All, None);
        assert!(can_edit_announcement(&context(UserRole::Teacher, 7), &item));
        assert!(!can_edit_announcement(&context(UserRole::Teacher, 8), &item));
        assert!(can_edit_announcement(&context(UserRole::Admin, 9), &item));
    }
}
