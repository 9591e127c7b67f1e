//! 公告存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::announcements::{ActiveModel, Column, Entity as Announcements};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    announcements::{
        entities::Announcement,
        requests::{AnnouncementListQuery, CreateAnnouncementRequest, UpdateAnnouncementRequest},
        responses::AnnouncementListResponse,
    },
    common::pagination::normalize_page,
};
use crate::utils::escape_like_pattern;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    Set,
};

impl SeaOrmStorage {
    pub async fn create_announcement_impl(
        &self,
        school_id: i64,
        author_id: i64,
        req: CreateAnnouncementRequest,
    ) -> Result<Announcement> {
        let now = chrono::Utc::now().timestamp();

        let result = ActiveModel {
            school_id: Set(school_id),
            author_id: Set(author_id),
            title: Set(req.title),
            body: Set(req.body),
            audience: Set(req.audience.to_string()),
            class_id: Set(req.class_id),
            pinned: Set(req.pinned),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("创建公告失败", e))?;

        Ok(result.into_announcement())
    }

    pub async fn get_announcement_by_id_impl(&self, id: i64) -> Result<Option<Announcement>> {
        let result = Announcements::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询公告失败", e))?;

        Ok(result.map(|m| m.into_announcement()))
    }

    /// 分页列出公告，置顶优先、新发布优先
    pub async fn list_announcements_with_pagination_impl(
        &self,
        school_id: i64,
        query: AnnouncementListQuery,
    ) -> Result<AnnouncementListResponse> {
        let (page, size) = normalize_page(query.page, query.size, 20);

        let mut select = Announcements::find().filter(Column::SchoolId.eq(school_id));

        if !query.audiences.is_empty() {
            select = select.filter(
                Column::Audience.is_in(query.audiences.iter().map(|a| a.to_string())),
            );
        }
        if let Some(class_ids) = query.class_ids {
            // 指定班级的公告 + 全校公告
            select = select.filter(
                Condition::any()
                    .add(Column::ClassId.is_in(class_ids))
                    .add(Column::ClassId.is_null()),
            );
        }
        if let Some(ref search) = query.search
            && !search.trim().is_empty()
        {
            let escaped = escape_like_pattern(search.trim());
            select = select.filter(
                Condition::any()
                    .add(Column::Title.contains(&escaped))
                    .add(Column::Body.contains(&escaped)),
            );
        }

        let paginator = select
            .order_by_desc(Column::Pinned)
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("查询公告总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("查询公告页数失败", e))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("查询公告列表失败", e))?;

        Ok(AnnouncementListResponse {
            items: items.into_iter().map(|m| m.into_announcement()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_announcement_impl(
        &self,
        id: i64,
        update: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>> {
        if self.get_announcement_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(title) = update.title {
            model.title = Set(title);
        }
        if let Some(body) = update.body {
            model.body = Set(body);
        }
        if let Some(audience) = update.audience {
            model.audience = Set(audience.to_string());
        }
        if let Some(pinned) = update.pinned {
            model.pinned = Set(pinned);
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("更新公告失败", e))?;

        Ok(Some(result.into_announcement()))
    }

    pub async fn delete_announcement_impl(&self, id: i64) -> Result<bool> {
        let result = Announcements::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("删除公告失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
