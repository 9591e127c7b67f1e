//! 教学日志存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::lesson_logs::{ActiveModel, Column, Entity as LessonLogs};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    lesson_logs::{
        entities::LessonLog,
        requests::{CreateLessonLogRequest, LessonLogListQuery, UpdateLessonLogRequest},
        responses::LessonLogListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_lesson_log_impl(
        &self,
        school_id: i64,
        teacher_id: i64,
        req: CreateLessonLogRequest,
    ) -> Result<LessonLog> {
        let now = chrono::Utc::now().timestamp();

        let result = ActiveModel {
            school_id: Set(school_id),
            class_id: Set(req.class_id),
            subject_id: Set(req.subject_id),
            teacher_id: Set(teacher_id),
            lesson_date: Set(req.lesson_date),
            topic: Set(req.topic),
            homework: Set(req.homework),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("创建教学日志失败", e))?;

        Ok(result.into_lesson_log())
    }

    pub async fn get_lesson_log_by_id_impl(&self, id: i64) -> Result<Option<LessonLog>> {
        let result = LessonLogs::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询教学日志失败", e))?;

        Ok(result.map(|m| m.into_lesson_log()))
    }

    /// 日期区间为闭区间，`YYYY-MM-DD` 可按字符串比较
    pub async fn list_lesson_logs_with_pagination_impl(
        &self,
        school_id: i64,
        query: LessonLogListQuery,
    ) -> Result<LessonLogListResponse> {
        let (page, size) = normalize_page(query.page, query.size, 20);

        let mut select = LessonLogs::find().filter(Column::SchoolId.eq(school_id));
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(subject_id) = query.subject_id {
            select = select.filter(Column::SubjectId.eq(subject_id));
        }
        if let Some(from) = query.from {
            select = select.filter(Column::LessonDate.gte(from));
        }
        if let Some(to) = query.to {
            select = select.filter(Column::LessonDate.lte(to));
        }

        let paginator = select
            .order_by_desc(Column::LessonDate)
            .order_by_desc(Column::Id)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("查询教学日志总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("查询教学日志页数失败", e))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("查询教学日志列表失败", e))?;

        Ok(LessonLogListResponse {
            items: items.into_iter().map(|m| m.into_lesson_log()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_lesson_log_impl(
        &self,
        id: i64,
        update: UpdateLessonLogRequest,
    ) -> Result<Option<LessonLog>> {
        if self.get_lesson_log_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(lesson_date) = update.lesson_date {
            model.lesson_date = Set(lesson_date);
        }
        if let Some(topic) = update.topic {
            model.topic = Set(topic);
        }
        if let Some(homework) = update.homework {
            model.homework = Set(Some(homework));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("更新教学日志失败", e))?;

        Ok(Some(result.into_lesson_log()))
    }

    pub async fn delete_lesson_log_impl(&self, id: i64) -> Result<bool> {
        let result = LessonLogs::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("删除教学日志失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
