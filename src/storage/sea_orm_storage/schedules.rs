//! 课表存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::schedules::{ActiveModel, Column, Entity as Schedules};
use crate::errors::Result;
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    schedules::{
        entities::Schedule,
        requests::{CreateScheduleRequest, ScheduleListQuery, UpdateScheduleRequest},
        responses::ScheduleListResponse,
    },
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};

impl SeaOrmStorage {
    pub async fn create_schedule_impl(
        &self,
        school_id: i64,
        req: CreateScheduleRequest,
    ) -> Result<Schedule> {
        let now = chrono::Utc::now().timestamp();

        let result = ActiveModel {
            school_id: Set(school_id),
            class_id: Set(req.class_id),
            subject_id: Set(req.subject_id),
            teacher_id: Set(req.teacher_id),
            weekday: Set(req.weekday),
            start_time: Set(req.start_time),
            end_time: Set(req.end_time),
            room: Set(req.room),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .map_err(|e| db_error("创建课表失败", e))?;

        Ok(result.into_schedule())
    }

    pub async fn get_schedule_by_id_impl(&self, id: i64) -> Result<Option<Schedule>> {
        let result = Schedules::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询课表失败", e))?;

        Ok(result.map(|m| m.into_schedule()))
    }

    /// 按星期、开始时间排序
    pub async fn list_schedules_with_pagination_impl(
        &self,
        school_id: i64,
        query: ScheduleListQuery,
    ) -> Result<ScheduleListResponse> {
        let (page, size) = normalize_page(query.page, query.size, 50);

        let mut select = Schedules::find().filter(Column::SchoolId.eq(school_id));
        if let Some(class_id) = query.class_id {
            select = select.filter(Column::ClassId.eq(class_id));
        }
        if let Some(teacher_id) = query.teacher_id {
            select = select.filter(Column::TeacherId.eq(teacher_id));
        }
        if let Some(weekday) = query.weekday {
            select = select.filter(Column::Weekday.eq(weekday));
        }

        let paginator = select
            .order_by_asc(Column::Weekday)
            .order_by_asc(Column::StartTime)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("查询课表总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("查询课表页数失败", e))?;
        let items = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("查询课表列表失败", e))?;

        Ok(ScheduleListResponse {
            items: items.into_iter().map(|m| m.into_schedule()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    pub async fn update_schedule_impl(
        &self,
        id: i64,
        update: UpdateScheduleRequest,
    ) -> Result<Option<Schedule>> {
        if self.get_schedule_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(teacher_id) = update.teacher_id {
            model.teacher_id = Set(Some(teacher_id));
        }
        if let Some(weekday) = update.weekday {
            model.weekday = Set(weekday);
        }
        if let Some(start_time) = update.start_time {
            model.start_time = Set(start_time);
        }
        if let Some(end_time) = update.end_time {
            model.end_time = Set(end_time);
        }
        if let Some(room) = update.room {
            model.room = Set(Some(room));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("更新课表失败", e))?;

        Ok(Some(result.into_schedule()))
    }

    pub async fn delete_schedule_impl(&self, id: i64) -> Result<bool> {
        let result = Schedules::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("删除课表失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
