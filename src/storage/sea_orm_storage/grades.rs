//! 成绩存储操作

use super::{SeaOrmStorage, db_error};
use crate::entity::grades::{ActiveModel, Column, Entity as Grades};
use crate::errors::{Result, SchoolHubError};
use crate::models::{
    PaginationInfo,
    common::pagination::normalize_page,
    grades::{
        entities::Grade,
        requests::{BulkGradeEntry, GradeListQuery, UpdateGradeRequest},
        responses::GradeListResponse,
    },
};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

/// 在给定连接（或事务）上插入或覆盖一条成绩并读回
async fn upsert_grade_on<C: ConnectionTrait>(
    conn: &C,
    school_id: i64,
    exam_id: i64,
    student_id: i64,
    score: Option<f64>,
    comment: Option<String>,
) -> Result<Grade> {
    let now = chrono::Utc::now().timestamp();

    let model = ActiveModel {
        school_id: Set(school_id),
        exam_id: Set(exam_id),
        student_id: Set(student_id),
        score: Set(score),
        comment: Set(comment),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    Grades::insert(model)
        .on_conflict(
            OnConflict::columns([Column::ExamId, Column::StudentId])
                .update_columns([Column::Score, Column::Comment, Column::UpdatedAt])
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(|e| db_error("保存成绩失败", e))?;

    let saved = Grades::find()
        .filter(Column::ExamId.eq(exam_id))
        .filter(Column::StudentId.eq(student_id))
        .one(conn)
        .await
        .map_err(|e| db_error("查询成绩失败", e))?
        .ok_or_else(|| SchoolHubError::database_operation("成绩保存后未能读回"))?;

    Ok(saved.into_grade())
}

impl SeaOrmStorage {
    /// 按 (exam_id, student_id) 插入或覆盖成绩
    pub async fn upsert_grade_impl(
        &self,
        school_id: i64,
        exam_id: i64,
        student_id: i64,
        score: Option<f64>,
        comment: Option<String>,
    ) -> Result<Grade> {
        upsert_grade_on(&self.db, school_id, exam_id, student_id, score, comment).await
    }

    /// 一次考试的成绩在同一事务中写入，任一条失败则全部回滚
    pub async fn upsert_grades_impl(
        &self,
        school_id: i64,
        exam_id: i64,
        entries: Vec<BulkGradeEntry>,
    ) -> Result<Vec<Grade>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        let mut saved = Vec::with_capacity(entries.len());
        for entry in entries {
            saved.push(
                upsert_grade_on(
                    &txn,
                    school_id,
                    exam_id,
                    entry.student_id,
                    entry.score,
                    entry.comment,
                )
                .await?,
            );
        }

        txn.commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))?;
        Ok(saved)
    }

    pub async fn get_grade_by_id_impl(&self, id: i64) -> Result<Option<Grade>> {
        let result = Grades::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(|e| db_error("查询成绩失败", e))?;

        Ok(result.map(|m| m.into_grade()))
    }

    pub async fn list_grades_with_pagination_impl(
        &self,
        school_id: i64,
        query: GradeListQuery,
    ) -> Result<GradeListResponse> {
        let (page, size) = normalize_page(query.page, query.size, 50);

        let mut select = Grades::find().filter(Column::SchoolId.eq(school_id));
        if let Some(exam_id) = query.exam_id {
            select = select.filter(Column::ExamId.eq(exam_id));
        }
        if let Some(student_id) = query.student_id {
            select = select.filter(Column::StudentId.eq(student_id));
        }
        if let Some(student_ids) = query.student_ids {
            select = select.filter(Column::StudentId.is_in(student_ids));
        }

        let paginator = select
            .order_by_asc(Column::ExamId)
            .order_by_asc(Column::StudentId)
            .paginate(&self.db, size);
        let total = paginator
            .num_items()
            .await
            .map_err(|e| db_error("查询成绩总数失败", e))?;
        let pages = paginator
            .num_pages()
            .await
            .map_err(|e| db_error("查询成绩页数失败", e))?;
        let grades = paginator
            .fetch_page(page - 1)
            .await
            .map_err(|e| db_error("查询成绩列表失败", e))?;

        Ok(GradeListResponse {
            items: grades.into_iter().map(|m| m.into_grade()).collect(),
            pagination: PaginationInfo::new(page, size, total, pages),
        })
    }

    /// 多场考试的全部成绩
    pub async fn list_grades_for_exams_impl(&self, exam_ids: &[i64]) -> Result<Vec<Grade>> {
        if exam_ids.is_empty() {
            return Ok(Vec::new());
        }

        let grades = Grades::find()
            .filter(Column::ExamId.is_in(exam_ids.iter().copied()))
            .order_by_asc(Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| db_error("查询考试成绩失败", e))?;

        Ok(grades.into_iter().map(|m| m.into_grade()).collect())
    }

    /// 更新成绩；score 为空表示缺考，会覆盖原分数
    pub async fn update_grade_impl(
        &self,
        id: i64,
        update: UpdateGradeRequest,
    ) -> Result<Option<Grade>> {
        if self.get_grade_by_id_impl(id).await?.is_none() {
            return Ok(None);
        }

        let mut model = ActiveModel {
            id: Set(id),
            score: Set(update.score),
            updated_at: Set(chrono::Utc::now().timestamp()),
            ..Default::default()
        };
        if let Some(comment) = update.comment {
            model.comment = Set(Some(comment));
        }

        let result = model
            .update(&self.db)
            .await
            .map_err(|e| db_error("更新成绩失败", e))?;

        Ok(Some(result.into_grade()))
    }

    pub async fn delete_grade_impl(&self, id: i64) -> Result<bool> {
        let result = Grades::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| db_error("删除成绩失败", e))?;

        Ok(result.rows_affected > 0)
    }
}
