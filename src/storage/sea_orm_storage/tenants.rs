//! 租户级操作：整校删除与概览统计

use super::{SeaOrmStorage, db_error};
use crate::entity::{
    announcements, classes, exams, grades, lesson_logs, matricule_counters, payments, profiles,
    schedules, schools, subjects, users,
};
use crate::errors::Result;
use crate::models::{
    payments::entities::PaymentStatus,
    schools::responses::{SchoolStats, TenantDeletionReport},
    users::entities::UserRole,
};
use sea_orm::{
    ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use tracing::info;

impl SeaOrmStorage {
    /// 在一个事务内删除学校的全部数据，返回各表删除行数
    ///
    /// 先删叶子表再删被引用表，不依赖数据库的外键级联。
    pub async fn delete_school_cascade_impl(
        &self,
        school_id: i64,
    ) -> Result<Option<TenantDeletionReport>> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        if schools::Entity::find_by_id(school_id)
            .one(&txn)
            .await
            .map_err(|e| db_error("查询学校失败", e))?
            .is_none()
        {
            return Ok(None);
        }

        let mut report = TenantDeletionReport {
            school_id,
            ..Default::default()
        };

        report.grades = grades::Entity::delete_many()
            .filter(grades::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除成绩失败", e))?
            .rows_affected;

        report.exams = exams::Entity::delete_many()
            .filter(exams::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除考试失败", e))?
            .rows_affected;

        report.schedules = schedules::Entity::delete_many()
            .filter(schedules::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除课表失败", e))?
            .rows_affected;

        report.lesson_logs = lesson_logs::Entity::delete_many()
            .filter(lesson_logs::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除教学日志失败", e))?
            .rows_affected;

        report.subjects = subjects::Entity::delete_many()
            .filter(subjects::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除科目失败", e))?
            .rows_affected;

        report.announcements = announcements::Entity::delete_many()
            .filter(announcements::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除公告失败", e))?
            .rows_affected;

        report.payments = payments::Entity::delete_many()
            .filter(payments::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除缴费记录失败", e))?
            .rows_affected;

        report.profiles = profiles::Entity::delete_many()
            .filter(profiles::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除档案失败", e))?
            .rows_affected;

        report.users = users::Entity::delete_many()
            .filter(users::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除认证记录失败", e))?
            .rows_affected;

        report.matricule_counters = matricule_counters::Entity::delete_many()
            .filter(matricule_counters::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除学号计数器失败", e))?
            .rows_affected;

        report.classes = classes::Entity::delete_many()
            .filter(classes::Column::SchoolId.eq(school_id))
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除班级失败", e))?
            .rows_affected;

        schools::Entity::delete_by_id(school_id)
            .exec(&txn)
            .await
            .map_err(|e| db_error("删除学校失败", e))?;

        txn.commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))?;

        info!(
            "学校 {} 已删除: {} 个账号, {} 条成绩",
            school_id, report.users, report.grades
        );

        Ok(Some(report))
    }

    /// 学校概览统计
    pub async fn get_school_stats_impl(&self, school_id: i64) -> Result<SchoolStats> {
        let count_role = |role: &'static str| {
            profiles::Entity::find()
                .filter(profiles::Column::SchoolId.eq(school_id))
                .filter(profiles::Column::Role.eq(role))
                .count(&self.db)
        };

        let students = count_role(UserRole::STUDENT)
            .await
            .map_err(|e| db_error("统计学生失败", e))?;
        let teachers = count_role(UserRole::TEACHER)
            .await
            .map_err(|e| db_error("统计教师失败", e))?;
        let parents = count_role(UserRole::PARENT)
            .await
            .map_err(|e| db_error("统计家长失败", e))?;

        let classes = classes::Entity::find()
            .filter(classes::Column::SchoolId.eq(school_id))
            .count(&self.db)
            .await
            .map_err(|e| db_error("统计班级失败", e))?;

        let pending_payments = payments::Entity::find()
            .filter(payments::Column::SchoolId.eq(school_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Pending.to_string()))
            .count(&self.db)
            .await
            .map_err(|e| db_error("统计待缴费用失败", e))?;

        let paid_amounts: Vec<i64> = payments::Entity::find()
            .select_only()
            .column(payments::Column::AmountCents)
            .filter(payments::Column::SchoolId.eq(school_id))
            .filter(payments::Column::Status.eq(PaymentStatus::Paid.to_string()))
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(|e| db_error("统计已缴金额失败", e))?;

        Ok(SchoolStats {
            students,
            teachers,
            parents,
            classes,
            pending_payments,
            paid_amount_cents: paid_amounts.iter().sum(),
        })
    }
}
