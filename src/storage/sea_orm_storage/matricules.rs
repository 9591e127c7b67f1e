//! 学号发放
//!
//! 计数器在事务内用 `counter = counter + 1` 原子递增后读回，
//! 并发发放同一 (学校, 角色) 时得到互不相同且连续的序号。

use super::{SeaOrmStorage, db_error};
use crate::entity::matricule_counters::{ActiveModel, Column, Entity as MatriculeCounters};
use crate::entity::schools::Entity as Schools;
use crate::errors::{Result, SchoolHubError};
use crate::models::users::entities::UserRole;
use crate::utils::matricule::format_matricule;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use tracing::debug;

impl SeaOrmStorage {
    /// 为 (学校, 角色) 发放下一个学号
    pub async fn issue_matricule_impl(&self, school_id: i64, role: UserRole) -> Result<String> {
        if role.matricule_prefix().is_none() {
            return Err(SchoolHubError::validation(format!(
                "角色 {role} 不分配学号，管理员使用邮箱登录"
            )));
        }

        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| db_error("开启事务失败", e))?;

        // 递增必须是事务的第一条语句：SQLite 的只读快照无法升级为写锁
        let role_name = role.to_string();
        let updated = MatriculeCounters::update_many()
            .col_expr(Column::Counter, Expr::cust("counter + 1"))
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::Role.eq(role_name.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| db_error("递增学号计数器失败", e))?;

        let school = Schools::find_by_id(school_id)
            .one(&txn)
            .await
            .map_err(|e| db_error("查询学校失败", e))?
            .ok_or_else(|| SchoolHubError::not_found(format!("学校不存在: {school_id}")))?;

        if updated.rows_affected == 0 {
            // 早期创建的学校没有计数器行
            MatriculeCounters::insert(ActiveModel {
                school_id: Set(school_id),
                role: Set(role_name.clone()),
                counter: Set(1),
                ..Default::default()
            })
            .on_conflict(
                OnConflict::columns([Column::SchoolId, Column::Role])
                    .value(Column::Counter, Expr::cust("counter + 1"))
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(|e| db_error("创建学号计数器失败", e))?;
        }

        let counter = MatriculeCounters::find()
            .filter(Column::SchoolId.eq(school_id))
            .filter(Column::Role.eq(role_name.as_str()))
            .one(&txn)
            .await
            .map_err(|e| db_error("读取学号计数器失败", e))?
            .ok_or_else(|| SchoolHubError::database_operation("学号计数器丢失"))?
            .counter;

        txn.commit()
            .await
            .map_err(|e| db_error("提交事务失败", e))?;

        let matricule = format_matricule(&role, counter, &school.suffix)?;
        debug!("发放学号 {} (school={}, role={})", matricule, school_id, role_name);
        Ok(matricule)
    }
}
