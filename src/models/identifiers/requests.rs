use serde::Deserialize;

/// 登录标识同步请求
///
/// old_suffix 为空时以学校当前后缀为准；
/// 部分失败后重跑时学校已是新后缀，此时按成员当前标识逐个比对。
#[derive(Debug, Clone, Deserialize)]
pub struct SyncIdentifiersRequest {
    pub new_suffix: String,
    pub old_suffix: Option<String>,
}
