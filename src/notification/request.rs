//! 通知请求模型

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ATTR_MESSAGE: &str = "message";
pub const ATTR_TITLE: &str = "title";
pub const ATTR_TARGET: &str = "target";
pub const ATTR_DATA: &str = "data";

/// 标准通知字段
pub const STANDARD_FIELDS: [&str; 4] = [ATTR_MESSAGE, ATTR_TITLE, ATTR_TARGET, ATTR_DATA];

/// 控制参数：覆盖脚本名
pub const CONTROL_SCRIPT_SUFFIX: &str = "script_suffix";
/// 控制参数：覆盖字段映射
pub const CONTROL_SCRIPT_FIELDS: &str = "script_fields";

/// 控制参数只影响路由，永远不会出现在发给脚本的 payload 中
pub const CONTROL_PARAMETERS: [&str; 2] = [CONTROL_SCRIPT_SUFFIX, CONTROL_SCRIPT_FIELDS];

/// 是否为控制参数
pub fn is_control_parameter(key: &str) -> bool {
    CONTROL_PARAMETERS.contains(&key)
}

/// 是否为标准通知字段
pub fn is_standard_field(key: &str) -> bool {
    STANDARD_FIELDS.contains(&key)
}

/// 从 data 中移除控制参数（幂等）
pub fn strip_control_parameters(data: &mut Map<String, Value>) {
    for param in CONTROL_PARAMETERS {
        data.shift_remove(param);
    }
}

/// 入站通知请求
///
/// `extra` 收集调用方传入的非标准字段，反序列化时由 `#[serde(flatten)]` 自动填充。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// 消息内容（可以为空）
    #[serde(default)]
    pub message: String,
    /// 标题
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 目标
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// 结构化附加数据，缺省视为空 map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    /// 其他调用方字段
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotificationRequest {
    /// 创建只有消息内容的请求
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// 设置标题
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// 设置目标
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// 设置 data
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// 在 data 中插入一个键值
    pub fn with_data_entry(mut self, key: impl Into<String>, value: Value) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value);
        self
    }

    /// 添加额外字段
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }

    /// 保证 data 存在并返回可变引用
    pub fn data_mut(&mut self) -> &mut Map<String, Value> {
        self.data.get_or_insert_with(Map::new)
    }

    /// 需要转发的额外字段（排除标准字段和控制参数）
    pub fn forwarded_extra(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.extra
            .iter()
            .filter(|(key, _)| !is_standard_field(key) && !is_control_parameter(key))
    }
}
