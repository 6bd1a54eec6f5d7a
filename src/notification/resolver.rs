//! 路由解析 - 决定调用哪个脚本以及使用哪张字段映射
//!
//! 脚本名优先级：
//! 1. 请求 data 中的 `script_suffix`
//! 2. 配置中的 `script_suffix`
//! 3. 通知器名称
//!
//! 字段映射优先级：
//! 1. 请求 data 中的 `script_fields`
//! 2. 配置中的 `script_fields`
//! 3. 空映射（不做字段重映射）
//!
//! 每一级中，空字符串/空映射视为未设置。

use serde_json::{Map, Value};
use tracing::warn;

use super::config::{FieldMapping, NotifierConfig};
use super::request::{NotificationRequest, CONTROL_SCRIPT_FIELDS, CONTROL_SCRIPT_SUFFIX};

/// 解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedRouting {
    /// 要调用的脚本名，永远非空
    pub script_id: String,
    /// 字段映射，为空表示不重映射
    pub field_mapping: FieldMapping,
}

/// 可判断"空"的层级值
trait Blank {
    fn is_blank(&self) -> bool;
}

impl Blank for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl Blank for Map<String, Value> {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

/// 按顺序返回第一个非空层级
fn first_present<T: Blank>(tiers: impl IntoIterator<Item = Option<T>>) -> Option<T> {
    tiers.into_iter().flatten().find(|value| !value.is_blank())
}

/// 解析路由，并从请求 data 中移除控制参数
///
/// 调用后 `request.data` 一定为 `Some`，且不含 `script_suffix` / `script_fields`。
pub fn resolve(config: &NotifierConfig, request: &mut NotificationRequest) -> ResolvedRouting {
    let data = request.data_mut();
    let requested_suffix = data.shift_remove(CONTROL_SCRIPT_SUFFIX).and_then(suffix_override);
    let requested_fields = data.shift_remove(CONTROL_SCRIPT_FIELDS).and_then(fields_override);

    let script_id = first_present([requested_suffix, config.script_suffix.clone()])
        .unwrap_or_else(|| config.name.clone());

    let field_mapping = first_present([requested_fields, Some(config.script_fields.clone())])
        .unwrap_or_default();

    ResolvedRouting {
        script_id,
        field_mapping,
    }
}

fn suffix_override(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => None,
        other => {
            warn!(value = %other, "Ignoring non-string script_suffix in notification data");
            None
        }
    }
}

fn fields_override(value: Value) -> Option<FieldMapping> {
    match value {
        Value::Object(map) => Some(map),
        Value::Null => None,
        other => {
            warn!(value = %other, "Ignoring non-object script_fields in notification data");
            None
        }
    }
}
