//! Payload 构建 - 将通知字段转换为脚本需要的形状
//!
//! 两种模式：
//!
//! - 无字段映射：payload 就是 `message` / `title` / `target` / `data` 加上额外字段，未设置的字段省略
//! - 有字段映射：映射原样作为 payload 顶层，原始通知字段移动到 `data.notifier_fields`
//!
//! ```json
//! {
//!   "message": "msg",
//!   "title": "heading",
//!   "data": {
//!     "custom_field": "value",
//!     "notifier_fields": { "message": "Hello", "title": "Test" }
//!   }
//! }
//! ```

use serde_json::{Map, Value};

use super::config::FieldMapping;
use super::request::{
    strip_control_parameters, NotificationRequest, ATTR_DATA, ATTR_MESSAGE, ATTR_TARGET,
    ATTR_TITLE,
};

/// 发给脚本的 payload（保持插入顺序）
pub type OutboundPayload = Map<String, Value>;

/// 原始通知字段在 data 中的位置
pub const NOTIFIER_FIELDS_KEY: &str = "notifier_fields";

/// 构建 payload
///
/// `field_mapping` 为空时走自然形状，否则走重映射。
/// `request.data` 中残留的控制参数会被再次剥离。
pub fn transform(request: &NotificationRequest, field_mapping: &FieldMapping) -> OutboundPayload {
    let mut data = request.data.clone().unwrap_or_default();
    strip_control_parameters(&mut data);

    if field_mapping.is_empty() {
        natural_payload(request, data)
    } else {
        remapped_payload(request, data, field_mapping)
    }
}

/// message / title / target 中有值的字段
fn present_fields(request: &NotificationRequest) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(ATTR_MESSAGE.to_string(), Value::String(request.message.clone()));
    if let Some(title) = &request.title {
        fields.insert(ATTR_TITLE.to_string(), Value::String(title.clone()));
    }
    if let Some(target) = &request.target {
        fields.insert(ATTR_TARGET.to_string(), Value::String(target.clone()));
    }
    fields
}

fn append_extra(fields: &mut Map<String, Value>, request: &NotificationRequest) {
    for (key, value) in request.forwarded_extra() {
        fields.insert(key.clone(), value.clone());
    }
}

fn natural_payload(request: &NotificationRequest, data: Map<String, Value>) -> OutboundPayload {
    let mut payload = present_fields(request);
    payload.insert(ATTR_DATA.to_string(), Value::Object(data));
    append_extra(&mut payload, request);
    payload
}

// data 的内容已经在 payload.data 顶层，notifier_fields 中不再重复
fn remapped_payload(
    request: &NotificationRequest,
    mut data: Map<String, Value>,
    field_mapping: &FieldMapping,
) -> OutboundPayload {
    let mut notifier_fields = present_fields(request);
    append_extra(&mut notifier_fields, request);

    data.insert(NOTIFIER_FIELDS_KEY.to_string(), Value::Object(notifier_fields));

    let mut payload = field_mapping.clone();
    payload.insert(ATTR_DATA.to_string(), Value::Object(data));
    payload
}
