//! 查询响应与后端信封

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// 游标分页信息 (由后端给出，客户端不重新计算)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub prev_cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<u64>,
}

impl Pagination {
    /// 没有更多数据时 nextCursor 必须为 null
    pub fn normalized(mut self) -> Self {
        if !self.has_more {
            self.next_cursor = None;
        }
        self
    }

    /// 单页结果
    pub fn single_page(total_count: u64) -> Self {
        Self {
            has_more: false,
            next_cursor: None,
            prev_cursor: None,
            total_count: Some(total_count),
        }
    }
}

/// 规范化后的分页查询响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse<T = Value> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> QueryResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            data,
            pagination: pagination.normalized(),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), Pagination::single_page(0))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// 后端返回的错误
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BackendError {
    #[serde(default, deserialize_with = "string_or_number")]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<Value>,
}

impl BackendError {
    /// 后端是否以 "not found" 拒绝
    pub fn is_not_found(&self) -> bool {
        self.code
            .as_deref()
            .is_some_and(|c| c.eq_ignore_ascii_case("NOT_FOUND") || c == "404")
    }
}

/// 后端响应信封
///
/// ```json
/// { "success": true, "data": [...], "pagination": { "hasMore": true, "nextCursor": "..." } }
/// { "success": false, "error": { "code": "NOT_FOUND", "message": "...", "details": {} } }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<BackendError>,
}

impl<T> BackendEnvelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: None,
            error: None,
        }
    }

    pub fn page(data: T, pagination: Pagination) -> Self {
        Self {
            success: true,
            data: Some(data),
            pagination: Some(pagination),
            error: None,
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            pagination: None,
            error: Some(BackendError {
                code: Some(code.into()),
                message: Some(message.into()),
                details: None,
            }),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Null) | None => None,
        Some(other) => Some(other.to_string()),
    })
}
