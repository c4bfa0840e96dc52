//! 表格列描述
//!
//! 列类型用带标签的枚举表达 (`{"kind": "number", "precision": 2}`)，
//! 渲染与过滤校验都对它做穷尽匹配。

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AppError, AppResult, ErrorCode};
use crate::query::{FilterOperator, QueryRequest};

/// 身份字段，总是允许排序 (游标分页的稳定次级键)
pub const IDENTITY_FIELD: &str = "id";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    pub value: String,
    pub label: String,
}

impl EnumOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// 列类型
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ColumnKind {
    Text,
    Number {
        #[serde(default)]
        precision: Option<u8>,
    },
    Enum {
        options: Vec<EnumOption>,
    },
    /// 引用其它集合，选项通过搜索接口预加载
    Select {
        endpoint: String,
        label_key: String,
        value_key: String,
    },
    Date,
    Boolean,
}

impl ColumnKind {
    /// 该列允许的过滤运算符
    pub fn operators(&self) -> &'static [FilterOperator] {
        use FilterOperator::*;
        match self {
            ColumnKind::Text => &[Equals, Contains, In],
            ColumnKind::Number { .. } | ColumnKind::Date => &[Equals, Gt, Lt, Gte, Lte],
            ColumnKind::Enum { .. } | ColumnKind::Select { .. } => &[Equals, In],
            ColumnKind::Boolean => &[Equals],
        }
    }
}

/// 列描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDescriptor {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: ColumnKind,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub filterable: bool,
    #[serde(default)]
    pub searchable: bool,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            sortable: false,
            filterable: false,
            searchable: false,
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, ColumnKind::Text)
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// 单元格显示文本
    pub fn display(&self, value: Option<&Value>) -> String {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return String::new();
        };

        match &self.kind {
            ColumnKind::Text | ColumnKind::Date => plain(value),
            ColumnKind::Number { precision } => match (value.as_f64(), precision) {
                (Some(n), Some(p)) => format!("{:.*}", *p as usize, n),
                _ => plain(value),
            },
            ColumnKind::Enum { options } => {
                let raw = plain(value);
                options
                    .iter()
                    .find(|o| o.value == raw)
                    .map(|o| o.label.clone())
                    .unwrap_or(raw)
            }
            // 关联记录可能已展开为对象
            ColumnKind::Select { label_key, .. } => match value {
                Value::Object(map) => map
                    .get(label_key)
                    .or_else(|| map.get("name"))
                    .map(plain)
                    .unwrap_or_default(),
                other => plain(other),
            },
            ColumnKind::Boolean => match value.as_bool() {
                Some(true) => "Yes".to_string(),
                Some(false) => "No".to_string(),
                None => plain(value),
            },
        }
    }
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// 按列配置校验查询: 排序列须可排序，过滤列须可过滤且运算符匹配列类型
pub fn validate_query(columns: &[ColumnDescriptor], request: &QueryRequest) -> AppResult<()> {
    if let Some(sort_by) = request.sort_by.as_deref()
        && sort_by != IDENTITY_FIELD
        && !columns.iter().any(|c| c.key == sort_by && c.sortable)
    {
        return Err(AppError::invalid_query(format!(
            "Column '{}' is not sortable",
            sort_by
        ))
        .with_detail("field", sort_by));
    }

    for field in &request.search_fields {
        if !columns.iter().any(|c| &c.key == field && c.searchable) {
            return Err(AppError::invalid_query(format!(
                "Column '{}' is not searchable",
                field
            ))
            .with_detail("field", field.as_str()));
        }
    }

    for filter in &request.filters {
        let column = columns
            .iter()
            .find(|c| c.key == filter.field && c.filterable)
            .ok_or_else(|| {
                AppError::invalid_query(format!("Column '{}' is not filterable", filter.field))
                    .with_detail("field", filter.field.as_str())
            })?;

        if !column.kind.operators().contains(&filter.operator) {
            return Err(AppError::with_message(
                ErrorCode::InvalidFilterOperator,
                format!(
                    "Operator '{}' is not supported on column '{}'",
                    filter.operator, filter.field
                ),
            )
            .with_detail("field", filter.field.as_str())
            .with_detail("operator", filter.operator.as_str()));
        }
    }

    Ok(())
}
