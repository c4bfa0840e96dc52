//! 查询请求类型
//!
//! 表格列表查询的统一请求结构，以及与 URL 查询串之间的互相转换。
//!
//! # 查询串格式
//!
//! ```text
//! ?cursor=abc&limit=10&sortBy=id&sortOrder=asc
//!  &searchQuery=btc&searchFields=symbol,name
//!  &filters[0][field]=status&filters[0][operator]=equals&filters[0][value]=open
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};

/// 默认每页数量
pub const DEFAULT_LIMIT: u32 = 10;
/// 每页数量上限
pub const MAX_LIMIT: u32 = 100;

/// 排序方向
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub const fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(AppError::invalid_query(format!(
                "sortOrder must be 'asc' or 'desc', got '{}'",
                other
            ))),
        }
    }
}

/// 过滤运算符
///
/// 运算语义 (大小写、类型转换) 由后端决定，这里只负责传递。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Equals,
    Contains,
    Gt,
    Lt,
    Gte,
    Lte,
    In,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 7] = [
        FilterOperator::Equals,
        FilterOperator::Contains,
        FilterOperator::Gt,
        FilterOperator::Lt,
        FilterOperator::Gte,
        FilterOperator::Lte,
        FilterOperator::In,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            FilterOperator::Equals => "equals",
            FilterOperator::Contains => "contains",
            FilterOperator::Gt => "gt",
            FilterOperator::Lt => "lt",
            FilterOperator::Gte => "gte",
            FilterOperator::Lte => "lte",
            FilterOperator::In => "in",
        }
    }
}

impl FromStr for FilterOperator {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::InvalidFilterOperator,
                    format!("Unsupported filter operator '{}'", s),
                )
                .with_detail("operator", s)
            })
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个过滤条件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOperator,
    /// 线上格式即字符串；`in` 运算使用逗号分隔的列表
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }

    pub fn equals(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(field, FilterOperator::Equals, value)
    }

    pub fn is_in<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(field, FilterOperator::In, joined)
    }
}

/// 列表查询请求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// 不透明游标，由上一页响应给出
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    /// 每页数量
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub search_fields: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

impl Default for QueryRequest {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

impl QueryRequest {
    pub fn new(limit: u32) -> Self {
        Self {
            cursor: None,
            limit,
            sort_by: None,
            sort_order: SortOrder::Asc,
            search_query: None,
            search_fields: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// 从游标继续
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    /// 添加排序
    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = order;
        self
    }

    /// 添加搜索
    pub fn search<I, S>(mut self, query: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.search_query = Some(query.into());
        self.search_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// 添加过滤条件
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// 实际使用的每页数量: 0 取默认值，超过上限截断
    pub fn effective_limit(&self) -> u32 {
        match self.limit {
            0 => DEFAULT_LIMIT,
            n => n.min(MAX_LIMIT),
        }
    }

    /// 编码为查询参数对 (顺序固定，便于比较与缓存)
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("cursor".to_string(), cursor.to_string()));
        }
        pairs.push(("limit".to_string(), self.effective_limit().to_string()));
        if let Some(sort_by) = self.sort_by.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("sortBy".to_string(), sort_by.to_string()));
        }
        pairs.push(("sortOrder".to_string(), self.sort_order.as_str().to_string()));
        if let Some(query) = self.search_query.as_deref().filter(|q| !q.is_empty()) {
            pairs.push(("searchQuery".to_string(), query.to_string()));
        }
        if !self.search_fields.is_empty() {
            pairs.push(("searchFields".to_string(), self.search_fields.join(",")));
        }
        for (i, filter) in self.filters.iter().enumerate() {
            pairs.push((format!("filters[{}][field]", i), filter.field.clone()));
            pairs.push((
                format!("filters[{}][operator]", i),
                filter.operator.as_str().to_string(),
            ));
            pairs.push((format!("filters[{}][value]", i), filter.value.clone()));
        }

        pairs
    }

    /// 从查询参数对解析，未知参数忽略
    pub fn from_query_pairs<I, K, V>(pairs: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut request = QueryRequest::default();
        let mut filters: BTreeMap<usize, PartialFilter> = BTreeMap::new();

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref();

            match key {
                "cursor" => request.cursor = non_empty(value),
                "limit" => {
                    request.limit = value.parse().map_err(|_| {
                        AppError::invalid_query(format!(
                            "limit must be a positive integer, got '{}'",
                            value
                        ))
                        .with_detail("field", "limit")
                    })?;
                }
                "sortBy" => request.sort_by = non_empty(value),
                "sortOrder" => request.sort_order = value.parse()?,
                "searchQuery" => request.search_query = non_empty(value),
                "searchFields" => {
                    request.search_fields = value
                        .split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(String::from)
                        .collect();
                }
                _ if key.starts_with("filters[") => {
                    let (index, part) = parse_filter_key(key)?;
                    let entry = filters.entry(index).or_default();
                    match part {
                        "field" => entry.field = Some(value.to_string()),
                        "operator" => entry.operator = Some(value.parse()?),
                        "value" => entry.value = Some(value.to_string()),
                        other => {
                            return Err(AppError::invalid_query(format!(
                                "Unknown filter attribute '{}'",
                                other
                            )));
                        }
                    }
                }
                _ => {}
            }
        }

        for (index, partial) in filters {
            let (Some(field), Some(operator)) = (partial.field, partial.operator) else {
                return Err(AppError::invalid_query(format!(
                    "filters[{}] requires both field and operator",
                    index
                )));
            };
            request.filters.push(Filter {
                field,
                operator,
                value: partial.value.unwrap_or_default(),
            });
        }

        Ok(request)
    }
}

#[derive(Default)]
struct PartialFilter {
    field: Option<String>,
    operator: Option<FilterOperator>,
    value: Option<String>,
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// `filters[3][operator]` → (3, "operator")
fn parse_filter_key(key: &str) -> AppResult<(usize, &str)> {
    let malformed = || AppError::invalid_query(format!("Malformed filter parameter '{}'", key));

    let rest = key.strip_prefix("filters[").ok_or_else(malformed)?;
    let (index, rest) = rest.split_once("][").ok_or_else(malformed)?;
    let part = rest.strip_suffix(']').ok_or_else(malformed)?;
    let index = index.parse::<usize>().map_err(|_| malformed())?;

    Ok((index, part))
}
