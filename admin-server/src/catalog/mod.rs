//! 表格目录
//!
//! 每个资源一份 [`TableConfig`]: 对应的 tab、后端端点、列、搜索字段、
//! 默认排序，以及集合为空时用于自动填充的示例记录。

use serde::Serialize;
use serde_json::{Value, json};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::query::{QueryRequest, SortOrder};
use shared::table::{ColumnDescriptor, ColumnKind, EnumOption, IDENTITY_FIELD, validate_query};

/// 单个资源的表格配置
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TableConfig {
    /// 资源名，同时是 tab id 与页面路径 (`/{resource}`)
    pub resource: String,
    pub title: String,
    /// 后端端点 (相对 BACKEND_API_URL)
    pub endpoint: String,
    pub columns: Vec<ColumnDescriptor>,
    pub search_fields: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_sort: Option<(String, SortOrder)>,
    #[serde(skip)]
    pub sample_record: Option<Value>,
}

impl TableConfig {
    pub fn new(resource: &str, title: &str, columns: Vec<ColumnDescriptor>) -> Self {
        let search_fields = columns
            .iter()
            .filter(|c| c.searchable)
            .map(|c| c.key.clone())
            .collect();

        Self {
            resource: resource.to_string(),
            title: title.to_string(),
            endpoint: format!("/{}", resource),
            columns,
            search_fields,
            default_sort: None,
            sample_record: None,
        }
    }

    pub fn sorted_by(mut self, field: &str, order: SortOrder) -> Self {
        self.default_sort = Some((field.to_string(), order));
        self
    }

    pub fn with_sample(mut self, record: Value) -> Self {
        self.sample_record = Some(record);
        self
    }

    pub fn action(&self, verb: &str) -> String {
        format!("{}.{}", self.resource, verb)
    }

    /// 请求未指定排序时套用默认排序
    pub fn apply_defaults(&self, mut request: QueryRequest) -> QueryRequest {
        if request.sort_by.is_none()
            && let Some((field, order)) = &self.default_sort
        {
            request.sort_by = Some(field.clone());
            request.sort_order = *order;
        }
        request
    }

    /// 解析查询参数: 默认排序 + 按列校验
    pub fn parse_query<I, K, V>(&self, pairs: I) -> AppResult<QueryRequest>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let request = self.apply_defaults(QueryRequest::from_query_pairs(pairs)?);
        validate_query(&self.columns, &request)?;
        Ok(request)
    }

    /// 渲染一行: 每列的显示文本
    pub fn render_row(&self, record: &Value) -> TableRow {
        let id = match record.get(IDENTITY_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        };
        let cells = self
            .columns
            .iter()
            .map(|c| c.display(record.get(&c.key)))
            .collect();

        TableRow {
            id,
            cells,
            record: record.clone(),
        }
    }
}

/// 渲染后的表格行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<String>,
    pub record: Value,
}

fn select(key: &str, label: &str, endpoint: &str, label_key: &str) -> ColumnDescriptor {
    ColumnDescriptor::new(
        key,
        label,
        ColumnKind::Select {
            endpoint: endpoint.to_string(),
            label_key: label_key.to_string(),
            value_key: "id".to_string(),
        },
    )
}

fn number(key: &str, label: &str, precision: Option<u8>) -> ColumnDescriptor {
    ColumnDescriptor::new(key, label, ColumnKind::Number { precision })
}

fn enumeration(key: &str, label: &str, options: &[(&str, &str)]) -> ColumnDescriptor {
    ColumnDescriptor::new(
        key,
        label,
        ColumnKind::Enum {
            options: options
                .iter()
                .map(|(value, label)| EnumOption::new(*value, *label))
                .collect(),
        },
    )
}

fn date(key: &str, label: &str) -> ColumnDescriptor {
    ColumnDescriptor::new(key, label, ColumnKind::Date)
}

fn boolean(key: &str, label: &str) -> ColumnDescriptor {
    ColumnDescriptor::new(key, label, ColumnKind::Boolean)
}

/// 全部表格配置
#[derive(Debug, Clone)]
pub struct TableCatalog {
    tables: Vec<TableConfig>,
}

impl TableCatalog {
    pub fn new(tables: Vec<TableConfig>) -> Self {
        Self { tables }
    }

    pub fn get(&self, resource: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|t| t.resource == resource)
    }

    pub fn require(&self, resource: &str) -> AppResult<&TableConfig> {
        self.get(resource).ok_or_else(|| {
            AppError::with_message(
                ErrorCode::TableNotFound,
                format!("Table '{}' does not exist", resource),
            )
            .with_detail("resource", resource)
        })
    }

    pub fn tables(&self) -> &[TableConfig] {
        &self.tables
    }

    /// 内置目录
    pub fn builtin() -> Self {
        let assets = TableConfig::new(
            "assets",
            "Assets",
            vec![
                ColumnDescriptor::text("symbol", "Symbol").sortable().searchable(),
                ColumnDescriptor::text("name", "Name").sortable().searchable(),
                enumeration(
                    "assetClass",
                    "Class",
                    &[
                        ("equity", "Equity"),
                        ("option", "Option"),
                        ("future", "Future"),
                        ("fx", "FX"),
                        ("crypto", "Crypto"),
                    ],
                )
                .filterable(),
                ColumnDescriptor::text("exchange", "Exchange").filterable(),
                boolean("active", "Active").filterable(),
                date("createdAt", "Created").sortable(),
            ],
        )
        .sorted_by("symbol", SortOrder::Asc)
        .with_sample(json!({
            "symbol": "AAPL",
            "name": "Apple Inc.",
            "assetClass": "equity",
            "exchange": "NASDAQ",
            "active": true
        }));

        let brokers = TableConfig::new(
            "brokers",
            "Brokers",
            vec![
                ColumnDescriptor::text("name", "Name").sortable().searchable(),
                ColumnDescriptor::text("code", "Code").sortable().searchable(),
                enumeration(
                    "region",
                    "Region",
                    &[("us", "US"), ("eu", "EU"), ("apac", "APAC")],
                )
                .filterable(),
                boolean("active", "Active").filterable(),
                date("createdAt", "Created").sortable(),
            ],
        )
        .sorted_by("name", SortOrder::Asc)
        .with_sample(json!({
            "name": "Interactive Brokers",
            "code": "IBKR",
            "region": "us",
            "active": true
        }));

        let trades = TableConfig::new(
            "trades",
            "Trades",
            vec![
                select("assetId", "Asset", "/assets", "symbol").filterable(),
                select("brokerId", "Broker", "/brokers", "name").filterable(),
                enumeration("side", "Side", &[("buy", "Buy"), ("sell", "Sell")]).filterable(),
                number("quantity", "Quantity", None).sortable().filterable(),
                number("price", "Price", Some(2)).sortable().filterable(),
                enumeration(
                    "status",
                    "Status",
                    &[
                        ("pending", "Pending"),
                        ("filled", "Filled"),
                        ("cancelled", "Cancelled"),
                    ],
                )
                .filterable(),
                ColumnDescriptor::text("reference", "Reference").searchable(),
                date("tradedAt", "Traded").sortable().filterable(),
            ],
        )
        .sorted_by("tradedAt", SortOrder::Desc);

        let broker_keys = TableConfig::new(
            "broker-keys",
            "Broker Keys",
            vec![
                select("brokerId", "Broker", "/brokers", "name").filterable(),
                ColumnDescriptor::text("label", "Label").sortable().searchable(),
                ColumnDescriptor::text("keyPrefix", "Key"),
                boolean("active", "Active").filterable(),
                date("expiresAt", "Expires").sortable().filterable(),
            ],
        )
        .sorted_by("label", SortOrder::Asc);

        let users = TableConfig::new(
            "users",
            "Users",
            vec![
                ColumnDescriptor::text("email", "Email").sortable().searchable(),
                ColumnDescriptor::text("name", "Name").sortable().searchable(),
                enumeration(
                    "role",
                    "Role",
                    &[
                        ("super_admin", "Super Admin"),
                        ("admin", "Admin"),
                        ("user", "User"),
                    ],
                )
                .filterable(),
                boolean("active", "Active").filterable(),
                date("createdAt", "Created").sortable(),
            ],
        )
        .sorted_by("email", SortOrder::Asc);

        let option_buffers = TableConfig::new(
            "option-buffers",
            "Option Buffers",
            vec![
                select("assetId", "Asset", "/assets", "symbol").filterable(),
                ColumnDescriptor::text("name", "Name").sortable().searchable(),
                number("bufferPct", "Buffer %", Some(2)).sortable().filterable(),
                number("minPremium", "Min Premium", Some(2)).sortable(),
                number("maturityDays", "Maturity (days)", None).sortable().filterable(),
                date("updatedAt", "Updated").sortable(),
            ],
        )
        .sorted_by("name", SortOrder::Asc)
        .with_sample(json!({
            "name": "Default buffer",
            "bufferPct": 10.0,
            "minPremium": 0.5,
            "maturityDays": 30
        }));

        Self::new(vec![assets, brokers, trades, broker_keys, users, option_buffers])
    }
}

impl Default for TableCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::query::FilterOperator;
    use shared::rbac::PermissionRegistry;

    #[test]
    fn test_every_table_has_a_tab_and_actions() {
        let registry = PermissionRegistry::builtin();
        for table in TableCatalog::builtin().tables() {
            assert!(registry.tab(&table.resource).is_some(), "{}", table.resource);
            for verb in ["view", "create", "update", "delete"] {
                assert!(
                    registry.action_roles(&table.action(verb)).is_some(),
                    "{}",
                    table.action(verb)
                );
            }
        }
    }

    #[test]
    fn test_default_sort_is_valid() {
        for table in TableCatalog::builtin().tables() {
            let request = table.apply_defaults(QueryRequest::default());
            assert!(validate_query(&table.columns, &request).is_ok(), "{}", table.resource);
        }
    }

    #[test]
    fn test_search_fields_follow_columns() {
        let catalog = TableCatalog::builtin();
        let assets = catalog.get("assets").unwrap();
        assert_eq!(assets.search_fields, vec!["symbol", "name"]);
        assert_eq!(assets.endpoint, "/assets");
        assert!(assets.sample_record.is_some());
        assert!(catalog.get("trades").unwrap().sample_record.is_none());
        assert!(catalog.get("orders").is_none());
    }

    #[test]
    fn test_apply_defaults_keeps_explicit_sort() {
        let catalog = TableCatalog::builtin();
        let trades = catalog.get("trades").unwrap();

        let request = trades.apply_defaults(QueryRequest::default());
        assert_eq!(request.sort_by.as_deref(), Some("tradedAt"));
        assert_eq!(request.sort_order, SortOrder::Desc);

        let request = trades.apply_defaults(QueryRequest::default().sort("price", SortOrder::Asc));
        assert_eq!(request.sort_by.as_deref(), Some("price"));
        assert_eq!(request.sort_order, SortOrder::Asc);
    }

    #[test]
    fn test_parse_query_validates_against_columns() {
        let catalog = TableCatalog::builtin();
        let trades = catalog.get("trades").unwrap();

        let request = trades
            .parse_query([
                ("limit", "25"),
                ("filters[0][field]", "side"),
                ("filters[0][operator]", "equals"),
                ("filters[0][value]", "buy"),
            ])
            .unwrap();
        assert_eq!(request.limit, 25);
        assert_eq!(request.sort_by.as_deref(), Some("tradedAt"));
        assert_eq!(request.filters[0].operator, FilterOperator::Equals);

        let err = trades.parse_query([("sortBy", "reference")]).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidQuery);

        let err = catalog.require("orders").unwrap_err();
        assert_eq!(err.code, ErrorCode::TableNotFound);
    }

    #[test]
    fn test_render_row() {
        let catalog = TableCatalog::builtin();
        let trades = catalog.get("trades").unwrap();
        let row = trades.render_row(&json!({
            "id": 42,
            "assetId": {"id": 1, "symbol": "AAPL"},
            "side": "buy",
            "price": 187.456,
            "quantity": 10
        }));

        assert_eq!(row.id, "42");
        assert_eq!(row.cells.len(), trades.columns.len());
        assert_eq!(row.cells[0], "AAPL");
        assert_eq!(row.cells[1], "");
        assert_eq!(row.cells[2], "Buy");
        assert_eq!(row.cells[3], "10");
        assert_eq!(row.cells[4], "187.46");
    }
}
