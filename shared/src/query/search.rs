//! 搜索选项 (typeahead / 下拉框)

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// 选项值: 字符串或数字
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(Number),
    Text(String),
}

impl OptionValue {
    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => Some(OptionValue::Number(n.clone())),
            Value::String(s) => Some(OptionValue::Text(s.clone())),
            Value::Null => None,
            other => Some(OptionValue::Text(other.to_string())),
        }
    }
}

impl std::fmt::Display for OptionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

/// 一条记录对应的 `{label, value}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOption {
    pub label: String,
    pub value: OptionValue,
}

impl SearchOption {
    /// label 取值顺序: `record[label_key]` → `record.name` → `record[value_key]` 的字符串形式
    ///
    /// 没有 `value_key` (或为 null) 的记录无法被选中，返回 `None`
    pub fn from_record(record: &Value, label_key: &str, value_key: &str) -> Option<Self> {
        let value = OptionValue::from_json(record.get(value_key)?)?;
        let label = label_text(record.get(label_key))
            .or_else(|| label_text(record.get("name")))
            .unwrap_or_else(|| value.to_string());

        Some(Self { label, value })
    }
}

fn label_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
