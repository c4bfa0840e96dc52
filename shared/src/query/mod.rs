//! 表格查询契约
//!
//! 游标分页、过滤、排序、搜索的请求/响应类型，客户端与服务端共用。

pub mod request;
pub mod response;
pub mod search;

pub use request::{DEFAULT_LIMIT, Filter, FilterOperator, MAX_LIMIT, QueryRequest, SortOrder};
pub use response::{BackendEnvelope, BackendError, Pagination, QueryResponse};
pub use search::{OptionValue, SearchOption};
