//! Shared types for the admin console
//!
//! Types used by both `admin-client` and `admin-server`: the RBAC registry,
//! the table query contract, column descriptors, session cookie conventions
//! and the unified error system.

pub mod error;
pub mod query;
pub mod rbac;
pub mod session;
pub mod settings;
pub mod table;

// Re-exports
pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
pub use query::{
    Filter, FilterOperator, OptionValue, Pagination, QueryRequest, QueryResponse, SearchOption,
    SortOrder,
};
pub use rbac::{PermissionRegistry, Role, TabDescriptor};
pub use table::{ColumnDescriptor, ColumnKind};
