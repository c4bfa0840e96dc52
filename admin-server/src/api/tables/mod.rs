//! Table API
//!
//! | 路径 | 方法 | 操作权限 |
//! |------|------|----------|
//! | /api/tables/{resource} | GET | `{resource}.view` |
//! | /api/tables/{resource}/search | GET | `{resource}.view` |
//! | /api/tables/{resource} | POST | `{resource}.create` |
//! | /api/tables/{resource}/{id} | PUT | `{resource}.update` |
//! | /api/tables/{resource}/{id} | DELETE | `{resource}.delete` |

mod handler;

use axum::{Router, routing::get, routing::put};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/tables/{resource}", get(handler::list).post(handler::create))
        .route("/api/tables/{resource}/search", get(handler::search))
        .route(
            "/api/tables/{resource}/{id}",
            put(handler::update).delete(handler::delete),
        )
}
