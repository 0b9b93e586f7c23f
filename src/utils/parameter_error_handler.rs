//! 请求参数解析失败时的统一响应
//!
//! actix 默认返回纯文本错误，这里改为与业务接口一致的 `ApiResponse` JSON。

use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{Error, HttpRequest, HttpResponse};
use tracing::debug;

use crate::models::{ApiResponse, ErrorCode};

fn bad_request(kind: &str, path: &str, detail: String) -> HttpResponse {
    debug!("{} parameter rejected for {}: {}", kind, path, detail);
    HttpResponse::BadRequest().json(ApiResponse::error_empty(
        ErrorCode::BadRequest,
        format!("Invalid {kind}: {detail}"),
    ))
}

pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> Error {
    let detail = match &err {
        JsonPayloadError::ContentType => "Content-Type must be application/json".to_string(),
        JsonPayloadError::OverflowKnownLength { length, limit } => {
            format!("payload of {length} bytes exceeds limit of {limit} bytes")
        }
        JsonPayloadError::Overflow { limit } => {
            format!("payload exceeds limit of {limit} bytes")
        }
        JsonPayloadError::Deserialize(e) => e.to_string(),
        other => other.to_string(),
    };
    let response = bad_request("JSON body", req.path(), detail);
    InternalError::from_response(err, response).into()
}

pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> Error {
    let response = bad_request("query", req.path(), err.to_string());
    InternalError::from_response(err, response).into()
}

pub fn path_error_handler(err: PathError, req: &HttpRequest) -> Error {
    let response = bad_request("path", req.path(), err.to_string());
    InternalError::from_response(err, response).into()
}
