//! Shared utility functions for API handlers.

use axum::{
    body::Body,
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;

use crate::domain::{AnalysisId, OrderId};

use super::error::ApiError;

pub(crate) const TURTLE_CONTENT_TYPE: &str = "text/turtle";

/// Parse an order id path segment; anything but a positive integer is a 400
pub(crate) fn parse_order_id(raw: &str) -> Result<OrderId, ApiError> {
    Ok(raw.parse::<OrderId>()?)
}

pub(crate) fn parse_analysis_id(raw: &str) -> Result<AnalysisId, ApiError> {
    Ok(raw.parse::<AnalysisId>()?)
}

/// Unwrap a JSON body, reporting malformed input in the common error format
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(ApiError::BadRequest {
            reason: rejection.body_text(),
            solution: "Send a JSON request body with the documented fields".to_string(),
        }),
    }
}

/// `attachment; filename="<name>"` with quotes in the name dropped
pub(crate) fn content_disposition(filename: &str) -> HeaderValue {
    let sanitized: String =
        filename.chars().filter(|c| *c != '"' && *c != '\\' && !c.is_control()).collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", sanitized))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Turtle attachment response
pub(crate) fn turtle_attachment(body: Body, filename: &str) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(TURTLE_CONTENT_TYPE)),
            (header::CONTENT_DISPOSITION, content_disposition(filename)),
        ],
        body,
    )
        .into_response()
}

/// 200 with the bundle, or 204 when no record carried a payload
pub(crate) fn turtle_download(content: Option<Bytes>, filename: &str) -> Response {
    match content {
        Some(bytes) => turtle_attachment(Body::from(bytes), filename),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ids() {
        assert_eq!(parse_order_id("55").unwrap(), OrderId::new(55));
        assert!(matches!(parse_order_id("blub"), Err(ApiError::BadRequest { .. })));
        assert!(matches!(parse_analysis_id("0"), Err(ApiError::BadRequest { .. })));
    }

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition("order_order_5_dotnet_core.ttl"),
            "attachment; filename=\"order_order_5_dotnet_core.ttl\""
        );
        assert_eq!(
            content_disposition("metric_metric_a\"b.ttl"),
            "attachment; filename=\"metric_metric_ab.ttl\""
        );
    }

    #[test]
    fn test_empty_download_is_no_content() {
        assert_eq!(turtle_download(None, "rdf.ttl").status(), StatusCode::NO_CONTENT);

        let response = turtle_download(Some(Bytes::from_static(b"<a> <b> <c> .")), "rdf.ttl");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TURTLE_CONTENT_TYPE);
    }
}
