//! JSON envelopes. Write routes answer `{success, data, message}`, every error answers
//! `{success: false, error: {code, message, details}}`. Read routes return bare JSON.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct Envelope<T> {
    success: bool,
    data: T,
    message: String,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
    details: Option<Value>,
}

#[derive(Serialize)]
struct ErrorEnvelope<'a> {
    success: bool,
    error: ErrorBody<'a>,
}

fn envelope<T: Serialize>(status: StatusCode, data: T, message: String) -> Response {
    let body = Envelope {
        success: true,
        data,
        message,
    };
    (status, Json(body)).into_response()
}

pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    envelope(StatusCode::OK, data, message.into())
}

pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    envelope(StatusCode::CREATED, data, message.into())
}

pub fn error(status: StatusCode, code: &str, message: String, details: Option<Value>) -> Response {
    let body = ErrorEnvelope {
        success: false,
        error: ErrorBody {
            code,
            message,
            details,
        },
    };
    (status, Json(body)).into_response()
}
