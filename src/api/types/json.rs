//! JSON and form extractors that return errors as JSON

use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Form as AxumForm, Json as AxumJson,
};
use serde::de::DeserializeOwned;

use super::error::{ApiErrorDetail, ApiErrorResponse, ApiErrorType};

/// JSON extractor whose rejections use the API error format
#[derive(Debug, Clone, Copy, Default)]
pub struct Json<T>(pub T);

/// URL-encoded form extractor whose rejections use the API error format
#[derive(Debug, Clone, Copy, Default)]
pub struct Form<T>(pub T);

/// Body rejection rendered in the API error format
#[derive(Debug)]
pub struct BodyRejection {
    status: StatusCode,
    message: String,
    code: &'static str,
}

impl IntoResponse for BodyRejection {
    fn into_response(self) -> Response {
        let response = ApiErrorResponse {
            error: ApiErrorDetail {
                message: self.message,
                error_type: ApiErrorType::InvalidRequestError,
                code: Some(self.code.to_string()),
            },
        };

        (self.status, AxumJson(response)).into_response()
    }
}

impl<S, T> FromRequest<S> for Json<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumJson::<T>::from_request(req, state).await {
            Ok(AxumJson(value)) => Ok(Json(value)),
            Err(rejection) => Err(BodyRejection {
                status: json_rejection_status(&rejection),
                message: format_json_rejection(&rejection),
                code: "json_parse_error",
            }),
        }
    }
}

impl<S, T> FromRequest<S> for Form<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = BodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match AxumForm::<T>::from_request(req, state).await {
            Ok(AxumForm(value)) => Ok(Form(value)),
            Err(rejection) => Err(BodyRejection {
                status: form_rejection_status(&rejection),
                message: format!("Invalid form data: {}", rejection.body_text()),
                code: "form_parse_error",
            }),
        }
    }
}

/// Malformed bodies are 400; content-type and size rejections keep their status
fn json_rejection_status(rejection: &axum::extract::rejection::JsonRejection) -> StatusCode {
    use axum::extract::rejection::JsonRejection::*;

    match rejection {
        JsonDataError(_) | JsonSyntaxError(_) => StatusCode::BAD_REQUEST,
        other => other.status(),
    }
}

fn form_rejection_status(rejection: &axum::extract::rejection::FormRejection) -> StatusCode {
    use axum::extract::rejection::FormRejection::*;

    match rejection {
        FailedToDeserializeForm(_) | FailedToDeserializeFormBody(_) => StatusCode::BAD_REQUEST,
        other => other.status(),
    }
}

fn format_json_rejection(rejection: &axum::extract::rejection::JsonRejection) -> String {
    use axum::extract::rejection::JsonRejection::*;

    match rejection {
        JsonDataError(err) => format!("Invalid JSON data: {}", err.body_text()),
        JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err.body_text()),
        MissingJsonContentType(_) => {
            "Missing Content-Type header. Expected 'application/json'.".to_string()
        }
        BytesRejection(err) => format!("Failed to read request body: {}", err.body_text()),
        _ => "Invalid JSON request".to_string(),
    }
}

impl<T> IntoResponse for Json<T>
where
    T: serde::Serialize,
{
    fn into_response(self) -> Response {
        AxumJson(self.0).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request as HttpRequest};
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Credentials {
        username: String,
        password: String,
    }

    #[tokio::test]
    async fn test_form_extracts_urlencoded_body() {
        let request = HttpRequest::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=user1&password=p%26ss"))
            .unwrap();

        let Form(credentials) = Form::<Credentials>::from_request(request, &()).await.unwrap();

        assert_eq!(credentials.username, "user1");
        assert_eq!(credentials.password, "p&ss");
    }

    #[tokio::test]
    async fn test_json_rejection_uses_api_format() {
        let request = HttpRequest::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let rejection = Json::<Credentials>::from_request(request, &())
            .await
            .unwrap_err();

        assert_eq!(rejection.code, "json_parse_error");
        assert_eq!(rejection.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_json_missing_content_type() {
        let request = HttpRequest::builder()
            .method("POST")
            .body(Body::from(r#"{"username":"a","password":"b"}"#))
            .unwrap();

        let rejection = Json::<Credentials>::from_request(request, &())
            .await
            .unwrap_err();

        assert_eq!(rejection.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_json_data_errors_are_bad_request() {
        for body in [r#"{"username":"u"}"#, r#"{"username": 1"#, r#"{"username":1,"password":"p"}"#] {
            let request = HttpRequest::builder()
                .method("POST")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap();

            let rejection = Json::<Credentials>::from_request(request, &())
                .await
                .unwrap_err();

            assert_eq!(rejection.status, StatusCode::BAD_REQUEST, "{}", body);
        }
    }

    #[tokio::test]
    async fn test_form_missing_field_is_bad_request() {
        let request = HttpRequest::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=user1"))
            .unwrap();

        let rejection = Form::<Credentials>::from_request(request, &())
            .await
            .unwrap_err();

        assert_eq!(rejection.status, StatusCode::BAD_REQUEST);
        assert_eq!(rejection.code, "form_parse_error");
    }
}
