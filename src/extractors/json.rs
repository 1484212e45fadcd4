//! JSON body extractor with validation.

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use axum_valid::{Valid, ValidRejection};

use crate::error::AppError;

/// A validated `Json<T>` whose rejections are [`AppError::BadRequest`].
///
/// Malformed bodies, missing or mistyped fields and failed `validator` rules all
/// answer 400 with the usual `{message}` body.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    Valid<Json<T>>: FromRequest<S, Rejection = ValidRejection<JsonRejection>>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Valid::<Json<T>>::from_request(req, state).await {
            Ok(Valid(Json(value))) => Ok(ValidJson(value)),
            Err(ValidRejection::Valid(errors)) => Err(AppError::BadRequest(errors.to_string())),
            Err(ValidRejection::Inner(rejection)) => {
                Err(AppError::BadRequest(rejection.body_text()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{self, header::CONTENT_TYPE},
    };
    use serde::Deserialize;
    use validator::Validate;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct Greeting {
        #[validate(length(min = 3))]
        name: String,
    }

    async fn extract(body: &str) -> Result<ValidJson<Greeting>, AppError> {
        let request = http::Request::builder()
            .method("POST")
            .uri("/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        ValidJson::<Greeting>::from_request(request, &()).await
    }

    #[tokio::test]
    async fn accepts_valid_body() {
        let ValidJson(greeting) = extract(r#"{"name":"quiz"}"#).await.unwrap();
        assert_eq!(greeting.name, "quiz");
    }

    #[tokio::test]
    async fn rejects_missing_fields_and_failed_rules_as_bad_request() {
        for body in [r#"{}"#, r#"{"name":4}"#, r#"{"name":"qu"}"#, "not json"] {
            assert!(matches!(extract(body).await, Err(AppError::BadRequest(_))));
        }
    }
}
