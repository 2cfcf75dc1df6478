use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use deadpool_redis::{redis::RedisError, CreatePoolError, PoolError};
use std::borrow::Cow;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Internal Server Error")]
    InternalServer,
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub message: Cow<'static, str>,
}

impl Error {
    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::InternalServer => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut res = HttpResponse::build(self.status_code());

        match self {
            Error::NotFound(msg) | Error::BadRequest(msg) => {
                res.json(ErrorBody { message: msg.clone() })
            }
            Error::InternalServer => {
                res.json(ErrorBody { message: "Internal Server Error".into() })
            }
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    // sqlx errors
    #[error("Database Error : {0}")]
    DatabaseError(Cow<'static, str>),
    #[error("Migration Error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
    // serde errors
    #[error("JSON Serialization/Deserialization Error")]
    JsonError(#[from] serde_json::Error),
    // redis errors
    #[error(transparent)]
    PoolInit(#[from] CreatePoolError),
    #[error("Redis pool error: {0}")]
    PoolGet(#[from] PoolError),
    #[error("Redis error: {0}")]
    RedisError(#[from] RedisError),
    // filesystem errors
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    // mail errors
    #[error("Mail address error: {0}")]
    MailAddress(#[from] lettre::address::AddressError),
    #[error("Mail message error: {0}")]
    MailMessage(#[from] lettre::error::Error),
    #[error("Mail transport error: {0}")]
    MailTransport(#[from] lettre::transport::smtp::Error),
    // Custom Errors
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),
    #[error("Database Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Internal System Error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::Validation(messages) => Error::BadRequest(messages.join("; ").into()),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            _ => {
                log::error!("Internal Server Error: {:?}", value);
                Error::InternalServer
            }
        }
    }
}

impl From<sqlx::Error> for SystemError {
    fn from(err: sqlx::Error) -> Self {
        log::error!("{:?}", err);
        match &err {
            sqlx::Error::RowNotFound => SystemError::NotFound("Resource not found".into()),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("42P01") => SystemError::NotFound("Resource not found".into()),
                _ => {
                    log::error!("Unhandled DB error: {:?}", db_err);
                    SystemError::DatabaseError(db_err.message().to_string().into())
                }
            },
            _ => SystemError::InternalError(Box::new(err)),
        }
    }
}

impl SystemError {
    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn is_mail_failure(&self) -> bool {
        matches!(
            self,
            SystemError::MailAddress(_) | SystemError::MailMessage(_) | SystemError::MailTransport(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_surface_as_bad_request() {
        let err: Error =
            SystemError::Validation(vec!["file: This field is required.".into()]).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Bad Request: file: This field is required.");
    }

    #[test]
    fn internal_errors_are_hidden() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = SystemError::from(io).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err = SystemError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, SystemError::NotFound(_)));
    }
}
