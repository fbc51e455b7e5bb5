use std::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeErrorType {
    NotFound,
    Conflict,
    ParentNotFound,
    InvalidName,
    InvalidPath,
    IOError,
}

impl From<TreeErrorType> for warp::http::StatusCode {
    fn from(error_type: TreeErrorType) -> Self {
        match error_type {
            TreeErrorType::NotFound => warp::http::StatusCode::NOT_FOUND,
            TreeErrorType::Conflict => warp::http::StatusCode::CONFLICT,
            TreeErrorType::InvalidName | TreeErrorType::InvalidPath => {
                warp::http::StatusCode::BAD_REQUEST
            }
            // A parent that cannot be resolved means the index itself is broken
            TreeErrorType::ParentNotFound | TreeErrorType::IOError => {
                warp::http::StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug)]
pub struct TreeError {
    pub error_type: TreeErrorType,
    pub message: String,
}

impl warp::Reply for TreeError {
    fn into_response(self) -> warp::reply::Response {
        let status: warp::http::StatusCode = self.error_type.into();
        warp::reply::with_status(warp::reply::json(&self.message), status).into_response()
    }
}

impl TreeError {
    pub fn new(error_type: TreeErrorType, message: String) -> Self {
        Self {
            error_type,
            message,
        }
    }

    pub(crate) fn not_found(message: String) -> Self {
        Self::new(TreeErrorType::NotFound, message)
    }

    pub(crate) fn conflict(message: String) -> Self {
        Self::new(TreeErrorType::Conflict, message)
    }

    pub(crate) fn parent_not_found(message: String) -> Self {
        Self::new(TreeErrorType::ParentNotFound, message)
    }

    pub fn kind(&self) -> TreeErrorType {
        self.error_type
    }
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.error_type, self.message)
    }
}

impl From<std::io::Error> for TreeError {
    fn from(error: std::io::Error) -> Self {
        let error_type = match error.kind() {
            std::io::ErrorKind::NotFound => TreeErrorType::NotFound,
            std::io::ErrorKind::AlreadyExists => TreeErrorType::Conflict,
            _ => TreeErrorType::IOError,
        };
        Self {
            error_type,
            message: error.to_string(),
        }
    }
}

impl Error for TreeError {}

pub type Result<T> = std::result::Result<T, TreeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use warp::http::StatusCode;
    use warp::Reply;

    #[test]
    fn io_errors_keep_their_meaning() {
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(TreeError::from(missing).kind(), TreeErrorType::NotFound);

        let taken = std::io::Error::new(std::io::ErrorKind::AlreadyExists, "taken");
        assert_eq!(TreeError::from(taken).kind(), TreeErrorType::Conflict);

        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(TreeError::from(denied).kind(), TreeErrorType::IOError);
    }

    #[test]
    fn errors_map_to_status_codes() {
        let response = TreeError::conflict("Folder already exists".into()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = TreeError::not_found("nope".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = TreeError::parent_not_found("broken".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
