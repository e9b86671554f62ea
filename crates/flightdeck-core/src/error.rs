use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid URL template: {0}")]
    InvalidTemplate(String),

    #[error("Settings store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_invalid_template() {
        let err = Error::InvalidTemplate("not a url".to_string());
        assert_eq!(err.to_string(), "Invalid URL template: not a url");
    }

    #[test]
    fn test_error_display_store_unavailable() {
        let err = Error::StoreUnavailable("permission denied".to_string());
        assert_eq!(
            err.to_string(),
            "Settings store unavailable: permission denied"
        );
    }

    #[test]
    fn test_error_display_navigation_failed() {
        let err = Error::NavigationFailed("no browser".to_string());
        assert_eq!(err.to_string(), "Navigation failed: no browser");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("access denied"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<i32>("\"not a number\"").unwrap_err();
        let err: Error = json_err.into();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().contains("JSON error"));
    }
}
