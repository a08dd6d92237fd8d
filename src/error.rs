use std::fmt;

/// Unified error type for download and sheet output operations
#[derive(Debug)]
pub enum AbpError {
    /// HTTP request failed (network error, timeout, etc.)
    Network(reqwest::Error),
    /// HTTP error status code, with the response body for reporting
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    /// File I/O error
    Io(std::io::Error),
    /// Image decoding or encoding error
    Image(image::ImageError),
}

impl fmt::Display for AbpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbpError::Network(e) => write!(f, "Network error: {}", e),
            AbpError::HttpStatus { status, body } => {
                write!(f, "ERROR {}", status)?;
                if !body.is_empty() {
                    write!(f, "\n{}", body)?;
                }
                Ok(())
            }
            AbpError::Io(e) => write!(f, "I/O error: {}", e),
            AbpError::Image(e) => write!(f, "Image error: {}", e),
        }
    }
}

impl std::error::Error for AbpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AbpError::Network(e) => Some(e),
            AbpError::Io(e) => Some(e),
            AbpError::Image(e) => Some(e),
            AbpError::HttpStatus { .. } => None,
        }
    }
}

impl From<reqwest::Error> for AbpError {
    fn from(err: reqwest::Error) -> Self {
        AbpError::Network(err)
    }
}

impl From<std::io::Error> for AbpError {
    fn from(err: std::io::Error) -> Self {
        AbpError::Io(err)
    }
}

impl From<image::ImageError> for AbpError {
    fn from(err: image::ImageError) -> Self {
        AbpError::Image(err)
    }
}

/// Result type alias for pipeline operations
pub type AbpResult<T> = Result<T, AbpError>;
