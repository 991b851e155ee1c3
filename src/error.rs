//! 错误处理

#[derive(Debug, thiserror::Error)]
pub enum Error {
    // 标准库错误处理
    #[error("io error, {0}")]
    Io(std::io::Error),
    // std::sync::poison::rwlock
    #[error("lock error, {0}")]
    LockError(String),

    #[error("serde json error, {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    #[error("py error, {0}")]
    PyErr(#[from] pyo3::PyErr),
    #[error("pythonize error, {0}")]
    PythonizeError(#[from] pythonize::PythonizeError),

    #[error("file not found, {0}")]
    FileNotFound(String),
    #[error("invalid path, {0}")]
    InvalidPath(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
