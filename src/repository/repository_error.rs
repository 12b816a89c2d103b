/// Error taxonomy shared by all repositories.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Already Exists: {0}")]
    AlreadyExists(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Database Error: {0}")]
    DatabaseError(String),

    #[error("Connection Error: {0}")]
    ConnectionError(String),

    #[error("Serialization Error: {0}")]
    SerializationError(String),

    /// Wraps errors from sources outside the taxonomy
    #[error("Repository Error: {0}")]
    Generic(Box<dyn std::error::Error + Send + Sync>),
}

impl RepositoryError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        RepositoryError::NotFound(msg.into())
    }

    pub fn already_exists<T: Into<String>>(msg: T) -> Self {
        RepositoryError::AlreadyExists(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        RepositoryError::ValidationError(msg.into())
    }

    pub fn database<T: Into<String>>(msg: T) -> Self {
        RepositoryError::DatabaseError(msg.into())
    }

    pub fn connection<T: Into<String>>(msg: T) -> Self {
        RepositoryError::ConnectionError(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        RepositoryError::SerializationError(msg.into())
    }

    pub fn generic<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        RepositoryError::Generic(Box::new(err))
    }
}

impl From<mongodb::error::Error> for RepositoryError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::Write(_) => {
                // Duplicate key errors (E11000) surface as conflicts.
                let msg = err.to_string();
                if msg.contains("E11000") {
                    RepositoryError::AlreadyExists(format!("Duplicate key: {}", err))
                } else {
                    RepositoryError::DatabaseError(format!("Write error: {}", err))
                }
            }
            ErrorKind::Authentication { .. } => {
                RepositoryError::ConnectionError(format!("Authentication failed: {}", err))
            }
            ErrorKind::InvalidArgument { .. } => {
                RepositoryError::ValidationError(format!("Invalid argument: {}", err))
            }
            ErrorKind::Io(_) => RepositoryError::ConnectionError(format!("IO error: {}", err)),
            _ => RepositoryError::DatabaseError(err.to_string()),
        }
    }
}

impl From<bson::ser::Error> for RepositoryError {
    fn from(err: bson::ser::Error) -> Self {
        RepositoryError::SerializationError(format!("BSON serialization error: {}", err))
    }
}

impl From<bson::de::Error> for RepositoryError {
    fn from(err: bson::de::Error) -> Self {
        RepositoryError::SerializationError(format!("BSON deserialization error: {}", err))
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
