use thiserror::Error;
use weft_types::TypeName;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("unknown type: {0}")]
    UnknownType(TypeName),

    #[error("invalid JSON object: {0}")]
    InvalidJson(String),

    #[error("transform error: {0}")]
    Transform(#[from] weft_transform::TransformError),

    #[error("store error: {0}")]
    Store(#[from] weft_store::StoreError),

    #[error("schema error: {0}")]
    Reflect(#[from] weft_reflect::ReflectError),

    #[error("type error: {0}")]
    Type(#[from] weft_types::TypeError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SdkResult<T> = Result<T, SdkError>;
