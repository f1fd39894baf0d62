use weft_types::TypeName;

/// Errors raised while loading or validating a schema.
#[derive(Debug, thiserror::Error)]
pub enum ReflectError {
    #[error("duplicate type: {0}")]
    DuplicateType(TypeName),

    #[error("duplicate property {property} on {type_name}")]
    DuplicateProperty { type_name: TypeName, property: String },

    #[error("{type_name}.{property} references unknown type {target}")]
    UnknownType {
        type_name: TypeName,
        property: String,
        target: TypeName,
    },

    #[error("{type_name} lists unknown representative property {property}")]
    UnknownRepresentative { type_name: TypeName, property: String },

    #[error("invalid precision on {type_name}.{property}: minimum {minimum} > maximum {maximum}")]
    InvalidPrecision {
        type_name: TypeName,
        property: String,
        minimum: u8,
        maximum: u8,
    },

    #[error("schema parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
