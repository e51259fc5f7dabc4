/// Errors produced by the `lockgate-core` crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum CoreError {
    /// A required request field was missing or blank.
    #[error("{field} is required")]
    MissingField { field: &'static str },

    /// A device id could not be parsed as a positive integer.
    #[error("device_id must be a positive integer, got '{value}'")]
    InvalidDeviceId { value: String },
}
