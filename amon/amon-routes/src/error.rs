#[derive(Debug, thiserror::Error)]
#[error("the amon service failed to complete the request")]
pub struct AmonServiceError;
