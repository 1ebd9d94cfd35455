#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("{context} [{status}]: {body}")]
    HttpStatus {
        context: String,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("An API key is required: pass --api-key or set KLUSTER_API_KEY")]
    MissingApiKey,

    #[error("Input file not found: {0}")]
    InputNotFound(String),

    #[error("Expected a JSON object at the root of {0}")]
    NotAnObject(String),
}
