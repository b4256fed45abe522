use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Uniform JSON error body returned by every handler.
#[derive(Serialize, Debug)]
pub struct ErrorBody {
    pub error: String,
    pub code: u16,
}
