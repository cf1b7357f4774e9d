use pulse::error::PAErr;
use std::fmt;

#[derive(Debug)]
pub enum QueryError {
    /// The polling event loop could not be allocated
    Mainloop,
    /// The client context could not be allocated
    Context,
    /// The connect call itself was rejected
    Connect(PAErr),
    Json(serde_json::Error),
}

impl From<PAErr> for QueryError {
    fn from(e: PAErr) -> Self {
        Self::Connect(e)
    }
}

impl From<serde_json::Error> for QueryError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainloop => write!(f, "could not allocate a pulseaudio mainloop"),
            Self::Context => write!(f, "could not allocate a pulseaudio context"),
            Self::Connect(e) => write!(f, "could not connect to the pulseaudio server: {}", e),
            Self::Json(e) => write!(f, "could not serialize the result: {}", e),
        }
    }
}
