use std::path::PathBuf;

use crm_core::pagination::InvalidPageSize;
use crm_core::resource::UnknownResource;
use crm_core::FormError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// A failed envelope; the message is what the API layer produced.
    #[error("{0}")]
    Api(String),

    #[error("Not logged in. Run `crm login` first.")]
    NotLoggedIn,

    #[error(transparent)]
    UnknownResource(#[from] UnknownResource),

    #[error(transparent)]
    PageSize(#[from] InvalidPageSize),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error("expected FIELD=VALUE, got '{0}'")]
    Assignment(String),

    #[error("token file {}: {source}", path.display())]
    TokenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("could not encode output: {0}")]
    Json(#[from] serde_json::Error),
}
