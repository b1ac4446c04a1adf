use thiserror::Error;

use crate::model::{SettingsError, TriggerError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Trigger(#[from] TriggerError),
}
