use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid grid size")]
    InvalidGridSize,
    #[error("Corrupt save data")]
    CorruptSave,
}

pub type Result<T> = core::result::Result<T, GameError>;
