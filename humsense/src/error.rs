//! Crate error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The ADC collaborator failed to produce a sample.
    #[error("ADC read failed: {0}")]
    Adc(#[from] std::io::Error),
}
