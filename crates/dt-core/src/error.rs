use thiserror::Error;

pub type DtResult<T> = Result<T, DtError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DtError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Non-positive value for {what}: {value}")]
    NonPositive { what: &'static str, value: f64 },
}
