use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("timer interval must be greater than zero")]
    ZeroInterval,
}

pub type Result<T> = std::result::Result<T, Error>;
