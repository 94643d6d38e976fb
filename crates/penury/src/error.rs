use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocError {
    #[error("quantity limit must not be negative")]
    NegativeLimit,

    #[error("wished quantity must not be negative")]
    NegativeWish,

    #[error("quantity overflow: total wishes or consumer count exceed the integer type")]
    Overflow,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum UnitsError {
    #[error("quantum must be strictly positive")]
    InvalidQuantum,

    #[error("quantity must not be negative")]
    Negative,

    #[error("quantity out of range for integral units")]
    OutOfRange,
}
