use thiserror::Error;

#[derive(Debug, Error)]
pub enum BinPackError {
    #[error("Invalid dimensions: {width}x{height} (width and height must be greater than 0)")]
    InvalidDimension { width: u32, height: u32 },
    #[error("Bin is not initialized; call init with a non-zero size first")]
    UninitializedBin,
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("'{key}' ({width}x{height}) does not fit into an empty atlas")]
    OutOfSpace { key: String, width: u32, height: u32 },
    #[error("Nothing to pack")]
    Empty,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Encoding error: {0}")]
    Encode(String),
}

pub type Result<T> = std::result::Result<T, BinPackError>;
