use thiserror::Error;

/// Reasons a ROM or save image cannot be attached to the memory bus.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("ROM image is empty")]
    Empty,
    #[error("ROM image is {len} bytes, too short to contain a cartridge header")]
    HeaderTooShort { len: usize },
    #[error("ROM header declares {expected} bytes but the image is only {actual} bytes")]
    Truncated { expected: usize, actual: usize },
    #[error("save RAM image is {actual} bytes but the cartridge only has {expected} bytes of RAM")]
    SaveRamTooLarge { expected: usize, actual: usize },
}
