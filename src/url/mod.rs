pub mod context;
pub mod generator;
pub mod signer;

pub use context::UrlGenerationContext;
pub use generator::{UrlGenerator, UrlType};
pub use signer::{HmacUrlSigner, UrlSigner};
