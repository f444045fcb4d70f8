mod provider;

pub use provider::{BufferHandle, BufferProvider};
