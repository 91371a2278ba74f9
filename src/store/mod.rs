//! Session store interface and the eden-backed implementation

mod eden;
mod traits;

pub use eden::EdenSessionStore;
pub use traits::SessionStore;
