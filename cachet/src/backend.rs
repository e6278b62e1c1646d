//! Store traits re-exported from `cachet-backend`.
//!
//! | Store | Crate | Use case |
//! |-------|-------|----------|
//! | Moka | `cachet-moka` | In-memory, single instance |
//! | Redis | `cachet-redis` | Shared between instances |

pub use cachet_backend::{Backend, BackendError, CacheBackend, DeleteStatus};
