//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements          | Connects to                  |
//! |----------------|---------------------|------------------------------|
//! | `memory_store` | RemoteStore         | In-process key/value store   |
//! | `log_sink`     | AlertSink, Renderer | `log` facade                 |
//! | `replay`       | (none)              | Scripted feed for the store  |

pub mod log_sink;
pub mod memory_store;
pub mod replay;
