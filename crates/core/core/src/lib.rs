//! # Spark Core
//!
//! Foundational types shared by every Spark crate: the plugin [`Descriptor`]
//! published to the host platform, and the per-request [`RequestContext`]
//! that carries a deadline from the inbound webhook down to outbound calls.

pub mod context;
pub mod descriptor;
pub mod error;

pub use context::{DeadlineExceeded, RequestContext, MAX_TIMEOUT};
pub use descriptor::{Control, Descriptor, Facade, Filter};
pub use error::{CoreError, CoreResult};
