//! Two independent event mechanisms the agent loop uses: the
//! intervention [`Hook`] pipeline (observe-and-decide at fixed points
//! in the loop), and the [`LifecycleEvent`] channel the rendering layer
//! consumes (announce-only, no intervention).

#![deny(missing_docs)]

mod error;
mod hook;
mod lifecycle;
mod registry;

pub use error::HookError;
pub use hook::{Hook, HookAction, HookContext, HookPoint};
pub use lifecycle::{lifecycle_channel, LifecycleEvent, LifecycleReceiver, LifecycleSender};
pub use registry::HookRegistry;
