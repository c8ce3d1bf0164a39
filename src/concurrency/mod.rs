pub mod instance_lock;

pub use instance_lock::{InstanceLock, InstanceLockGuard};
