pub mod change_sets;
pub mod client;
pub mod protocol;
pub mod stacks;

pub use change_sets::ChangeSetsManager;
pub use client::{CfnClient, CfnConnection};
pub use stacks::StacksManager;
