pub mod cli;
pub mod conf;
pub mod config;
pub mod dispatch;
pub mod registry;

pub use config::{ConfOption, HarnessConfig};
pub use dispatch::{process_test_line, DispatchError};
pub use registry::{ActivationSet, DescriptorTable};
