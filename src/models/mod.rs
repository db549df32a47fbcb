mod job;
mod vm;
pub mod instance;

pub use instance::{Instance, InstanceData, VmGpuPair};
pub use job::Job;
pub use vm::Vm;

pub type GpuCount = u32;

pub type VmIndex = usize;
pub type JobIndex = usize;
/// Position in the flattened `VM_GPU_pairs` relation.
pub type PairIndex = usize;
