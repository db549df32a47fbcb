use std::ops::RangeInclusive;

use super::GpuCount;

#[derive(Clone, Debug, PartialEq)]
pub struct Vm {
    name: String,
    available_gpus: GpuCount, // n_v : GPUs installed on one node of this type.
    cost: f64,                // c_v : Cost per time unit.
}

impl Vm {
    pub fn new(name: impl Into<String>, available_gpus: GpuCount, cost: f64) -> Self {
        Self {
            name: name.into(),
            available_gpus,
            cost,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn available_gpus(&self) -> GpuCount {
        self.available_gpus
    }

    pub fn cost(&self) -> f64 {
        self.cost
    }

    /// GPU counts a job may request on this VM, `1..=available_gpus`.
    ///
    /// Empty when the VM declares no GPUs.
    pub fn gpus(&self) -> RangeInclusive<GpuCount> {
        1..=self.available_gpus
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gpus_start_at_one() {
        let vm = Vm::new("p3.8xlarge", 4, 12.24);
        assert_eq!(vm.gpus().collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn zero_gpus_gives_empty_range() {
        let vm = Vm::new("t2.micro", 0, 0.01);
        assert!(vm.gpus().next().is_none());
    }
}
