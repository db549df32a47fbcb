//! Index sets and parameters of one problem instance.
//!
//! [`InstanceData`] collects raw, unchecked values the way a loader reads them.
//! [`InstanceData::validate`] turns it into an [`Instance`], whose sets are fixed
//! and whose parameters are defined over their whole domain.

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use tracing::debug;

use super::{GpuCount, Job, JobIndex, PairIndex, Vm, VmIndex};
use crate::errors::SchemaError;

/// One element of `VM_GPU_pairs`: VM `vm` running with `gpus` GPUs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VmGpuPair {
    pub vm: VmIndex,
    pub gpus: GpuCount,
}

#[derive(Clone, Debug)]
struct RawVm {
    name: String,
    available_gpus: i64,
    cost: f64,
}

#[derive(Clone, Debug)]
struct RawJob {
    name: String,
    deadline: f64,
    penalty: f64,
    tardiness_weight: f64,
}

#[derive(Clone, Debug)]
struct RawTime {
    job: String,
    vm: String,
    gpus: i64,
    time: f64,
}

/// Unvalidated instance data, in declaration order.
#[derive(Clone, Debug, Default)]
pub struct InstanceData {
    vms: Vec<RawVm>,
    jobs: Vec<RawJob>,
    times: Vec<RawTime>,
}

impl InstanceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_vm(&mut self, name: impl Into<String>, available_gpus: i64, cost: f64) -> &mut Self {
        self.vms.push(RawVm {
            name: name.into(),
            available_gpus,
            cost,
        });
        self
    }

    pub fn add_job(
        &mut self,
        name: impl Into<String>,
        deadline: f64,
        penalty: f64,
        tardiness_weight: f64,
    ) -> &mut Self {
        self.jobs.push(RawJob {
            name: name.into(),
            deadline,
            penalty,
            tardiness_weight,
        });
        self
    }

    /// Sets `time[job, vm, gpus]`.
    pub fn set_time(
        &mut self,
        job: impl Into<String>,
        vm: impl Into<String>,
        gpus: i64,
        time: f64,
    ) -> &mut Self {
        self.times.push(RawTime {
            job: job.into(),
            vm: vm.into(),
            gpus,
            time,
        });
        self
    }

    /// Builds the index sets and checks every parameter against its domain.
    pub fn validate(&self) -> Result<Instance, SchemaError> {
        let vms = self.validate_vms()?;
        let jobs = self.validate_jobs()?;

        let mut pairs = Vec::new();
        let mut pairs_by_vm = Vec::with_capacity(vms.len());
        for (v, vm) in vms.iter().enumerate() {
            let start = pairs.len();
            pairs.extend(vm.gpus().map(|gpus| VmGpuPair { vm: v, gpus }));
            pairs_by_vm.push(start..pairs.len());
        }

        let time = self.validate_times(&vms, &jobs, &pairs, &pairs_by_vm)?;

        debug!(
            vms = vms.len(),
            jobs = jobs.len(),
            pairs = pairs.len(),
            "instance validated"
        );

        Ok(Instance {
            vms,
            jobs,
            pairs,
            pairs_by_vm,
            time,
        })
    }

    fn validate_vms(&self) -> Result<Vec<Vm>, SchemaError> {
        let mut seen = HashSet::new();
        let mut vms = Vec::with_capacity(self.vms.len());

        for raw in &self.vms {
            if !seen.insert(raw.name.as_str()) {
                return Err(SchemaError::DuplicateEntity {
                    set: "VMs",
                    name: raw.name.clone(),
                });
            }
            let available_gpus = GpuCount::try_from(raw.available_gpus).map_err(|_| {
                SchemaError::OutOfDomain {
                    param: "available_GPUs",
                    index: raw.name.clone(),
                    value: raw.available_gpus.to_string(),
                    domain: "NonNegativeIntegers",
                }
            })?;
            check_non_negative("cost", &raw.name, raw.cost)?;
            vms.push(Vm::new(raw.name.clone(), available_gpus, raw.cost));
        }

        Ok(vms)
    }

    fn validate_jobs(&self) -> Result<Vec<Job>, SchemaError> {
        let mut seen = HashSet::new();
        let mut jobs = Vec::with_capacity(self.jobs.len());

        for raw in &self.jobs {
            if !seen.insert(raw.name.as_str()) {
                return Err(SchemaError::DuplicateEntity {
                    set: "Jobs",
                    name: raw.name.clone(),
                });
            }
            check_non_negative("deadline", &raw.name, raw.deadline)?;
            check_non_negative("penalty", &raw.name, raw.penalty)?;
            check_non_negative("tardinessweight", &raw.name, raw.tardiness_weight)?;
            jobs.push(Job::new(
                raw.name.clone(),
                raw.deadline,
                raw.penalty,
                raw.tardiness_weight,
            ));
        }

        Ok(jobs)
    }

    /// Produces the dense `time[job][pair]` table.
    fn validate_times(
        &self,
        vms: &[Vm],
        jobs: &[Job],
        pairs: &[VmGpuPair],
        pairs_by_vm: &[Range<PairIndex>],
    ) -> Result<Vec<Vec<f64>>, SchemaError> {
        let vm_index: HashMap<&str, VmIndex> =
            vms.iter().enumerate().map(|(v, vm)| (vm.name(), v)).collect();
        let job_index: HashMap<&str, JobIndex> =
            jobs.iter().enumerate().map(|(j, job)| (job.name(), j)).collect();

        let mut table: Vec<Vec<Option<f64>>> = vec![vec![None; pairs.len()]; jobs.len()];

        for raw in &self.times {
            let label = format!("{},{},{}", raw.job, raw.vm, raw.gpus);
            let outside = || SchemaError::UnknownIndex {
                param: "time",
                index: label.clone(),
            };

            let j = *job_index.get(raw.job.as_str()).ok_or_else(outside)?;
            let v = *vm_index.get(raw.vm.as_str()).ok_or_else(outside)?;
            let range = &pairs_by_vm[v];
            // pairs of a VM are stored with gpus = 1, 2, ... in order
            let p = usize::try_from(raw.gpus)
                .ok()
                .filter(|&g| g >= 1 && g <= range.len())
                .map(|g| range.start + g - 1)
                .ok_or_else(outside)?;

            check_non_negative("time", &label, raw.time)?;

            let slot = &mut table[j][p];
            if slot.is_some() {
                return Err(SchemaError::DuplicateValue {
                    param: "time",
                    index: label,
                });
            }
            *slot = Some(raw.time);
        }

        table
            .into_iter()
            .enumerate()
            .map(|(j, row)| {
                row.into_iter()
                    .enumerate()
                    .map(|(p, value)| {
                        value.ok_or_else(|| {
                            let pair = pairs[p];
                            SchemaError::MissingValue {
                                param: "time",
                                index: format!(
                                    "{},{},{}",
                                    jobs[j].name(),
                                    vms[pair.vm].name(),
                                    pair.gpus
                                ),
                            }
                        })
                    })
                    .collect::<Result<Vec<f64>, SchemaError>>()
            })
            .collect()
    }
}

fn check_non_negative(param: &'static str, index: &str, value: f64) -> Result<(), SchemaError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(SchemaError::OutOfDomain {
        param,
        index: index.to_string(),
        value: value.to_string(),
        domain: "NonNegativeReals",
    })
}

/// A validated problem instance. Immutable once built.
#[derive(Clone, Debug)]
pub struct Instance {
    vms: Vec<Vm>,
    jobs: Vec<Job>,
    pairs: Vec<VmGpuPair>,             // VM_GPU_pairs, grouped by VM
    pairs_by_vm: Vec<Range<PairIndex>>, // GPUs[v] as a slice of `pairs`
    time: Vec<Vec<f64>>,               // time[j][p]
}

impl Instance {
    pub fn vms(&self) -> &[Vm] {
        &self.vms
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn vm(&self, v: VmIndex) -> &Vm {
        &self.vms[v]
    }

    pub fn job(&self, j: JobIndex) -> &Job {
        &self.jobs[j]
    }

    /// The flattened `VM_GPU_pairs` relation.
    pub fn pairs(&self) -> &[VmGpuPair] {
        &self.pairs
    }

    pub fn pair(&self, p: PairIndex) -> VmGpuPair {
        self.pairs[p]
    }

    /// Indices into [`Instance::pairs`] belonging to VM `v`.
    pub fn pairs_of(&self, v: VmIndex) -> Range<PairIndex> {
        self.pairs_by_vm[v].clone()
    }

    /// Execution time of job `j` on pair `p`.
    pub fn time(&self, j: JobIndex, p: PairIndex) -> f64 {
        self.time[j][p]
    }

    pub fn vm_index(&self, name: &str) -> Option<VmIndex> {
        self.vms.iter().position(|vm| vm.name() == name)
    }

    pub fn job_index(&self, name: &str) -> Option<JobIndex> {
        self.jobs.iter().position(|job| job.name() == name)
    }

    /// Index of the pair `(vm, gpus)`, if `gpus` is within `GPUs[vm]`.
    pub fn pair_index(&self, vm: VmIndex, gpus: GpuCount) -> Option<PairIndex> {
        let range = self.pairs_by_vm.get(vm)?;
        let offset = usize::try_from(gpus).ok()?.checked_sub(1)?;
        (offset < range.len()).then(|| range.start + offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn two_vms() -> InstanceData {
        let mut data = InstanceData::new();
        data.add_vm("small", 1, 1.0)
            .add_vm("big", 2, 3.0)
            .add_job("train", 10.0, 100.0, 5.0)
            .set_time("train", "small", 1, 8.0)
            .set_time("train", "big", 1, 7.0)
            .set_time("train", "big", 2, 4.0);
        data
    }

    #[test]
    fn pairs_are_flattened_per_vm() {
        let instance = two_vms().validate().unwrap();

        assert_eq!(
            instance.pairs().to_vec(),
            vec![
                VmGpuPair { vm: 0, gpus: 1 },
                VmGpuPair { vm: 1, gpus: 1 },
                VmGpuPair { vm: 1, gpus: 2 },
            ]
        );
        assert_eq!(instance.pairs_of(1), 1..3);
        assert_eq!(instance.pair_index(1, 2), Some(2));
        assert_eq!(instance.pair_index(1, 3), None);
        assert_eq!(instance.pair_index(0, 0), None);
        assert_eq!(instance.time(0, 2), 4.0);
        assert_eq!(instance.vm_index("big"), Some(1));
        assert_eq!(instance.job_index("train"), Some(0));
        assert_eq!(instance.job_index("infer"), None);
    }

    #[test]
    fn zero_gpu_vm_has_no_pairs() {
        let mut data = two_vms();
        data.add_vm("cpu-only", 0, 0.5);
        let instance = data.validate().unwrap();

        assert_eq!(instance.pairs().len(), 3);
        assert!(instance.pairs_of(2).is_empty());
    }

    #[test]
    fn missing_time_is_rejected() {
        let mut data = InstanceData::new();
        data.add_vm("big", 2, 3.0)
            .add_job("train", 10.0, 100.0, 5.0)
            .set_time("train", "big", 1, 7.0);

        assert_eq!(
            data.validate().unwrap_err(),
            SchemaError::MissingValue {
                param: "time",
                index: "train,big,2".to_string(),
            }
        );
    }

    #[test]
    fn time_outside_gpu_range_is_rejected() {
        let mut data = two_vms();
        data.set_time("train", "small", 2, 1.0);

        assert_eq!(
            data.validate().unwrap_err(),
            SchemaError::UnknownIndex {
                param: "time",
                index: "train,small,2".to_string(),
            }
        );
    }

    #[test]
    fn time_for_unknown_job_is_rejected() {
        let mut data = two_vms();
        data.set_time("infer", "small", 1, 1.0);

        assert!(matches!(
            data.validate(),
            Err(SchemaError::UnknownIndex { param: "time", .. })
        ));
    }

    #[test]
    fn duplicate_time_is_rejected() {
        let mut data = two_vms();
        data.set_time("train", "big", 2, 5.0);

        assert!(matches!(
            data.validate(),
            Err(SchemaError::DuplicateValue { param: "time", .. })
        ));
    }

    #[test]
    fn negative_values_are_rejected() {
        let mut data = InstanceData::new();
        data.add_vm("small", -1, 1.0);
        assert!(matches!(
            data.validate(),
            Err(SchemaError::OutOfDomain { param: "available_GPUs", .. })
        ));

        let mut data = InstanceData::new();
        data.add_vm("small", 1, -0.5);
        assert!(matches!(
            data.validate(),
            Err(SchemaError::OutOfDomain { param: "cost", .. })
        ));

        let mut data = two_vms();
        data.add_job("eval", 1.0, f64::NAN, 1.0);
        assert!(matches!(
            data.validate(),
            Err(SchemaError::OutOfDomain { param: "penalty", .. })
        ));
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut data = two_vms();
        data.add_vm("small", 1, 1.0);

        assert_eq!(
            data.validate().unwrap_err(),
            SchemaError::DuplicateEntity {
                set: "VMs",
                name: "small".to_string(),
            }
        );
    }
}
