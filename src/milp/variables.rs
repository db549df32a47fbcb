use std::collections::HashSet;

use tracing::debug;

use super::VarId;
use crate::constants::VarDomain;
use crate::errors::ConstructionError;
use crate::models::{Instance, JobIndex, PairIndex, VmIndex};

#[derive(Clone, Debug, PartialEq)]
pub struct VarSlot {
    name: String,
    domain: VarDomain,
}

impl VarSlot {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn domain(&self) -> VarDomain {
        self.domain
    }
}

/// Identity of a slot, used to detect double allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum SlotKey {
    Deployment(JobIndex, PairIndex),
    ChosenVm(VmIndex),
    ChosenJob(JobIndex),
    Tardiness(JobIndex),
    FinalCost,
}

/// The decision variables of the model. Slots only, values come from a solver.
#[derive(Clone, Debug)]
pub struct Variables {
    slots: Vec<VarSlot>,
    deployment: Vec<Vec<VarId>>, // x[j][p]
    chosen_vms: Vec<VarId>,      // y[v]
    chosen_job: Vec<VarId>,      // z[j]
    tardiness: Vec<VarId>,       // tau[j]
    final_cost: VarId,           // xi
}

struct Allocator {
    slots: Vec<VarSlot>,
    seen: HashSet<SlotKey>,
}

impl Allocator {
    fn reserve(&mut self, key: SlotKey, name: String, domain: VarDomain) -> Result<VarId, ConstructionError> {
        if !self.seen.insert(key) {
            return Err(ConstructionError::DuplicateSlot(name));
        }
        self.slots.push(VarSlot { name, domain });
        Ok(VarId(self.slots.len() - 1))
    }
}

impl Variables {
    /// Reserves one slot per index of every variable family.
    pub fn allocate(instance: &Instance) -> Result<Self, ConstructionError> {
        let mut alloc = Allocator {
            slots: Vec::new(),
            seen: HashSet::new(),
        };

        let mut deployment = Vec::with_capacity(instance.jobs().len());
        for (j, job) in instance.jobs().iter().enumerate() {
            let row = instance
                .pairs()
                .iter()
                .enumerate()
                .map(|(p, pair)| {
                    alloc.reserve(
                        SlotKey::Deployment(j, p),
                        format!(
                            "deployment[{},{},{}]",
                            job.name(),
                            instance.vm(pair.vm).name(),
                            pair.gpus
                        ),
                        VarDomain::Binary,
                    )
                })
                .collect::<Result<Vec<_>, _>>()?;
            deployment.push(row);
        }

        let chosen_vms = instance
            .vms()
            .iter()
            .enumerate()
            .map(|(v, vm)| {
                alloc.reserve(
                    SlotKey::ChosenVm(v),
                    format!("chosen_VMs[{}]", vm.name()),
                    VarDomain::Binary,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let chosen_job = instance
            .jobs()
            .iter()
            .enumerate()
            .map(|(j, job)| {
                alloc.reserve(
                    SlotKey::ChosenJob(j),
                    format!("chosen_job[{}]", job.name()),
                    VarDomain::Binary,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let tardiness = instance
            .jobs()
            .iter()
            .enumerate()
            .map(|(j, job)| {
                alloc.reserve(
                    SlotKey::Tardiness(j),
                    format!("tardiness[{}]", job.name()),
                    VarDomain::NonNegativeReal,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        let final_cost = alloc.reserve(
            SlotKey::FinalCost,
            "final_cost".to_string(),
            VarDomain::NonNegativeReal,
        )?;

        let expected = instance.jobs().len() * instance.pairs().len();
        let allocated: usize = deployment.iter().map(Vec::len).sum();
        if allocated != expected {
            return Err(ConstructionError::MissingSlots { expected, allocated });
        }

        debug!(
            slots = alloc.slots.len(),
            deployment = allocated,
            "variables allocated"
        );

        Ok(Self {
            slots: alloc.slots,
            deployment,
            chosen_vms,
            chosen_job,
            tardiness,
            final_cost,
        })
    }

    pub fn slots(&self) -> &[VarSlot] {
        &self.slots
    }

    pub fn slot(&self, var: VarId) -> &VarSlot {
        &self.slots[var.0]
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn deployment(&self, j: JobIndex, p: PairIndex) -> VarId {
        self.deployment[j][p]
    }

    /// `deployment[j, ·, ·]` in pair order.
    pub fn deployments_of(&self, j: JobIndex) -> &[VarId] {
        &self.deployment[j]
    }

    pub fn chosen_vm(&self, v: VmIndex) -> VarId {
        self.chosen_vms[v]
    }

    pub fn chosen_job(&self, j: JobIndex) -> VarId {
        self.chosen_job[j]
    }

    pub fn tardiness(&self, j: JobIndex) -> VarId {
        self.tardiness[j]
    }

    pub fn final_cost(&self) -> VarId {
        self.final_cost
    }
}
