//! Constraint groups of the single node model.
//!
//! Every group is produced by one function that emits a constraint for each
//! element of its index domain. Sums over `(v, g)` always go through the
//! flattened `VM_GPU_pairs` relation of the instance.

use tracing::debug;

use super::{Constraint, LinearExpr, Variables};
use crate::models::Instance;

/// A named family of constraints sharing one index domain.
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintGroup {
    name: &'static str,
    doc: &'static str,
    constraints: Vec<Constraint>,
}

impl ConstraintGroup {
    fn new(name: &'static str, doc: &'static str, constraints: Vec<Constraint>) -> Self {
        debug!(group = name, constraints = constraints.len(), "constraint group built");
        Self {
            name,
            doc,
            constraints,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn doc(&self) -> &'static str {
        self.doc
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }
}

/// All groups, in a fixed order.
pub fn generate(instance: &Instance, vars: &Variables) -> Vec<ConstraintGroup> {
    vec![
        one_vm(instance, vars),
        disable_vms(instance, vars),
        one_deployment(instance, vars),
        gpu_bound(instance, vars),
        job_duration(instance, vars),
        maximum_deployed_cost(instance, vars),
        selected_vm_for_accepted_job(instance, vars),
    ]
}

/// Label `[job,vm,gpus]` for constraints indexed by a job and a pair.
fn triple(instance: &Instance, j: usize, p: usize) -> String {
    let pair = instance.pair(p);
    format!(
        "[{},{},{}]",
        instance.job(j).name(),
        instance.vm(pair.vm).name(),
        pair.gpus
    )
}

/// `Σ_v chosen_VMs[v] = 1`
pub fn one_vm(instance: &Instance, vars: &Variables) -> ConstraintGroup {
    let mut sum = LinearExpr::new();
    for v in 0..instance.vms().len() {
        sum.add_term(vars.chosen_vm(v), 1.0);
    }

    ConstraintGroup::new(
        "one_vm",
        "Enable only one node",
        vec![Constraint::exactly("one_vm", sum, LinearExpr::constant(1.0))],
    )
}

/// `deployment[j,v,g] <= chosen_VMs[v]` for every job and pair.
pub fn disable_vms(instance: &Instance, vars: &Variables) -> ConstraintGroup {
    let mut constraints = Vec::new();
    for j in 0..instance.jobs().len() {
        for (p, pair) in instance.pairs().iter().enumerate() {
            constraints.push(Constraint::at_most(
                format!("disable_vms{}", triple(instance, j, p)),
                LinearExpr::var(vars.deployment(j, p)),
                LinearExpr::var(vars.chosen_vm(pair.vm)),
            ));
        }
    }

    ConstraintGroup::new(
        "disable_vms",
        "Disable all the choices related to discarded VMs",
        constraints,
    )
}

/// `Σ_(v,g) deployment[j,v,g] = chosen_job[j]` for every job.
pub fn one_deployment(instance: &Instance, vars: &Variables) -> ConstraintGroup {
    let constraints = instance
        .jobs()
        .iter()
        .enumerate()
        .map(|(j, job)| {
            let mut placed = LinearExpr::new();
            for &x in vars.deployments_of(j) {
                placed.add_term(x, 1.0);
            }
            Constraint::exactly(
                format!("one_deployment[{}]", job.name()),
                placed,
                LinearExpr::var(vars.chosen_job(j)),
            )
        })
        .collect();

    ConstraintGroup::new(
        "one_deployment",
        "Enforce exactly one deployment per accepted job",
        constraints,
    )
}

/// `Σ_j Σ_g g · deployment[j,v,g] <= available_GPUs[v]` for every VM.
pub fn gpu_bound(instance: &Instance, vars: &Variables) -> ConstraintGroup {
    let constraints = instance
        .vms()
        .iter()
        .enumerate()
        .map(|(v, vm)| {
            let mut used = LinearExpr::new();
            for j in 0..instance.jobs().len() {
                for p in instance.pairs_of(v) {
                    used.add_term(vars.deployment(j, p), f64::from(instance.pair(p).gpus));
                }
            }
            Constraint::at_most(
                format!("gpu_bound[{}]", vm.name()),
                used,
                LinearExpr::constant(f64::from(vm.available_gpus())),
            )
        })
        .collect();

    ConstraintGroup::new(
        "gpu_bound",
        "Constrain the number of GPUs available per VM",
        constraints,
    )
}

/// `Σ_(v,g) time[j,v,g] · deployment[j,v,g] <= deadline[j] + tardiness[j]` for every job.
pub fn job_duration(instance: &Instance, vars: &Variables) -> ConstraintGroup {
    let constraints = instance
        .jobs()
        .iter()
        .enumerate()
        .map(|(j, job)| {
            let mut duration = LinearExpr::new();
            for (p, &x) in vars.deployments_of(j).iter().enumerate() {
                duration.add_term(x, instance.time(j, p));
            }
            Constraint::at_most(
                format!("job_duration[{}]", job.name()),
                duration,
                LinearExpr::constant(job.deadline()).plus(vars.tardiness(j), 1.0),
            )
        })
        .collect();

    ConstraintGroup::new("job_duration", "Enforce deadlines on jobs", constraints)
}

/// `final_cost >= time[j,v,g] · cost[v] · deployment[j,v,g]` for every job and pair.
///
/// Minimizing `final_cost` then makes it the largest cost among deployed jobs.
pub fn maximum_deployed_cost(instance: &Instance, vars: &Variables) -> ConstraintGroup {
    let mut constraints = Vec::new();
    for j in 0..instance.jobs().len() {
        for (p, pair) in instance.pairs().iter().enumerate() {
            let cost = instance.time(j, p) * instance.vm(pair.vm).cost();
            constraints.push(Constraint::at_least(
                format!("maximum_deployed_cost{}", triple(instance, j, p)),
                LinearExpr::var(vars.final_cost()),
                LinearExpr::new().plus(vars.deployment(j, p), cost),
            ));
        }
    }

    ConstraintGroup::new(
        "maximum_deployed_cost",
        "Find maximum total cost among deployed jobs",
        constraints,
    )
}

/// `deployment[j,v,g] <= chosen_job[j]` for every job and pair.
///
/// Implied by `one_deployment` for integral solutions, kept as its own group.
pub fn selected_vm_for_accepted_job(instance: &Instance, vars: &Variables) -> ConstraintGroup {
    let mut constraints = Vec::new();
    for j in 0..instance.jobs().len() {
        for p in 0..instance.pairs().len() {
            constraints.push(Constraint::at_most(
                format!("selected_vm_for_accepted_job{}", triple(instance, j, p)),
                LinearExpr::var(vars.deployment(j, p)),
                LinearExpr::var(vars.chosen_job(j)),
            ));
        }
    }

    ConstraintGroup::new(
        "selected_vm_for_accepted_job",
        "Only deploy jobs that are not rejected",
        constraints,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::Comparison;
    use crate::InstanceData;
    use similar_asserts::assert_eq;

    // one VM with 2 GPUs, one with 1 GPU, two jobs
    fn fixture() -> (Instance, Variables) {
        let mut data = InstanceData::new();
        data.add_vm("dual", 2, 2.0)
            .add_vm("single", 1, 1.0)
            .add_job("a", 10.0, 50.0, 2.0)
            .add_job("b", 4.0, 20.0, 1.0)
            .set_time("a", "dual", 1, 8.0)
            .set_time("a", "dual", 2, 5.0)
            .set_time("a", "single", 1, 9.0)
            .set_time("b", "dual", 1, 6.0)
            .set_time("b", "dual", 2, 3.0)
            .set_time("b", "single", 1, 7.0);
        let instance = data.validate().unwrap();
        let vars = Variables::allocate(&instance).unwrap();
        (instance, vars)
    }

    #[test]
    fn group_sizes_follow_index_domains() {
        let (instance, vars) = fixture();
        let sizes: Vec<(&str, usize)> = generate(&instance, &vars)
            .iter()
            .map(|g| (g.name(), g.len()))
            .collect();

        assert_eq!(
            sizes,
            vec![
                ("one_vm", 1),
                ("disable_vms", 6),
                ("one_deployment", 2),
                ("gpu_bound", 2),
                ("job_duration", 2),
                ("maximum_deployed_cost", 6),
                ("selected_vm_for_accepted_job", 6),
            ]
        );
    }

    #[test]
    fn gpu_bound_weights_by_gpu_count() {
        let (instance, vars) = fixture();
        let group = gpu_bound(&instance, &vars);
        let dual = &group.constraints()[0];

        assert_eq!(dual.name(), "gpu_bound[dual]");
        assert_eq!(dual.comparison(), Comparison::LessEqual);
        assert_eq!(dual.rhs(), 2.0);
        assert_eq!(dual.lhs().coefficient(vars.deployment(0, 0)), 1.0);
        assert_eq!(dual.lhs().coefficient(vars.deployment(1, 1)), 2.0);
        // the single-GPU VM does not appear in the dual VM's bound
        assert_eq!(dual.lhs().coefficient(vars.deployment(0, 2)), 0.0);
        assert_eq!(dual.lhs().terms().len(), 4);
    }

    #[test]
    fn job_duration_moves_deadline_and_tardiness() {
        let (instance, vars) = fixture();
        let group = job_duration(&instance, &vars);
        let b = &group.constraints()[1];

        // 6 x1 + 3 x2 + 7 x3 - tau_b <= 4
        assert_eq!(b.rhs(), 4.0);
        assert_eq!(b.lhs().coefficient(vars.deployment(1, 1)), 3.0);
        assert_eq!(b.lhs().coefficient(vars.tardiness(1)), -1.0);
    }

    #[test]
    fn maximum_cost_uses_time_times_cost() {
        let (instance, vars) = fixture();
        let group = maximum_deployed_cost(&instance, &vars);
        let c = group
            .constraints()
            .iter()
            .find(|c| c.name() == "maximum_deployed_cost[a,dual,2]")
            .unwrap();

        // final_cost - 10 x >= 0
        assert_eq!(c.comparison(), Comparison::GreaterEqual);
        assert_eq!(c.rhs(), 0.0);
        assert_eq!(c.lhs().coefficient(vars.final_cost()), 1.0);
        assert_eq!(c.lhs().coefficient(vars.deployment(0, 1)), -10.0);
    }

    #[test]
    fn one_deployment_links_to_acceptance() {
        let (instance, vars) = fixture();
        let group = one_deployment(&instance, &vars);
        let a = &group.constraints()[0];

        assert_eq!(a.comparison(), Comparison::Equal);
        assert_eq!(a.rhs(), 0.0);
        assert_eq!(a.lhs().coefficient(vars.chosen_job(0)), -1.0);
        assert_eq!(a.lhs().terms().len(), 4);
    }
}
