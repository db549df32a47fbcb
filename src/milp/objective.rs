use super::{LinearExpr, Variables};
use crate::models::Instance;

/// `final_cost + Σ_j penalty[j]·(1 − chosen_job[j]) + Σ_j tardinessweight[j]·tardiness[j]`
///
/// The rejection penalties are expanded into the constant `Σ_j penalty[j]` and a
/// `-penalty[j]` coefficient on each `chosen_job[j]`.
pub fn minimum_cost(instance: &Instance, vars: &Variables) -> LinearExpr {
    let mut objective = LinearExpr::var(vars.final_cost());

    for (j, job) in instance.jobs().iter().enumerate() {
        objective.add_constant(job.penalty());
        objective.add_term(vars.chosen_job(j), -job.penalty());
        objective.add_term(vars.tardiness(j), job.tardiness_weight());
    }

    objective
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milp::Assignment;
    use crate::InstanceData;

    #[test]
    fn rejected_jobs_pay_their_penalty() {
        let mut data = InstanceData::new();
        data.add_vm("v", 1, 1.0)
            .add_job("kept", 5.0, 30.0, 2.0)
            .add_job("dropped", 5.0, 7.0, 1.0)
            .set_time("kept", "v", 1, 6.0)
            .set_time("dropped", "v", 1, 1.0);
        let instance = data.validate().unwrap();
        let vars = Variables::allocate(&instance).unwrap();
        let objective = minimum_cost(&instance, &vars);

        assert_eq!(objective.constant_term(), 37.0);

        let mut assignment = Assignment::zeros(vars.len());
        assignment
            .set(vars.final_cost(), 6.0)
            .set(vars.chosen_job(0), 1.0)
            .set(vars.tardiness(0), 1.0);

        // 6 (cost) + 7 (penalty of "dropped") + 2·1 (tardiness of "kept")
        assert_eq!(objective.evaluate(&assignment), 15.0);
    }
}
