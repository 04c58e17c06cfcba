use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use transim_elements::prelude::{Circuit, StepContext};
use transim_matrix::MnaSystem;

use crate::config::SolverConfig;
use crate::error::{Error, Result};

/// Owns the restart RNG across the whole transient run: the RNG is
/// process-wide state per the engine's seeding policy, not reseeded per step.
pub struct Newton {
    rng: StdRng,
}

/// Outcome of solving one time step to convergence.
pub struct StepOutcome {
    pub x: Vec<f64>,
    pub iterations: usize,
    pub restarts: usize,
}

impl Newton {
    pub fn new(config: &SolverConfig) -> Self {
        Self { rng: StdRng::seed_from_u64(config.rng_seed) }
    }

    /// Solves one time step to convergence, re-seeding `x_now` with uniform
    /// noise and resetting the iteration counter on stall. `x_prev` and the
    /// step's `dt`/`dt_prev`/`t`/`n` are fixed for the whole call; only
    /// `x_now` changes between iterations.
    pub fn solve_step(
        &mut self,
        circuit: &Circuit,
        sys: &mut MnaSystem,
        rule: transim_elements::prelude::IntegrationRule,
        t: f64,
        dt: f64,
        dt_prev: f64,
        n: u64,
        x_prev: &[f64],
        config: &SolverConfig,
    ) -> Result<StepOutcome> {
        let nv = circuit.nv;
        let mut x_now = x_prev.to_vec();
        let mut iterations = 0usize;
        let mut restarts = 0usize;
        let single_pass = !circuit.has_nonlinear();

        loop {
            let ctx = StepContext { rule, t, dt, dt_prev, n, x_now: &x_now, x_prev };

            sys.clear();
            circuit.stamp_all(sys, &ctx, iterations);
            sys.solve().map_err(|e| Error::SingularSystem { t, pivot: e_pivot(&e) })?;
            let x_new = sys.solution_vec();

            let err = (1..=nv)
                .map(|i| (x_new[i] - x_now[i]).abs())
                .fold(0.0_f64, f64::max);

            x_now = x_new;
            iterations += 1;

            if single_pass || err <= config.newton_tolerance {
                return Ok(StepOutcome { x: x_now, iterations, restarts });
            }

            if iterations >= config.restart_threshold && iterations < config.max_iterations {
                if restarts >= config.restart_budget {
                    return Err(Error::Nonconvergent { t, restarts });
                }
                log::warn!("t={t:e}: Newton stalled after {iterations} iterations, restart {}/{}", restarts + 1, config.restart_budget);
                for slot in x_now.iter_mut().skip(1) {
                    *slot = self.rng.gen_range(-5.0..=5.0);
                }
                restarts += 1;
                iterations = 0;
                continue;
            }

            if iterations >= config.max_iterations {
                return Err(Error::Nonconvergent { t, restarts });
            }

            log::debug!("t={t:e}: Newton iteration {iterations}, err={err:e}");
        }
    }
}

fn e_pivot(e: &transim_matrix::Error) -> f64 {
    match e {
        transim_matrix::Error::Singular { pivot, .. } => *pivot,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transim_elements::elements::resistor::Resistor;
    use transim_elements::elements::sources::VoltageSource;
    use transim_elements::elements::IntegrationRule;
    use transim_elements::symtab::SymbolTable;
    use transim_elements::waveform::Waveform;

    fn single_resistor_divider() -> Circuit {
        let mut symtab = SymbolTable::new(16);
        let n1 = symtab.intern_node("n1").unwrap();
        symtab.finalize_nodes();
        let jv = symtab.intern_current("jV1").unwrap();
        symtab.finalize_currents();

        let elements: Vec<transim_elements::elements::Element> = vec![
            Resistor { name: "1".into(), plus: n1, minus: 0, resistance: 1_000.0 }.into(),
            VoltageSource { name: "1".into(), plus: n1, minus: 0, current: jv, waveform: Waveform::Dc(1.0) }.into(),
        ];
        Circuit::new(IntegrationRule::BackwardEuler, &symtab, elements).unwrap()
    }

    #[test]
    fn linear_circuit_converges_in_one_iteration() {
        let circuit = single_resistor_divider();
        let mut sys = MnaSystem::new(circuit.nv);
        let mut newton = Newton::new(&SolverConfig::default());
        let x_prev = vec![0.0; circuit.nv + 1];

        let outcome = newton
            .solve_step(
                &circuit,
                &mut sys,
                circuit.rule,
                0.0,
                1e-6,
                1e-6,
                0,
                &x_prev,
                &SolverConfig::default(),
            )
            .unwrap();

        assert_eq!(outcome.iterations, 1);
        assert_eq!(outcome.restarts, 0);
        assert!((outcome.x[1] - 1.0).abs() < 1e-9);
    }
}
