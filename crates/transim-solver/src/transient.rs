use transim_elements::prelude::Circuit;
use transim_matrix::MnaSystem;

use crate::config::SolverConfig;
use crate::error::{Error, Result};
use crate::newton::Newton;

/// `T`, `P`, `S` from §4.5: total simulated time, emitted sample count, and
/// internal substeps per emitted sample.
pub struct TransientParams {
    pub t_total: f64,
    pub samples: usize,
    pub substeps: usize,
}

/// Netlists with more samples than this are rejected up front; `P` above the
/// bound is an `InvalidParameters` condition, not a slow run.
pub const MAX_SAMPLES: usize = 100_000;

impl TransientParams {
    pub fn new(t_total: f64, samples: usize, substeps: usize) -> Result<Self> {
        if !(t_total > 0.0) {
            return Err(invalid("T must be positive"));
        }
        if samples == 0 {
            return Err(invalid("P must be positive"));
        }
        if substeps == 0 {
            return Err(invalid("S must be positive"));
        }
        if samples > MAX_SAMPLES {
            return Err(invalid(&format!("P={samples} exceeds the {MAX_SAMPLES} sample bound")));
        }
        Ok(Self { t_total, samples, substeps })
    }

    fn total_steps(&self) -> u64 {
        self.samples as u64 * self.substeps as u64
    }

    fn nominal_dt(&self) -> f64 {
        self.t_total / self.total_steps() as f64
    }
}

fn invalid(message: &str) -> Error {
    Error::Elements(transim_elements::error::Error::InvalidParameters(message.to_string()))
}

/// One emitted trajectory row: the time and every unknown in symbol-table order.
#[derive(Debug)]
pub struct Sample {
    pub t: f64,
    pub x: Vec<f64>,
}

/// Summary statistics reported at engine shutdown, per §4.5's termination note.
#[derive(Debug)]
pub struct TransientReport {
    pub samples: Vec<Sample>,
    pub peak_iterations: usize,
    pub peak_restarts: usize,
    pub last_randomization_time: Option<f64>,
}

/// Runs the transient engine to completion, returning every emitted sample
/// plus the iteration/restart statistics the engine logs at shutdown.
pub fn run(circuit: &mut Circuit, params: &TransientParams, config: &SolverConfig) -> Result<TransientReport> {
    let nv = circuit.nv;
    let total_steps = params.total_steps();
    let dt1 = params.nominal_dt();

    log::info!(
        "transient engine starting: T={:e} P={} S={} N={} dt1={:e}",
        params.t_total, params.samples, params.substeps, total_steps, dt1
    );

    let mut sys = MnaSystem::new(nv);
    let mut newton = Newton::new(config);

    let mut t = 0.0_f64;
    let mut dt_prev = dt1;
    let mut x_prev = vec![0.0_f64; nv + 1];

    let mut samples = Vec::with_capacity(params.samples + 1);
    let mut peak_iterations = 0usize;
    let mut peak_restarts = 0usize;
    let mut last_randomization_time = None;

    for n in 0..total_steps {
        let dt = if n == 0 { dt1 * 1e-3 } else { dt1 };

        // Companion scratch (trapezoidal capacitor voltage, Lnodal current) is
        // advanced once per step, before any Newton iteration runs, using
        // last step's x_prev/dt_prev.
        circuit.on_step_start_all(&transim_elements::prelude::StepContext {
            rule: circuit.rule,
            t,
            dt,
            dt_prev,
            n,
            x_now: &x_prev,
            x_prev: &x_prev,
        });

        let outcome = newton.solve_step(
            circuit, &mut sys, circuit.rule, t, dt, dt_prev, n, &x_prev, config,
        )?;

        peak_iterations = peak_iterations.max(outcome.iterations);
        if outcome.restarts > 0 {
            peak_restarts = peak_restarts.max(outcome.restarts);
            last_randomization_time = Some(t);
        }

        if n % params.substeps as u64 == 0 {
            samples.push(Sample { t, x: outcome.x.clone() });
        }

        x_prev = outcome.x;
        t += dt;
        dt_prev = dt;
    }

    log::info!(
        "transient engine finished: peak_iterations={peak_iterations} peak_restarts={peak_restarts} last_randomization_time={last_randomization_time:?}"
    );

    Ok(TransientReport { samples, peak_iterations, peak_restarts, last_randomization_time })
}
