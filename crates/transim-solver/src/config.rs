/// Solver tunables, gathered in one place per the "never hardcoded inline at
/// each call site" policy. Defaults match the literals fixed by the engine's
/// Newton loop and linear solver.
#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// Newton iteration stops once `max_i |x_new[i] - x_now[i]|` falls at or
    /// below this value.
    pub newton_tolerance: f64,

    /// Hard cap on Newton iterations per time step, restarts included.
    pub max_iterations: usize,

    /// Iterations without convergence before a random restart is attempted.
    pub restart_threshold: usize,

    /// Restarts allowed within a single time step before it is reported
    /// nonconvergent.
    pub restart_budget: usize,

    /// Mirrors `transim_matrix::PIVOT_EPSILON`; carried here so callers can
    /// read the documented default without reaching into the matrix crate.
    pub pivot_epsilon: f64,

    /// Seed for the restart RNG. Fixed by default so runs are reproducible;
    /// override with an entropy-derived value to vary restarts across runs.
    pub rng_seed: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            newton_tolerance: 1e-7,
            max_iterations: 100,
            restart_threshold: 20,
            restart_budget: 10,
            pivot_epsilon: transim_matrix::PIVOT_EPSILON,
            rng_seed: 0x7653_ddc1_a5f0_21e9,
        }
    }
}
