//! Fixed-step integration of the pendulum equation of motion
//! `d²θ/dt² + (g/L)·sinθ = 0`.

use crate::{
    error::PendulaResult,
    model::{SimulationConfig, StateSample, Trajectory},
};

/// Integrate the configured pendulum over the half-open window `[0, t_max)`.
///
/// Semi-implicit (symplectic) Euler: the angular velocity is updated from the
/// previous angle first, and the angle then uses the just-updated velocity.
/// That ordering keeps the energy error bounded over long horizons;
/// angle-first would be plain explicit Euler, which diverges.
///
/// Sample times are `t_i = i * dt` (index-multiplied, not accumulated), and
/// the first sample is exactly the configured initial condition.
#[tracing::instrument(skip(cfg), fields(t_max = cfg.t_max, dt = cfg.dt))]
pub fn integrate(cfg: &SimulationConfig) -> PendulaResult<Trajectory> {
    cfg.validate()?;

    let n = cfg.sample_count();
    let mut trajectory = Trajectory::with_capacity(n);
    if n == 0 {
        return Ok(trajectory);
    }

    let mut theta = cfg.theta0;
    let mut omega = cfg.omega0;
    trajectory.push(StateSample::from_angular(0.0, theta, omega, cfg.length));

    let g_over_l = cfg.g / cfg.length;
    for i in 1..n {
        omega -= g_over_l * theta.sin() * cfg.dt;
        theta += omega * cfg.dt;
        trajectory.push(StateSample::from_angular(
            i as f64 * cfg.dt,
            theta,
            omega,
            cfg.length,
        ));
    }

    tracing::debug!(samples = trajectory.len(), "integration complete");
    Ok(trajectory)
}
