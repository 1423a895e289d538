use crate::error::{PendulaError, PendulaResult};

/// Physical constants and integration window for one simulation run.
///
/// The defaults reproduce the stock demo: a 1 m pendulum released from
/// 0.3 rad at rest, integrated for 10 s at 10 ms steps.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Gravitational acceleration (m/s^2).
    pub g: f64,
    /// Rod length (m). Must be > 0.
    pub length: f64,
    /// Initial angle from the rest position (rad).
    pub theta0: f64,
    /// Initial angular velocity (rad/s).
    pub omega0: f64,
    /// Total simulated time (s). Must be > 0.
    pub t_max: f64,
    /// Fixed integration step (s). Must be > 0.
    pub dt: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            g: 9.81,
            length: 1.0,
            theta0: 0.3,
            omega0: 0.0,
            t_max: 10.0,
            dt: 0.01,
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> PendulaResult<()> {
        let fields = [
            ("g", self.g),
            ("length", self.length),
            ("theta0", self.theta0),
            ("omega0", self.omega0),
            ("t_max", self.t_max),
            ("dt", self.dt),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(PendulaError::invalid_config(format!(
                    "{name} must be finite"
                )));
            }
        }
        if self.length <= 0.0 {
            return Err(PendulaError::invalid_config("length must be > 0"));
        }
        if self.dt <= 0.0 {
            return Err(PendulaError::invalid_config("dt must be > 0"));
        }
        if self.t_max <= 0.0 {
            return Err(PendulaError::invalid_config("t_max must be > 0"));
        }
        Ok(())
    }

    /// Number of samples in the half-open window `[0, t_max)`.
    ///
    /// The f64 quotient is nudged up by a few ulps before flooring so an
    /// exactly divisible `t_max` (10.0 / 0.01 style cases) is not lost to
    /// division rounding. A sample exactly at `t_max` is always excluded.
    pub fn sample_count(&self) -> usize {
        let ratio = self.t_max / self.dt;
        (ratio + ratio * 4.0 * f64::EPSILON).floor() as usize
    }
}

/// One instant of the pendulum: angular state plus the derived bob position.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StateSample {
    /// Sample time (s).
    pub t: f64,
    /// Signed, unwrapped angle (rad); never normalized into [-pi, pi].
    pub theta: f64,
    /// Angular velocity (rad/s).
    pub omega: f64,
    /// Bob x with the pivot at the origin (m).
    pub x: f64,
    /// Bob y with the pivot at the origin (m); the rest position is y = -length.
    pub y: f64,
}

impl StateSample {
    pub fn from_angular(t: f64, theta: f64, omega: f64, length: f64) -> Self {
        Self {
            t,
            theta,
            omega,
            x: length * theta.sin(),
            y: -length * theta.cos(),
        }
    }
}

/// Complete integrator output: one sample per step, ordered by increasing time.
///
/// Fully materialized so consumers can make repeated, random-access passes
/// (the chart reads `(t, theta)`, the animation reads `(x, y)` with a stride,
/// the CSV export reads every column).
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Trajectory {
    samples: Vec<StateSample>,
}

impl Trajectory {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            samples: Vec::with_capacity(n),
        }
    }

    pub(crate) fn push(&mut self, sample: StateSample) {
        self.samples.push(sample);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[StateSample] {
        &self.samples
    }

    pub fn first(&self) -> Option<&StateSample> {
        self.samples.first()
    }

    pub fn last(&self) -> Option<&StateSample> {
        self.samples.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StateSample> {
        self.samples.iter()
    }

    /// Every `stride`-th sample, starting from the first. A stride of 0 is
    /// treated as 1.
    pub fn iter_stride(&self, stride: usize) -> impl Iterator<Item = &StateSample> {
        self.samples.iter().step_by(stride.max(1))
    }

    /// `(t, theta)` pairs for charting.
    pub fn angle_series(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples.iter().map(|s| (s.t, s.theta))
    }
}

impl std::ops::Index<usize> for Trajectory {
    type Output = StateSample;

    fn index(&self, index: usize) -> &Self::Output {
        &self.samples[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_nonpositive_length_dt_t_max() {
        for cfg in [
            SimulationConfig {
                length: 0.0,
                ..Default::default()
            },
            SimulationConfig {
                dt: 0.0,
                ..Default::default()
            },
            SimulationConfig {
                t_max: 0.0,
                ..Default::default()
            },
            SimulationConfig {
                length: -1.0,
                ..Default::default()
            },
        ] {
            assert!(matches!(
                cfg.validate(),
                Err(PendulaError::InvalidConfig(_))
            ));
        }
    }

    #[test]
    fn validate_rejects_non_finite_fields() {
        let cfg = SimulationConfig {
            theta0: f64::NAN,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = SimulationConfig {
            g: f64::INFINITY,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn sample_count_survives_division_rounding() {
        // 10.0 / 0.01 and 0.3 / 0.1 are both exact multiples that round badly
        // in f64 without the guard.
        let cfg = SimulationConfig::default();
        assert_eq!(cfg.sample_count(), 1000);

        let cfg = SimulationConfig {
            t_max: 0.3,
            dt: 0.1,
            ..Default::default()
        };
        assert_eq!(cfg.sample_count(), 3);
    }

    #[test]
    fn sample_count_floors_partial_steps() {
        let cfg = SimulationConfig {
            t_max: 1.05,
            dt: 0.1,
            ..Default::default()
        };
        assert_eq!(cfg.sample_count(), 10);
    }

    #[test]
    fn from_angular_derives_bob_position() {
        let s = StateSample::from_angular(0.0, 0.0, 0.0, 2.0);
        assert_eq!(s.x, 0.0);
        assert_eq!(s.y, -2.0);

        let s = StateSample::from_angular(0.0, std::f64::consts::FRAC_PI_2, 0.0, 1.0);
        assert!((s.x - 1.0).abs() < 1e-12);
        assert!(s.y.abs() < 1e-12);
    }

    #[test]
    fn json_roundtrip() {
        let cfg = SimulationConfig::default();
        let s = serde_json::to_string_pretty(&cfg).unwrap();
        let de: SimulationConfig = serde_json::from_str(&s).unwrap();
        assert_eq!(de.t_max, 10.0);
        assert_eq!(de.dt, 0.01);
    }

    #[test]
    fn partial_json_fills_defaults() {
        let de: SimulationConfig = serde_json::from_str(r#"{"theta0": 0.5}"#).unwrap();
        assert_eq!(de.theta0, 0.5);
        assert_eq!(de.length, 1.0);
    }
}
