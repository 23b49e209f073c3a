//! Easing curves for overlay tweens.

/// Named easing curves, following the usual `powerN` naming.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    Linear,
    /// Quadratic ease-out.
    #[default]
    Power1Out,
    /// Quintic ease-in-out.
    Power4InOut,
}

impl Easing {
    /// Evaluate at `t`, clamped to [0, 1]. Endpoints map to 0 and 1.
    #[inline]
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::Power1Out => {
                let omt = 1.0 - t;
                1.0 - omt * omt
            }
            Easing::Power4InOut => {
                if t < 0.5 {
                    16.0 * t.powi(5)
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(5) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoints() {
        for easing in [Easing::Linear, Easing::Power1Out, Easing::Power4InOut] {
            assert_eq!(easing.evaluate(0.0), 0.0);
            assert!((easing.evaluate(1.0) - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_power4_in_out_is_symmetric() {
        let e = Easing::Power4InOut;
        assert!((e.evaluate(0.5) - 0.5).abs() < 1e-6);
        assert!((e.evaluate(0.25) + e.evaluate(0.75) - 1.0).abs() < 1e-5);
        assert!(e.evaluate(0.1) < 0.01);
    }

    #[test]
    fn test_power1_out_front_loaded() {
        assert!(Easing::Power1Out.evaluate(0.25) > 0.25);
    }

    #[test]
    fn test_input_clamping() {
        assert_eq!(Easing::Linear.evaluate(-0.5), 0.0);
        assert_eq!(Easing::Linear.evaluate(1.5), 1.0);
    }
}
