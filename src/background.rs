//! Page background behind the pattern.
//!
//! Independent of the active archetype: either a solid color or a linear
//! gradient between the two endpoint colors whose angle drifts slowly around
//! the configured value.

use crate::color::HexColor;
use crate::params::ParamSet;

/// Gradient angle in degrees at `elapsed` seconds.
///
/// Equals `configured` exactly at `elapsed = 0`.
#[inline]
pub fn gradient_angle(configured: f32, elapsed: f32) -> f32 {
    configured + (elapsed * 0.05).sin() * 8.0
}

/// Background for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Background {
    Solid(HexColor),
    Gradient {
        angle: f32,
        from: HexColor,
        to: HexColor,
    },
}

impl Background {
    pub fn from_params(params: &ParamSet, elapsed: f32) -> Self {
        if params.gradient {
            Background::Gradient {
                angle: gradient_angle(params.gradient_angle, elapsed),
                from: params.color_a,
                to: params.color_b,
            }
        } else {
            Background::Solid(params.background)
        }
    }

    /// CSS `background` value.
    pub fn css(&self) -> String {
        match self {
            Background::Solid(color) => color.to_hex(),
            Background::Gradient { angle, from, to } => format!(
                "linear-gradient({:.2}deg, {}, {})",
                angle,
                from.to_hex(),
                to.to_hex()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angle_at_zero_is_configured() {
        for angle in [0.0, 45.0, 135.0, 359.5] {
            assert_eq!(gradient_angle(angle, 0.0), angle);
        }
    }

    #[test]
    fn test_angle_oscillation_bounded() {
        for i in 0..200 {
            let a = gradient_angle(135.0, i as f32 * 7.3);
            assert!((a - 135.0).abs() <= 8.0 + 1e-4);
        }
    }

    #[test]
    fn test_css() {
        let params = ParamSet::default();
        let bg = Background::from_params(&params, 0.0);
        assert_eq!(bg.css(), "linear-gradient(135.00deg, #00aaff, #ff44aa)");

        let params = ParamSet {
            gradient: false,
            ..Default::default()
        };
        assert_eq!(Background::from_params(&params, 3.0).css(), "#0b0b0b");
    }
}
