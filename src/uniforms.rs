//! Typed uniform records for shader surfaces.
//!
//! Each shader archetype owns a plain struct whose fields are its uniforms.
//! `#[derive(ShaderUniforms)]` generates the GLSL declarations and an ordered
//! list of named values, so every uniform always exists and the render stage
//! assigns them without presence checks.
//!
//! # Example
//!
//! ```ignore
//! #[derive(ShaderUniforms, Clone, Debug)]
//! struct Glow {
//!     time: f32,
//!     color_a: Vec3,
//! }
//!
//! assert_eq!(Glow::GLSL_DECLARATIONS, "uniform float time;\nuniform vec3 colorA;\n");
//! ```

use glam::{Vec2, Vec3};

/// Supported uniform value types.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UniformValue {
    F32(f32),
    Vec2(Vec2),
    Vec3(Vec3),
}

impl UniformValue {
    /// Get the GLSL type name for this value.
    pub fn glsl_type(&self) -> &'static str {
        match self {
            UniformValue::F32(_) => "float",
            UniformValue::Vec2(_) => "vec2",
            UniformValue::Vec3(_) => "vec3",
        }
    }

    /// Byte size without trailing padding.
    pub fn byte_size(&self) -> usize {
        match self {
            UniformValue::F32(_) => 4,
            UniformValue::Vec2(_) => 8,
            UniformValue::Vec3(_) => 12,
        }
    }

    /// std140 base alignment.
    fn alignment(&self) -> usize {
        match self {
            UniformValue::F32(_) => 4,
            UniformValue::Vec2(_) => 8,
            UniformValue::Vec3(_) => 16,
        }
    }

    /// Append the little-endian bytes of this value.
    pub fn write_bytes(&self, buf: &mut Vec<u8>) {
        match self {
            UniformValue::F32(v) => buf.extend_from_slice(bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => buf.extend_from_slice(bytemuck::bytes_of(v)),
            // Scalars that follow may pack into the vec3's trailing 4 bytes.
            UniformValue::Vec3(v) => buf.extend_from_slice(bytemuck::bytes_of(v)),
        }
    }

    /// JavaScript initializer for a three.js uniform of this type.
    ///
    /// Non-finite components are written as `0`; the export is best effort.
    pub fn js_literal(&self) -> String {
        match self {
            UniformValue::F32(v) => js_number(*v),
            UniformValue::Vec2(v) => {
                format!("new THREE.Vector2({}, {})", js_number(v.x), js_number(v.y))
            }
            UniformValue::Vec3(v) => format!(
                "new THREE.Vector3({}, {}, {})",
                js_number(v.x),
                js_number(v.y),
                js_number(v.z)
            ),
        }
    }
}

fn js_number(v: f32) -> String {
    if v.is_finite() {
        format!("{:?}", v)
    } else {
        "0".to_string()
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::F32(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        UniformValue::Vec3(v)
    }
}

/// A strongly-typed uniform record. Implemented with
/// `#[derive(ShaderUniforms)]`.
pub trait ShaderUniforms {
    /// One `uniform <type> <name>;` line per field, in declaration order.
    const GLSL_DECLARATIONS: &'static str;

    /// `(glsl_name, value)` pairs in declaration order.
    fn entries(&self) -> Vec<(&'static str, UniformValue)>;

    /// Look up a single uniform by its GLSL name.
    fn get(&self, name: &str) -> Option<UniformValue> {
        self.entries()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }

    /// Pack all values into a std140 uniform block for GPU upload.
    fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        for (_, value) in self.entries() {
            let align = value.alignment();
            while buf.len() % align != 0 {
                buf.push(0);
            }
            value.write_bytes(&mut buf);
        }
        // Block size rounds up to 16 bytes.
        while buf.len() % 16 != 0 {
            buf.push(0);
        }
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Manual {
        time: f32,
        center: Vec3,
    }

    impl ShaderUniforms for Manual {
        const GLSL_DECLARATIONS: &'static str = "uniform float time;\nuniform vec3 center;\n";

        fn entries(&self) -> Vec<(&'static str, UniformValue)> {
            vec![("time", self.time.into()), ("center", self.center.into())]
        }
    }

    #[test]
    fn test_glsl_types() {
        assert_eq!(UniformValue::F32(0.0).glsl_type(), "float");
        assert_eq!(UniformValue::Vec2(Vec2::ZERO).glsl_type(), "vec2");
        assert_eq!(UniformValue::Vec3(Vec3::ZERO).glsl_type(), "vec3");
    }

    #[test]
    fn test_js_literal() {
        assert_eq!(UniformValue::F32(1.5).js_literal(), "1.5");
        assert_eq!(UniformValue::F32(f32::NAN).js_literal(), "0");
        assert_eq!(
            UniformValue::Vec2(Vec2::new(1.0, 2.0)).js_literal(),
            "new THREE.Vector2(1.0, 2.0)"
        );
    }

    #[test]
    fn test_get_by_name() {
        let u = Manual {
            time: 2.0,
            center: Vec3::X,
        };
        assert_eq!(u.get("time"), Some(UniformValue::F32(2.0)));
        assert_eq!(u.get("center"), Some(UniformValue::Vec3(Vec3::X)));
        assert_eq!(u.get("missing"), None);
    }

    #[test]
    fn test_std140_packing() {
        let u = Manual {
            time: 1.0,
            center: Vec3::ONE,
        };
        let bytes = u.to_bytes();
        // float at 0, vec3 aligned to 16, block rounded to 32.
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[0..4], &1.0f32.to_le_bytes());
        assert_eq!(&bytes[16..20], &1.0f32.to_le_bytes());
    }
}
