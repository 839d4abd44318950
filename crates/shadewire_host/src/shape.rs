// SPDX-License-Identifier: MIT OR Apache-2.0
//! Value shape tags for data flowing through ports.

use serde::{Deserialize, Serialize};

/// Component count of a value flowing through the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Shape {
    /// Single float
    Scalar,
    /// 2-component vector
    Vec2,
    /// 3-component vector
    Vec3,
    /// 4-component vector
    #[default]
    Vec4,
}

/// Order of the shape-variant ports on Set and Get nodes.
///
/// Port index 0 is Vec4, 1 is Scalar, 2 is Vec2, 3 is Vec3. Downstream
/// code relies on this order being stable.
pub const SHAPE_PORT_ORDER: [Shape; 4] = [Shape::Vec4, Shape::Scalar, Shape::Vec2, Shape::Vec3];

impl Shape {
    /// Number of components in a value of this shape
    pub fn components(&self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 => 4,
        }
    }

    /// Display name matching the host's port naming
    pub fn port_name(&self) -> &'static str {
        match self {
            Self::Scalar => "Float",
            Self::Vec2 => "Vector2",
            Self::Vec3 => "Vector3",
            Self::Vec4 => "Vector4",
        }
    }

    /// Index of this shape's port within [`SHAPE_PORT_ORDER`]
    pub fn port_index(&self) -> usize {
        match self {
            Self::Vec4 => 0,
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_order_round_trip() {
        for (index, shape) in SHAPE_PORT_ORDER.iter().enumerate() {
            assert_eq!(shape.port_index(), index);
        }
    }

    #[test]
    fn test_components() {
        assert_eq!(Shape::Scalar.components(), 1);
        assert_eq!(Shape::Vec4.components(), 4);
    }
}
