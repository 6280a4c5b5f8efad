// Copyright (c) 2017-2021 Fabian Schuiki

//! Types of values.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub use self::TypeKind::*;

/// A type.
pub type Type = Arc<TypeKind>;

/// The different kinds of types.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeKind {
    /// The `void` type.
    VoidType,
    /// The `label` type of basic blocks.
    LabelType,
    /// The `time` type.
    TimeType,
    /// Integer types like `i32`.
    IntType(usize),
    /// Nine-valued logic types like `l32`.
    LogicType(usize),
    /// Struct types like `{i8, i32}`.
    StructType(Vec<Type>),
    /// Array types like `[4 x i32]`.
    ArrayType(usize, Type),
    /// Pointer types like `i32*`.
    PointerType(Type),
    /// Component types like `(i8, i8) -> (i32)`.
    ComponentType(Vec<Type>, Vec<Type>),
}

impl std::fmt::Display for TypeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            VoidType => write!(f, "void"),
            LabelType => write!(f, "label"),
            TimeType => write!(f, "time"),
            IntType(w) => write!(f, "i{}", w),
            LogicType(w) => write!(f, "l{}", w),
            StructType(ref fields) => write!(f, "{{{}}}", fields.iter().format(", ")),
            ArrayType(l, ref ty) => write!(f, "[{} x {}]", l, ty),
            PointerType(ref ty) => write!(f, "{}*", ty),
            ComponentType(ref ins, ref outs) => write!(
                f,
                "({}) -> ({})",
                ins.iter().format(", "),
                outs.iter().format(", ")
            ),
        }
    }
}

impl TypeKind {
    /// Check if this is a void type.
    pub fn is_void(&self) -> bool {
        *self == VoidType
    }

    /// Check if this is a time type.
    pub fn is_time(&self) -> bool {
        *self == TimeType
    }

    /// Check if this is an integer type.
    pub fn is_int(&self) -> bool {
        match *self {
            IntType(..) => true,
            _ => false,
        }
    }

    /// Check if this is a logic type.
    pub fn is_logic(&self) -> bool {
        match *self {
            LogicType(..) => true,
            _ => false,
        }
    }

    /// Check if this is a struct type.
    pub fn is_struct(&self) -> bool {
        match *self {
            StructType(..) => true,
            _ => false,
        }
    }

    /// Check if this is an array type.
    pub fn is_array(&self) -> bool {
        match *self {
            ArrayType(..) => true,
            _ => false,
        }
    }

    /// Check if this is a pointer type.
    pub fn is_pointer(&self) -> bool {
        match *self {
            PointerType(..) => true,
            _ => false,
        }
    }

    /// Check if this is a component type.
    pub fn is_component(&self) -> bool {
        match *self {
            ComponentType(..) => true,
            _ => false,
        }
    }

    /// Get the width of the type, or panic if it has none.
    ///
    /// Asserts that the width is positive.
    pub fn width(&self) -> usize {
        let w = match *self {
            IntType(w) => w,
            LogicType(w) => w,
            _ => panic!("width() called on {}", self),
        };
        assert!(w > 0, "width of {} must be positive", self);
        w
    }

    /// Unwrap the fields of a struct type, or panic.
    pub fn unwrap_struct(&self) -> &[Type] {
        match *self {
            StructType(ref fields) => fields,
            _ => panic!("unwrap_struct called on {}", self),
        }
    }

    /// Unwrap the length and element type of an array type, or panic.
    pub fn unwrap_array(&self) -> (usize, &Type) {
        match *self {
            ArrayType(l, ref ty) => (l, ty),
            _ => panic!("unwrap_array called on {}", self),
        }
    }

    /// Unwrap the target of a pointer type, or panic.
    pub fn unwrap_pointer(&self) -> &Type {
        match *self {
            PointerType(ref ty) => ty,
            _ => panic!("unwrap_pointer called on {}", self),
        }
    }

    /// Unwrap the inputs and outputs of a component type, or panic.
    pub fn unwrap_component(&self) -> (&[Type], &[Type]) {
        match *self {
            ComponentType(ref ins, ref outs) => (ins, outs),
            _ => panic!("unwrap_component called on {}", self),
        }
    }
}

/// Create a void type.
pub fn void_ty() -> Type {
    Arc::new(VoidType)
}

/// Create a label type.
pub fn label_ty() -> Type {
    Arc::new(LabelType)
}

/// Create a time type.
pub fn time_ty() -> Type {
    Arc::new(TimeType)
}

/// Create an integer type of the requested width.
pub fn int_ty(width: usize) -> Type {
    Arc::new(IntType(width))
}

/// Create a logic type of the requested width.
pub fn logic_ty(width: usize) -> Type {
    Arc::new(LogicType(width))
}

/// Create a struct type with the requested fields.
pub fn struct_ty(fields: Vec<Type>) -> Type {
    Arc::new(StructType(fields))
}

/// Create an array type with the requested length and element type.
pub fn array_ty(length: usize, element: Type) -> Type {
    Arc::new(ArrayType(length, element))
}

/// Create a pointer type to the requested target type.
pub fn pointer_ty(to: Type) -> Type {
    Arc::new(PointerType(to))
}

/// Create a component type with the requested inputs and outputs.
pub fn component_ty(inputs: Vec<Type>, outputs: Vec<Type>) -> Type {
    Arc::new(ComponentType(inputs, outputs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting() {
        assert_eq!(format!("{}", void_ty()), "void");
        assert_eq!(format!("{}", time_ty()), "time");
        assert_eq!(format!("{}", int_ty(42)), "i42");
        assert_eq!(format!("{}", logic_ty(9)), "l9");
        assert_eq!(
            format!("{}", struct_ty(vec![int_ty(8), logic_ty(1)])),
            "{i8, l1}"
        );
        assert_eq!(format!("{}", array_ty(4, int_ty(32))), "[4 x i32]");
        assert_eq!(format!("{}", pointer_ty(int_ty(16))), "i16*");
        assert_eq!(
            format!("{}", component_ty(vec![int_ty(1), int_ty(1)], vec![int_ty(1)])),
            "(i1, i1) -> (i1)"
        );
    }

    #[test]
    fn equality() {
        let a = struct_ty(vec![int_ty(8), array_ty(2, logic_ty(4))]);
        let b = struct_ty(vec![int_ty(8), array_ty(2, logic_ty(4))]);
        let c = struct_ty(vec![int_ty(8), array_ty(3, logic_ty(4))]);
        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_ne!(a, c);
    }
}
