//! Vector path commands.
//!
//! A path is a list of `[opcode, coords…]` rows: `M x y`, `L x y`,
//! `C x1 y1 x2 y2 x y`, `Q x1 y1 x y`, `Z`. The row layout is contractual:
//! renderers consume the serialized form directly, so serialization is
//! implemented by hand instead of leaning on derive.

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::ser::SerializeSeq;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;

/// Path opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathOp {
    MoveTo,
    LineTo,
    CubicTo,
    QuadTo,
    Close,
}

impl PathOp {
    /// The single-letter wire opcode.
    #[must_use]
    pub fn opcode(self) -> &'static str {
        match self {
            Self::MoveTo => "M",
            Self::LineTo => "L",
            Self::CubicTo => "C",
            Self::QuadTo => "Q",
            Self::Close => "Z",
        }
    }

    #[must_use]
    pub fn from_opcode(op: &str) -> Option<Self> {
        match op {
            "M" => Some(Self::MoveTo),
            "L" => Some(Self::LineTo),
            "C" => Some(Self::CubicTo),
            "Q" => Some(Self::QuadTo),
            "Z" => Some(Self::Close),
            _ => None,
        }
    }

    /// Number of coordinates the opcode carries.
    #[must_use]
    pub fn arg_count(self) -> usize {
        match self {
            Self::MoveTo | Self::LineTo => 2,
            Self::CubicTo => 6,
            Self::QuadTo => 4,
            Self::Close => 0,
        }
    }
}

/// One path instruction with its coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct PathCommand {
    pub op: PathOp,
    pub args: SmallVec<[f64; 6]>,
}

impl PathCommand {
    #[must_use]
    pub fn move_to(x: f64, y: f64) -> Self {
        Self {
            op: PathOp::MoveTo,
            args: SmallVec::from_slice(&[x, y]),
        }
    }

    #[must_use]
    pub fn line_to(x: f64, y: f64) -> Self {
        Self {
            op: PathOp::LineTo,
            args: SmallVec::from_slice(&[x, y]),
        }
    }

    #[must_use]
    pub fn cubic_to(x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> Self {
        Self {
            op: PathOp::CubicTo,
            args: SmallVec::from_slice(&[x1, y1, x2, y2, x, y]),
        }
    }

    #[must_use]
    pub fn quad_to(x1: f64, y1: f64, x: f64, y: f64) -> Self {
        Self {
            op: PathOp::QuadTo,
            args: SmallVec::from_slice(&[x1, y1, x, y]),
        }
    }

    #[must_use]
    pub fn close() -> Self {
        Self {
            op: PathOp::Close,
            args: SmallVec::new(),
        }
    }

    /// The control points of this command as `(x, y)` pairs. Bezier control
    /// points are included, which over-approximates curve extents; that is
    /// the documented bounds contract.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.args.chunks_exact(2).map(|c| (c[0], c[1]))
    }
}

impl Serialize for PathCommand {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(1 + self.args.len()))?;
        seq.serialize_element(self.op.opcode())?;
        for arg in &self.args {
            seq.serialize_element(arg)?;
        }
        seq.end()
    }
}

struct PathCommandVisitor;

impl<'de> Visitor<'de> for PathCommandVisitor {
    type Value = PathCommand;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a path command array [opcode, coords...]")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let opcode: String = seq
            .next_element()?
            .ok_or_else(|| de::Error::custom("empty path command"))?;
        let op = PathOp::from_opcode(&opcode)
            .ok_or_else(|| de::Error::custom(format!("unknown path opcode: {opcode}")))?;

        let mut args: SmallVec<[f64; 6]> = SmallVec::new();
        while let Some(value) = seq.next_element::<f64>()? {
            args.push(value);
        }
        if args.len() != op.arg_count() {
            return Err(de::Error::custom(format!(
                "path opcode {opcode} expects {} coordinates, got {}",
                op.arg_count(),
                args.len()
            )));
        }
        Ok(PathCommand { op, args })
    }
}

impl<'de> Deserialize<'de> for PathCommand {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(PathCommandVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let cmds = vec![
            PathCommand::move_to(0.0, 0.0),
            PathCommand::cubic_to(1.0, 2.0, 3.0, 4.0, 5.0, 6.0),
            PathCommand::close(),
        ];
        let json = serde_json::to_string(&cmds).unwrap();
        assert_eq!(json, r#"[["M",0.0,0.0],["C",1.0,2.0,3.0,4.0,5.0,6.0],["Z"]]"#);
        let back: Vec<PathCommand> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cmds);
    }

    #[test]
    fn rejects_bad_arity() {
        let err = serde_json::from_str::<PathCommand>(r#"["L", 1.0]"#);
        assert!(err.is_err());
    }

    #[test]
    fn rejects_unknown_opcode() {
        let err = serde_json::from_str::<PathCommand>(r#"["A", 1.0, 2.0]"#);
        assert!(err.is_err());
    }
}
