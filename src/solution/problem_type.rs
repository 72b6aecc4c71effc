//! @ai:module:intent Problem type: the operation family being tuned
//! @ai:module:layer domain
//! @ai:module:public_api ProblemType, DataType, OperationType
//! @ai:module:stateless true

use crate::solution::params::{ParamBag, ParamValue};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// @ai:intent Element data type of a GEMM problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DataType {
    #[serde(rename = "s", alias = "S", alias = "single", alias = "float")]
    Single,
    #[serde(rename = "d", alias = "D", alias = "double")]
    Double,
    #[serde(rename = "h", alias = "H", alias = "half")]
    Half,
    #[serde(rename = "b", alias = "B", alias = "bfloat16")]
    BFloat16,
    #[serde(rename = "i8", alias = "I8", alias = "int8")]
    Int8,
    #[serde(rename = "i", alias = "I", alias = "int32")]
    Int32,
}

impl DataType {
    /// @ai:intent Single-character code used in problem type names
    /// @ai:effects pure
    pub fn as_char(&self) -> &'static str {
        match self {
            DataType::Single => "S",
            DataType::Double => "D",
            DataType::Half => "H",
            DataType::BFloat16 => "B",
            DataType::Int8 => "I8",
            DataType::Int32 => "I",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Single => "s",
            DataType::Double => "d",
            DataType::Half => "h",
            DataType::BFloat16 => "b",
            DataType::Int8 => "i8",
            DataType::Int32 => "i",
        }
    }

    pub fn is_half(&self) -> bool {
        matches!(self, DataType::Half)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OperationType {
    #[default]
    #[serde(rename = "GEMM", alias = "gemm")]
    Gemm,
}

/// @ai:intent Immutable description of a GEMM operation family
/// @ai:invariant identity is value based; used as grouping and compatibility key
/// @ai:invariant an omitted DestDataType equals an explicit one naming DataType
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ProblemType {
    #[serde(default)]
    pub operation_type: OperationType,
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dest_data_type: Option<DataType>,
    #[serde(default)]
    pub transpose_a: bool,
    #[serde(default)]
    pub transpose_b: bool,
    #[serde(default = "default_true")]
    pub batched: bool,
    #[serde(default = "default_true")]
    pub use_beta: bool,
    #[serde(default)]
    pub high_precision_accumulate: bool,
    #[serde(default)]
    pub tile_aware_selection: bool,
}

fn default_true() -> bool {
    true
}

impl ProblemType {
    /// @ai:intent Minimal GEMM problem type for a data type
    /// @ai:effects pure
    pub fn gemm(data_type: DataType) -> Self {
        Self {
            operation_type: OperationType::Gemm,
            data_type,
            dest_data_type: None,
            transpose_a: false,
            transpose_b: false,
            batched: true,
            use_beta: true,
            high_precision_accumulate: false,
            tile_aware_selection: false,
        }
    }

    pub fn dest_type(&self) -> DataType {
        self.dest_data_type.unwrap_or(self.data_type)
    }

    /// Identity fields with the destination type resolved.
    #[allow(clippy::type_complexity)]
    fn identity(&self) -> (OperationType, DataType, DataType, bool, bool, bool, bool, bool, bool) {
        (
            self.operation_type,
            self.data_type,
            self.dest_type(),
            self.transpose_a,
            self.transpose_b,
            self.batched,
            self.use_beta,
            self.high_precision_accumulate,
            self.tile_aware_selection,
        )
    }

    /// @ai:intent Number of size indices: free M, N, optional batch, summation K
    /// @ai:effects pure
    pub fn num_indices(&self) -> usize {
        if self.batched {
            4
        } else {
            3
        }
    }

    /// @ai:intent Canonical key/value view used in mismatch diagnostics
    /// @ai:effects pure
    pub fn entries(&self) -> ParamBag {
        ParamBag::new()
            .with("OperationType", "GEMM")
            .with("DataType", self.data_type.as_str())
            .with("DestDataType", self.dest_type().as_str())
            .with("TransposeA", self.transpose_a)
            .with("TransposeB", self.transpose_b)
            .with("Batched", self.batched)
            .with("UseBeta", self.use_beta)
            .with("HighPrecisionAccumulate", self.high_precision_accumulate)
            .with("TileAwareSelection", self.tile_aware_selection)
    }

    /// @ai:intent Entries that differ from another problem type, for each side
    /// @ai:effects pure
    pub fn asymmetric_difference(
        &self,
        other: &ProblemType,
    ) -> (Vec<(String, ParamValue)>, Vec<(String, ParamValue)>) {
        let ours = self.entries();
        let theirs = other.entries();
        (ours.difference(&theirs), theirs.difference(&ours))
    }

    /// @ai:intent Index notation for C, A, B (e.g. Cijk_Ailk_Bljk)
    /// @ai:effects pure
    fn index_notation(&self) -> String {
        let (batch, sum) = if self.batched { ("k", "l") } else { ("", "k") };
        let a = if self.transpose_a {
            format!("A{}i{}", sum, batch)
        } else {
            format!("Ai{}{}", sum, batch)
        };
        let b = if self.transpose_b {
            format!("Bj{}{}", sum, batch)
        } else {
            format!("B{}j{}", sum, batch)
        };
        format!("Cij{}_{}_{}", batch, a, b)
    }
}

impl PartialEq for ProblemType {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for ProblemType {}

impl Hash for ProblemType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

impl PartialOrd for ProblemType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ProblemType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(&other.identity())
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.index_notation(), self.data_type.as_char())?;

        if self.batched {
            write!(f, "B")?;
        }

        if self.dest_type() != self.data_type {
            write!(f, "{}", self.dest_type().as_char())?;
        }

        if self.high_precision_accumulate {
            write!(f, "_HPA")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_problem_type_names() {
        let mut pt = ProblemType::gemm(DataType::Single);
        assert_eq!(pt.to_string(), "Cijk_Ailk_Bljk_SB");

        pt.transpose_b = true;
        assert_eq!(pt.to_string(), "Cijk_Ailk_Bjlk_SB");

        pt.batched = false;
        pt.transpose_a = true;
        assert_eq!(pt.to_string(), "Cij_Aki_Bjk_S");
    }

    #[test]
    fn test_half_with_hpa_name() {
        let mut pt = ProblemType::gemm(DataType::Half);
        pt.dest_data_type = Some(DataType::Single);
        pt.high_precision_accumulate = true;
        assert_eq!(pt.to_string(), "Cijk_Ailk_Bljk_HBS_HPA");
        assert!(pt.data_type.is_half());
    }

    #[test]
    fn test_deserialize_pascal_case() {
        let pt: ProblemType = serde_yaml::from_str(
            "OperationType: GEMM\nDataType: s\nTransposeB: true\nBatched: true\n",
        )
        .unwrap();

        assert_eq!(pt.data_type, DataType::Single);
        assert!(pt.transpose_b);
        assert!(pt.use_beta);
        assert!(!pt.tile_aware_selection);
    }

    #[test]
    fn test_implicit_dest_type_equals_explicit() {
        let implicit = ProblemType::gemm(DataType::Single);
        let mut explicit = ProblemType::gemm(DataType::Single);
        explicit.dest_data_type = Some(DataType::Single);

        assert_eq!(implicit, explicit);

        let hash = |pt: &ProblemType| {
            let mut hasher = std::collections::hash_map::DefaultHasher::new();
            pt.hash(&mut hasher);
            hasher.finish()
        };
        assert_eq!(hash(&implicit), hash(&explicit));

        let mut half_out = ProblemType::gemm(DataType::Single);
        half_out.dest_data_type = Some(DataType::Half);
        assert_ne!(implicit, half_out);
    }

    #[test]
    fn test_asymmetric_difference() {
        let a = ProblemType::gemm(DataType::Single);
        let b = ProblemType::gemm(DataType::Double);

        let (config_only, kernel_only) = a.asymmetric_difference(&b);
        assert!(config_only.contains(&("DataType".to_string(), ParamValue::from("s"))));
        assert!(kernel_only.contains(&("DataType".to_string(), ParamValue::from("d"))));
        assert!(!config_only.iter().any(|(k, _)| k == "Batched"));
    }
}
