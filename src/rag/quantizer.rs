//! Int8 quantization of embedding vectors.
//!
//! Two codecs are supported:
//! - `FixedRange`: symmetric, assumes components in [-1, 1], `code = round(v * 127)`.
//! - `AdaptiveMinMax`: per-vector min/max, `code = round((v - min) / scale) - 128`
//!   with `scale = (max - min) / 255`. `min` and `max` are stored with the codes.
//!
//! New data is written with `AdaptiveMinMax`; `FixedRange` files (including the
//! bare-array legacy layout) stay readable.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::RagError;

/// Field name that holds a quantized embedding in stored records.
pub const QUANTIZED_FIELD: &str = "embedding_q8";

const FIXED_RANGE_MAX: f32 = 127.0;
const ADAPTIVE_LEVELS: f32 = 255.0;
const ADAPTIVE_OFFSET: f32 = 128.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VectorCodec {
    FixedRange,
    #[default]
    AdaptiveMinMax,
}

impl VectorCodec {
    pub fn encode(self, vector: &[f32]) -> QuantizedVector {
        match self {
            VectorCodec::FixedRange => QuantizedVector::FixedRange {
                codes: vector.iter().map(|&v| encode_fixed(v)).collect(),
            },
            VectorCodec::AdaptiveMinMax => encode_adaptive(vector),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            VectorCodec::FixedRange => "fixed_range",
            VectorCodec::AdaptiveMinMax => "adaptive_min_max",
        }
    }
}

impl fmt::Display for VectorCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VectorCodec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fixed" | "fixed_range" | "symmetric" => Ok(VectorCodec::FixedRange),
            "adaptive" | "adaptive_min_max" | "minmax" => Ok(VectorCodec::AdaptiveMinMax),
            other => Err(format!(
                "unknown quantization scheme '{}' (expected 'fixed' or 'adaptive')",
                other
            )),
        }
    }
}

/// A quantized embedding plus whatever it needs for reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "scheme", rename_all = "snake_case")]
pub enum QuantizedVector {
    FixedRange { codes: Vec<i8> },
    AdaptiveMinMax { codes: Vec<i8>, min: f32, max: f32 },
}

impl QuantizedVector {
    pub fn codec(&self) -> VectorCodec {
        match self {
            QuantizedVector::FixedRange { .. } => VectorCodec::FixedRange,
            QuantizedVector::AdaptiveMinMax { .. } => VectorCodec::AdaptiveMinMax,
        }
    }

    pub fn codes(&self) -> &[i8] {
        match self {
            QuantizedVector::FixedRange { codes } => codes,
            QuantizedVector::AdaptiveMinMax { codes, .. } => codes,
        }
    }

    pub fn dim(&self) -> usize {
        self.codes().len()
    }

    /// Reconstructs the floating-point vector. Lossy.
    pub fn dequantize(&self) -> Vec<f32> {
        match self {
            QuantizedVector::FixedRange { codes } => codes
                .iter()
                .map(|&code| code as f32 / FIXED_RANGE_MAX)
                .collect(),
            QuantizedVector::AdaptiveMinMax { codes, min, max } => {
                let scale = adaptive_scale(*min, *max);
                if scale == 0.0 {
                    return vec![*min; codes.len()];
                }
                codes
                    .iter()
                    .map(|&code| (code as f32 + ADAPTIVE_OFFSET) * scale + min)
                    .collect()
            }
        }
    }
}

/// On-disk shape of `embedding_q8`: tagged, or a bare array of fixed-range codes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredEmbedding {
    Quantized(QuantizedVector),
    LegacyCodes(Vec<i8>),
}

impl StoredEmbedding {
    pub fn into_quantized(self) -> QuantizedVector {
        match self {
            StoredEmbedding::Quantized(vector) => vector,
            StoredEmbedding::LegacyCodes(codes) => QuantizedVector::FixedRange { codes },
        }
    }
}

fn encode_fixed(value: f32) -> i8 {
    if !value.is_finite() {
        return 0;
    }
    (value * FIXED_RANGE_MAX)
        .round()
        .clamp(-FIXED_RANGE_MAX, FIXED_RANGE_MAX) as i8
}

fn encode_adaptive(vector: &[f32]) -> QuantizedVector {
    let (min, max) = vector
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f32, f32)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .unwrap_or((0.0, 0.0));

    let scale = adaptive_scale(min, max);
    let codes = if scale == 0.0 {
        vec![0i8; vector.len()]
    } else {
        vector
            .iter()
            .map(|&v| {
                let v = if v.is_finite() { v } else { min };
                (((v - min) / scale).round() - ADAPTIVE_OFFSET).clamp(-128.0, 127.0) as i8
            })
            .collect()
    };

    QuantizedVector::AdaptiveMinMax { codes, min, max }
}

fn adaptive_scale(min: f32, max: f32) -> f32 {
    let scale = (max - min) / ADAPTIVE_LEVELS;
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        0.0
    }
}

/// Cosine similarity between two vectors; 0.0 on length mismatch or zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| (*x as f64) * (*y as f64)).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}

/// Summary of a batch quantization run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuantizationReport {
    pub codec: VectorCodec,
    pub records: usize,
    pub quantized: usize,
    pub skipped: usize,
    pub dimensions: Option<usize>,
    /// Lowest round-trip cosine similarity seen; `None` when nothing was quantized.
    pub min_similarity: Option<f64>,
    pub mean_similarity: Option<f64>,
}

/// Quantizes the float array stored under `field` in every record.
///
/// The float array is replaced by `embedding_q8`; all other fields are kept
/// as they are. Records without `field` are passed through and counted as
/// skipped. A `field` that is present but not a numeric array is an error.
pub fn quantize_collection(
    records: Vec<Value>,
    codec: VectorCodec,
    field: &str,
) -> Result<(Vec<Value>, QuantizationReport), RagError> {
    let mut report = QuantizationReport {
        codec,
        records: records.len(),
        ..Default::default()
    };
    let mut similarity_sum = 0.0;
    let mut output = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let Value::Object(mut map) = record else {
            return Err(RagError::Parse(format!("record {} is not an object", index)));
        };

        let Some(raw) = map.remove(field) else {
            report.skipped += 1;
            output.push(Value::Object(map));
            continue;
        };

        let vector = parse_float_array(&raw)
            .ok_or_else(|| RagError::Parse(format!("record {}: '{}' is not a number array", index, field)))?;

        match report.dimensions {
            None => report.dimensions = Some(vector.len()),
            Some(dim) if dim != vector.len() => {
                tracing::warn!(
                    "record {} has {} dimensions, expected {}",
                    index,
                    vector.len(),
                    dim
                );
            }
            Some(_) => {}
        }

        let quantized = codec.encode(&vector);
        let similarity = cosine_similarity(&vector, &quantized.dequantize());
        similarity_sum += similarity;
        report.min_similarity = Some(report.min_similarity.map_or(similarity, |m| m.min(similarity)));
        report.quantized += 1;

        let encoded = serde_json::to_value(&quantized)
            .map_err(|e| RagError::Unknown(format!("record {}: {}", index, e)))?;
        map.insert(QUANTIZED_FIELD.to_string(), encoded);
        output.push(Value::Object(map));
    }

    if report.quantized > 0 {
        report.mean_similarity = Some(similarity_sum / report.quantized as f64);
    }

    Ok((output, report))
}

/// Reads `embedding_q8` back from a stored record, if present.
pub fn dequantize_record(record: &Map<String, Value>) -> Option<Result<Vec<f32>, RagError>> {
    let raw = record.get(QUANTIZED_FIELD)?;
    Some(
        serde_json::from_value::<StoredEmbedding>(raw.clone())
            .map(|stored| stored.into_quantized().dequantize())
            .map_err(|e| RagError::parse(QUANTIZED_FIELD, e)),
    )
}

fn parse_float_array(value: &Value) -> Option<Vec<f32>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_f64().map(|f| f as f32))
        .collect()
}
