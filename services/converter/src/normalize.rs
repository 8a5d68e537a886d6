//! Raw row -> canonical retailer record.
//!
//! This function is DETERMINISTIC: same row + same row index = same record.
//! Coercion failures never drop a row; the field becomes null and the problem
//! is handed back as a [`CoercionIssue`].

use serde::Serialize;
use std::fmt;

use crate::raw::{RawRecord, RawValue};
use crate::resolve::{resolve, resolve_or};
use crate::schema::{Field, FieldKind};

pub const UNKNOWN_NAME: &str = "Unknown";

/// One normalized point of interest. Field order is the artifact order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalRecord {
    pub id: String,
    pub name: String,
    pub locality: String,
    pub postcode: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub category: String,
    pub subcategory: String,
    pub category_detail: String,
    pub business_status: String,
    pub police_force: String,
    pub tactical_area: String,
    pub local_authority: String,
    pub rating: Option<f64>,
    pub rating_count: Option<i64>,
    pub phone: String,
    pub website: String,
}

/// A present value that could not be coerced to its field's type.
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionIssue {
    pub field: Field,
    pub raw: String,
    pub reason: String,
}

impl fmt::Display for CoercionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "field '{}': cannot coerce '{}' ({})",
            self.field.name(),
            self.raw,
            self.reason
        )
    }
}

/// Normalizer output: the record plus any per-field coercion problems.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub record: CanonicalRecord,
    pub issues: Vec<CoercionIssue>,
}

struct Coercer<'r> {
    raw: &'r RawRecord,
    issues: Vec<CoercionIssue>,
}

impl<'r> Coercer<'r> {
    fn text(&self, field: Field) -> String {
        debug_assert_eq!(field.kind(), FieldKind::Text);
        resolve(self.raw, field.aliases())
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    fn float(&mut self, field: Field) -> Option<f64> {
        debug_assert_eq!(field.kind(), FieldKind::Float);
        let value = resolve(self.raw, field.aliases())?;
        match to_float(value) {
            Ok(v) => v,
            Err(reason) => {
                self.record_issue(field, value, reason);
                None
            }
        }
    }

    fn integer(&mut self, field: Field) -> Option<i64> {
        debug_assert_eq!(field.kind(), FieldKind::Integer);
        let value = resolve(self.raw, field.aliases())?;
        match to_integer(value) {
            Ok(v) => v,
            Err(reason) => {
                self.record_issue(field, value, reason);
                None
            }
        }
    }

    fn record_issue(&mut self, field: Field, value: &RawValue, reason: String) {
        self.issues.push(CoercionIssue {
            field,
            raw: value.to_string(),
            reason,
        });
    }
}

/// Parse a resolved value as a float. `Ok(None)` means blank text.
fn to_float(value: &RawValue) -> Result<Option<f64>, String> {
    let parsed = match value {
        RawValue::Float(v) => *v,
        RawValue::Int(v) => *v as f64,
        RawValue::Bool(v) => {
            if *v {
                1.0
            } else {
                0.0
            }
        }
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
                .parse::<f64>()
                .map_err(|e| format!("not a number: {}", e))?
        }
        RawValue::Empty => return Ok(None),
    };

    if !parsed.is_finite() {
        return Err("not a finite number".to_string());
    }
    Ok(Some(parsed))
}

/// Parse a resolved value as an integer. Whole numbers stay exact; only
/// fractional values go through `f64` and are truncated toward zero.
fn to_integer(value: &RawValue) -> Result<Option<i64>, String> {
    match value {
        RawValue::Int(v) => Ok(Some(*v)),
        RawValue::Text(s) => match s.trim().parse::<i64>() {
            Ok(v) => Ok(Some(v)),
            Err(_) => to_float(value)?.map(truncate_to_i64).transpose(),
        },
        other => to_float(other)?.map(truncate_to_i64).transpose(),
    }
}

fn truncate_to_i64(v: f64) -> Result<i64, String> {
    let truncated = v.trunc();
    // i64::MAX is not representable as f64; the bound is exclusive.
    if truncated < -(2f64.powi(63)) || truncated >= 2f64.powi(63) {
        return Err("out of integer range".to_string());
    }
    Ok(truncated as i64)
}

/// Normalize one raw row. `row_index` is the 0-based ordinal within its
/// source and becomes the id when no id column has a value.
pub fn normalize(raw: &RawRecord, row_index: usize) -> Normalized {
    let mut c = Coercer {
        raw,
        issues: Vec::new(),
    };

    let row_id = RawValue::from(row_index.to_string());
    let unknown = RawValue::from(UNKNOWN_NAME);
    let id = resolve_or(raw, Field::Id.aliases(), &row_id).to_string();
    let name = resolve_or(raw, Field::Name.aliases(), &unknown).to_string();

    let record = CanonicalRecord {
        id,
        name,
        locality: c.text(Field::Locality),
        postcode: c.text(Field::Postcode),
        address: c.text(Field::Address),
        latitude: c.float(Field::Latitude),
        longitude: c.float(Field::Longitude),
        category: c.text(Field::Category),
        subcategory: c.text(Field::Subcategory),
        category_detail: c.text(Field::CategoryDetail),
        business_status: c.text(Field::BusinessStatus),
        police_force: c.text(Field::PoliceForce),
        tactical_area: c.text(Field::TacticalArea),
        local_authority: c.text(Field::LocalAuthority),
        rating: c.float(Field::Rating),
        rating_count: c.integer(Field::RatingCount),
        phone: c.text(Field::Phone),
        website: c.text(Field::Website),
    };

    Normalized {
        record,
        issues: c.issues,
    }
}

// =============================================================================
// TESTS
// =============================================================================
