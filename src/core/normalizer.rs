//! Maps the remote service's schema-loose result payloads into the one
//! canonical `PipelineStatistics` shape.
//!
//! The backend's response format has evolved and may use either of two
//! naming conventions for the same concept, so every derived field is
//! resolved through an ordered chain of candidate paths: the first *present*
//! value wins, zero and other falsy values included. Only an absent or null
//! field falls through to the next candidate. Missing optional sections
//! degrade to empty defaults so downstream code never null-checks.

use crate::domain::model::{
    GroupNpiStats, NpiValidation, PipelineStatistics, PipelineStep, ProviderDistribution,
    StatusDistribution,
};
use crate::utils::error::{PipelineError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// One candidate location inside a JSON document. A segment that parses as
/// an integer descends into arrays.
type JsonPath = &'static [&'static str];

/// Fallback chains, highest priority first.
const STATS_BLOCK: &[JsonPath] = &[&["pipeline_stats"], &["pipeline_statistics"]];
const DEDUP_BEFORE: &[JsonPath] = &[
    &["deduplication", "initial_rows"],
    &["initial", "total_count"],
];
const DEDUP_AFTER: &[JsonPath] = &[
    &["deduplication", "final_rows"],
    &["final", "total_count"],
];
const DEDUP_REMOVED: &[JsonPath] = &[&["deduplication", "duplicates_removed"]];
const GROUP_A_FINAL: &[JsonPath] = &[&["final", "ca_count"]];
const GROUP_B_FINAL: &[JsonPath] = &[&["final", "ny_count"]];
const NPI_BLOCK: &[JsonPath] = &[&["npi_validation"], &["npiValidation"]];
const COLLECTION_COLUMNS: &[JsonPath] = &[
    &["summary", "total_columns"],
    &["data_info", "shape", "1"],
];

/// Walks `path` into `root`; `None` for anything absent or JSON null.
fn pluck<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for segment in path {
        current = match current {
            Value::Object(map) => map.get(*segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

fn first_present<'a>(root: &'a Value, chain: &[&[&str]]) -> Option<&'a Value> {
    chain.iter().find_map(|path| pluck(root, path))
}

fn as_count(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_u64().map(|n| n as i64))
        .or_else(|| value.as_f64().map(|n| n as i64))
}

/// Resolves a count through its fallback chain. A value that is present but
/// not numeric is treated as absent.
fn first_count(root: &Value, chain: &[&[&str]]) -> Option<i64> {
    chain
        .iter()
        .find_map(|path| pluck(root, path).and_then(as_count))
}

fn as_percentage(value: &Value) -> f64 {
    value.as_f64().unwrap_or(0.0)
}

/// Builds the canonical statistics from the final stage's raw payload plus
/// an optional collection-statistics payload (used only as a low-priority
/// fallback source). Never raises for missing optional sections; fails only
/// when there is no usable payload at all.
pub fn normalize(raw: &Value, collection_stats: Option<&Value>) -> Result<PipelineStatistics> {
    if !raw.is_object() {
        return Err(PipelineError::Normalization {
            message: "payload is not a JSON object".to_string(),
        });
    }

    if let Some(status) = raw.get("status").and_then(Value::as_str) {
        if status != "success" {
            let message = raw
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("pipeline reported failure")
                .to_string();
            return Err(PipelineError::Normalization { message });
        }
    }

    let empty = Value::Object(serde_json::Map::new());
    let stats = first_present(raw, STATS_BLOCK).unwrap_or(&empty);

    let dedup_before = first_count(stats, DEDUP_BEFORE).unwrap_or(0);
    let dedup_after = first_count(stats, DEDUP_AFTER).unwrap_or(0);
    // Explicitly supplied removed count wins even when inconsistent with
    // before - after; the derivation is a fallback only.
    let dedup_removed =
        first_count(stats, DEDUP_REMOVED).unwrap_or(dedup_before - dedup_after);

    // Combined post-processing count: sum of the two group-specific final
    // counts. Intentionally a different aggregation path than `dedup_after`;
    // the two may disagree and are both kept.
    let group_a_final = first_count(stats, GROUP_A_FINAL).unwrap_or(0);
    let group_b_final = first_count(stats, GROUP_B_FINAL).unwrap_or(0);
    let after_count = group_a_final + group_b_final;

    let total_columns = resolve_total_columns(raw, collection_stats);

    Ok(PipelineStatistics {
        total_columns,
        before_count: dedup_before,
        after_count,
        removed: dedup_removed,
        dedup_before,
        dedup_after,
        dedup_removed,
        status_distribution: status_distribution(stats),
        provider_distribution: provider_distribution(stats),
        pipeline_steps: pipeline_steps(stats),
        npi_validation: npi_validation(stats),
    })
}

/// Column count, derived from the shape of the first record of group A's
/// final dataset; the collection-statistics payload is the fallback.
fn resolve_total_columns(raw: &Value, collection_stats: Option<&Value>) -> u64 {
    if let Some(sample) = pluck(raw, &["final_data", "ca_data", "0"]) {
        if let Some(record) = sample.as_object() {
            return record.len() as u64;
        }
    }

    collection_stats
        .and_then(|stats| first_count(stats, COLLECTION_COLUMNS))
        .map(|n| n.max(0) as u64)
        .unwrap_or(0)
}

fn label_counts(stats: &Value, path: &[&str]) -> BTreeMap<String, i64> {
    pluck(stats, path)
        .and_then(Value::as_object)
        .map(|map| {
            map.iter()
                .map(|(label, count)| (label.clone(), as_count(count).unwrap_or(0)))
                .collect()
        })
        .unwrap_or_default()
}

fn status_distribution(stats: &Value) -> StatusDistribution {
    StatusDistribution {
        group_a: label_counts(stats, &["status_distribution", "ca_status"]),
        group_b: label_counts(stats, &["status_distribution", "ny_status"]),
    }
}

fn provider_distribution(stats: &Value) -> ProviderDistribution {
    ProviderDistribution {
        group_a: first_count(stats, &[&["provider_distribution", "ca_providers"]]).unwrap_or(0),
        group_b: first_count(stats, &[&["provider_distribution", "ny_providers"]]).unwrap_or(0),
        total: first_count(stats, &[&["provider_distribution", "total_providers"]]).unwrap_or(0),
    }
}

fn pipeline_steps(stats: &Value) -> Vec<PipelineStep> {
    pluck(stats, &["pipeline_steps"])
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|entry| {
                    // Entries without a step name are unrenderable; skip them.
                    let step = entry.get("step")?.as_str()?.to_string();
                    Some(PipelineStep {
                        step,
                        records: entry.get("records").and_then(as_count).unwrap_or(0),
                        description: entry
                            .get("description")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn group_npi_stats(block: &Value, key: &'static str) -> GroupNpiStats {
    GroupNpiStats {
        valid: first_count(block, &[&[key, "valid"]]).unwrap_or(0),
        invalid: first_count(block, &[&[key, "invalid"]]).unwrap_or(0),
        total: first_count(block, &[&[key, "total"]]).unwrap_or(0),
    }
}

fn npi_validation(stats: &Value) -> Option<NpiValidation> {
    let block = first_present(stats, NPI_BLOCK)?;
    Some(NpiValidation {
        valid_count: first_count(block, &[&["valid_count"]]).unwrap_or(0),
        invalid_count: first_count(block, &[&["invalid_count"]]).unwrap_or(0),
        total_count: first_count(block, &[&["total_count"]]).unwrap_or(0),
        valid_percentage: block
            .get("valid_percentage")
            .map(as_percentage)
            .unwrap_or(0.0),
        invalid_percentage: block
            .get("invalid_percentage")
            .map(as_percentage)
            .unwrap_or(0.0),
        group_a_stats: group_npi_stats(block, "ca_stats"),
        group_b_stats: group_npi_stats(block, "ny_stats"),
    })
}
