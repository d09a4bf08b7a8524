//! Draft assembly - turning tool sections into an answer outline
//!
//! Sections are sorted by capability name before rendering so the outline
//! does not depend on completion order. Rendered sentences reuse the
//! wording of the derived citations the tools produced, which keeps the
//! draft verifiable against its own provenance.

use millwright_domain::{Citation, ToolResult};
use serde_json::Value;

/// How one fanned-out invocation ended
pub(crate) enum SectionOutcome {
    /// The tool returned a result (including the not-found shape)
    Completed(ToolResult),
    /// The tool failed; the reason stays in the logs, the section is
    /// marked unavailable
    Unavailable,
    /// The timeout budget elapsed before the tool finished
    TimedOut,
}

pub(crate) struct Section {
    pub tool: String,
    pub outcome: SectionOutcome,
}

pub(crate) struct Assembled {
    pub outline: String,
    pub citations: Vec<Citation>,
    pub follow_ups: Vec<String>,
    pub completed: usize,
}

/// Assemble sections into an outline plus the citations and follow-ups of
/// the completed ones
pub(crate) fn assemble(mut sections: Vec<Section>) -> Assembled {
    sections.sort_by(|a, b| a.tool.cmp(&b.tool));

    let mut paragraphs = Vec::new();
    let mut citations = Vec::new();
    let mut follow_ups: Vec<String> = Vec::new();
    let mut completed = 0;

    for section in sections {
        match section.outcome {
            SectionOutcome::Completed(result) => {
                completed += 1;
                paragraphs.push(section_text(&section.tool, &result));
                citations.extend(result.citations);
                for question in result.metadata.follow_up_questions {
                    if !follow_ups.contains(&question) {
                        follow_ups.push(question);
                    }
                }
            }
            SectionOutcome::Unavailable => {
                paragraphs.push(format!(
                    "The {} is unavailable right now.",
                    section_label(&section.tool)
                ));
            }
            SectionOutcome::TimedOut => {
                paragraphs.push(format!(
                    "The {} could not be completed in time and was left out.",
                    section_label(&section.tool)
                ));
            }
        }
    }

    follow_ups.truncate(5);

    Assembled {
        outline: paragraphs.join("\n\n"),
        citations,
        follow_ups,
        completed,
    }
}

/// Human label for a capability, used in degraded-section wording
fn section_label(tool: &str) -> &'static str {
    match tool {
        "asset_lookup" => "asset details",
        "efficiency" => "efficiency analysis",
        "downtime" => "stoppage breakdown",
        "production_status" => "live status check",
        "safety_events" => "safety event review",
        "financial_impact" => "financial estimate",
        _ => "requested analysis",
    }
}

fn section_text(tool: &str, result: &ToolResult) -> String {
    if result.is_not_found() {
        return not_found_text(&result.data);
    }

    let data = &result.data;
    match tool {
        "asset_lookup" => format!(
            "{} ({}) in {}.",
            str_field(data, "name"),
            str_field(data, "asset_type"),
            str_field(data, "area")
        ),
        "efficiency" => {
            if !bool_field(data, "has_data") {
                return "No daily metrics are recorded for this asset in that period."
                    .to_string();
            }
            format!(
                "{} ran at {:.1}% OEE over {} days: availability {:.1}%, performance {:.1}%, \
                 quality {:.1}%. The biggest opportunity is {} ({:.1} points).",
                str_field(data, "asset"),
                num_field(data, "oee"),
                data.get("days_with_data").and_then(Value::as_u64).unwrap_or(0),
                num_field(data, "availability"),
                num_field(data, "performance"),
                num_field(data, "quality"),
                data.pointer("/biggest_opportunity/component")
                    .and_then(Value::as_str)
                    .unwrap_or("availability"),
                data.pointer("/biggest_opportunity/gap")
                    .and_then(Value::as_f64)
                    .unwrap_or(0.0),
            )
        }
        "downtime" => {
            if !bool_field(data, "has_downtime") {
                return str_field(data, "message").to_string();
            }
            let vital: Vec<&str> = data
                .get("vital_few")
                .and_then(Value::as_array)
                .map(|v| v.iter().filter_map(Value::as_str).collect())
                .unwrap_or_default();
            let reasons = data
                .get("reasons")
                .and_then(Value::as_array)
                .map(|v| v.len())
                .unwrap_or(0);
            let mut text = format!(
                "{} lost {:.0} minutes of downtime across {} reasons; top contributors: {}.",
                str_field(data, "asset"),
                num_field(data, "total_minutes"),
                reasons,
                vital.join(", ")
            );
            let safety: Vec<&str> = data
                .get("safety_reasons")
                .and_then(Value::as_array)
                .map(|v| {
                    v.iter()
                        .filter_map(|r| r.get("reason").and_then(Value::as_str))
                        .collect()
                })
                .unwrap_or_default();
            if !safety.is_empty() {
                text.push_str(&format!(
                    " Safety-tagged reasons recorded: {}.",
                    safety.join(", ")
                ));
            }
            text
        }
        "production_status" => {
            if !bool_field(data, "has_status") {
                return "No live production figures are recorded for this asset.".to_string();
            }
            let mut text = format!(
                "{} produced {:.0} of {:.0}, variance {:.0}",
                str_field(data, "asset"),
                num_field(data, "current_count"),
                num_field(data, "target_count"),
                num_field(data, "variance"),
            );
            if let Some(percent) = data.get("variance_percent").and_then(Value::as_f64) {
                text.push_str(&format!(" ({:.1}%)", percent));
            }
            text.push('.');
            if bool_field(data, "running") {
                text.push_str(" The line is currently running.");
            } else {
                text.push_str(" The line is currently stopped.");
            }
            text
        }
        "safety_events" => format!(
            "{} logged {} safety-tagged events in this period.",
            str_field(data, "asset"),
            data.get("count").and_then(Value::as_u64).unwrap_or(0)
        ),
        "financial_impact" => format!(
            "The {:.0} minutes of downtime on {} comes to {:.2} in estimated cost at \
             {:.2}/hour.",
            num_field(data, "total_downtime_minutes"),
            str_field(data, "asset"),
            num_field(data, "estimated_cost"),
            num_field(data, "cost_per_hour"),
        ),
        _ => format!("Results from the {} are attached.", section_label(tool)),
    }
}

fn not_found_text(data: &Value) -> String {
    let requested = str_field(data, "requested");
    let suggestions: Vec<&str> = data
        .get("suggestions")
        .and_then(Value::as_array)
        .map(|v| v.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    if suggestions.is_empty() {
        format!("No asset matched '{}', and nothing similar is on record.", requested)
    } else {
        format!(
            "No asset matched '{}'. Assets similar to '{}': {}.",
            requested,
            requested,
            suggestions.join(", ")
        )
    }
}

fn str_field<'a>(data: &'a Value, field: &str) -> &'a str {
    data.get(field).and_then(Value::as_str).unwrap_or("")
}

fn num_field(data: &Value, field: &str) -> f64 {
    data.get(field).and_then(Value::as_f64).unwrap_or(0.0)
}

fn bool_field(data: &Value, field: &str) -> bool {
    data.get(field).and_then(Value::as_bool).unwrap_or(false)
}
