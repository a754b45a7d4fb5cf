//! Coaching tool registry.
//!
//! Every tool the model can call lives here, keyed by name. Tools are
//! read-only renders over the turn's context snapshot. Dispatch is
//! total: unknown names come back as plain text for the model to read,
//! never as a run-ending error.

use chrono::NaiveDate;
use qc_domain::health;
use qc_domain::snapshot::ContextSnapshot;
use qc_domain::tool::{ToolCall, ToolDefinition};
use serde_json::json;
use tracing::info;

/// Everything a tool may read while it runs. Passed explicitly per call.
pub struct ToolContext {
    pub user_id: String,
    pub today: NaiveDate,
    pub snapshot: ContextSnapshot,
}

pub struct ToolRegistry {
    definitions: Vec<ToolDefinition>,
}

impl ToolRegistry {
    /// The standard coaching toolset.
    pub fn standard() -> Self {
        let no_args = json!({ "type": "object", "properties": {} });
        let definitions = vec![
            ToolDefinition {
                name: "get_user_cravings".into(),
                description: "Fetch the user's recent craving logs (last 30 days).".into(),
                parameters: no_args.clone(),
            },
            ToolDefinition {
                name: "get_user_diary".into(),
                description: "Fetch the user's recent diary entries (last 30 days).".into(),
                parameters: no_args.clone(),
            },
            ToolDefinition {
                name: "calculate_health_improvements".into(),
                description: "Compute recovery indicators (nicotine clearance, CO level, \
                              heart and lung risk, money saved, life regained) from the \
                              quit date."
                    .into(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "quit_date": {
                            "type": "string",
                            "description": "Quit date as YYYY-MM-DD; defaults to the user's stored quit date."
                        },
                        "cigarettes_per_day": {
                            "type": "integer",
                            "description": "Former daily consumption; defaults to the user's stored value."
                        }
                    }
                }),
            },
            ToolDefinition {
                name: "get_craving_management_tips".into(),
                description: "Evidence-based techniques for riding out an acute craving.".into(),
                parameters: no_args.clone(),
            },
            ToolDefinition {
                name: "get_relapse_prevention_strategies".into(),
                description: "Strategies for avoiding relapse in high-risk situations.".into(),
                parameters: no_args,
            },
        ];
        Self { definitions }
    }

    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.definitions
    }

    /// Execute one tool call. The returned string goes back to the model
    /// verbatim; anything unexpected is folded into it rather than
    /// propagated.
    pub async fn dispatch(&self, call: &ToolCall, ctx: &ToolContext) -> String {
        info!(
            tool = %call.tool_name,
            call_id = %call.call_id,
            user_id = %ctx.user_id,
            "dispatching tool"
        );
        match call.tool_name.as_str() {
            "get_user_cravings" => render_cravings(&ctx.snapshot),
            "get_user_diary" => render_diary(&ctx.snapshot),
            "calculate_health_improvements" => health_improvements(call, ctx),
            "get_craving_management_tips" => CRAVING_TIPS.to_string(),
            "get_relapse_prevention_strategies" => RELAPSE_STRATEGIES.to_string(),
            other => format!("Tool {other} is not available."),
        }
    }
}

fn render_cravings(snapshot: &ContextSnapshot) -> String {
    if snapshot.cravings.is_empty() {
        return "No cravings logged in the last 30 days.".into();
    }
    let mut out = format!("{} craving(s) logged recently:\n", snapshot.cravings.len());
    for c in &snapshot.cravings {
        out.push_str(&format!(
            "- {}: {}{}{}\n",
            c.date.format("%Y-%m-%d"),
            c.comments,
            c.desire_range
                .map(|d| format!(" (desire {d}/10)"))
                .unwrap_or_default(),
            if c.have_smoked { " [smoked]" } else { "" },
        ));
    }
    out.trim_end().to_string()
}

fn render_diary(snapshot: &ContextSnapshot) -> String {
    if snapshot.diary.is_empty() {
        return "No diary entries logged in the last 30 days.".into();
    }
    let mut out = format!("{} diary entry(ies) logged recently:\n", snapshot.diary.len());
    for d in &snapshot.diary {
        out.push_str(&format!(
            "- {}: {}{}\n",
            d.date.format("%Y-%m-%d"),
            d.notes,
            if d.have_smoked { " [smoked]" } else { "" },
        ));
    }
    out.trim_end().to_string()
}

fn health_improvements(call: &ToolCall, ctx: &ToolContext) -> String {
    let quit_date = match call.arguments.get("quit_date").and_then(|v| v.as_str()) {
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Some(date),
            Err(_) => return "Invalid quit_date. Use format YYYY-MM-DD.".into(),
        },
        None => ctx.snapshot.quit_date,
    };
    let Some(quit_date) = quit_date else {
        return "No quit date available. Ask the user for their quit date first.".into();
    };

    let days = (ctx.today - quit_date).num_days();
    if days < 0 {
        return format!(
            "The quit date {} is {} day(s) in the future. Health improvements \
             start accruing from the quit date onward.",
            quit_date.format("%Y-%m-%d"),
            -days
        );
    }

    let cigarettes_per_day = call
        .arguments
        .get("cigarettes_per_day")
        .and_then(|v| v.as_u64())
        .map(|v| v as u32)
        .or(ctx.snapshot.cigarettes_per_day)
        .unwrap_or(10);

    let mut out = format!(
        "Health improvements after {days} day(s) smoke-free \
         (former consumption {cigarettes_per_day}/day):\n\
         - Nicotine expelled: {}%\n\
         - Carbon monoxide back to normal: {}%\n\
         - Pulse rate normalized: {}%\n\
         - Oxygen levels restored: {}%\n\
         - Taste and smell recovered: {}%\n\
         - Breathing improved: {}%\n\
         - Energy levels: {}%\n\
         - Circulation: {}%\n\
         - Gum texture: {}%\n\
         - Immunity and lung function: {}%\n\
         - Reduced risk of heart disease: {}%\n\
         - Decreased risk of lung cancer: {}%\n\
         - Decreased risk of heart attack: {}%\n\
         - Life expectancy regained: ~{} hour(s)",
        health::nicotine_expelled(days),
        health::carbon_monoxide_level(days),
        health::pulse_rate(days),
        health::oxygen_levels(days),
        health::taste_and_smell(days),
        health::breathing(days),
        health::energy_levels(days),
        health::circulation(days),
        health::gum_texture(days),
        health::immunity_and_lung_function(days),
        health::reduced_risk_of_heart_disease(days),
        health::decreased_risk_of_lung_cancer(days),
        health::decreased_risk_of_heart_attack(days),
        health::life_regained_in_hours(days),
    );
    if let Some(price) = ctx.snapshot.price_per_cigarette {
        out.push_str(&format!(
            "\n- Money saved: ~{:.2}",
            health::money_saved(days, cigarettes_per_day, price)
        ));
    }
    out
}

const CRAVING_TIPS: &str = "\
Craving management techniques (cravings typically pass in 3-5 minutes):
1. Delay: tell yourself to wait 5 minutes before acting on the urge.
2. Deep breathing: four slow breaths in through the nose, out through the mouth.
3. Drink water: sip slowly; it occupies hands and mouth.
4. Distract: change rooms, take a short walk, call someone.
5. Keep your hands busy: a pen, a stress ball, a rubber band.
6. Brush your teeth: the fresh taste discourages lighting up.
7. Remind yourself why you quit and how far you have come.";

const RELAPSE_STRATEGIES: &str = "\
Relapse prevention strategies:
1. Know your triggers (alcohol, coffee, stress, certain people or places) and plan around them.
2. Avoid high-risk situations during the first weeks; if unavoidable, rehearse an exit.
3. One slip is not a relapse: if you smoke one, stop there and examine what led to it.
4. Keep no cigarettes at home or in the car.
5. Build replacement routines for your old smoking moments.
6. Ask for support: tell friends and family you have quit and what helps you.
7. Consider nicotine replacement or medication with a healthcare professional if cravings stay severe.";

#[cfg(test)]
mod tests {
    use super::*;
    use qc_domain::snapshot::CravingEntry;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ctx_with(snapshot: ContextSnapshot) -> ToolContext {
        ToolContext {
            user_id: "u1".into(),
            today: d(2026, 8, 27),
            snapshot,
        }
    }

    fn call(name: &str, args: serde_json::Value) -> ToolCall {
        ToolCall {
            call_id: "c1".into(),
            tool_name: name.into(),
            arguments: args,
        }
    }

    #[tokio::test]
    async fn unknown_tool_comes_back_as_text() {
        let registry = ToolRegistry::standard();
        let out = registry
            .dispatch(&call("launch_rocket", json!({})), &ctx_with(Default::default()))
            .await;
        assert_eq!(out, "Tool launch_rocket is not available.");
    }

    #[tokio::test]
    async fn health_tool_rejects_malformed_date() {
        let registry = ToolRegistry::standard();
        let out = registry
            .dispatch(
                &call("calculate_health_improvements", json!({"quit_date": "yesterday"})),
                &ctx_with(Default::default()),
            )
            .await;
        assert_eq!(out, "Invalid quit_date. Use format YYYY-MM-DD.");
    }

    #[tokio::test]
    async fn health_tool_reports_future_quit_date() {
        let registry = ToolRegistry::standard();
        let out = registry
            .dispatch(
                &call("calculate_health_improvements", json!({"quit_date": "2026-09-01"})),
                &ctx_with(Default::default()),
            )
            .await;
        assert!(out.contains("5 day(s) in the future"));
    }

    #[tokio::test]
    async fn health_tool_falls_back_to_snapshot_quit_date() {
        let registry = ToolRegistry::standard();
        let snapshot = ContextSnapshot {
            quit_date: Some(d(2026, 8, 17)),
            cigarettes_per_day: Some(15),
            ..Default::default()
        };
        let out = registry
            .dispatch(&call("calculate_health_improvements", json!({})), &ctx_with(snapshot))
            .await;
        assert!(out.contains("after 10 day(s) smoke-free"));
        assert!(out.contains("former consumption 15/day"));
        assert!(!out.contains("Money saved"));
    }

    #[tokio::test]
    async fn health_tool_reports_money_saved_when_price_is_known() {
        let registry = ToolRegistry::standard();
        let snapshot = ContextSnapshot {
            quit_date: Some(d(2026, 8, 17)),
            cigarettes_per_day: Some(15),
            price_per_cigarette: Some(0.5),
            ..Default::default()
        };
        let out = registry
            .dispatch(&call("calculate_health_improvements", json!({})), &ctx_with(snapshot))
            .await;
        assert!(out.contains("Money saved: ~75.00"));
    }

    #[tokio::test]
    async fn health_tool_without_any_quit_date_asks_for_one() {
        let registry = ToolRegistry::standard();
        let out = registry
            .dispatch(
                &call("calculate_health_improvements", json!({})),
                &ctx_with(Default::default()),
            )
            .await;
        assert!(out.starts_with("No quit date available."));
    }

    #[tokio::test]
    async fn cravings_tool_renders_snapshot_rows() {
        let snapshot = ContextSnapshot {
            cravings: vec![CravingEntry {
                date: d(2026, 8, 20),
                comments: "after coffee".into(),
                have_smoked: false,
                desire_range: Some(7),
                cigarettes_smoked: None,
                feeling: None,
                activity: None,
                company: None,
            }],
            ..Default::default()
        };
        let registry = ToolRegistry::standard();
        let out = registry
            .dispatch(&call("get_user_cravings", json!({})), &ctx_with(snapshot))
            .await;
        assert!(out.contains("after coffee"));
        assert!(out.contains("desire 7/10"));
    }

    #[tokio::test]
    async fn empty_snapshot_renders_no_rows_messages() {
        let registry = ToolRegistry::standard();
        let ctx = ctx_with(Default::default());
        let cravings = registry.dispatch(&call("get_user_cravings", json!({})), &ctx).await;
        assert_eq!(cravings, "No cravings logged in the last 30 days.");
        let diary = registry.dispatch(&call("get_user_diary", json!({})), &ctx).await;
        assert_eq!(diary, "No diary entries logged in the last 30 days.");
    }

    #[test]
    fn registry_exposes_five_tools() {
        let registry = ToolRegistry::standard();
        let names: Vec<&str> = registry.definitions().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "get_user_cravings",
                "get_user_diary",
                "calculate_health_improvements",
                "get_craving_management_tips",
                "get_relapse_prevention_strategies",
            ]
        );
    }
}
