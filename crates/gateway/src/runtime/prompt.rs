//! System prompt assembly.
//!
//! The system prompt is the fixed coaching policy, the rendered user
//! context, and a short tool catalog. It is built once per thread and
//! injected as the first message; later turns reuse the persisted copy.

use std::collections::BTreeMap;

use qc_domain::health;
use qc_domain::prompts::SYSTEM_POLICY;
use qc_domain::snapshot::{milestone_for, quit_status_line, ContextSnapshot};
use qc_domain::tool::ToolDefinition;

/// Per-turn key/value context derived from the snapshot.
///
/// A `BTreeMap` keeps the rendered prompt deterministic, which the
/// scenario tests rely on.
pub fn conversation_context(snapshot: &ContextSnapshot) -> BTreeMap<String, String> {
    let mut ctx = BTreeMap::new();
    if let Some(date) = snapshot.quit_date {
        ctx.insert("quit_date".into(), date.format("%Y-%m-%d").to_string());
    }
    if let Some(days) = snapshot.days_since_quit {
        ctx.insert("days_since_quit".into(), days.to_string());
        ctx.insert("quit_status".into(), quit_status_line(days));
        if let Some(milestone) = milestone_for(days) {
            ctx.insert("milestone".into(), milestone.to_string());
        }
    }
    if let Some(reason) = &snapshot.quit_reason {
        ctx.insert("quit_reason".into(), reason.clone());
    }
    if let Some(lang) = &snapshot.language {
        ctx.insert("language".into(), lang.clone());
    }
    if let Some(cpd) = snapshot.cigarettes_per_day {
        ctx.insert("cigarettes_per_day".into(), cpd.to_string());
    }
    if let Some(years) = snapshot.years_smoking {
        ctx.insert("years_smoking".into(), years.to_string());
    }
    if let Some(price) = snapshot.price_per_cigarette {
        ctx.insert("price_per_cigarette".into(), format!("{price:.2}"));
        if let (Some(days), Some(cpd)) = (snapshot.days_since_quit, snapshot.cigarettes_per_day) {
            ctx.insert(
                "money_saved".into(),
                format!("{:.2}", health::money_saved(days, cpd, price)),
            );
        }
    }
    if !snapshot.goals.is_empty() {
        let goals = snapshot
            .goals
            .iter()
            .map(|g| {
                let mark = if g.is_completed { "done" } else { "open" };
                format!("{} ({mark})", g.description)
            })
            .collect::<Vec<_>>()
            .join("; ");
        ctx.insert("goals".into(), goals);
    }
    if !snapshot.cravings.is_empty() {
        ctx.insert(
            "recent_cravings".into(),
            format!("{} logged in the last month", snapshot.cravings.len()),
        );
    }
    if !snapshot.diary.is_empty() {
        ctx.insert(
            "recent_diary_entries".into(),
            format!("{} logged in the last month", snapshot.diary.len()),
        );
    }
    ctx
}

/// Render the full system prompt for a new thread.
pub fn build_system_prompt(
    context: &BTreeMap<String, String>,
    tools: &[ToolDefinition],
) -> String {
    let mut out = String::from(SYSTEM_POLICY);

    if !context.is_empty() {
        out.push_str("\n\nUser Context:\n");
        for (key, value) in context {
            out.push_str(&format!("- {key}: {value}\n"));
        }
    }

    if !tools.is_empty() {
        out.push_str("\nAvailable Tools:\n");
        for tool in tools {
            out.push_str(&format!("- {}: {}\n", tool.name, tool.description));
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn snapshot(days: i64) -> ContextSnapshot {
        ContextSnapshot {
            quit_date: NaiveDate::from_ymd_opt(2026, 8, 17),
            days_since_quit: Some(days),
            quit_reason: Some("family".into()),
            ..Default::default()
        }
    }

    #[test]
    fn context_carries_status_line_and_reason() {
        let ctx = conversation_context(&snapshot(10));
        assert_eq!(ctx["days_since_quit"], "10");
        assert_eq!(ctx["quit_status"], "10 day(s) smoke-free");
        assert_eq!(ctx["quit_reason"], "family");
        assert!(!ctx.contains_key("milestone"));
    }

    #[test]
    fn price_yields_money_saved_context() {
        let snap = ContextSnapshot {
            cigarettes_per_day: Some(15),
            price_per_cigarette: Some(0.5),
            ..snapshot(10)
        };
        let ctx = conversation_context(&snap);
        assert_eq!(ctx["price_per_cigarette"], "0.50");
        assert_eq!(ctx["money_saved"], "75.00");
    }

    #[test]
    fn money_saved_needs_consumption_and_quit_date() {
        let snap = ContextSnapshot {
            price_per_cigarette: Some(0.5),
            ..ContextSnapshot::default()
        };
        let ctx = conversation_context(&snap);
        assert_eq!(ctx["price_per_cigarette"], "0.50");
        assert!(!ctx.contains_key("money_saved"));
    }

    #[test]
    fn milestone_appears_only_on_exact_days() {
        let ctx = conversation_context(&snapshot(7));
        assert!(ctx["milestone"].contains("One week"));
        let ctx = conversation_context(&snapshot(8));
        assert!(!ctx.contains_key("milestone"));
    }

    #[test]
    fn empty_snapshot_renders_policy_only() {
        let ctx = conversation_context(&ContextSnapshot::default());
        let prompt = build_system_prompt(&ctx, &[]);
        assert_eq!(prompt, SYSTEM_POLICY.trim_end());
        assert!(!prompt.contains("User Context:"));
    }

    #[test]
    fn prompt_lists_context_and_tools() {
        let ctx = conversation_context(&snapshot(1));
        let tools = vec![ToolDefinition {
            name: "get_user_cravings".into(),
            description: "Fetch the user's recent craving logs.".into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }];
        let prompt = build_system_prompt(&ctx, &tools);
        assert!(prompt.contains("User Context:"));
        assert!(prompt.contains("- quit_status: 1 day(s) smoke-free"));
        assert!(prompt.contains("Available Tools:"));
        assert!(prompt.contains("- get_user_cravings:"));
    }
}
