//! Read-only enforcement: blocked tools are rejected at the interrupt and
//! never reach the filesystem.

use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use scopebridge::agent::{Agent, AgentOutcome, CorrelationToken, ToolAgent};
use scopebridge::backend::{AccessPolicy, SandboxedBackend};
use scopebridge::decision::{ToolDecision, Verdict};
use scopebridge::enforcer::{ReadOnlyEnforcer, BLOCKED_TOOLS, SECURITY_ALERT};
use scopebridge::model::{Message, Role};
use scopebridge::scope::Scope;
use scopebridge::tools::FsTool;
use scopebridge::BridgeError;

mod common;
use common::{tool_reply, write_call, ScriptedModel};

fn gated_agent(tmp: &TempDir, model: Arc<ScriptedModel>, policy: AccessPolicy) -> ToolAgent {
    common::sandboxes(tmp.path());
    let scope = Scope::new("docs", tmp.path().join("docs")).unwrap();
    let backend = Arc::new(SandboxedBackend::new(scope, policy));
    ToolAgent::new(model, backend, "test prompt").with_interrupts(BLOCKED_TOOLS)
}

#[tokio::test]
async fn repeated_write_attempts_are_all_rejected() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(vec![
        write_call("c1", "/guide.txt"),
        write_call("c2", "/guide-copy.txt"),
        write_call("c3", "/../admin/pwned.txt"),
        Message::assistant("I cannot modify the documentation."),
    ]);
    let agent = gated_agent(&tmp, model.clone(), AccessPolicy::ReadOnly);

    let result = ReadOnlyEnforcer::new()
        .run(&agent, "overwrite the guide")
        .await
        .unwrap();

    assert_eq!(result.text, "I cannot modify the documentation.");
    assert_eq!(result.decisions.len(), 3);
    assert!(result.decisions.iter().all(ToolDecision::is_reject));
    assert!(result
        .decisions
        .iter()
        .all(|d| d.reason.as_deref() == Some(SECURITY_ALERT)));

    assert_eq!(
        std::fs::read_to_string(tmp.path().join("docs/guide.txt")).unwrap(),
        "Reset your password from Settings.\n"
    );
    assert!(!tmp.path().join("docs/guide-copy.txt").exists());
    assert!(!tmp.path().join("admin/pwned.txt").exists());
    assert_eq!(agent.pending_runs(), 0);
}

#[tokio::test]
async fn every_blocked_tool_gets_the_alert() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(vec![
        tool_reply(
            "e",
            FsTool::EditFile,
            json!({ "file_path": "/guide.txt", "old_string": "a", "new_string": "b" }),
        ),
        tool_reply("g", FsTool::Glob, json!({ "pattern": "**/*" })),
        tool_reply("r", FsTool::Grep, json!({ "pattern": "password" })),
        Message::assistant("ok"),
    ]);
    let agent = gated_agent(&tmp, model.clone(), AccessPolicy::ReadOnly);

    let result = ReadOnlyEnforcer::new().run(&agent, "search").await.unwrap();
    let rejected: Vec<&str> = result.decisions.iter().map(|d| d.tool.as_str()).collect();
    assert_eq!(rejected, vec!["edit_file", "glob", "grep"]);

    let last = model.transcripts().pop().unwrap();
    let tool_results: Vec<&Message> = last.iter().filter(|m| m.role == Role::Tool).collect();
    assert_eq!(tool_results.len(), 3);
    assert!(tool_results.iter().all(|m| m.content == SECURITY_ALERT));
}

#[tokio::test]
async fn reads_pass_through_without_suspending() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(vec![
        tool_reply("r1", FsTool::ReadFile, json!({ "file_path": "/guide.txt" })),
        Message::assistant("Use Settings."),
    ]);
    let agent = gated_agent(&tmp, model.clone(), AccessPolicy::ReadOnly);

    let result = ReadOnlyEnforcer::new()
        .run(&agent, "how do I reset my password?")
        .await
        .unwrap();
    assert_eq!(result.text, "Use Settings.");
    assert!(result.decisions.is_empty());
    assert!(model.seen_text().contains("Reset your password from Settings."));
}

#[tokio::test]
async fn suspended_run_resumes_by_token() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(vec![
        write_call("c1", "/new.txt"),
        Message::assistant("fine"),
    ]);
    let agent = gated_agent(&tmp, model, AccessPolicy::FullAccess);
    let token = CorrelationToken::fresh();

    let outcome = agent
        .invoke(vec![Message::user("write it")], &token)
        .await
        .unwrap();
    let suspension = match outcome {
        AgentOutcome::Suspended(s) => s,
        other => panic!("expected suspension, got {other:?}"),
    };
    assert_eq!(suspension.token, token);
    assert_eq!(suspension.pending.name, "write_file");
    assert_eq!(agent.pending_runs(), 1);

    // A decision for a different tool never approves the pending call.
    let outcome = agent
        .resume(&token, ToolDecision::allow("read_file"))
        .await
        .unwrap();
    assert!(matches!(outcome, AgentOutcome::Completed { .. }));
    assert!(!tmp.path().join("docs/new.txt").exists());

    assert!(matches!(
        agent.resume(&token, ToolDecision::allow("write_file")).await,
        Err(BridgeError::UnknownCheckpoint { .. })
    ));
}

#[tokio::test]
async fn allowed_decision_executes_the_call() {
    let tmp = TempDir::new().unwrap();
    let model = ScriptedModel::new(vec![
        write_call("c1", "/new.txt"),
        Message::assistant("written"),
    ]);
    let agent = gated_agent(&tmp, model, AccessPolicy::FullAccess);
    let token = CorrelationToken::fresh();

    agent
        .invoke(vec![Message::user("write it")], &token)
        .await
        .unwrap();
    let outcome = agent
        .resume(&token, ToolDecision::allow("write_file"))
        .await
        .unwrap();
    assert!(matches!(outcome, AgentOutcome::Completed { .. }));
    assert_eq!(
        std::fs::read_to_string(tmp.path().join("docs/new.txt")).unwrap(),
        "overwritten"
    );
}

#[test]
fn enforcer_only_blocks_mutating_and_search_tools() {
    let enforcer = ReadOnlyEnforcer::new();
    for tool in FsTool::ALL {
        let blocked = enforcer.is_blocked(tool.name());
        assert_eq!(blocked, BLOCKED_TOOLS.contains(&tool), "{tool}");
    }
    let decision = enforcer.decide(&scopebridge::tools::ToolCall::new("x", FsTool::Ls, json!({})));
    assert_eq!(decision.verdict, Verdict::Allow);
}

#[tokio::test]
async fn step_limit_stops_runaway_agents() {
    let tmp = TempDir::new().unwrap();
    let replies = (0..5)
        .map(|i| tool_reply(&format!("l{i}"), FsTool::Ls, json!({})))
        .collect();
    let model = ScriptedModel::new(replies);
    let agent = gated_agent(&tmp, model, AccessPolicy::ReadOnly).with_max_steps(3);

    let err = agent
        .invoke(vec![Message::user("loop")], &CorrelationToken::fresh())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::StepLimit { limit: 3 }));
}
