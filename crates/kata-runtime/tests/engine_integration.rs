use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use anyhow::anyhow;
use kata_runtime::{
    define_hook, EngineConfig, HookDefinition, HookEvent, HookExit, HookOutput, HookRuntime,
    HookSpecificOutput, HookTrigger, PermissionDecision, SuccessPayload,
};
use serde_json::{json, Value};
use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::Instant;

/// Stdin that must never be touched
struct PoisonedStdin;

impl AsyncRead for PoisonedStdin {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        panic!("stdin was read although the gate was closed");
    }
}

struct Outcome {
    exit: HookExit,
    stdout: String,
    stderr: String,
}

async fn run_with(runtime: &HookRuntime, hook: &HookDefinition, input: &Value) -> Outcome {
    let raw = input.to_string();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = runtime
        .execute(hook, raw.as_bytes(), &mut stdout, &mut stderr)
        .await
        .unwrap();
    Outcome {
        exit,
        stdout: String::from_utf8(stdout).unwrap(),
        stderr: String::from_utf8(stderr).unwrap(),
    }
}

fn assert_elapsed(started: Instant, at_least_ms: u64, below_ms: u64) {
    let elapsed = started.elapsed();
    assert!(
        elapsed >= Duration::from_millis(at_least_ms) && elapsed < Duration::from_millis(below_ms),
        "elapsed {:?}",
        elapsed
    );
}

async fn run(hook: &HookDefinition, input: &Value) -> Outcome {
    run_with(&HookRuntime::default(), hook, input).await
}

fn common(event: &str) -> Value {
    json!({
        "hook_event_name": event,
        "cwd": "/repo",
        "session_id": "abc123",
        "transcript_path": "/home/me/.claude/projects/repo/abc123.jsonl"
    })
}

fn with(mut base: Value, extra: Value) -> Value {
    let map = base.as_object_mut().unwrap();
    for (key, value) in extra.as_object().unwrap() {
        map.insert(key.clone(), value.clone());
    }
    base
}

fn session_start() -> Value {
    with(common("SessionStart"), json!({"source": "startup"}))
}

fn user_prompt() -> Value {
    with(common("UserPromptSubmit"), json!({"prompt": "fix the tests"}))
}

fn stop() -> Value {
    with(common("Stop"), json!({"stop_hook_active": false}))
}

fn pre_read(path: &str) -> Value {
    with(
        common("PreToolUse"),
        json!({
            "tool_name": "Read",
            "tool_input": {"file_path": path},
            "tool_use_id": "toolu_01"
        }),
    )
}

#[tokio::test]
async fn test_missing_common_field_never_reaches_handler() {
    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();
    let hook = define_hook(HookTrigger::new().on(HookEvent::SessionStart), move |ctx| {
        flag.store(true, Ordering::SeqCst);
        async move { Ok(ctx.success()) }
    })
    .unwrap();

    let mut input = session_start();
    input.as_object_mut().unwrap().remove("cwd");
    let outcome = run(&hook, &input).await;

    assert_eq!(outcome.exit, HookExit::NonBlockingError);
    assert!(outcome.stdout.is_empty());
    assert!(outcome
        .stderr
        .starts_with("Error in hook: Invalid hook input (schema mismatch for SessionStart): cwd: missing required field"));
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_invalid_json_is_soft_failure() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.success())
    })
    .unwrap();
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = HookRuntime::default()
        .execute(&hook, &b"{not json"[..], &mut stdout, &mut stderr)
        .await
        .unwrap();
    assert_eq!(exit, HookExit::NonBlockingError);
    assert!(stdout.is_empty());
    assert!(String::from_utf8(stderr)
        .unwrap()
        .starts_with("Error in hook: Invalid hook input (invalid JSON)"));
}

#[tokio::test]
async fn test_event_outside_trigger_is_rejected() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.success())
    })
    .unwrap();
    let outcome = run(&hook, &session_start()).await;
    assert_eq!(outcome.exit, HookExit::NonBlockingError);
    assert!(outcome
        .stderr
        .contains(r#"hook_event_name: expected one of "Stop", received "SessionStart""#));
}

#[tokio::test]
async fn test_closed_gate_skips_everything() {
    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), move |ctx| {
        flag.store(true, Ordering::SeqCst);
        async move { Ok(ctx.blocking_error("should not run")) }
    })
    .unwrap()
    .should_run(false);

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = HookRuntime::default()
        .execute(&hook, PoisonedStdin, &mut stdout, &mut stderr)
        .await
        .unwrap();

    assert_eq!(exit, HookExit::Success);
    assert!(stdout.is_empty());
    assert!(stderr.is_empty());
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_async_gate_predicate() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.blocking_error("should not run"))
    })
    .unwrap()
    .should_run_when(|| async {
        tokio::task::yield_now().await;
        Ok(false)
    });

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = HookRuntime::default()
        .execute(&hook, PoisonedStdin, &mut stdout, &mut stderr)
        .await
        .unwrap();
    assert_eq!(exit, HookExit::Success);
    assert!(stdout.is_empty() && stderr.is_empty());
}

#[tokio::test]
async fn test_failing_gate_is_soft_failure() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.success())
    })
    .unwrap()
    .should_run_when(|| async { Err(anyhow!("cannot read settings")) });

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = HookRuntime::default()
        .execute(&hook, PoisonedStdin, &mut stdout, &mut stderr)
        .await
        .unwrap();
    assert_eq!(exit, HookExit::NonBlockingError);
    assert_eq!(String::from_utf8(stderr).unwrap(), "Error in hook: cannot read settings\n");
}

#[tokio::test]
async fn test_panicking_gate_is_soft_failure() {
    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), move |ctx| {
        flag.store(true, Ordering::SeqCst);
        async move { Ok(ctx.success()) }
    })
    .unwrap()
    .should_run_when(|| async {
        if true {
            panic!("settings file corrupt");
        }
        Ok(true)
    });

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit = HookRuntime::default()
        .execute(&hook, PoisonedStdin, &mut stdout, &mut stderr)
        .await
        .unwrap();
    assert_eq!(exit, HookExit::NonBlockingError);
    assert!(stdout.is_empty());
    assert_eq!(
        String::from_utf8(stderr).unwrap(),
        "Error in hook: gate panicked: settings file corrupt\n"
    );
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_success_message_for_user() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::SessionStart), |ctx| async move {
        Ok(ctx.success_with(SuccessPayload::new().message("Welcome")))
    })
    .unwrap();
    let outcome = run(&hook, &session_start()).await;
    assert_eq!(outcome.exit, HookExit::Success);
    assert_eq!(outcome.stdout, "Welcome\n");
    assert!(outcome.stderr.is_empty());
}

#[tokio::test]
async fn test_additional_context_wins_on_context_events() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::UserPromptSubmit), |ctx| async move {
        Ok(ctx.success_with(SuccessPayload::new().message("ignored").context("ctx")))
    })
    .unwrap();
    let outcome = run(&hook, &user_prompt()).await;
    assert_eq!(outcome.exit, HookExit::Success);
    assert_eq!(outcome.stdout, "ctx\n");
}

#[tokio::test]
async fn test_additional_context_ignored_on_other_events() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.success_with(SuccessPayload::new().message("bye").context("ctx")))
    })
    .unwrap();
    assert_eq!(run(&hook, &stop()).await.stdout, "bye\n");

    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.success_with(SuccessPayload::new().context("ctx")))
    })
    .unwrap();
    let outcome = run(&hook, &stop()).await;
    assert_eq!(outcome.exit, HookExit::Success);
    assert!(outcome.stdout.is_empty());
}

#[tokio::test]
async fn test_empty_context_falls_back_to_message() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::SessionStart), |ctx| async move {
        Ok(ctx.success_with(SuccessPayload::new().message("Welcome").context("")))
    })
    .unwrap();
    assert_eq!(run(&hook, &session_start()).await.stdout, "Welcome\n");
}

#[tokio::test]
async fn test_context_events_follow_config() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.success_with(SuccessPayload::new().message("bye").context("ctx")))
    })
    .unwrap();
    let runtime = HookRuntime::new(EngineConfig {
        context_events: [HookEvent::Stop].into_iter().collect(),
        ..EngineConfig::default()
    });
    assert_eq!(run_with(&runtime, &hook, &stop()).await.stdout, "ctx\n");
}

#[tokio::test]
async fn test_blocking_error() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::PreToolUse), |ctx| async move {
        Ok(ctx.blocking_error("bad file"))
    })
    .unwrap();
    let outcome = run(&hook, &pre_read("/repo/src/main.rs")).await;
    assert_eq!(outcome.exit, HookExit::BlockingError);
    assert_eq!(outcome.exit.code(), 2);
    assert_eq!(outcome.stderr, "bad file\n");
    assert!(outcome.stdout.is_empty());
}

#[tokio::test]
async fn test_non_blocking_error_without_message() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.non_blocking_error())
    })
    .unwrap();
    let outcome = run(&hook, &stop()).await;
    assert_eq!(outcome.exit.code(), 1);
    assert!(outcome.stderr.is_empty());
    assert!(outcome.stdout.is_empty());
}

#[tokio::test]
async fn test_json_output_is_exact() {
    let hook = define_hook(
        HookTrigger::new().on_tools(HookEvent::PreToolUse, ["Read"]),
        |ctx| async move {
            let path: Value = ctx.input().tool_input().cloned().unwrap_or_default();
            let reason = format!("Access to {} is restricted.", path["file_path"].as_str().unwrap_or(""));
            Ok(ctx.json(HookOutput::new().hook_specific(HookSpecificOutput::permission(
                PermissionDecision::Deny,
                reason,
            )))?)
        },
    )
    .unwrap();

    let outcome = run(&hook, &pre_read("/repo/.env")).await;
    assert_eq!(outcome.exit, HookExit::Success);
    assert_eq!(
        outcome.stdout,
        concat!(
            r#"{"hookSpecificOutput":{"hookEventName":"PreToolUse","permissionDecision":"deny","#,
            r#""permissionDecisionReason":"Access to /repo/.env is restricted."}}"#,
            "\n"
        )
    );
    assert!(outcome.stderr.is_empty());
}

#[tokio::test]
async fn test_json_for_wrong_event_is_soft_failure() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.json(HookOutput::new().hook_specific(HookSpecificOutput::permission(
            PermissionDecision::Allow,
            "ok",
        )))?)
    })
    .unwrap();
    let outcome = run(&hook, &stop()).await;
    assert_eq!(outcome.exit, HookExit::NonBlockingError);
    assert!(outcome.stdout.is_empty());
    assert_eq!(
        outcome.stderr,
        "Error in hook: PreToolUse output cannot be returned from a Stop hook\n"
    );
}

#[tokio::test]
async fn test_tool_scope_rejects_other_tools() {
    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();
    let hook = define_hook(
        HookTrigger::new().on_tools(HookEvent::PreToolUse, ["Read"]),
        move |ctx| {
            flag.store(true, Ordering::SeqCst);
            async move { Ok(ctx.success()) }
        },
    )
    .unwrap();
    let input = with(
        common("PreToolUse"),
        json!({"tool_name": "Bash", "tool_input": {"command": "ls"}, "tool_use_id": "toolu_02"}),
    );
    let outcome = run(&hook, &input).await;
    assert_eq!(outcome.exit, HookExit::NonBlockingError);
    assert!(outcome.stderr.contains("tool_name"));
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_handler_error_is_soft_failure() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |_ctx| async move {
        Err(anyhow!("database unreachable"))
    })
    .unwrap();
    let outcome = run(&hook, &stop()).await;
    assert_eq!(outcome.exit, HookExit::NonBlockingError);
    assert_eq!(outcome.stderr, "Error in hook: database unreachable\n");
    assert!(outcome.stdout.is_empty());
}

#[tokio::test]
async fn test_handler_panic_is_soft_failure() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |_ctx| async move {
        if true {
            panic!("index out of range");
        }
        Ok(kata_runtime::HookResponse::NonBlockingError(None))
    })
    .unwrap();
    let outcome = run(&hook, &stop()).await;
    assert_eq!(outcome.exit, HookExit::NonBlockingError);
    assert_eq!(
        outcome.stderr,
        "Error in hook: handler panicked: index out of range\n"
    );
}

#[tokio::test(start_paused = true)]
async fn test_json_async_fast_result_is_emitted() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.json_async(
            || async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                Ok(HookOutput::new().system_message("done"))
            },
            Some(100),
        ))
    })
    .unwrap();

    let started = Instant::now();
    let outcome = run(&hook, &stop()).await;
    assert_elapsed(started, 50, 100);
    assert_eq!(outcome.exit, HookExit::Success);
    assert_eq!(
        outcome.stdout,
        "{\"async\":true,\"asyncTimeout\":100}\n{\"systemMessage\":\"done\"}\n"
    );
    assert!(outcome.stderr.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_json_async_times_out_after_grace() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.json_async(
            || async {
                tokio::time::sleep(Duration::from_millis(10_000)).await;
                Ok(HookOutput::new().system_message("too late"))
            },
            Some(100),
        ))
    })
    .unwrap();

    let started = Instant::now();
    let outcome = run(&hook, &stop()).await;
    assert_elapsed(started, 5100, 5200);
    assert_eq!(outcome.exit, HookExit::NonBlockingError);
    assert_eq!(outcome.stdout, "{\"async\":true,\"asyncTimeout\":100}\n");
    assert_eq!(
        outcome.stderr,
        "Async hook execution failed: Exceeded user specified timeout: 100ms\n"
    );
}

#[tokio::test(start_paused = true)]
async fn test_json_async_grace_follows_config() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.json_async(
            || async {
                tokio::time::sleep(Duration::from_millis(1_000)).await;
                Ok(HookOutput::new())
            },
            Some(100),
        ))
    })
    .unwrap();
    let runtime = HookRuntime::new(EngineConfig {
        deferred_grace_ms: 200,
        ..EngineConfig::default()
    });

    let started = Instant::now();
    let outcome = run_with(&runtime, &hook, &stop()).await;
    assert_elapsed(started, 300, 1000);
    assert_eq!(outcome.exit, HookExit::NonBlockingError);
}

#[tokio::test(start_paused = true)]
async fn test_deferred_without_timeout_waits() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.defer(|| async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(HookOutput::new().system_message("slow but fine"))
        }))
    })
    .unwrap();
    let outcome = run(&hook, &stop()).await;
    assert_eq!(outcome.exit, HookExit::Success);
    assert_eq!(
        outcome.stdout,
        "{\"async\":true}\n{\"systemMessage\":\"slow but fine\"}\n"
    );
}

#[tokio::test]
async fn test_deferred_failure_reported_on_stderr() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.defer(|| async { Err(anyhow!("marketplace offline")) }))
    })
    .unwrap();
    let outcome = run(&hook, &stop()).await;
    assert_eq!(outcome.exit, HookExit::NonBlockingError);
    assert_eq!(outcome.stdout, "{\"async\":true}\n");
    assert_eq!(outcome.stderr, "Async hook execution failed: marketplace offline\n");
}

#[tokio::test]
async fn test_deferred_panic_reported_on_stderr() {
    let hook = define_hook(HookTrigger::new().on(HookEvent::Stop), |ctx| async move {
        Ok(ctx.defer(|| async {
            if true {
                panic!("worker blew up");
            }
            Ok(HookOutput::new())
        }))
    })
    .unwrap();
    let outcome = run(&hook, &stop()).await;
    assert_eq!(outcome.exit, HookExit::NonBlockingError);
    assert_eq!(
        outcome.stderr,
        "Async hook execution failed: deferred hook panicked: worker blew up\n"
    );
}
