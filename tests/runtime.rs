//! Runtime tests: real timers, worker threads and out-of-order completion

mod common;

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use common::*;
use mention_editor::hover::HoverTarget;
use mention_editor::messages::{HoverMsg, Msg};
use mention_editor::overlay::AnchorRect;
use mention_editor::provider::{FixtureProvider, ProviderError};
use mention_editor::query::STATUS_FAILED;
use mention_editor::replay::{self, ReplayScript};
use mention_editor::trigger::Category;
use mention_editor::view::RenderSnapshot;
use mention_editor::Runtime;

const SETTLE: Duration = Duration::from_secs(5);

fn runtime_with(provider: Arc<ScriptedProvider>) -> Runtime {
    Runtime::new(fast_config(), provider.clone(), provider)
}

fn result_titles(runtime: &Runtime) -> Vec<String> {
    titles(runtime.model())
}

#[test]
fn test_typing_burst_sends_one_query() {
    let provider = ScriptedProvider::new()
        .respond("abc", 0, vec![raw_user("abc", "Abc")])
        .shared();
    let mut runtime = runtime_with(provider.clone());

    runtime.dispatch(Msg::input("@a", 2));
    runtime.dispatch(Msg::input("@ab", 3));
    runtime.dispatch(Msg::input("@abc", 4));
    assert!(runtime.run_until_idle(SETTLE));

    assert_eq!(provider.calls(), vec![(Category::User, "abc".to_string())]);
    assert_eq!(result_titles(&runtime), vec!["Abc"]);
}

#[test]
fn test_slow_stale_response_is_discarded() {
    let provider = ScriptedProvider::new()
        .respond("a", 150, vec![raw_user("ann", "Ann")])
        .respond("ab", 0, vec![raw_user("abby", "Abby")])
        .shared();
    let mut runtime = runtime_with(provider.clone());

    runtime.dispatch(Msg::input("@a", 2));
    let deadline = Instant::now() + SETTLE;
    while !runtime.model().dispatcher.is_searching() && Instant::now() < deadline {
        runtime.pump(Duration::from_millis(10));
    }
    assert!(runtime.model().dispatcher.is_searching());

    // "a" is now in flight; "ab" overtakes it
    runtime.dispatch(Msg::input("@ab", 3));
    assert!(runtime.run_until_idle(SETTLE));

    assert_eq!(provider.calls().len(), 2);
    assert_eq!(result_titles(&runtime), vec!["Abby"]);
}

#[test]
fn test_provider_failure_becomes_status() {
    let provider = ScriptedProvider::new()
        .fail("x", ProviderError::Status(503))
        .shared();
    let mut runtime = runtime_with(provider);

    runtime.dispatch(Msg::input("@x", 2));
    assert!(runtime.run_until_idle(SETTLE));
    assert_eq!(runtime.snapshot().menu.status.as_deref(), Some(STATUS_FAILED));
    assert_eq!(runtime.snapshot().value, "@x");
}

#[test]
fn test_dispose_cancels_pending_timer() {
    let provider = ScriptedProvider::new().shared();
    let mut runtime = runtime_with(provider.clone());

    runtime.dispatch(Msg::input("@ab", 3));
    assert!(!runtime.is_idle());
    runtime.dispose();

    assert!(runtime.is_idle());
    assert!(runtime.is_disposed());
    std::thread::sleep(Duration::from_millis(50));
    assert!(!runtime.pump(Duration::from_millis(10)));
    assert!(provider.calls().is_empty());
}

#[test]
fn test_surface_receives_snapshots() {
    let provider = ScriptedProvider::new()
        .respond("an", 0, vec![raw_user("ann", "Ann")])
        .shared();
    let seen: Arc<Mutex<Vec<RenderSnapshot>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let mut runtime = runtime_with(provider)
        .with_surface(move |s: &RenderSnapshot| sink.lock().unwrap().push(s.clone()));

    runtime.dispatch(Msg::input("@an", 3));
    assert!(runtime.run_until_idle(SETTLE));

    let seen = seen.lock().unwrap();
    assert!(seen.len() >= 3, "input, searching and results each redraw");
    let last = seen.last().unwrap();
    assert!(last.menu.open);
    assert_eq!(last.menu.items[0].title, "Ann");
    assert_eq!(last.value, "@an");
}

#[test]
fn test_hover_lookup_through_fixture() {
    let fixtures = Arc::new(FixtureProvider::from_json(FIXTURES).unwrap());
    let mut runtime = Runtime::new(fast_config(), fixtures.clone(), fixtures);

    let target = HoverTarget::new("/ann/nice-places", AnchorRect::new(10.0, 10.0, 80.0, 16.0));
    runtime.dispatch(Msg::Hover(HoverMsg::PointerMoved(Some(target))));
    assert!(runtime.run_until_idle(SETTLE));

    let tooltip = runtime.snapshot().tooltip;
    assert!(tooltip.visible);
    let entity = tooltip.entity.unwrap();
    assert_eq!(entity.title, "Nice Places");
    assert_eq!(entity.meta.as_deref(), Some("12 blocks; Ann"));
}

#[test]
fn test_replay_script_end_to_end() {
    let fixtures = Arc::new(FixtureProvider::from_json(FIXTURES).unwrap());
    let mut runtime = Runtime::new(fast_config(), fixtures.clone(), fixtures);

    let script = ReplayScript::from_yaml(
        r#"
steps:
  - input: { text: "hi @an" }
  - settle
  - key: tab
  - key: down
  - key: enter
"#,
    )
    .unwrap();
    replay::run(&script, &mut runtime).unwrap();

    let snapshot = runtime.snapshot();
    assert_eq!(snapshot.value, "hi [Annika](/annika) ");
    assert_eq!(snapshot.selection_end, 21);
    assert!(!snapshot.menu.open);
}

#[test]
fn test_messages_from_host_thread_are_applied() {
    let provider = ScriptedProvider::new()
        .respond("bo", 0, vec![raw_user("bob", "Bob")])
        .shared();
    let mut runtime = runtime_with(provider);

    let sender = runtime.sender();
    std::thread::spawn(move || {
        sender.send(Msg::input("@bo", 3)).unwrap();
    })
    .join()
    .unwrap();

    assert!(runtime.pump(Duration::from_secs(1)));
    assert_eq!(runtime.snapshot().value, "@bo");
    assert!(runtime.run_until_idle(SETTLE));
    assert_eq!(result_titles(&runtime), vec!["Bob"]);
}
