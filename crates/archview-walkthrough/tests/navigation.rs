//! Walkthrough sessions over computed dynamic views.

use archview_compute::{
    compute_view, BranchCollection, BranchKind, BranchPath, ComputeConfig, ParsedView, RawBranch,
    RawPath, RawStep, StepInput,
};
use archview_model::{Element, Fqn, ModelGraph, ViewId};
use archview_walkthrough::{
    decode, encode, transition, ActiveStep, BranchRef, Event, Phase, Snapshot, Walkthrough,
    WalkthroughMeta, WalkthroughState,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

fn fqn(s: &str) -> Fqn {
    Fqn::new(s).unwrap()
}

fn step(source: &str, target: &str) -> RawStep {
    StepInput::new(fqn(source), fqn(target)).into()
}

/// step-01 user -> api, then either
/// card:    step-02 api -> psp, step-03 psp -> api
/// invoice: step-04 api -> ledger
/// and finally step-05 api -> user.
fn checkout() -> Walkthrough {
    let graph = ModelGraph::builder()
        .element(Element::new(fqn("user"), "actor"))
        .element(Element::new(fqn("api"), "service"))
        .element(Element::new(fqn("psp"), "service"))
        .element(Element::new(fqn("ledger"), "service"))
        .build()
        .unwrap();
    let view = ParsedView::dynamic("checkout")
        .step(step("user", "api"))
        .step(
            RawBranch::new(
                BranchKind::Alternate,
                vec![
                    RawPath::new(vec![step("api", "psp"), step("psp", "api")]).with_id("card"),
                    RawPath::new(vec![step("api", "ledger")]).with_id("invoice"),
                ],
            )
            .with_id("pay"),
        )
        .step(step("api", "user"));
    let computed = compute_view(&view, &graph, &ComputeConfig::default()).unwrap();
    Walkthrough::from_view(&computed)
}

#[test]
fn full_walk_through_a_decision() {
    init_tracing();
    let mut session = checkout();
    assert_eq!(session.meta().step_ids.len(), 5);

    assert!(session.send(Event::start()));
    assert_eq!(session.phase(), Phase::BranchDecision);
    assert_eq!(session.state().active_step(), Some("step-01"));
    assert_eq!(
        session.options(),
        vec![BranchRef::new("pay", "card"), BranchRef::new("pay", "invoice")]
    );

    assert!(session.send(Event::select("pay", "invoice")));
    assert_eq!(session.state().active_step(), Some("step-04"));
    assert_eq!(session.url_token(), "checkout:step-04:pay:invoice");

    assert!(session.send(Event::complete("step-04")));
    assert!(session
        .state()
        .is_path_complete(&BranchRef::new("pay", "invoice")));

    assert!(session.send(Event::Next));
    assert_eq!(session.state().active_step(), Some("step-05"));
    assert_eq!(session.state().active_branch(), None);

    assert_eq!(
        &session.log().replay(session.meta()),
        session.snapshot()
    );
}

#[test]
fn next_without_choice_takes_first_path() {
    init_tracing();
    let mut session = checkout();
    session.send(Event::start());
    assert!(session.send(Event::Next));
    assert_eq!(session.state().active_step(), Some("step-02"));
    assert_eq!(
        session.state().active_branch(),
        Some(&BranchRef::new("pay", "card"))
    );
}

#[test]
fn navigation_stops_at_both_ends() {
    init_tracing();
    let mut session = checkout();
    session.send(Event::start_at("step-05"));
    assert!(!session.send(Event::Next));
    assert_eq!(session.state().active_step(), Some("step-05"));

    session.send(Event::Stop);
    session.send(Event::start_at("step-02"));
    assert!(session.send(Event::Previous));
    assert_eq!(session.state().active_step(), Some("step-01"));
    assert_eq!(session.phase(), Phase::BranchDecision);
    assert!(!session.send(Event::Previous));
    assert_eq!(session.state().active_step(), Some("step-01"));
}

#[test]
fn url_token_resumes_a_session() {
    init_tracing();
    let mut first = checkout();
    first.send(Event::start());
    first.send(Event::select("pay", "card"));
    first.send(Event::Next);
    let token = first.url_token();
    assert_eq!(token, "checkout:step-03:pay:card");

    let mut resumed = checkout();
    assert!(resumed.send(Event::sync(token.as_str())));
    assert_eq!(resumed.state().active, first.state().active);
    assert_eq!(resumed.phase(), Phase::Navigating);

    assert!(!resumed.send(Event::sync("other-view:step-03")));
}

#[test]
fn url_round_trip() {
    let state = WalkthroughState {
        active: Some(ActiveStep::new("s2").with_branch(BranchRef::new("b1", "p2"))),
        ..WalkthroughState::default()
    };
    let token = encode(&ViewId::new("v"), &state);
    assert_eq!(token, "v:s2:b1:p2");
    let decoded = decode(&token).unwrap();
    assert_eq!(decoded.step_id, "s2");
    assert_eq!(decoded.branch, Some(BranchRef::new("b1", "p2")));
}

fn graph() -> ModelGraph {
    ModelGraph::builder()
        .element(Element::new(fqn("u"), "actor"))
        .element(Element::new(fqn("a"), "service"))
        .element(Element::new(fqn("b"), "service"))
        .element(Element::new(fqn("c"), "service"))
        .element(Element::new(fqn("d"), "service"))
        .build()
        .unwrap()
}

fn session(view: ParsedView) -> Walkthrough {
    let computed = compute_view(&view, &graph(), &ComputeConfig::default()).unwrap();
    Walkthrough::from_view(&computed)
}

fn inner(p1: RawStep, p2: RawStep) -> RawStep {
    RawBranch::new(
        BranchKind::Alternate,
        vec![
            RawPath::new(vec![p1]).with_id("p1"),
            RawPath::new(vec![p2]).with_id("p2"),
        ],
    )
    .with_id("inner")
    .into()
}

fn outer(ok: Vec<RawStep>) -> RawStep {
    RawBranch::new(
        BranchKind::Alternate,
        vec![
            RawPath::new(ok).with_id("ok"),
            RawPath::new(vec![step("a", "u")]).with_id("fail"),
        ],
    )
    .with_id("outer")
    .into()
}

/// step-01 u -> a, then outer/ok:
///   step-02 a -> b, inner/p1: step-03 b -> c, inner/p2: step-04 b -> d,
///   step-05 b -> a
/// or outer/fail: step-06 a -> u.
fn nested_midway() -> Walkthrough {
    session(
        ParsedView::dynamic("nested").step(step("u", "a")).step(outer(vec![
            step("a", "b"),
            inner(step("b", "c"), step("b", "d")),
            step("b", "a"),
        ])),
    )
}

/// step-01 u -> a, then outer/ok opens with inner/p1: step-02 a -> b,
/// inner/p2: step-03 a -> c, followed by `tail`.
fn nested_opening(tail: Option<RawStep>) -> Walkthrough {
    let mut ok = vec![inner(step("a", "b"), step("a", "c"))];
    ok.extend(tail);
    session(ParsedView::dynamic("opening").step(step("u", "a")).step(outer(ok)))
}

#[test]
fn nested_decision_is_offered_along_an_outer_path() {
    init_tracing();
    let mut session = nested_midway();
    session.send(Event::start());
    assert!(session.send(Event::select("outer", "ok")));
    assert_eq!(session.state().active_step(), Some("step-02"));
    assert_eq!(session.phase(), Phase::BranchDecision);
    assert_eq!(
        session.options(),
        vec![BranchRef::new("inner", "p1"), BranchRef::new("inner", "p2")]
    );
    assert_eq!(session.url_token(), "nested:step-02:outer:ok");
    assert!(!session.send(Event::select("outer", "fail")));

    assert!(session.send(Event::Next));
    assert_eq!(session.state().active_step(), Some("step-03"));
    assert_eq!(
        session.state().active_branch(),
        Some(&BranchRef::new("inner", "p1"))
    );
    assert_eq!(session.phase(), Phase::Navigating);

    // Back on the inner decision step with the inner choice still carried.
    assert!(session.send(Event::Previous));
    assert_eq!(session.state().active_step(), Some("step-02"));
    assert_eq!(session.phase(), Phase::Navigating);

    assert!(session.send(Event::select("inner", "p2")));
    assert_eq!(session.state().active_step(), Some("step-04"));
    assert!(session.send(Event::Next));
    assert_eq!(session.state().active_step(), Some("step-05"));
    assert_eq!(session.state().active_branch(), None);
    assert_eq!(session.phase(), Phase::Navigating);

    assert_eq!(&session.log().replay(session.meta()), session.snapshot());
}

#[test]
fn outer_path_completes_on_its_own_steps() {
    let mut session = nested_midway();
    session.send(Event::complete("step-02"));
    session.send(Event::complete("step-05"));
    let state = session.state();
    assert!(state.is_path_complete(&BranchRef::new("outer", "ok")));
    assert!(!state.is_path_complete(&BranchRef::new("inner", "p1")));
    assert!(!state.is_path_complete(&BranchRef::new("inner", "p2")));

    session.send(Event::complete("step-03"));
    assert!(session
        .state()
        .is_path_complete(&BranchRef::new("inner", "p1")));
}

#[test]
fn path_opening_with_a_branch_enters_the_nested_decision() {
    init_tracing();
    let mut session = nested_opening(Some(step("b", "d")));
    session.send(Event::start());
    assert!(session.send(Event::select("outer", "ok")));
    assert_eq!(session.state().active_step(), Some("step-02"));
    assert_eq!(session.phase(), Phase::BranchDecision);

    assert!(session.send(Event::select("inner", "p2")));
    assert_eq!(session.state().active_step(), Some("step-03"));
    assert!(session.send(Event::Next));
    assert_eq!(session.state().active_step(), Some("step-04"));
    assert_eq!(session.phase(), Phase::Navigating);
}

#[test]
fn default_paths_descend_through_nested_branches() {
    let mut session = nested_opening(Some(step("b", "d")));
    session.send(Event::start());
    assert!(session.send(Event::Next));
    assert_eq!(session.state().active_step(), Some("step-02"));
    assert_eq!(session.phase(), Phase::BranchDecision);

    assert!(session.send(Event::Next));
    assert_eq!(session.state().active_step(), Some("step-02"));
    assert_eq!(
        session.state().active_branch(),
        Some(&BranchRef::new("inner", "p1"))
    );
    assert_eq!(session.phase(), Phase::Navigating);
    assert!(session.send(Event::Next));
    assert_eq!(session.state().active_step(), Some("step-03"));
}

#[test]
fn path_holding_only_a_branch_leaves_the_decision_step() {
    let mut session = nested_opening(None);
    session.send(Event::start());
    assert!(session.send(Event::select("outer", "ok")));
    assert_eq!(session.state().active_step(), Some("step-02"));
    assert_eq!(session.phase(), Phase::BranchDecision);
}

fn shared_step_meta() -> WalkthroughMeta {
    let path = |id: &str, index: usize, steps: &[&str]| BranchPath {
        path_id: id.to_string(),
        path_index: index,
        title: None,
        is_default_path: false,
        step_ids: steps.iter().map(|s| s.to_string()).collect(),
        first_step_id: steps.first().map(|s| s.to_string()),
    };
    WalkthroughMeta::new(
        ViewId::new("v"),
        ["s1", "s2", "s3", "s4"].map(String::from).to_vec(),
        vec![BranchCollection {
            branch_id: "b1".into(),
            kind: BranchKind::Parallel,
            decision_step_id: "s1".into(),
            default_path_id: None,
            paths: vec![path("p1", 0, &["s2", "s3"]), path("p2", 1, &["s2", "s4"])],
        }],
    )
}

#[test]
fn path_completion_requires_every_own_step() {
    let meta = shared_step_meta();
    let complete = |steps: &[&str]| {
        steps.iter().fold(Snapshot::default(), |snapshot, s| {
            transition(&meta, &snapshot, &Event::complete(*s))
        })
    };

    let all = complete(&["s2", "s3", "s4"]);
    assert!(all.state.completed_paths.contains("b1:p1"));
    assert!(all.state.completed_paths.contains("b1:p2"));

    let partial = complete(&["s2", "s3"]);
    assert!(partial.state.completed_paths.contains("b1:p1"));
    assert!(!partial.state.completed_paths.contains("b1:p2"));
}

fn event() -> impl Strategy<Value = Event> {
    let step = prop::sample::select(vec!["s1", "s2", "s3", "s4", "s9"]);
    prop_oneof![
        proptest::option::of(step.clone()).prop_map(|s| Event::Start {
            step_id: s.map(String::from)
        }),
        Just(Event::Next),
        Just(Event::Previous),
        prop::sample::select(vec!["p1", "p2", "p3"]).prop_map(|p| Event::select("b1", p)),
        Just(Event::Stop),
        step.prop_map(|s| Event::complete(s)),
        Just(Event::ResetCompletion),
        prop::sample::select(vec!["v:s2:b1:p1", "v:s4", "v:s3:b1:p2", "x:s1", "v"])
            .prop_map(|t| Event::sync(t)),
    ]
}

proptest! {
    #[test]
    fn replay_reconstructs_every_session(events in prop::collection::vec(event(), 0..40)) {
        let mut session = Walkthrough::new(shared_step_meta());
        for event in events {
            session.send(event);
        }
        prop_assert_eq!(&session.log().replay(session.meta()), session.snapshot());

        // The phase always agrees with the cursor.
        let snapshot = session.snapshot();
        match snapshot.state.active_step() {
            None => prop_assert_eq!(snapshot.phase, Phase::Idle),
            Some(step) => {
                let carried = snapshot.state.active_branch();
                let deciding = session.meta().decisions_at(step).any(|b| {
                    !b.paths.is_empty() && carried.map_or(true, |r| r.branch_id != b.branch_id)
                });
                prop_assert_eq!(snapshot.phase == Phase::BranchDecision, deciding);
            }
        }
    }

    #[test]
    fn nested_sessions_replay(events in prop::collection::vec(nested_event(), 0..40)) {
        let mut session = nested_midway();
        for event in events {
            session.send(event);
        }
        prop_assert_eq!(&session.log().replay(session.meta()), session.snapshot());
        if let Some(step) = session.state().active_step() {
            prop_assert!(session.meta().contains(step));
        }
    }
}

fn nested_event() -> impl Strategy<Value = Event> {
    let step = prop::sample::select(vec!["step-01", "step-02", "step-04", "step-06"]);
    prop_oneof![
        Just(Event::start()),
        Just(Event::Next),
        Just(Event::Previous),
        prop::sample::select(vec![("outer", "ok"), ("outer", "fail"), ("inner", "p1"), ("inner", "p2")])
            .prop_map(|(b, p)| Event::select(b, p)),
        Just(Event::Stop),
        step.prop_map(|s| Event::complete(s)),
        prop::sample::select(vec!["nested:step-03:inner:p1", "nested:step-02:outer:ok", "nested:step-05:inner:p2"])
            .prop_map(|t| Event::sync(t)),
    ]
}
