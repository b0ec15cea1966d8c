use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quizgen_engine::prelude::*;
use quizgen_engine::{FailureKind, GenerateRequest, ProviderFailure};

const VALID_PAYLOAD: &str = "\
Q1: What is the chemical symbol for gold?
A) Ag
B) Au
C) Gd
Answer: B
Explanation: From the Latin aurum.

Q2: Which planets are gas giants?
A) Jupiter
B) Mars
C) Saturn
D) Venus
Answers: A, C
Source: Chapter 4
";

enum Step {
    Reply(Result<String, ProviderFailure>),
    Hang,
}

struct ScriptedTransport {
    steps: Mutex<VecDeque<Step>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    fn new(steps: Vec<Step>) -> Arc<Self> {
        Arc::new(Self {
            steps: Mutex::new(steps.into()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelTransport for ScriptedTransport {
    async fn generate(&self, request: GenerateRequest<'_>) -> Result<String, ProviderFailure> {
        self.calls.lock().unwrap().push(request.model.to_string());
        let step = self.steps.lock().unwrap().pop_front();
        match step {
            Some(Step::Reply(result)) => result,
            Some(Step::Hang) => std::future::pending().await,
            None => panic!("transport called more times than scripted"),
        }
    }
}

fn overloaded() -> Step {
    Step::Reply(Err(ProviderFailure::status_with_code(
        503,
        "UNAVAILABLE",
        "The model is overloaded. Please try again later.",
    )))
}

fn bad_gateway() -> Step {
    Step::Reply(Err(ProviderFailure::status(502, "Bad Gateway")))
}

fn ok(payload: &str) -> Step {
    Step::Reply(Ok(payload.to_string()))
}

type Recorded = Arc<Mutex<Vec<ProgressEvent>>>;

fn options(models: &[&str], max_attempts: usize) -> (ExtractionOptions, Recorded) {
    let events: Recorded = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let options = ExtractionOptions::default()
        .with_roster(ModelRoster::new(models.iter().copied()).unwrap())
        .with_max_attempts_per_model(max_attempts)
        .with_reporter(move |event: &ProgressEvent| sink.lock().unwrap().push(event.clone()));
    (options, events)
}

fn positions(events: &Recorded) -> Vec<(usize, usize, bool)> {
    events
        .lock()
        .unwrap()
        .iter()
        .map(|e| (e.model_index, e.attempt_number, e.is_retrying))
        .collect()
}

async fn run(
    transport: &Arc<ScriptedTransport>,
    options: &ExtractionOptions,
) -> Result<ExtractionResult, ExtractionError> {
    ExtractionPipeline::new(transport.clone())
        .extract_questions("Some study notes.", "test-key", options)
        .await
}

#[tokio::test(start_paused = true)]
async fn test_all_transient_exhausts_every_model() {
    let transport = ScriptedTransport::new((0..6).map(|_| overloaded()).collect());
    let (options, events) = options(&["a", "b", "c"], 2);

    let err = run(&transport, &options).await.unwrap_err();

    match &err {
        ExtractionError::AllModelsExhausted {
            models_tried,
            attempts_per_model,
            total_attempts,
            history,
            ..
        } => {
            assert_eq!(*models_tried, 3);
            assert_eq!(*attempts_per_model, 2);
            assert_eq!(*total_attempts, 6);
            assert_eq!(history.len(), 6);
            assert!(history.iter().all(|e| e.kind == FailureKind::Transient));
        }
        other => panic!("expected AllModelsExhausted, got {other:?}"),
    }
    assert!(err.to_string().contains("tried 3 models, 2 attempts each"));
    assert_eq!(transport.calls(), ["a", "a", "b", "b", "c", "c"]);
    assert_eq!(events.lock().unwrap().len(), 6);
}

#[tokio::test(start_paused = true)]
async fn test_first_fatal_stops_immediately() {
    let transport = ScriptedTransport::new(vec![Step::Reply(Err(ProviderFailure::status_with_code(
        400,
        "INVALID_ARGUMENT",
        "API key not valid.",
    )))]);
    let (options, events) = options(&["a", "b"], 3);

    let err = run(&transport, &options).await.unwrap_err();

    match &err {
        ExtractionError::FatalProvider { model_id, error } => {
            assert_eq!(model_id, "a");
            assert_eq!(error.kind, FailureKind::Fatal);
            assert_eq!(error.attempt_number, 1);
        }
        other => panic!("expected FatalProvider, got {other:?}"),
    }
    assert_eq!(err.history().len(), 1);
    assert_eq!(transport.calls(), ["a"]);
    assert_eq!(positions(&events), [(0, 1, false)]);
}

#[tokio::test(start_paused = true)]
async fn test_fatal_after_transient_does_not_fall_back() {
    let transport = ScriptedTransport::new(vec![
        overloaded(),
        Step::Reply(Err(ProviderFailure::Network("connection reset".into()))),
    ]);
    let (options, _) = options(&["a", "b"], 3);

    let err = run(&transport, &options).await.unwrap_err();

    assert!(matches!(err, ExtractionError::FatalProvider { .. }));
    assert_eq!(transport.calls(), ["a", "a"]);
}

#[tokio::test(start_paused = true)]
async fn test_success_on_attempt_k_of_model_m() {
    // m = 1, k = 2, max = 3 -> 1 * 3 + 2 = 5 attempts.
    let transport = ScriptedTransport::new(vec![
        overloaded(),
        bad_gateway(),
        overloaded(),
        overloaded(),
        ok(VALID_PAYLOAD),
    ]);
    let (options, events) = options(&["a", "b", "c"], 3);

    let result = run(&transport, &options).await.unwrap();

    assert_eq!(result.model_id, "b");
    assert_eq!(result.metrics.total_attempts, 5);
    assert_eq!(result.metrics.models_tried, 2);
    assert_eq!(transport.calls().len(), 5);

    let seen = positions(&events);
    assert_eq!(seen.len(), 5);
    assert!(seen
        .windows(2)
        .all(|w| (w[0].0, w[0].1) < (w[1].0, w[1].1)));
}

#[tokio::test(start_paused = true)]
async fn test_two_model_fallback_event_sequence() {
    let transport = ScriptedTransport::new(vec![overloaded(), overloaded(), ok(VALID_PAYLOAD)]);
    let (options, events) = options(&["A", "B"], 2);

    let result = run(&transport, &options).await.unwrap();

    assert_eq!(result.model_id, "B");
    assert_eq!(transport.calls(), ["A", "A", "B"]);
    assert_eq!(
        positions(&events),
        [(0, 1, false), (0, 2, true), (1, 1, false)]
    );
    let recorded = events.lock().unwrap();
    assert!(recorded[2].is_model_switch());
    assert_eq!(recorded[2].model_id, "B");
}

#[tokio::test(start_paused = true)]
async fn test_single_model_exhaustion_has_no_switch_event() {
    let transport = ScriptedTransport::new(vec![overloaded(), overloaded(), overloaded()]);
    let (options, events) = options(&["A"], 3);

    let err = run(&transport, &options).await.unwrap_err();

    assert_eq!(err.history().len(), 3);
    assert_eq!(
        positions(&events),
        [(0, 1, false), (0, 2, true), (0, 3, true)]
    );
    assert!(events.lock().unwrap().iter().all(|e| !e.is_model_switch()));
}

#[tokio::test(start_paused = true)]
async fn test_malformed_payload_is_not_retried() {
    let transport = ScriptedTransport::new(vec![ok("Sorry, I cannot help with that.")]);
    let (options, _) = options(&["a", "b"], 3);

    let err = run(&transport, &options).await.unwrap_err();

    match err {
        ExtractionError::MalformedResponse {
            model_id, raw_text, ..
        } => {
            assert_eq!(model_id, "a");
            assert_eq!(raw_text, "Sorry, I cannot help with that.");
        }
        other => panic!("expected MalformedResponse, got {other:?}"),
    }
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_blank_payload_is_malformed_not_fatal() {
    let transport = ScriptedTransport::new(vec![ok("   \n")]);
    let (options, _) = options(&["a", "b"], 3);

    let err = run(&transport, &options).await.unwrap_err();

    assert!(matches!(
        err,
        ExtractionError::MalformedResponse { ref model_id, .. } if model_id == "a"
    ));
    assert_eq!(transport.calls(), ["a"]);
}

#[tokio::test(start_paused = true)]
async fn test_textless_response_is_malformed_not_fatal() {
    let transport = ScriptedTransport::new(vec![Step::Reply(Err(
        ProviderFailure::InvalidResponse("prompt blocked: SAFETY".to_string()),
    ))]);
    let (options, _) = options(&["a", "b"], 3);

    let err = run(&transport, &options).await.unwrap_err();

    assert!(matches!(err, ExtractionError::MalformedResponse { .. }));
    assert!(err.to_string().contains("prompt blocked: SAFETY"));
    assert_eq!(transport.calls(), ["a"]);
}

#[tokio::test(start_paused = true)]
async fn test_well_formed_payload_round_trip() {
    let transport = ScriptedTransport::new(vec![ok(VALID_PAYLOAD)]);
    let (options, _) = options(&["a"], 1);

    let result = run(&transport, &options).await.unwrap();

    assert_eq!(result.len(), 2);
    let texts: Vec<_> = result.questions[1].options.iter().map(|o| o.text.as_str()).collect();
    assert_eq!(texts, ["Jupiter", "Mars", "Saturn", "Venus"]);
    let correct: Vec<_> = result
        .iter()
        .map(|q| q.correct_options().map(|o| o.label).collect::<String>())
        .collect();
    assert_eq!(correct, ["B", "AC"]);
    assert_eq!(result.questions[1].source.as_deref(), Some("Chapter 4"));
}

#[tokio::test(start_paused = true)]
async fn test_backoff_schedule_is_awaited() {
    let transport = ScriptedTransport::new(vec![overloaded(), overloaded(), ok(VALID_PAYLOAD)]);
    let (options, _) = options(&["a"], 3);

    let result = run(&transport, &options).await.unwrap();

    // 4s after attempt 1, 8s after attempt 2.
    assert!(result.metrics.wall_time >= Duration::from_secs(12));
    assert!(result.metrics.wall_time < Duration::from_secs(13));
}

#[tokio::test(start_paused = true)]
async fn test_model_switch_owes_no_backoff() {
    let transport = ScriptedTransport::new(vec![overloaded(), ok(VALID_PAYLOAD)]);
    let (options, _) = options(&["a", "b"], 1);

    let result = run(&transport, &options).await.unwrap();

    assert_eq!(result.model_id, "b");
    assert!(result.metrics.wall_time < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_hung_attempt_times_out_and_falls_back() {
    let transport = ScriptedTransport::new(vec![Step::Hang, ok(VALID_PAYLOAD)]);
    let (options, _) = options(&["slow", "fast"], 1);
    let options = options.with_config(
        ExtractionConfig::default()
            .with_max_attempts_per_model(1)
            .with_attempt_timeout(Duration::from_secs(30)),
    );

    let result = run(&transport, &options).await.unwrap();

    assert_eq!(result.model_id, "fast");
    assert_eq!(transport.calls(), ["slow", "fast"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_before_first_attempt() {
    let transport = ScriptedTransport::new(vec![]);
    let cancel = CancellationToken::new();
    cancel.cancel();
    let (options, events) = options(&["a"], 3);
    let options = options.with_cancellation(cancel);

    let err = run(&transport, &options).await.unwrap_err();

    assert!(matches!(err, ExtractionError::Cancelled { attempts_made: 0 }));
    assert!(transport.calls().is_empty());
    assert!(events.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_backoff_is_not_exhaustion() {
    let transport = ScriptedTransport::new(vec![overloaded()]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let options = ExtractionOptions::default()
        .with_roster(ModelRoster::new(["a"]).unwrap())
        .with_max_attempts_per_model(3)
        .with_cancellation(cancel)
        .with_reporter(move |event: &ProgressEvent| {
            if event.is_retrying {
                trigger.cancel();
            }
        });

    let err = run(&transport, &options).await.unwrap_err();

    assert!(matches!(err, ExtractionError::Cancelled { attempts_made: 1 }));
    assert_eq!(transport.calls(), ["a"]);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_during_inflight_call() {
    let transport = ScriptedTransport::new(vec![Step::Hang]);
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let (options, events) = options(&["a", "b"], 3);
    let options = options.with_cancellation(cancel);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let started = tokio::time::Instant::now();
    let err = run(&transport, &options).await.unwrap_err();

    assert!(matches!(err, ExtractionError::Cancelled { attempts_made: 1 }));
    assert!(started.elapsed() < Duration::from_secs(120));
    assert_eq!(transport.calls(), ["a"]);
    assert_eq!(positions(&events), [(0, 1, false)]);
}

#[tokio::test(start_paused = true)]
async fn test_rejects_blank_inputs_without_calling() {
    let transport = ScriptedTransport::new(vec![]);
    let pipeline = ExtractionPipeline::new(transport.clone());
    let options = ExtractionOptions::default();

    let blank_text = pipeline.extract_questions("  ", "key", &options).await;
    let blank_key = pipeline.extract_questions("notes", "", &options).await;
    let zero_budget = pipeline
        .extract_questions("notes", "key", &options.clone().with_max_attempts_per_model(0))
        .await;

    assert!(matches!(blank_text, Err(ExtractionError::InvalidInput(_))));
    assert!(matches!(blank_key, Err(ExtractionError::InvalidInput(_))));
    assert!(matches!(zero_budget, Err(ExtractionError::InvalidInput(_))));
    assert!(transport.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_extractions_are_independent() {
    let first = ScriptedTransport::new(vec![overloaded(), ok(VALID_PAYLOAD)]);
    let second = ScriptedTransport::new(vec![ok(VALID_PAYLOAD)]);
    let (options_a, events_a) = options(&["a", "b"], 1);
    let (options_b, events_b) = options(&["a", "b"], 1);

    let (a, b) = tokio::join!(run(&first, &options_a), run(&second, &options_b));

    assert_eq!(a.unwrap().model_id, "b");
    assert_eq!(b.unwrap().model_id, "a");
    assert_eq!(positions(&events_a), [(0, 1, false), (1, 1, false)]);
    assert_eq!(positions(&events_b), [(0, 1, false)]);
}
