//! 流水线集成测试
//!
//! 使用脚本化的假后端：按阶段排队返回内容，可以把某个阶段的调用"卡住"，
//! 用来验证单飞、互斥、取消和版本号。

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::{Notify, Semaphore};
use tokio_test::{assert_err, assert_ok};

use exam_pipeline::error::{AppError, CollaboratorError, InputError, PipelineError};
use exam_pipeline::infrastructure::{LlmBackend, LlmRequest};
use exam_pipeline::models::{GeneratorParams, QuestionType, RttiCounts, RttiWeights, Stage};
use exam_pipeline::services::ExamCollaborator;
use exam_pipeline::workflow::{ExamPipeline, LifecycleState};

// ========== 假后端 ==========

enum Reply {
    Text(String),
    Down,
}

#[derive(Default)]
struct FakeBackend {
    scripts: Mutex<HashMap<Stage, VecDeque<Reply>>>,
    gates: Mutex<HashMap<Stage, Arc<Semaphore>>>,
    entered: Notify,
    requests: Mutex<Vec<LlmRequest>>,
}

impl FakeBackend {
    fn reply(&self, stage: Stage, body: impl Into<String>) {
        self.scripts
            .lock()
            .unwrap()
            .entry(stage)
            .or_default()
            .push_back(Reply::Text(body.into()));
    }

    fn reply_json(&self, stage: Stage, body: &Value) {
        self.reply(stage, body.to_string());
    }

    fn go_down(&self, stage: Stage) {
        self.scripts
            .lock()
            .unwrap()
            .entry(stage)
            .or_default()
            .push_back(Reply::Down);
    }

    /// 该阶段的调用会停在后端，直到 `release`
    fn hold(&self, stage: Stage) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates.lock().unwrap().insert(stage, gate.clone());
        gate
    }

    async fn wait_entered(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.entered.notified())
            .await
            .expect("调用没有到达后端");
    }

    fn calls(&self, stage: Stage) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.stage == stage)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl LlmBackend for FakeBackend {
    async fn complete(&self, request: LlmRequest) -> Result<String, CollaboratorError> {
        let stage = request.stage;
        let model = request.model.clone();
        self.requests.lock().unwrap().push(request);

        let gate = self.gates.lock().unwrap().get(&stage).cloned();
        if let Some(gate) = gate {
            self.entered.notify_one();
            gate.acquire().await.expect("gate closed").forget();
        }

        let reply = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&stage)
            .and_then(|queue| queue.pop_front());
        match reply {
            Some(Reply::Text(body)) => Ok(body),
            Some(Reply::Down) | None => Err(CollaboratorError::Unavailable {
                stage,
                model,
                message: "offline".to_string(),
            }),
        }
    }
}

// ========== 测试数据 ==========

fn params(count: u32) -> GeneratorParams {
    GeneratorParams {
        question_count: count,
        question_types: vec![QuestionType::Open],
        sources: "BRON A: Kaart van Nederland".to_string(),
        ..Default::default()
    }
}

fn setup(params: GeneratorParams) -> (Arc<FakeBackend>, Arc<ExamPipeline>) {
    let backend = Arc::new(FakeBackend::default());
    let collaborator = Arc::new(ExamCollaborator::with_models(
        backend.clone(),
        "snel",
        "sterk",
        4096,
    ));
    let pipeline = ExamPipeline::new(collaborator, params)
        .unwrap()
        .with_name("test");
    (backend, Arc::new(pipeline))
}

/// 结构正确的试卷；题目文本带连字符，元数据里的目标故意写错
fn artifact_json(labels: &[&str]) -> Value {
    let student: Vec<Value> = labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            json!({
                "id": idx + 1,
                "punten": 2,
                "rtti": label,
                "bron_id": ["A"],
                "dimensie": "fysisch geografisch",
                "kernconcept": "samenhang",
                "vraag_tekst": format!("Beschrijf de ligging van Noord-Holland (vraag {})", idx + 1),
                "type": "open",
                "bronrechtvaardiging": "Bron A toont de kaart."
            })
        })
        .collect();
    let teacher: Vec<Value> = labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            json!({
                "vraag_id": idx + 1,
                "rtti": label,
                "motivatie": "Aflezen van de kaart.",
                "punten": 2,
                "antwoord_model": "Ten noorden van Amsterdam.",
                "beoordelingsregels": ["1 punt voor de ligging"],
                "vereiste_vaktaal": ["ligging"],
                "veelgemaakte_fouten": [],
                "syllabus_domein": "Nederland",
                "tijdsindicatie": "2 minuten",
                "geografische_schaal": "nationaal"
            })
        })
        .collect();
    json!({
        "meta": {
            "titel": "Toets Nederland",
            "niveau": "3 havo",
            "niveauProfiel": "H_3",
            "enabledQuestionTypes": ["open"],
            "onderwerp": "Nederland",
            "tijd": 50,
            "questionCount": labels.len(),
            "totalPoints": labels.len() * 2,
            "rttiCountsTarget": {"r": 9, "t1": 0, "t2": 0, "i": 0}
        },
        "sources": [{"id": "A", "title": "Kaart", "content": "Kaart van Nederland", "type": "kaart"}],
        "student_view": student,
        "teacher_view": teacher,
        "quality_report": {
            "rtti_dekking": "volledig",
            "bron_gebruik": "bron A",
            "taal_check": "ok",
            "google_proof_check": "ok"
        }
    })
}

fn revision_json(labels: &[&str], claims_rtti_ok: bool) -> Value {
    json!({
        "changes": [{"target": "vraag", "id": "2", "change_type": "edit", "before": "oud", "after": "nieuw"}],
        "updated_test": artifact_json(labels),
        "quality_delta": {"rtti_ok": claims_rtti_ok, "types_ok": true, "clustering_ok": true, "notes": []}
    })
}

fn audit_json(pass: bool) -> Value {
    json!({
        "pass": pass,
        "issues": [{"severity": "medium", "location": "vraag 1", "problem": "te makkelijk", "suggested_fix": "verzwaar"}],
        "suggested_fixes": []
    })
}

const EVEN_FOUR: [&str; 4] = ["R", "T1", "T2", "I"];

// ========== 生成 ==========

#[tokio::test]
async fn test_generate_stamps_target_and_scrubs_hyphens() {
    let (backend, pipeline) = setup(params(4));
    backend.reply(
        Stage::Generate,
        format!("```json\n{}\n```", artifact_json(&EVEN_FOUR)),
    );

    let artifact = assert_ok!(pipeline.generate().await);

    assert_eq!(artifact.meta.rtti_counts_target, RttiCounts::new(1, 1, 1, 1));
    assert!(artifact.student_items[0].text.contains("Noord Holland"));
    assert!(!artifact.student_items[0].text.contains('-'));
    assert_eq!(pipeline.state(), LifecycleState::Generated);
    assert_eq!(pipeline.version(), 1);
    assert!(pipeline.consistency().unwrap().is_consistent());

    let calls = backend.calls(Stage::Generate);
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].model, "sterk");
    assert!(calls[0].user_message.contains("R=1, T1=1, T2=1, I=1"));
}

#[tokio::test]
async fn test_generate_without_sources_is_rejected_before_call() {
    let (backend, pipeline) = setup(GeneratorParams {
        sources: "   ".to_string(),
        ..params(4)
    });
    assert_eq!(pipeline.state(), LifecycleState::Unconfigured);

    let err = assert_err!(pipeline.generate().await);
    assert!(err.is_precondition());
    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::EmptyInput {
            stage: Stage::Generate,
            ..
        })
    ));
    assert!(backend.calls(Stage::Generate).is_empty());
    assert!(pipeline.stage_error(Stage::Generate).is_some());

    let err = assert_err!(pipeline.validate().await);
    assert!(err.is_precondition());
    assert!(backend.calls(Stage::Validate).is_empty());
}

#[tokio::test]
async fn test_generate_rejects_unpaired_teacher_items() {
    let (backend, pipeline) = setup(params(4));
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));
    assert_ok!(pipeline.generate().await);
    let before = pipeline.artifact().unwrap();

    let mut broken = artifact_json(&EVEN_FOUR);
    broken["teacher_view"].as_array_mut().unwrap().pop();
    backend.reply_json(Stage::Generate, &broken);

    let err = assert_err!(pipeline.generate().await);
    assert!(matches!(
        err,
        AppError::Collaborator(CollaboratorError::InvariantViolation { .. })
    ));
    assert_eq!(pipeline.artifact().unwrap(), before);
    assert_eq!(pipeline.version(), 1);
}

#[tokio::test]
async fn test_generate_clears_validation_and_audit() {
    let (backend, pipeline) = setup(params(4));
    backend.reply_json(
        Stage::Validate,
        &json!({"warnings": [], "quick_fixes": [], "missing_information": [], "feasibility": "ok"}),
    );
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));
    backend.reply_json(Stage::Audit, &audit_json(true));
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));

    assert_ok!(pipeline.validate().await);
    assert!(pipeline.validation_report().is_some());
    assert!(pipeline.artifact().is_none());

    assert_ok!(pipeline.generate().await);
    assert!(pipeline.validation_report().is_none());

    assert_ok!(pipeline.audit().await);
    assert!(pipeline.audit_report().is_some());

    assert_ok!(pipeline.generate().await);
    assert!(pipeline.audit_report().is_none());
    assert_eq!(pipeline.version(), 2);
}

// ========== 协同修订 ==========

#[tokio::test]
async fn test_co_construct_failure_leaves_artifact_identical() {
    let (backend, pipeline) = setup(params(4));
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));
    assert_ok!(pipeline.generate().await);
    let before = pipeline.artifact().unwrap();

    backend.go_down(Stage::CoConstruct);
    let err = assert_err!(pipeline.co_construct("Maak vraag 2 moeilijker", None).await);
    assert!(matches!(
        err,
        AppError::Collaborator(CollaboratorError::Unavailable { .. })
    ));

    backend.reply(Stage::CoConstruct, "dit is geen json");
    assert_err!(pipeline.co_construct("Maak vraag 2 moeilijker", None).await);

    assert_eq!(pipeline.artifact().unwrap(), before);
    assert_eq!(pipeline.version(), 1);
    assert_eq!(pipeline.state(), LifecycleState::Generated);
    assert!(pipeline.stage_error(Stage::CoConstruct).is_some());
    assert!(pipeline.stage_error(Stage::Generate).is_none());
}

#[tokio::test]
async fn test_co_construct_preconditions() {
    let (backend, pipeline) = setup(params(4));

    let err = assert_err!(pipeline.co_construct("iets", None).await);
    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::NoArtifact {
            stage: Stage::CoConstruct
        })
    ));

    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));
    assert_ok!(pipeline.generate().await);

    let err = assert_err!(pipeline.co_construct("  ", Some("context")).await);
    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::EmptyInput {
            stage: Stage::CoConstruct,
            ..
        })
    ));
    assert!(backend.calls(Stage::CoConstruct).is_empty());
}

#[tokio::test]
async fn test_audit_report_goes_stale_after_co_construct() {
    let (backend, pipeline) = setup(params(4));
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));
    backend.reply_json(Stage::Audit, &audit_json(false));
    backend.reply_json(Stage::CoConstruct, &revision_json(&EVEN_FOUR, true));

    assert_ok!(pipeline.generate().await);
    let report = assert_ok!(pipeline.audit().await);
    assert!(!report.pass);
    assert_eq!(pipeline.audit_report(), Some(report));

    let review = assert_ok!(
        pipeline
            .co_construct("Verzwaar vraag 1", Some("Gebruik bron A"))
            .await
    );
    assert_eq!(review.changes.len(), 1);
    assert!(review.disagreements().is_empty());

    assert!(pipeline.audit_report().is_none());
    assert!(pipeline.snapshot().audit.is_none());
    assert_eq!(pipeline.state(), LifecycleState::Revised);
    assert_eq!(pipeline.version(), 2);

    let calls = backend.calls(Stage::CoConstruct);
    assert!(calls[0].user_message.contains("Verzwaar vraag 1"));
    assert!(calls[0].user_message.contains("Gebruik bron A"));
}

#[tokio::test]
async fn test_co_construct_claim_is_checked_locally() {
    let (backend, pipeline) = setup(params(4));
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));
    // 声称 RTTI 没变，实际变成了 R, R, T2, I
    backend.reply_json(Stage::CoConstruct, &revision_json(&["R", "R", "T2", "I"], true));

    assert_ok!(pipeline.generate().await);
    let review = assert_ok!(pipeline.co_construct("Vervang vraag 2", None).await);

    assert!(!review.verified.rtti_ok);
    assert_eq!(review.disagreements(), vec!["rtti_ok"]);
    // 软约束：接受，但标记为不一致
    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.revisions, 1);
    assert!(!snapshot.consistency.unwrap().is_consistent());
    assert_eq!(snapshot.last_revision.unwrap(), review);
}

// ========== 并发 ==========

#[tokio::test]
async fn test_second_generate_while_in_flight_is_busy() {
    let (backend, pipeline) = setup(params(4));
    let gate = backend.hold(Stage::Generate);
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));

    let running = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.generate().await })
    };
    backend.wait_entered().await;
    assert!(pipeline.is_in_flight(Stage::Generate));

    let err = assert_err!(pipeline.generate().await);
    assert!(err.is_busy());
    let err = assert_err!(pipeline.co_construct("iets", None).await);
    assert!(err.is_busy());
    let err = assert_err!(pipeline.audit().await);
    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::StageBusy {
            stage: Stage::Audit,
            blocking: Stage::Generate
        })
    ));
    // 被拒绝不写入错误通道
    assert!(pipeline.stage_error(Stage::Audit).is_none());

    // 预检报告属于生成前的版本，同样被拒绝
    let err = assert_err!(pipeline.validate().await);
    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::StageBusy {
            stage: Stage::Validate,
            blocking: Stage::Generate
        })
    ));
    assert!(backend.calls(Stage::Validate).is_empty());

    gate.add_permits(1);
    assert_ok!(running.await.unwrap());
    assert!(!pipeline.is_in_flight(Stage::Generate));
    assert_eq!(backend.calls(Stage::Generate).len(), 1);
    assert_eq!(pipeline.version(), 1);
}

#[tokio::test]
async fn test_generate_rejected_while_audit_in_flight() {
    let (backend, pipeline) = setup(params(4));
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));
    assert_ok!(pipeline.generate().await);

    let gate = backend.hold(Stage::Audit);
    backend.reply_json(Stage::Audit, &audit_json(true));
    let running = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.audit().await })
    };
    backend.wait_entered().await;

    let err = assert_err!(pipeline.generate().await);
    assert!(err.is_busy());
    let err = assert_err!(pipeline.co_construct("iets", None).await);
    assert!(err.is_busy());

    gate.add_permits(1);
    let report = assert_ok!(running.await.unwrap());
    assert!(report.pass);
    assert_eq!(pipeline.audit_report(), Some(report));
}

#[tokio::test]
async fn test_generate_rejected_while_validate_in_flight() {
    let (backend, pipeline) = setup(params(4));
    let gate = backend.hold(Stage::Validate);
    backend.reply_json(
        Stage::Validate,
        &json!({"warnings": [], "quick_fixes": [], "missing_information": [], "feasibility": "ok"}),
    );
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));
    backend.reply_json(Stage::Audit, &audit_json(true));

    let running = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.validate().await })
    };
    backend.wait_entered().await;

    let err = assert_err!(pipeline.generate().await);
    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::StageBusy {
            stage: Stage::Generate,
            blocking: Stage::Validate
        })
    ));
    assert!(backend.calls(Stage::Generate).is_empty());
    assert!(pipeline.artifact().is_none());

    gate.add_permits(1);
    assert_ok!(running.await.unwrap());
    assert!(pipeline.validation_report().is_some());

    // 预检结束后生成丢弃旧报告，新试卷旁边不会出现生成前的预检结果
    assert_ok!(pipeline.generate().await);
    assert!(pipeline.validation_report().is_none());
    assert!(pipeline.snapshot().validation.is_none());

    // 预检与审计都是只读阶段，可以同时进行
    let audit_gate = backend.hold(Stage::Audit);
    let auditing = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.audit().await })
    };
    backend.wait_entered().await;
    backend.reply_json(
        Stage::Validate,
        &json!({"warnings": [], "quick_fixes": [], "missing_information": [], "feasibility": "ok"}),
    );
    gate.add_permits(1);
    assert_ok!(pipeline.validate().await);
    audit_gate.add_permits(1);
    assert_ok!(auditing.await.unwrap());
}

#[tokio::test]
async fn test_reset_during_validate_discards_report() {
    let (backend, pipeline) = setup(params(4));
    let gate = backend.hold(Stage::Validate);
    backend.reply_json(
        Stage::Validate,
        &json!({"warnings": [], "quick_fixes": [], "missing_information": [], "feasibility": "ok"}),
    );

    let running = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.validate().await })
    };
    backend.wait_entered().await;
    pipeline.reset();

    gate.add_permits(1);
    let err = assert_err!(running.await.unwrap());
    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::StaleResult {
            stage: Stage::Validate,
            ..
        })
    ));
    assert!(pipeline.validation_report().is_none());
}

#[tokio::test]
async fn test_dropped_call_releases_stage() {
    let (backend, pipeline) = setup(params(4));
    let gate = backend.hold(Stage::Generate);
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));

    let timed_out = tokio::time::timeout(Duration::from_millis(50), pipeline.generate()).await;
    assert!(timed_out.is_err());
    assert!(!pipeline.is_in_flight(Stage::Generate));
    assert!(pipeline.artifact().is_none());

    gate.add_permits(1);
    assert_ok!(pipeline.generate().await);
    assert_eq!(pipeline.version(), 1);
}

#[tokio::test]
async fn test_reset_during_generate_discards_result() {
    let (backend, pipeline) = setup(params(4));
    let gate = backend.hold(Stage::Generate);
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));

    let running = {
        let pipeline = pipeline.clone();
        tokio::spawn(async move { pipeline.generate().await })
    };
    backend.wait_entered().await;
    pipeline.reset();

    gate.add_permits(1);
    let err = assert_err!(running.await.unwrap());
    assert!(matches!(
        err,
        AppError::Pipeline(PipelineError::StaleResult {
            stage: Stage::Generate,
            ..
        })
    ));
    assert!(pipeline.artifact().is_none());
    assert_eq!(pipeline.state(), LifecycleState::Configured);
}

// ========== 配置与重算 ==========

#[tokio::test]
async fn test_recompute_does_not_touch_existing_artifact() {
    let (backend, pipeline) = setup(params(4));
    backend.reply_json(Stage::Generate, &artifact_json(&EVEN_FOUR));
    assert_ok!(pipeline.generate().await);
    let before = pipeline.artifact().unwrap();

    let target = assert_ok!(pipeline.set_question_count(8));
    assert_eq!(target, RttiCounts::new(2, 2, 2, 2));
    let target = assert_ok!(pipeline.set_weights(RttiWeights::new(40, 30, 20, 10)));
    assert_eq!(target, RttiCounts::new(4, 2, 1, 1));

    assert_eq!(pipeline.artifact().unwrap(), before);
    assert_eq!(
        pipeline.artifact().unwrap().meta.rtti_counts_target,
        RttiCounts::new(1, 1, 1, 1)
    );
    assert!(pipeline.consistency().unwrap().is_consistent());
    assert_eq!(pipeline.version(), 1);
}

#[tokio::test]
async fn test_invalid_configuration_is_rolled_back() {
    let (_backend, pipeline) = setup(params(10));
    let original = pipeline.target();

    let err = assert_err!(pipeline.set_question_count(-1));
    assert!(matches!(
        err,
        AppError::InvalidInput(InputError::NegativeBudget(-1))
    ));
    let err = assert_err!(pipeline.set_question_count(0));
    assert!(matches!(
        err,
        AppError::InvalidInput(InputError::OutOfRange { .. })
    ));
    let err = assert_err!(pipeline.set_weights(RttiWeights::new(25, -1, 25, 25)));
    assert!(matches!(
        err,
        AppError::InvalidInput(InputError::NegativeWeight { category: "T1", .. })
    ));

    assert_eq!(pipeline.target(), original);
    assert_eq!(pipeline.params().question_count, 10);

    // 权重全为 0 时分配全 0
    let target = assert_ok!(pipeline.set_weights(RttiWeights::new(0, 0, 0, 0)));
    assert_eq!(target, RttiCounts::default());
}

// ========== 提取与规范化 ==========

#[tokio::test]
async fn test_extract_and_normalize_append_with_separators() {
    let (backend, pipeline) = setup(GeneratorParams {
        learning_goals: "Bestaand doel".to_string(),
        sources: "BRON X: Oud".to_string(),
        ..params(4)
    });

    let err = assert_err!(pipeline.normalize().await);
    assert!(matches!(err, AppError::Pipeline(PipelineError::NoExtraction)));
    let err = assert_err!(pipeline.extract(vec![" ".to_string()]).await);
    assert!(err.is_precondition());

    backend.reply_json(
        Stage::Extract,
        &json!({
            "pages": [{"page_id": "p1", "raw_text": "...", "detected_sections": [{"label": "leerdoelen", "text": "..."}], "warnings": []}],
            "leerdoelen": ["Doel een"],
            "begrippen": [{"term": "erosie", "definitie": "afslijten"}],
            "bronnen": [{"bron_id": "A", "titel": "Rijn", "bron_tekst": "De Rijn stroomt"}],
            "leertekst": "Tekst",
            "global_warnings": []
        }),
    );
    backend.reply_json(
        Stage::Normalize,
        &json!({
            "normalized_leerdoelen": ["Nieuw doel 1", "Nieuw doel 2"],
            "normalized_begrippen": [{"term": "erosie", "definitie": "afslijten door water of ijs"}],
            "normalized_bronnen": [{"bron_id": "A", "titel": "Rijn", "bron_tekst": "De Rijn stroomt"}],
            "normalized_leertekst": "Tekst",
            "notes": []
        }),
    );

    let extraction = assert_ok!(
        pipeline
            .extract(vec!["data:image/jpeg;base64,AAAA".to_string()])
            .await
    );
    assert_eq!(extraction.terms[0].definition, "afslijten");
    assert!(pipeline.pending_extraction().is_some());
    // 提取结果不直接合并
    assert_eq!(pipeline.params().learning_goals, "Bestaand doel");

    let calls = backend.calls(Stage::Extract);
    assert_eq!(calls[0].model, "snel");
    assert_eq!(calls[0].images.len(), 1);

    assert_ok!(pipeline.normalize().await);
    let params = pipeline.params();
    assert_eq!(params.learning_goals, "Bestaand doel\nNieuw doel 1\nNieuw doel 2");
    assert_eq!(params.terms, "erosie: afslijten door water of ijs");
    assert_eq!(
        params.sources,
        "BRON X: Oud\n\nBRON A: Rijn\nDe Rijn stroomt\n\nLEERTEKST:\nTekst"
    );
    assert!(pipeline.pending_extraction().is_none());
}
