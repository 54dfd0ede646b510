//! 试卷生成：按目标分布合成完整试卷

use serde_json::json;
use tracing::warn;

use crate::error::CollaboratorError;
use crate::models::{ExamArtifact, GeneratorParams, RttiCounts, Stage};
use crate::services::collaborator::{to_prompt_json, ExamCollaborator, StagePrompt, HOUSE_RULES};

const SYSTEM: &str = "Je bent de Senior Toetsconstructeur Aardrijkskunde. Je negeert ruis en \
genereert uitsluitend syllabus dekkende toetsen op basis van een gesloten systeem. \
De output is consistent, corrigeerbaar en direct bruikbaar.";

/// 试卷的输出结构，协同修订阶段复用
pub(crate) const ARTIFACT_SCHEMA: &str = r#"{
  "meta": {"titel": "...", "niveau": "...", "niveauProfiel": "MH_1", "enabledQuestionTypes": ["open"],
           "onderwerp": "...", "tijd": 50, "questionCount": 8, "totalPoints": 16,
           "rttiCountsTarget": {"r": 2, "t1": 2, "t2": 2, "i": 2}},
  "sources": [{"id": "A", "title": "...", "content": "...", "type": "tekst|tabel|kaart|grafiek"}],
  "student_view": [{"id": 1, "punten": 2, "rtti": "R|T1|T2|I", "bron_id": ["A"],
                    "dimensie": "fysisch geografisch|sociaal economisch|integratief",
                    "kernconcept": "verscheidenheid|samenhang|schaal|perceptie|verandering in tijd",
                    "vraag_tekst": "...", "opties": ["..."], "type": "open", "bronrechtvaardiging": "..."}],
  "teacher_view": [{"vraag_id": 1, "rtti": "R", "motivatie": "...", "punten": 2, "antwoord_model": "...",
                    "beoordelingsregels": ["..."], "vereiste_vaktaal": ["..."], "veelgemaakte_fouten": ["..."],
                    "syllabus_domein": "...", "tijdsindicatie": "...", "geografische_schaal": "..."}],
  "beeld_prompts": ["..."],
  "quality_report": {"rtti_dekking": "...", "bron_gebruik": "...", "taal_check": "...", "google_proof_check": "..."}
}"#;

impl ExamCollaborator {
    /// 生成整份试卷
    ///
    /// 返回的试卷已通过结构检查（ID 唯一、评分项一一对应、材料引用可解析）
    pub async fn generate(
        &self,
        params: &GeneratorParams,
        target: &RttiCounts,
    ) -> Result<ExamArtifact, CollaboratorError> {
        let data = to_prompt_json(
            Stage::Generate,
            &json!({
                "niveauProfiel": params.level_profile,
                "jaarlaag": params.year_label(),
                "aantalVragen": params.question_count,
                "rttiTarget": target,
                "vraagTypes": params.question_types,
                "leerdoelen": params.learning_goals,
                "begrippen": params.terms,
                "bronnen": params.sources,
                "bronDichtheid": params.source_density,
                "leesniveau": params.reading_level,
                "toetstijd": params.time_minutes,
                "moeilijkheidsverdeling": params.difficulty,
            }),
        )?;
        let user = format!(
            "Genereer een examenwaardige toets op basis van de aangeleverde inhoud.\n\n\
             PARAMETERS:\n{}\n\n\
             EISEN:\n\
             - Het niveauprofiel {} is de bron van waarheid.\n\
             - RTTI EXACT: de labels tellen exact op tot {}.\n\
             - Precies {} vragen, alleen de toegestane vraagtypes.\n\
             - Elke vraag in student_view heeft precies één item in teacher_view met hetzelfde id.\n\
             - Gebiedende wijs, formele toon, kernbegrippen **dikgedrukt**.\n\n\
             {}\n\nSCHEMA:\n{}",
            data,
            params.level_profile.code(),
            target,
            params.question_count,
            HOUSE_RULES,
            ARTIFACT_SCHEMA
        );

        let artifact: ExamArtifact = self
            .call(
                Stage::Generate,
                StagePrompt {
                    system: SYSTEM.to_string(),
                    user,
                    temperature: 0.6,
                },
                Vec::new(),
            )
            .await?;

        artifact.check_structure().map_err(|reason| {
            warn!("[{}] 试卷结构不合法: {}", Stage::Generate, reason);
            CollaboratorError::InvariantViolation {
                stage: Stage::Generate,
                reason,
            }
        })?;

        Ok(artifact)
    }
}
