//! 可行性预检：判断输入是否足以支撑目标 RTTI 数量

use serde_json::json;

use crate::error::CollaboratorError;
use crate::models::{GeneratorParams, RttiCounts, Stage, ValidationReport};
use crate::services::collaborator::{to_prompt_json, ExamCollaborator, StagePrompt, HOUSE_RULES};

const SYSTEM: &str = "Je bent Preflight Validator voor een gesloten systeem toetsgenerator \
Aardrijkskunde. Je beoordeelt of de aangeleverde input rijk genoeg is.";

const SCHEMA: &str = r#"{
  "warnings": ["..."],
  "quick_fixes": ["..."],
  "missing_information": ["..."],
  "suggested_edits": ["..."],
  "feasibility": "ok|risk"
}"#;

impl ExamCollaborator {
    /// 检查输入是否足以生成目标数量的 R/T1/T2/I 题目，不修改试卷
    pub async fn validate_feasibility(
        &self,
        params: &GeneratorParams,
        target: &RttiCounts,
    ) -> Result<ValidationReport, CollaboratorError> {
        let data = to_prompt_json(
            Stage::Validate,
            &json!({
                "leerdoelen": params.learning_goals,
                "begrippen": params.terms,
                "bronnen": params.sources,
                "rtti_target": target,
                "aantal_vragen": params.question_count,
                "vraagtypes": params.question_types,
            }),
        )?;
        let user = format!(
            "Controleer of de input rijk genoeg is voor de gekozen RTTI aantallen ({}).\n\
             Zet feasibility op \"risk\" als een categorie niet haalbaar is met de bronnen.\n\n\
             INPUT DATA:\n{}\n\n{}\n\nSCHEMA:\n{}",
            target, data, HOUSE_RULES, SCHEMA
        );

        self.call(
            Stage::Validate,
            StagePrompt {
                system: SYSTEM.to_string(),
                user,
                temperature: 0.1,
            },
            Vec::new(),
        )
        .await
    }
}
