//! 质量审计

use crate::error::CollaboratorError;
use crate::models::{AuditReport, ExamArtifact, RttiCounts, Stage};
use crate::services::collaborator::{to_prompt_json, ExamCollaborator, StagePrompt, HOUSE_RULES};

const SYSTEM: &str = "Je bent Senior toetsconstructeur en kwaliteitsauditor Aardrijkskunde.";

const SCHEMA: &str = r#"{
  "pass": true,
  "issues": [{"severity": "low|medium|high", "location": "vraag 3", "problem": "...", "suggested_fix": "..."}],
  "suggested_fixes": ["..."]
}"#;

impl ExamCollaborator {
    /// 审计试卷，只读
    pub async fn audit(
        &self,
        artifact: &ExamArtifact,
        target: &RttiCounts,
    ) -> Result<AuditReport, CollaboratorError> {
        let test = to_prompt_json(Stage::Audit, artifact)?;
        let user = format!(
            "Voer een audit uit op deze toets.\n\
             Controleer RTTI labels tegen de doelen, bronrechtvaardiging, \
             eenduidigheid van vragen en correctievoorschrift, taal en google proof.\n\n\
             TOETS:\n{}\n\nRTTI DOELEN: {}\n\n{}\n\nSCHEMA:\n{}",
            test, target, HOUSE_RULES, SCHEMA
        );

        self.call(
            Stage::Audit,
            StagePrompt {
                system: SYSTEM.to_string(),
                user,
                temperature: 0.2,
            },
            Vec::new(),
        )
        .await
    }
}
