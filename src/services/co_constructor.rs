//! 协同修订：按教师指令修改现有试卷

use tracing::warn;

use crate::error::CollaboratorError;
use crate::models::{CoConstructResult, ExamArtifact, RttiCounts, Stage};
use crate::services::collaborator::{to_prompt_json, ExamCollaborator, StagePrompt, HOUSE_RULES};
use crate::services::generator::ARTIFACT_SCHEMA;

const SYSTEM: &str = "Je bent AI Co Constructeur. Je voert wijzigingen uit op een bestaande toets \
op basis van instructies van de docent en laat de rest ongemoeid.";

impl ExamCollaborator {
    /// 修订试卷，返回完整的新试卷、变更记录和质量变化
    pub async fn co_construct(
        &self,
        artifact: &ExamArtifact,
        instruction: &str,
        context: Option<&str>,
        target: &RttiCounts,
    ) -> Result<CoConstructResult, CollaboratorError> {
        let current = to_prompt_json(Stage::CoConstruct, artifact)?;
        let user = format!(
            "BESTAANDE TOETS:\n{}\n\n\
             INSTRUCTIE: {}\n\
             EXTRA CONTEXT: {}\n\
             RTTI TARGET: {}\n\n\
             Lever de volledige bijgewerkte toets in updated_test, \
             elke wijziging als item in changes, en een eerlijke quality_delta.\n\n\
             {}\n\nSCHEMA:\n{{\n  \"changes\": [{{\"target\": \"vraag|bron\", \"id\": \"...\", \
             \"change_type\": \"edit|replace|add|remove\", \"before\": \"...\", \"after\": \"...\"}}],\n  \
             \"updated_test\": {},\n  \
             \"quality_delta\": {{\"rtti_ok\": true, \"types_ok\": true, \"clustering_ok\": true, \"notes\": []}}\n}}",
            current,
            instruction,
            context.unwrap_or("Geen."),
            target,
            HOUSE_RULES,
            ARTIFACT_SCHEMA
        );

        let result: CoConstructResult = self
            .call(
                Stage::CoConstruct,
                StagePrompt {
                    system: SYSTEM.to_string(),
                    user,
                    temperature: 0.3,
                },
                Vec::new(),
            )
            .await?;

        result.updated_test.check_structure().map_err(|reason| {
            warn!("[{}] 修订后的试卷结构不合法: {}", Stage::CoConstruct, reason);
            CollaboratorError::InvariantViolation {
                stage: Stage::CoConstruct,
                reason,
            }
        })?;

        Ok(result)
    }
}
