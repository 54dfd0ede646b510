//! 规范化：把提取结果压缩为一致的输入

use crate::error::CollaboratorError;
use crate::models::{ExtractionOutput, NormalizedOutput, Stage};
use crate::services::collaborator::{to_prompt_json, ExamCollaborator, StagePrompt, HOUSE_RULES};

const SYSTEM: &str = "Je bent Input Normalizer. Je maakt geëxtraheerde input compact en consistent \
zonder inhoud toe te voegen.";

const SCHEMA: &str = r#"{
  "normalized_leerdoelen": ["..."],
  "normalized_begrippen": [{"term": "...", "definitie": "..."}],
  "normalized_bronnen": [{"bron_id": "A", "titel": "...", "bron_tekst": "..."}],
  "normalized_leertekst": "...",
  "notes": []
}"#;

impl ExamCollaborator {
    /// 去重、统一措辞、给材料分配稳定的 ID
    pub async fn normalize(
        &self,
        extraction: &ExtractionOutput,
    ) -> Result<NormalizedOutput, CollaboratorError> {
        let data = to_prompt_json(Stage::Normalize, extraction)?;
        let user = format!(
            "Normaliseer de geëxtraheerde data.\n\
             Verwijder dubbelingen, formuleer leerdoelen als één zin per doel, \
             en geef elke bron een unieke bron_id (A, B, C, ...).\n\n\
             DATA:\n{}\n\n{}\n\nSCHEMA:\n{}",
            data, HOUSE_RULES, SCHEMA
        );

        self.call(
            Stage::Normalize,
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
