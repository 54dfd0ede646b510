//! 图片提取：把教材页面图片转为结构化输入

use crate::error::CollaboratorError;
use crate::models::{ExtractionOutput, Stage};
use crate::services::collaborator::{ExamCollaborator, StagePrompt, HOUSE_RULES};

const SYSTEM: &str = "Je bent Input Extractor voor een toetsgenerator Aardrijkskunde. \
Je zet foto's van lesmateriaal om naar gestructureerde input.";

const SCHEMA: &str = r#"{
  "pages": [{"page_id": "p1", "raw_text": "...", "detected_sections": [{"label": "leerdoelen|begrippenlijst|bronnen|leertekst|overig", "text": "..."}], "warnings": []}],
  "leerdoelen": ["..."],
  "begrippen": [{"term": "...", "definitie": "..."}],
  "bronnen": [{"bron_id": "A", "titel": "...", "bron_tekst": "..."}],
  "leertekst": "...",
  "global_warnings": []
}"#;

impl ExamCollaborator {
    /// 从页面图片中提取学习目标、术语、材料和正文
    pub async fn extract(&self, images: &[String]) -> Result<ExtractionOutput, CollaboratorError> {
        let user = format!(
            "Zet de {} bijgevoegde afbeelding(en) om naar gestructureerde input.\n\
             Label elk fragment als leerdoelen, begrippenlijst, bronnen of leertekst.\n\
             Neem onleesbare of afgesneden stukken op als waarschuwing per pagina.\n\n\
             {}\n\nSCHEMA:\n{}",
            images.len(),
            HOUSE_RULES,
            SCHEMA
        );

        self.call(
            Stage::Extract,
            StagePrompt {
                system: SYSTEM.to_string(),
                user,
                temperature: 0.2,
            },
            images.to_vec(),
        )
        .await
    }
}
