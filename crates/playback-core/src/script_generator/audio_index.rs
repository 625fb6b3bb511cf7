//! The normalised-text → audio-id mapping the Script Generator builds once
//! per course before emitting any cycles (spec §4.1 step 1).

use std::collections::HashMap;

use crate::ports::content_repository::{AudioRole, AudioRow};
use crate::text_norm::normalize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSlot {
    pub id: String,
    pub duration_ms: Option<u64>,
}

#[derive(Debug, Default)]
struct TextAudioEntry {
    known: Option<AudioSlot>,
    target1: Option<AudioSlot>,
    target2: Option<AudioSlot>,
}

#[derive(Debug, Default)]
pub struct AudioIndex {
    by_text: HashMap<String, TextAudioEntry>,
    presentation: HashMap<String, AudioSlot>,
}

impl AudioIndex {
    pub fn build(rows: &[AudioRow]) -> Self {
        let mut by_text: HashMap<String, TextAudioEntry> = HashMap::new();
        let mut presentation: HashMap<String, AudioSlot> = HashMap::new();

        for row in rows {
            let slot = AudioSlot {
                id: row.id.clone(),
                duration_ms: row.duration_ms,
            };
            match row.role {
                // "known" and "source" are synonymous (spec §6).
                AudioRole::Known | AudioRole::Source => {
                    by_text.entry(normalize(&row.text_normalized)).or_default().known = Some(slot);
                }
                AudioRole::Target1 => {
                    by_text.entry(normalize(&row.text_normalized)).or_default().target1 = Some(slot);
                }
                AudioRole::Target2 => {
                    by_text.entry(normalize(&row.text_normalized)).or_default().target2 = Some(slot);
                }
                AudioRole::Presentation => {
                    if let Some(lego_id) = &row.lego_id {
                        presentation.insert(lego_id.clone(), slot);
                    }
                }
            }
        }

        Self { by_text, presentation }
    }

    pub fn known(&self, normalized_text: &str) -> Option<&AudioSlot> {
        self.by_text.get(normalized_text).and_then(|e| e.known.as_ref())
    }

    pub fn target1(&self, normalized_text: &str) -> Option<&AudioSlot> {
        self.by_text.get(normalized_text).and_then(|e| e.target1.as_ref())
    }

    pub fn target2(&self, normalized_text: &str) -> Option<&AudioSlot> {
        self.by_text.get(normalized_text).and_then(|e| e.target2.as_ref())
    }

    pub fn presentation(&self, lego_id: &str) -> Option<&AudioSlot> {
        self.presentation.get(lego_id)
    }
}
