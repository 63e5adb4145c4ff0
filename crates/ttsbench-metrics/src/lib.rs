use std::sync::Arc;

use ttsbench_core::metrics_api::Collector;
use ttsbench_core::settings::ToolSettings;

pub mod asr;
pub mod signal;
pub mod speaker;

/// Signal, ASR and speaker-similarity collectors wired from `settings`.
/// ASR and similarity report "not computed" when their tool is not
/// configured.
pub fn default_collectors(settings: &ToolSettings) -> Vec<Arc<dyn Collector>> {
    let transcriber = settings.whisper_model.as_ref().map(|model| {
        Arc::new(asr::WhisperCpp {
            bin: settings.whisper_bin.clone(),
            model: model.clone(),
        }) as Arc<dyn asr::Transcriber>
    });
    let embedder = settings.speaker_embed_cmd.as_ref().map(|cmd| {
        Arc::new(speaker::CommandEmbedder { cmd: cmd.clone() }) as Arc<dyn speaker::SpeakerEmbedder>
    });

    vec![
        Arc::new(signal::SignalCollector::new(settings.ffmpeg_bin.clone())),
        Arc::new(asr::AsrCollector::new(transcriber)),
        Arc::new(speaker::SpeakerCollector::new(embedder)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_order() {
        let names: Vec<&str> = default_collectors(&ToolSettings::default())
            .iter()
            .map(|c| c.name())
            .collect();
        assert_eq!(names, vec!["signal", "asr", "speaker"]);
    }
}
