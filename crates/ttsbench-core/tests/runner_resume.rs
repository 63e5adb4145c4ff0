use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use ttsbench_core::audio::{read_audio, rms_db};
use ttsbench_core::config::parse_prompts;
use ttsbench_core::engine::{Overrides, RunRequest, Runner};
use ttsbench_core::errors::BenchError;
use ttsbench_core::metrics_api::{CollectContext, Collector, Measurement};
use ttsbench_core::model::{ModelCapabilities, PromptSet, SynthConfig, SynthResult};
use ttsbench_core::providers::tts::registry::ModelRegistry;
use ttsbench_core::providers::tts::stub::StubModel;
use ttsbench_core::providers::tts::{output_path, timing_metrics, TtsModel};
use ttsbench_core::storage::store::Store;

/// Writes a short sine tone and counts invocations.
#[derive(Default)]
struct SineModel {
    calls: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<SynthConfig>>>,
    fail_on_call: Option<usize>,
    silent: bool,
}

#[async_trait]
impl TtsModel for SineModel {
    fn name(&self) -> &'static str {
        "sine"
    }
    fn description(&self) -> &'static str {
        "Sine tone test double"
    }
    fn capabilities(&self) -> ModelCapabilities {
        ModelCapabilities {
            languages: vec!["en".into()],
            supports_cloning: false,
            supports_styles: true,
        }
    }
    fn is_available(&self) -> bool {
        true
    }
    fn availability_help(&self) -> &'static str {
        "always available"
    }

    async fn synth(
        &self,
        _text: &str,
        config: &SynthConfig,
        out_dir: &Path,
    ) -> anyhow::Result<SynthResult> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_call == Some(n) {
            anyhow::bail!("synthetic backend crash");
        }
        self.seen.lock().unwrap().push(config.clone());

        let started = Instant::now();
        let sample_rate = config.sample_rate.unwrap_or(16000);
        std::fs::create_dir_all(out_dir)?;
        let path = output_path(out_dir);
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec)?;
        for i in 0..sample_rate / 4 {
            let t = i as f32 / sample_rate as f32;
            let amp = if self.silent { 0.0 } else { 0.1 };
            let v = (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * amp;
            writer.write_sample((v * i16::MAX as f32) as i16)?;
        }
        writer.finalize()?;

        Ok(SynthResult {
            audio_path: path,
            sample_rate,
            timings: timing_metrics(started.elapsed(), 0.25),
            stats: Default::default(),
        })
    }
}

/// Reports decoded duration for every output.
#[derive(Default)]
struct DurationCollector {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Collector for DurationCollector {
    fn name(&self) -> &'static str {
        "duration"
    }
    async fn collect(&self, ctx: &CollectContext<'_>) -> anyhow::Result<Measurement> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let audio = read_audio(ctx.audio_path)?;
        Ok(Measurement::single("duration_s", audio.duration_seconds()))
    }
}

struct LevelCollector;

#[async_trait]
impl Collector for LevelCollector {
    fn name(&self) -> &'static str {
        "level"
    }
    async fn collect(&self, ctx: &CollectContext<'_>) -> anyhow::Result<Measurement> {
        let audio = read_audio(ctx.audio_path)?;
        Ok(Measurement::single("rms_db", rms_db(&audio.samples)))
    }
}

struct NeverCollector;

#[async_trait]
impl Collector for NeverCollector {
    fn name(&self) -> &'static str {
        "never"
    }
    async fn collect(&self, _ctx: &CollectContext<'_>) -> anyhow::Result<Measurement> {
        Ok(Measurement::not_computed("capability missing"))
    }
}

fn prompt_set() -> PromptSet {
    let config = parse_prompts(
        r#"
sample_rate: 16000
styles: [neutral, fast]
prompts:
  - id: p1
    text: "Hello   world"
  - id: p2
    text: "Pinned style"
    style: slow
"#,
    )
    .unwrap();
    PromptSet {
        path: "prompts.yaml".into(),
        sha256: "abc".into(),
        config,
    }
}

fn runner(model: SineModel, collector: DurationCollector) -> Runner {
    let registry = ModelRegistry::new()
        .with(Arc::new(model))
        .with(Arc::new(StubModel::bark()));
    Runner::new(registry, vec![Arc::new(collector), Arc::new(NeverCollector)])
}

fn request<'a>(
    models: &'a [String],
    prompts: &'a PromptSet,
    run_dir: &'a Path,
    overrides: &'a Overrides,
) -> RunRequest<'a> {
    RunRequest {
        models,
        prompts,
        run_dir,
        run_id: "run-1",
        seed: 1337,
        reference_voice: None,
        overrides,
        notes: None,
    }
}

#[tokio::test]
async fn resume_does_not_reinvoke_adapter() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prompts = prompt_set();
    let models = vec!["sine".to_string()];
    let overrides = Overrides::new();

    let calls = Arc::new(AtomicUsize::new(0));
    let collected = Arc::new(AtomicUsize::new(0));
    let make = || {
        runner(
            SineModel {
                calls: calls.clone(),
                ..Default::default()
            },
            DurationCollector {
                calls: collected.clone(),
            },
        )
    };

    let first = make()
        .execute(&request(&models, &prompts, dir.path(), &overrides))
        .await?;
    // p1 expands to two styles, p2 is pinned to one.
    assert_eq!(first.outputs.len(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(first.outputs.iter().all(|o| o.metrics.contains_key("rtf")));

    std::fs::remove_file(dir.path().join("results.sqlite"))?;
    let second = make()
        .execute(&request(&models, &prompts, dir.path(), &overrides))
        .await?;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(collected.load(Ordering::SeqCst), 6);
    assert_eq!(second.outputs.len(), 3);
    for out in &second.outputs {
        assert!(!out.metrics.contains_key("rtf"));
        assert!((out.metrics["duration_s"] - 0.25).abs() < 1e-6);
        assert_eq!(out.sample_rate, 16000);
    }

    let store = Store::open(&dir.path().join("results.sqlite"))?;
    assert_eq!(store.count_rows("outputs")?, 3);
    assert_eq!(store.count_rows("metrics")?, 3);
    Ok(())
}

#[tokio::test]
async fn rerun_against_existing_store_is_duplicate() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prompts = prompt_set();
    let models = vec!["sine".to_string()];
    let overrides = Overrides::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let make = || {
        runner(
            SineModel {
                calls: calls.clone(),
                ..Default::default()
            },
            DurationCollector::default(),
        )
    };

    make()
        .execute(&request(&models, &prompts, dir.path(), &overrides))
        .await?;
    let err = make()
        .execute(&request(&models, &prompts, dir.path(), &overrides))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<BenchError>(),
        Some(BenchError::DuplicateRun { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    Ok(())
}

#[tokio::test]
async fn unavailable_models_are_recorded_but_not_run() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prompts = prompt_set();
    let models = vec!["bark".to_string(), "sine".to_string()];
    let overrides = Overrides::new();

    let payload = runner(SineModel::default(), DurationCollector::default())
        .execute(&request(&models, &prompts, dir.path(), &overrides))
        .await?;

    assert_eq!(payload.models.len(), 2);
    assert!(!payload.models[0].available);
    assert!(payload.outputs.iter().all(|o| o.model == "sine"));
    assert!(!dir.path().join("bark").exists());

    // One prompt row per item, recorded style is the item's own or neutral.
    let styles: Vec<&str> = payload.prompts.iter().map(|p| p.style.as_str()).collect();
    assert_eq!(styles, vec!["neutral", "slow"]);
    assert_eq!(payload.prompts[0].text, "Hello world");

    assert!(dir.path().join("results.json").exists());
    let report = std::fs::read_to_string(dir.path().join("report.md"))?;
    assert!(report.contains("## Leaderboard"));
    assert!(report.contains("| sine"));
    Ok(())
}

#[tokio::test]
async fn overrides_win_and_seeds_are_reproducible() -> anyhow::Result<()> {
    let prompts = prompt_set();
    let models = vec!["sine".to_string()];
    let mut overrides = Overrides::new();
    overrides.insert("model_path".into(), "ckpt/best.pth".into());
    overrides.insert("sample_rate".into(), serde_json::json!(8000));

    let mut seeds = Vec::new();
    for _ in 0..2 {
        let dir = tempfile::tempdir()?;
        let seen = Arc::new(Mutex::new(Vec::new()));
        let payload = runner(
            SineModel {
                seen: seen.clone(),
                ..Default::default()
            },
            DurationCollector::default(),
        )
        .execute(&request(&models, &prompts, dir.path(), &overrides))
        .await?;

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen
            .iter()
            .all(|c| c.model_path.as_deref() == Some("ckpt/best.pth")));
        assert_eq!(seen[0].style.as_deref(), Some("neutral"));
        assert_eq!(seen[1].style.as_deref(), Some("fast"));
        assert_eq!(seen[2].style.as_deref(), Some("slow"));
        assert!(payload.outputs.iter().all(|o| o.sample_rate == 8000));
        seeds.push(seen.iter().map(|c| c.seed).collect::<Vec<_>>());
    }
    assert_eq!(seeds[0], seeds[1]);
    assert!(seeds[0].iter().all(Option::is_some));
    Ok(())
}

#[tokio::test]
async fn adapter_failure_aborts_run() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prompts = prompt_set();
    let models = vec!["sine".to_string()];
    let overrides = Overrides::new();

    let err = runner(
        SineModel {
            fail_on_call: Some(2),
            ..Default::default()
        },
        DurationCollector::default(),
    )
    .execute(&request(&models, &prompts, dir.path(), &overrides))
    .await
    .unwrap_err();

    assert!(format!("{:#}", err).contains("synthetic backend crash"));
    assert!(!dir.path().join("results.json").exists());
    let store = Store::open(&dir.path().join("results.sqlite"))?;
    assert_eq!(store.count_rows("outputs")?, 1);
    Ok(())
}

#[tokio::test]
async fn unknown_model_fails_before_store_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let prompts = prompt_set();
    let models = vec!["tacotron".to_string()];
    let overrides = Overrides::new();

    let err = runner(SineModel::default(), DurationCollector::default())
        .execute(&request(&models, &prompts, dir.path(), &overrides))
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BenchError>(),
        Some(BenchError::UnknownModel { .. })
    ));
    assert!(!dir.path().join("results.sqlite").exists());
}

#[tokio::test]
async fn synthesize_only_skips_existing_audio() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prompts = prompt_set();
    let calls = Arc::new(AtomicUsize::new(0));
    let r = runner(
        SineModel {
            calls: calls.clone(),
            ..Default::default()
        },
        DurationCollector::default(),
    );

    let paths = r
        .synthesize("sine", &prompts, dir.path(), 1, &Overrides::new())
        .await?;
    assert_eq!(paths.len(), 3);
    r.synthesize("sine", &prompts, dir.path(), 1, &Overrides::new())
        .await?;
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert!(!dir.path().join("results.sqlite").exists());

    let err = r
        .synthesize("bark", &prompts, dir.path(), 1, &Overrides::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<BenchError>(),
        Some(BenchError::ModelUnavailable { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn repeated_model_name_is_synthesized_once() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prompts = prompt_set();
    let models = vec!["sine".to_string(), "sine".to_string()];
    let overrides = Overrides::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let payload = runner(
        SineModel {
            calls: calls.clone(),
            ..Default::default()
        },
        DurationCollector::default(),
    )
    .execute(&request(&models, &prompts, dir.path(), &overrides))
    .await?;

    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(payload.outputs.len(), 3);
    assert!(payload.outputs.iter().all(|o| o.metrics.contains_key("rtf")));
    assert_eq!(payload.models.len(), 2);

    let store = Store::open(&dir.path().join("results.sqlite"))?;
    assert_eq!(store.count_rows("outputs")?, 3);
    assert_eq!(store.count_rows("models")?, 2);
    Ok(())
}

#[tokio::test]
async fn empty_prompt_list_reports_no_outputs() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prompts = PromptSet {
        path: "empty.yaml".into(),
        sha256: "abc".into(),
        config: parse_prompts("prompts: []\n")?,
    };
    let models = vec!["sine".to_string()];
    let overrides = Overrides::new();
    let calls = Arc::new(AtomicUsize::new(0));

    let payload = runner(
        SineModel {
            calls: calls.clone(),
            ..Default::default()
        },
        DurationCollector::default(),
    )
    .execute(&request(&models, &prompts, dir.path(), &overrides))
    .await?;

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert!(payload.outputs.is_empty());
    assert!(payload.prompts.is_empty());
    let report = std::fs::read_to_string(dir.path().join("report.md"))?;
    assert!(report.contains("No outputs generated."));
    assert!(!report.contains("## Leaderboard"));
    assert!(dir.path().join("results.json").exists());
    Ok(())
}

#[tokio::test]
async fn silent_output_stores_negative_infinity_and_json_null() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let prompts = prompt_set();
    let models = vec!["sine".to_string()];
    let overrides = Overrides::new();

    let registry = ModelRegistry::new().with(Arc::new(SineModel {
        silent: true,
        ..Default::default()
    }));
    let payload = Runner::new(registry, vec![Arc::new(LevelCollector)])
        .execute(&request(&models, &prompts, dir.path(), &overrides))
        .await?;
    assert!(payload
        .outputs
        .iter()
        .all(|o| o.metrics["rms_db"] == f64::NEG_INFINITY));

    let store = Store::open(&dir.path().join("results.sqlite"))?;
    let conn = store.conn.lock().unwrap();
    let stored: Vec<f64> = conn
        .prepare("SELECT value FROM metrics WHERE name = 'rms_db'")?
        .query_map([], |r| r.get(0))?
        .collect::<Result<_, _>>()?;
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|v| *v == f64::NEG_INFINITY));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("results.json"))?)?;
    for out in json["outputs"].as_array().unwrap() {
        assert!(out["metrics"]["rms_db"].is_null());
    }
    Ok(())
}
