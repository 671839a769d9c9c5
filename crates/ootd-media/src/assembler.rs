//! Clip assembly: source clip plus script in, branded short-form video out.
//!
//! One call builds one filter graph (loop, branding overlay, optional scene
//! captions, audio) and runs exactly one render. The script is parsed before
//! anything is spawned, so a malformed script never reaches the tool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use ootd_models::{EncodingConfig, ScriptDescriptor};

use crate::command::RenderSpec;
use crate::error::{MediaError, MediaResult};
use crate::filters::{filter_amix, filter_audio_loop, filter_video_loop, filter_volume};
use crate::overlay::{layout_captions, OverlayStyle};
use crate::probe::MediaProbe;
use crate::renderer::{FfmpegRenderer, Renderer};

/// Nominal length of a generated source clip.
pub const DEFAULT_SOURCE_DURATION_SECS: u32 = 8;

/// Default length of an assembled clip.
pub const DEFAULT_TARGET_DURATION_SECS: u32 = 24;

/// Longest clip a caller may request.
pub const DEFAULT_MAX_TARGET_DURATION_SECS: u32 = 180;

/// Default background track volume relative to the source audio.
pub const DEFAULT_BGM_VOLUME: f32 = 0.3;

/// How the output's audio track is produced.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum AudioMode {
    /// Loop the source's own audio alongside the video.
    #[default]
    Source,
    /// Mix a looping background track under the looped source audio.
    Mixed { track: PathBuf, volume: f32 },
    /// No audio track.
    Silent,
}

/// Style and encoding constants for assembled clips.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyConfig {
    pub source_duration_secs: u32,
    /// Upper bound on the requested target duration
    pub max_target_secs: u32,
    pub style: OverlayStyle,
    /// Burn the script's scene captions in after the branding overlay
    pub scene_captions: bool,
    pub audio: AudioMode,
    pub encoding: EncodingConfig,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            source_duration_secs: DEFAULT_SOURCE_DURATION_SECS,
            max_target_secs: DEFAULT_MAX_TARGET_DURATION_SECS,
            style: OverlayStyle::default(),
            scene_captions: false,
            audio: AudioMode::default(),
            encoding: EncodingConfig::default(),
        }
    }
}

/// Number of source plays needed to cover the target: `max(1, ceil(target / source))`.
pub fn loop_factor(target_secs: u32, source_secs: u32) -> u32 {
    target_secs.div_ceil(source_secs.max(1)).max(1)
}

/// Assembles short-form clips through a [`Renderer`].
///
/// With a [`MediaProbe`] attached, the source is inspected first and a clip
/// without an audio stream never has `[0:a]` wired into the graph.
#[derive(Clone)]
pub struct ClipAssembler {
    renderer: Arc<dyn Renderer>,
    probe: Option<Arc<dyn MediaProbe>>,
    config: AssemblyConfig,
}

impl std::fmt::Debug for ClipAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClipAssembler")
            .field("config", &self.config)
            .field("probe", &self.probe.is_some())
            .finish_non_exhaustive()
    }
}

impl ClipAssembler {
    pub fn new(renderer: Arc<dyn Renderer>, config: AssemblyConfig) -> Self {
        Self {
            renderer,
            probe: None,
            config,
        }
    }

    /// Assembler backed by an FFmpeg binary.
    pub fn with_ffmpeg(renderer: FfmpegRenderer, config: AssemblyConfig) -> Self {
        Self::new(Arc::new(renderer), config)
    }

    /// Inspect sources before rendering.
    pub fn with_probe(mut self, probe: Arc<dyn MediaProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn config(&self) -> &AssemblyConfig {
        &self.config
    }

    /// Assemble from a serialized script.
    pub async fn assemble(
        &self,
        source: impl AsRef<Path>,
        output: impl AsRef<Path>,
        script_json: &str,
        target_secs: u32,
    ) -> MediaResult<PathBuf> {
        let script = ScriptDescriptor::from_json(script_json)?;
        self.assemble_script(source, output, &script, target_secs).await
    }

    /// Assemble from an already-parsed script.
    pub async fn assemble_script(
        &self,
        source: impl AsRef<Path>,
        output: impl AsRef<Path>,
        script: &ScriptDescriptor,
        target_secs: u32,
    ) -> MediaResult<PathBuf> {
        let source = source.as_ref();
        let output = output.as_ref();

        script.validate()?;
        self.check_target(target_secs)?;

        let has_source_audio = self.source_has_audio(source).await;
        let spec = self.build_render_spec(source, output, script, target_secs, has_source_audio)?;

        info!(
            source = %source.display(),
            output = %output.display(),
            target_secs,
            has_source_audio,
            title = %script.title,
            "Assembling clip"
        );

        let rendered = self.renderer.render(&spec).await?;

        if !rendered.stderr.trim().is_empty() {
            debug!(stderr = %rendered.stderr.trim(), "FFmpeg diagnostics");
        }

        Ok(rendered.output)
    }

    /// Reject a zero target or one above the configured cap.
    pub fn check_target(&self, target_secs: u32) -> MediaResult<()> {
        if target_secs == 0 {
            return Err(MediaError::InvalidDuration(target_secs));
        }
        if target_secs > self.config.max_target_secs {
            return Err(MediaError::TargetTooLong {
                requested: target_secs,
                max: self.config.max_target_secs,
            });
        }
        Ok(())
    }

    /// Whether the source carries audio. Without a probe, or when probing
    /// fails, the configured audio mode is trusted and the render reports
    /// any problem.
    async fn source_has_audio(&self, source: &Path) -> bool {
        if self.config.audio == AudioMode::Silent {
            return false;
        }
        let Some(probe) = &self.probe else {
            return true;
        };
        match probe.probe(source).await {
            Ok(info) => {
                if !info.has_audio {
                    debug!(source = %source.display(), "Source has no audio stream");
                }
                info.has_audio
            }
            Err(e) => {
                warn!(source = %source.display(), "Could not probe source streams: {}", e);
                true
            }
        }
    }

    /// Build the render for one assembly without running it.
    pub fn build_render_spec(
        &self,
        source: &Path,
        output: &Path,
        script: &ScriptDescriptor,
        target_secs: u32,
        has_source_audio: bool,
    ) -> MediaResult<RenderSpec> {
        self.check_target(target_secs)?;

        let factor = loop_factor(target_secs, self.config.source_duration_secs);
        let style = &self.config.style;

        // Overlays run on the looped timeline
        let mut graph = format!(
            "[0:v]{}[looped];[looped]{}",
            filter_video_loop(factor),
            style.drawtext()
        );
        if self.config.scene_captions {
            for caption in layout_captions(script, target_secs) {
                graph.push(',');
                graph.push_str(&style.caption_drawtext(&caption));
            }
        }
        graph.push_str("[vout]");

        let mut spec = RenderSpec::new(source, output);
        let mut has_audio_out = true;

        match (&self.config.audio, has_source_audio) {
            (AudioMode::Source, true) => {
                graph.push_str(&format!(";[0:a]{}[aout]", filter_audio_loop(factor)));
            }
            (AudioMode::Mixed { track, volume }, true) => {
                spec = spec.extra_input(track, ["-stream_loop", "-1"]);
                graph.push_str(&format!(
                    ";[0:a]{}[src];[1:a]{}[bgm];{}",
                    filter_audio_loop(factor),
                    filter_volume(*volume),
                    filter_amix("src", "bgm", "aout")
                ));
            }
            // Background track alone, trimmed by the duration clamp
            (AudioMode::Mixed { track, volume }, false) => {
                spec = spec.extra_input(track, ["-stream_loop", "-1"]);
                graph.push_str(&format!(";[1:a]{}[aout]", filter_volume(*volume)));
            }
            (AudioMode::Source, false) | (AudioMode::Silent, _) => has_audio_out = false,
        }

        debug!(loop_factor = factor, filter = %graph, "Built assembly filter graph");

        spec = spec
            .filter_complex(graph)
            .map("[vout]")
            .duration(target_secs)
            .output_args(self.config.encoding.video_args());

        spec = if has_audio_out {
            spec.map("[aout]").output_args(self.config.encoding.audio_args())
        } else {
            spec.no_audio()
        };

        Ok(spec.overwrite(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::{MediaInfo, MockMediaProbe};
    use crate::renderer::{MockRenderer, RenderOutput};
    use ootd_models::SceneDetail;
    use std::time::Duration;

    const SCRIPT: &str = r#"{"title": "버블 헴 드레스", "scene_details": [
        {"caption": "Volume", "start_time": 0, "end_time": 8},
        {"caption": "Sculptural"}
    ]}"#;

    fn ok_renderer() -> MockRenderer {
        let mut renderer = MockRenderer::new();
        renderer.expect_render().returning(|spec| {
            Ok(RenderOutput {
                output: spec.output().to_path_buf(),
                stderr: String::new(),
                elapsed: Duration::from_millis(5),
            })
        });
        renderer
    }

    fn script() -> ScriptDescriptor {
        ScriptDescriptor::from_json(SCRIPT).unwrap()
    }

    fn build(config: AssemblyConfig) -> RenderSpec {
        build_with_audio(config, true)
    }

    fn build_with_audio(config: AssemblyConfig, has_source_audio: bool) -> RenderSpec {
        ClipAssembler::new(Arc::new(MockRenderer::new()), config)
            .build_render_spec(
                Path::new("in.mp4"),
                Path::new("out.mp4"),
                &script(),
                24,
                has_source_audio,
            )
            .unwrap()
    }

    fn probe_reporting(has_audio: bool) -> MockMediaProbe {
        let mut probe = MockMediaProbe::new();
        probe.expect_probe().returning(move |_| {
            Ok(MediaInfo {
                duration: 8.0,
                width: 1080,
                height: 1920,
                has_audio,
            })
        });
        probe
    }

    #[test]
    fn test_loop_factor() {
        assert_eq!(loop_factor(24, 8), 3);
        assert_eq!(loop_factor(25, 8), 4);
        assert_eq!(loop_factor(8, 8), 1);
        assert_eq!(loop_factor(5, 8), 1);
        assert_eq!(loop_factor(24, 0), 24);
    }

    #[test]
    fn test_default_spec_loops_and_clamps() {
        let spec = build(AssemblyConfig::default());
        let args = spec.build_args();
        let graph = spec.filter_graph().unwrap();

        assert!(graph.starts_with("[0:v]loop=loop=2:size=32767:start=0,setpts=N/FRAME_RATE/TB[looped];"));
        assert!(graph.contains("[looped]drawtext=text=오늘 무엇을 입을까?:"));
        assert!(graph.contains("[0:a]aloop=loop=2:"));
        assert!(!graph.contains("enable="));

        assert!(args.windows(2).any(|w| w == ["-t", "24"]));
        assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
        assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
        assert!(args.windows(2).any(|w| w == ["-b:a", "192k"]));
        assert!(args.windows(2).any(|w| w == ["-pix_fmt", "yuv420p"]));
        assert!(args.windows(2).any(|w| w == ["-map", "[vout]"]));
        assert!(args.windows(2).any(|w| w == ["-map", "[aout]"]));
        assert!(args.contains(&"-y".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
    }

    #[test]
    fn test_scene_captions_opt_in() {
        let config = AssemblyConfig {
            scene_captions: true,
            ..Default::default()
        };
        let spec = build(config);
        let graph = spec.filter_graph().unwrap();
        assert!(graph.contains("text=Volume"));
        assert!(graph.contains("enable='between(t,0,8)'"));
        // untimed second scene takes the second equal slot
        assert!(graph.contains("enable='between(t,12,24)'"));
        assert!(graph.ends_with("[aout]"));
    }

    #[test]
    fn test_mixed_audio_adds_looping_input() {
        let config = AssemblyConfig {
            audio: AudioMode::Mixed {
                track: PathBuf::from("bgm.mp3"),
                volume: 0.3,
            },
            ..Default::default()
        };
        let spec = build(config);
        assert_eq!(spec.inputs().len(), 2);
        assert_eq!(spec.inputs()[1].args, vec!["-stream_loop", "-1"]);
        let graph = spec.filter_graph().unwrap();
        assert!(graph.contains("[1:a]volume=0.30[bgm]"));
        assert!(graph.contains("amix=inputs=2:duration=first"));
    }

    #[test]
    fn test_silent_audio() {
        let config = AssemblyConfig {
            audio: AudioMode::Silent,
            ..Default::default()
        };
        let spec = build(config);
        let args = spec.build_args();
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"[aout]".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
    }

    #[test]
    fn test_source_without_audio_renders_silent() {
        let spec = build_with_audio(AssemblyConfig::default(), false);
        let args = spec.build_args();
        let graph = spec.filter_graph().unwrap();
        assert!(!graph.contains("[0:a]"));
        assert!(graph.ends_with("[vout]"));
        assert!(args.contains(&"-an".to_string()));
        assert!(!args.contains(&"[aout]".to_string()));
    }

    #[test]
    fn test_mixed_without_source_audio_uses_track_alone() {
        let config = AssemblyConfig {
            audio: AudioMode::Mixed {
                track: PathBuf::from("bgm.mp3"),
                volume: 0.3,
            },
            ..Default::default()
        };
        let spec = build_with_audio(config, false);
        let args = spec.build_args();
        let graph = spec.filter_graph().unwrap();
        assert_eq!(spec.inputs().len(), 2);
        assert!(!graph.contains("[0:a]"));
        assert!(!graph.contains("amix"));
        assert!(graph.ends_with(";[1:a]volume=0.30[aout]"));
        assert!(args.windows(2).any(|w| w == ["-map", "[aout]"]));
        assert!(args.windows(2).any(|w| w == ["-t", "24"]));
    }

    #[test]
    fn test_target_above_cap_rejected() {
        let assembler = ClipAssembler::new(
            Arc::new(MockRenderer::new()),
            AssemblyConfig {
                max_target_secs: 60,
                ..Default::default()
            },
        );
        let err = assembler
            .build_render_spec(Path::new("in.mp4"), Path::new("out.mp4"), &script(), 61, true)
            .unwrap_err();
        assert!(matches!(err, MediaError::TargetTooLong { requested: 61, max: 60 }));
        assert!(assembler
            .build_render_spec(Path::new("in.mp4"), Path::new("out.mp4"), &script(), 60, true)
            .is_ok());
    }

    #[tokio::test]
    async fn test_probed_source_without_audio_skips_audio_input() {
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .withf(|spec| {
                spec.filter_graph().is_some_and(|g| !g.contains("[0:a]"))
                    && spec.build_args().contains(&"-an".to_string())
            })
            .times(1)
            .returning(|spec| {
                Ok(RenderOutput {
                    output: spec.output().to_path_buf(),
                    stderr: String::new(),
                    elapsed: Duration::ZERO,
                })
            });
        let assembler = ClipAssembler::new(Arc::new(renderer), AssemblyConfig::default())
            .with_probe(Arc::new(probe_reporting(false)));

        assembler.assemble("in.mp4", "out.mp4", SCRIPT, 24).await.unwrap();
    }

    #[tokio::test]
    async fn test_probed_source_with_audio_keeps_audio_loop() {
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .withf(|spec| spec.filter_graph().is_some_and(|g| g.contains("[0:a]aloop=")))
            .times(1)
            .returning(|spec| {
                Ok(RenderOutput {
                    output: spec.output().to_path_buf(),
                    stderr: String::new(),
                    elapsed: Duration::ZERO,
                })
            });
        let assembler = ClipAssembler::new(Arc::new(renderer), AssemblyConfig::default())
            .with_probe(Arc::new(probe_reporting(true)));

        assembler.assemble("in.mp4", "out.mp4", SCRIPT, 24).await.unwrap();
    }

    #[tokio::test]
    async fn test_probe_failure_falls_back_to_configured_audio() {
        let mut probe = MockMediaProbe::new();
        probe
            .expect_probe()
            .returning(|_| Err(MediaError::probe_failed("bad header", None)));
        let assembler = ClipAssembler::new(Arc::new(ok_renderer()), AssemblyConfig::default())
            .with_probe(Arc::new(probe));

        assert!(assembler.source_has_audio(Path::new("in.mp4")).await);
    }

    #[tokio::test]
    async fn test_silent_mode_skips_probe() {
        let mut probe = MockMediaProbe::new();
        probe.expect_probe().times(0);
        let assembler = ClipAssembler::new(
            Arc::new(ok_renderer()),
            AssemblyConfig {
                audio: AudioMode::Silent,
                ..Default::default()
            },
        )
        .with_probe(Arc::new(probe));

        assembler.assemble("in.mp4", "out.mp4", SCRIPT, 24).await.unwrap();
    }

    #[tokio::test]
    async fn test_assemble_returns_output_path() {
        let assembler = ClipAssembler::new(Arc::new(ok_renderer()), AssemblyConfig::default());
        let output = assembler
            .assemble("/media/src.mp4", "/media/out.mp4", SCRIPT, 24)
            .await
            .unwrap();
        assert_eq!(output, PathBuf::from("/media/out.mp4"));
    }

    #[tokio::test]
    async fn test_bad_script_never_renders() {
        let mut renderer = MockRenderer::new();
        renderer.expect_render().times(0);
        let assembler = ClipAssembler::new(Arc::new(renderer), AssemblyConfig::default());

        for bad in ["not json", r#"{"title": "x"}"#, r#"{"scene_details": []}"#] {
            let err = assembler.assemble("in.mp4", "out.mp4", bad, 24).await.unwrap_err();
            assert!(matches!(err, MediaError::ScriptFormat(_)), "{bad}: {err:?}");
        }
    }

    #[tokio::test]
    async fn test_zero_target_never_renders() {
        let mut renderer = MockRenderer::new();
        renderer.expect_render().times(0);
        let assembler = ClipAssembler::new(Arc::new(renderer), AssemblyConfig::default());

        let err = assembler.assemble("in.mp4", "out.mp4", SCRIPT, 0).await.unwrap_err();
        assert!(matches!(err, MediaError::InvalidDuration(0)));
    }

    #[tokio::test]
    async fn test_empty_scenes_still_branded() {
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .withf(|spec| {
                spec.filter_graph()
                    .is_some_and(|g| g.contains("drawtext=text=오늘 무엇을 입을까?"))
                    && spec.duration_secs() == Some(24)
            })
            .times(1)
            .returning(|spec| {
                Ok(RenderOutput {
                    output: spec.output().to_path_buf(),
                    stderr: String::new(),
                    elapsed: Duration::ZERO,
                })
            });
        let assembler = ClipAssembler::new(Arc::new(renderer), AssemblyConfig::default());

        let script = ScriptDescriptor {
            title: "빈 대본".into(),
            scene_details: Vec::<SceneDetail>::new(),
        };
        assembler
            .assemble_script("in.mp4", "out.mp4", &script, 24)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_render_failure_passes_through() {
        let mut renderer = MockRenderer::new();
        renderer
            .expect_render()
            .times(1)
            .returning(|_| Err(MediaError::render_failed("in.mp4: No such file or directory\n", Some(1))));
        let assembler = ClipAssembler::new(Arc::new(renderer), AssemblyConfig::default());

        let err = assembler.assemble("in.mp4", "out.mp4", SCRIPT, 24).await.unwrap_err();
        match err {
            MediaError::Render { stderr, exit_code } => {
                assert_eq!(stderr, "in.mp4: No such file or directory\n");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
