// Stream Setup Wizard
// Linear multi-step editor for a StreamDraft plus the option catalogs it offers

use crate::models::{License, OutputTarget, OutputType, Platform, StreamDraft};
use crate::services::platform_registry::PlatformRegistry;
use serde::Serialize;

/// Wizard pages in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum WizardStep {
    BasicInfo,
    Input,
    Output,
    Encoding,
    Review,
}

impl WizardStep {
    pub const ALL: [WizardStep; 5] = [
        WizardStep::BasicInfo,
        WizardStep::Input,
        WizardStep::Output,
        WizardStep::Encoding,
        WizardStep::Review,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            WizardStep::BasicInfo => "Basic Information",
            WizardStep::Input => "Input",
            WizardStep::Output => "Outputs",
            WizardStep::Encoding => "Encoding",
            WizardStep::Review => "Review & Launch",
        }
    }
}

/// Step counter plus the draft being edited
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    step: usize,
    draft: StreamDraft,
    completed: bool,
}

impl Default for WizardState {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardState {
    pub const TOTAL_STEPS: usize = WizardStep::ALL.len();

    pub fn new() -> Self {
        Self {
            step: 0,
            draft: StreamDraft::default(),
            completed: false,
        }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn current_step(&self) -> WizardStep {
        WizardStep::ALL[self.step.min(Self::TOTAL_STEPS - 1)]
    }

    pub fn draft(&self) -> &StreamDraft {
        &self.draft
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Advance one step; stays on the last step
    pub fn next_step(&mut self) {
        if self.step < Self::TOTAL_STEPS - 1 {
            self.step += 1;
        }
    }

    /// Go back one step; stays on the first step
    pub fn prev_step(&mut self) {
        self.step = self.step.saturating_sub(1);
    }

    /// Jump to a step; out-of-range requests are ignored
    pub fn go_to_step(&mut self, step: usize) {
        if step < Self::TOTAL_STEPS {
            self.step = step;
        }
    }

    /// Edit the draft in place
    pub fn update(&mut self, edit: impl FnOnce(&mut StreamDraft)) {
        edit(&mut self.draft);
    }

    pub fn add_output(&mut self, output: OutputTarget) {
        self.draft.outputs.push(output);
    }

    /// Remove the output at `index`; out-of-range indices are ignored
    pub fn remove_output(&mut self, index: usize) {
        if index < self.draft.outputs.len() {
            self.draft.outputs.remove(index);
        }
    }

    /// Edit the output at `index`; out-of-range indices are ignored
    pub fn update_output(&mut self, index: usize, edit: impl FnOnce(&mut OutputTarget)) {
        if let Some(output) = self.draft.outputs.get_mut(index) {
            edit(output);
        }
    }

    pub fn complete(&mut self) {
        self.completed = true;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Take the finished draft, leaving a fresh wizard behind
    pub fn take_draft(&mut self) -> StreamDraft {
        std::mem::take(self).draft
    }
}

/// HLS output for the built-in player, written under `/memfs/<key>`
pub fn hls_output(stream_name: &str) -> OutputTarget {
    OutputTarget::hls(format!("/memfs/{}", crate::models::stream_key_for(stream_name)))
}

/// Network output for a platform.
///
/// `custom` uses `url` unchanged; known platforms use their server URL followed by `stream_key`.
pub fn platform_output(
    registry: &PlatformRegistry,
    output_type: OutputType,
    platform: Platform,
    url: &str,
    stream_key: &str,
) -> OutputTarget {
    let address = registry.build_url_with_key(&platform, url, stream_key);
    OutputTarget::network(output_type, platform, address)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CodecPreset {
    pub id: &'static str,
    pub name: &'static str,
    pub video: &'static str,
    pub audio: &'static str,
}

pub const CODEC_PRESETS: [CodecPreset; 4] = [
    CodecPreset { id: "copy", name: "Copy (no transcoding)", video: "copy", audio: "copy" },
    CodecPreset { id: "h264_aac", name: "H.264 + AAC", video: "libx264", audio: "aac" },
    CodecPreset { id: "h265_aac", name: "H.265 + AAC", video: "libx265", audio: "aac" },
    CodecPreset { id: "vp9_opus", name: "VP9 + Opus", video: "libvpx-vp9", audio: "libopus" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionPreset {
    pub name: &'static str,
    pub value: &'static str,
}

pub const RESOLUTION_PRESETS: [ResolutionPreset; 5] = [
    ResolutionPreset { name: "4K (3840x2160)", value: "3840x2160" },
    ResolutionPreset { name: "1080p (1920x1080)", value: "1920x1080" },
    ResolutionPreset { name: "720p (1280x720)", value: "1280x720" },
    ResolutionPreset { name: "480p (854x480)", value: "854x480" },
    ResolutionPreset { name: "360p (640x360)", value: "640x360" },
];

/// Apply a codec preset by id; unknown ids leave the draft unchanged
pub fn apply_codec_preset(draft: &mut StreamDraft, preset_id: &str) -> bool {
    match CODEC_PRESETS.iter().find(|p| p.id == preset_id) {
        Some(preset) => {
            draft.video_codec = preset.video.to_string();
            draft.audio_codec = preset.audio.to_string();
            true
        }
        None => false,
    }
}

/// Licence choices with their descriptions
pub fn licenses() -> impl Iterator<Item = (&'static str, &'static str)> {
    License::ALL.iter().map(|l| (l.as_str(), l.description()))
}
