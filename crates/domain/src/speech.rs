//! Text-to-speech announcements — option resolution, volume and payloads.
//!
//! A [`SpeechRequest`] is either spoken text or a short sound clip (any
//! content ending in `.mp3`). Everything the speaker bridge needs is derived
//! by explicit pure functions:
//!
//! - [`resolve_option`]: per-call override > room profile > global default
//! - [`compute_volume`]: volume from priority unless a sane override is given
//! - [`should_play`]: quiet-hours policy
//! - [`topic_for`] / [`build_payload`]: the outbound MQTT message

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::notification::Priority;

/// Room name that addresses every speaker at once.
pub const ALL_ROOMS: &str = "All";

/// Default clip timeout in seconds.
pub const CLIP_TIMEOUT_SECS: u32 = 15;

/// Delay used when a request gives none, or one outside `1..=1000` ms.
pub const DEFAULT_DELAY_MS: u32 = 500;

/// Whether the content is synthesised speech or a pre-recorded clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechKind {
    Speak,
    Clip,
}

impl SpeechKind {
    /// Classify request content: `.mp3` file names are clips.
    #[must_use]
    pub fn of(content: &str) -> Self {
        if content.to_lowercase().ends_with(".mp3") {
            Self::Clip
        } else {
            Self::Speak
        }
    }
}

/// Voice settings; every field is optional so it can serve as an override or
/// as a room profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceOptions {
    pub language: Option<String>,
    pub voice: Option<String>,
    pub gender: Option<String>,
    pub engine: Option<String>,
}

/// Fully resolved voice settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub language: String,
    pub voice: String,
    pub gender: String,
    pub engine: String,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            language: "sv-SE".to_string(),
            voice: "Elin".to_string(),
            gender: "female".to_string(),
            engine: "neural".to_string(),
        }
    }
}

/// Pick the first value present: per-call override, room profile, default.
#[must_use]
pub fn resolve_option<T: Clone>(
    overridden: Option<&T>,
    room_profile: Option<&T>,
    default: &T,
) -> T {
    overridden.or(room_profile).unwrap_or(default).clone()
}

impl Voice {
    /// Resolve each voice field with [`resolve_option`].
    #[must_use]
    pub fn resolve(
        overrides: &VoiceOptions,
        room_profile: Option<&VoiceOptions>,
        defaults: &Voice,
    ) -> Self {
        let profile = room_profile.cloned().unwrap_or_default();
        Self {
            language: resolve_option(
                overrides.language.as_ref(),
                profile.language.as_ref(),
                &defaults.language,
            ),
            voice: resolve_option(
                overrides.voice.as_ref(),
                profile.voice.as_ref(),
                &defaults.voice,
            ),
            gender: resolve_option(
                overrides.gender.as_ref(),
                profile.gender.as_ref(),
                &defaults.gender,
            ),
            engine: resolve_option(
                overrides.engine.as_ref(),
                profile.engine.as_ref(),
                &defaults.engine,
            ),
        }
    }
}

/// Volume for a priority, unless `overridden` is set to a value in `1..70`.
#[must_use]
pub fn compute_volume(priority: Priority, overridden: Option<u8>) -> u8 {
    match overridden {
        Some(volume) if volume > 0 && volume < 70 => volume,
        _ => match priority {
            Priority::Low => 30,
            Priority::Moderate => 40,
            Priority::High => 60,
            Priority::Emergency => 70,
        },
    }
}

/// Quiet hours run from 22:00 to 06:59; low and moderate announcements are
/// suppressed during them.
#[must_use]
pub fn should_play(priority: Priority, local_hour: u32) -> bool {
    let quiet = !(7..=21).contains(&local_hour);
    !(quiet && priority <= Priority::Moderate)
}

/// Normalise a requested delay: values outside `1..=1000` ms fall back to
/// [`DEFAULT_DELAY_MS`].
#[must_use]
pub fn normalize_delay(delay_ms: Option<u32>) -> u32 {
    match delay_ms {
        Some(delay) if (1..=1000).contains(&delay) => delay,
        _ => DEFAULT_DELAY_MS,
    }
}

/// MQTT topic for a request under `prefix` (e.g. `sonos/set`).
#[must_use]
pub fn topic_for(prefix: &str, kind: SpeechKind, room: &str) -> String {
    let action = match kind {
        SpeechKind::Speak => "speak",
        SpeechKind::Clip => "notify",
    };
    if room == ALL_ROOMS {
        format!("{prefix}/{action}")
    } else {
        format!("{prefix}/{room}/{action}")
    }
}

/// A request to announce something on the speakers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpeechRequest {
    /// Text to speak, or a clip file name ending in `.mp3`.
    pub content: String,
    pub priority: Priority,
    /// Target room; `None` uses the configured default room.
    pub room: Option<String>,
    pub volume: Option<u8>,
    pub voice: VoiceOptions,
    pub only_when_playing: bool,
    pub delay_ms: Option<u32>,
    pub timeout_secs: Option<u32>,
}

impl SpeechRequest {
    /// Speak `content` with the given priority and otherwise default settings.
    #[must_use]
    pub fn new(content: impl Into<String>, priority: Priority) -> Self {
        Self {
            content: content.into(),
            priority,
            ..Self::default()
        }
    }
}

/// Settings shared by every request: where the speech server lives and the
/// defaults that room profiles refine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// Base URL of the speech server, e.g. `http://tts.local:5601`.
    pub server_url: String,
    /// Topic prefix of the speaker bridge.
    pub topic_prefix: String,
    pub default_room: String,
    pub defaults: Voice,
    pub rooms: HashMap<String, VoiceOptions>,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5601".to_string(),
            topic_prefix: "sonos/set".to_string(),
            default_room: "Vardagsrummet".to_string(),
            defaults: Voice::default(),
            rooms: HashMap::new(),
        }
    }
}

/// Everything [`build_payload`] needs, already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadFields {
    pub content: String,
    pub volume: u8,
    pub voice: Voice,
    pub only_when_playing: bool,
    pub delay_ms: u32,
    pub timeout_secs: Option<u32>,
    pub server_url: String,
}

/// Build the JSON body published to the speaker bridge.
#[must_use]
pub fn build_payload(kind: SpeechKind, fields: &PayloadFields) -> serde_json::Value {
    let mut payload = match kind {
        SpeechKind::Clip => serde_json::json!({
            "trackUri": format!("{}/cache/sounds/{}", fields.server_url, fields.content),
            "volume": fields.volume,
            "timeout": CLIP_TIMEOUT_SECS,
            "onlyWhenPlaying": fields.only_when_playing,
        }),
        SpeechKind::Speak => serde_json::json!({
            "text": fields.content,
            "endpoint": format!("{}/api/generate", fields.server_url),
            "lang": fields.voice.language,
            "gender": fields.voice.gender,
            "engine": fields.voice.engine,
            "name": fields.voice.voice,
            "volume": fields.volume,
            "onlyWhenPlaying": fields.only_when_playing,
        }),
    };

    if fields.delay_ms > 0 && fields.delay_ms < 2001 {
        payload["delayMs"] = fields.delay_ms.into();
    }
    if let Some(timeout) = fields.timeout_secs.filter(|t| *t > 0 && *t < 250) {
        payload["timeout"] = timeout.into();
    }
    payload
}

/// A fully prepared announcement: topic and payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    pub topic: String,
    pub payload: serde_json::Value,
}

/// Resolve `request` against `settings`, or `None` when quiet hours suppress it.
#[must_use]
pub fn prepare(
    request: &SpeechRequest,
    settings: &SpeechSettings,
    local_hour: u32,
) -> Option<Announcement> {
    if !should_play(request.priority, local_hour) {
        return None;
    }
    let kind = SpeechKind::of(&request.content);
    let room = request.room.as_deref().unwrap_or(&settings.default_room);
    let fields = PayloadFields {
        content: request.content.clone(),
        volume: compute_volume(request.priority, request.volume),
        voice: Voice::resolve(&request.voice, settings.rooms.get(room), &settings.defaults),
        only_when_playing: request.only_when_playing,
        delay_ms: normalize_delay(request.delay_ms),
        timeout_secs: request.timeout_secs,
        server_url: settings.server_url.clone(),
    };
    Some(Announcement {
        topic: topic_for(&settings.topic_prefix, kind, room),
        payload: build_payload(kind, &fields),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(content: &str) -> PayloadFields {
        PayloadFields {
            content: content.to_string(),
            volume: 40,
            voice: Voice::default(),
            only_when_playing: false,
            delay_ms: DEFAULT_DELAY_MS,
            timeout_secs: None,
            server_url: "http://tts:5601".to_string(),
        }
    }

    // ── Option resolution ──────────────────────────────────────────

    #[test]
    fn should_prefer_override_then_profile_then_default() {
        let default = "sv-SE".to_string();
        let profile = "en-GB".to_string();
        let overridden = "de-DE".to_string();
        assert_eq!(resolve_option(Some(&overridden), Some(&profile), &default), "de-DE");
        assert_eq!(resolve_option(None, Some(&profile), &default), "en-GB");
        assert_eq!(resolve_option(None, None, &default), "sv-SE");
    }

    #[test]
    fn should_resolve_voice_per_field() {
        let overrides = VoiceOptions {
            voice: Some("Brian".to_string()),
            ..VoiceOptions::default()
        };
        let profile = VoiceOptions {
            language: Some("en-GB".to_string()),
            voice: Some("Amy".to_string()),
            ..VoiceOptions::default()
        };
        let voice = Voice::resolve(&overrides, Some(&profile), &Voice::default());
        assert_eq!(voice.voice, "Brian");
        assert_eq!(voice.language, "en-GB");
        assert_eq!(voice.gender, "female");
        assert_eq!(voice.engine, "neural");
    }

    // ── Volume and quiet hours ─────────────────────────────────────

    #[test]
    fn should_map_priority_to_volume_without_override() {
        assert_eq!(compute_volume(Priority::Low, None), 30);
        assert_eq!(compute_volume(Priority::Moderate, None), 40);
        assert_eq!(compute_volume(Priority::High, None), 60);
        assert_eq!(compute_volume(Priority::Emergency, None), 70);
    }

    #[test]
    fn should_use_override_only_when_below_seventy_and_non_zero() {
        assert_eq!(compute_volume(Priority::Low, Some(50)), 50);
        assert_eq!(compute_volume(Priority::Low, Some(0)), 30);
        assert_eq!(compute_volume(Priority::High, Some(70)), 60);
        assert_eq!(compute_volume(Priority::High, Some(95)), 60);
    }

    #[test]
    fn should_suppress_low_priority_during_quiet_hours() {
        assert!(!should_play(Priority::Moderate, 6));
        assert!(!should_play(Priority::Low, 22));
        assert!(should_play(Priority::High, 23));
        assert!(should_play(Priority::Low, 7));
        assert!(should_play(Priority::Moderate, 21));
    }

    #[test]
    fn should_normalize_delay_into_range() {
        assert_eq!(normalize_delay(None), 500);
        assert_eq!(normalize_delay(Some(0)), 500);
        assert_eq!(normalize_delay(Some(1500)), 500);
        assert_eq!(normalize_delay(Some(250)), 250);
    }

    // ── Topics and payloads ────────────────────────────────────────

    #[test]
    fn should_classify_mp3_content_as_clip() {
        assert_eq!(SpeechKind::of("joke_sting.MP3"), SpeechKind::Clip);
        assert_eq!(SpeechKind::of("Hello there"), SpeechKind::Speak);
    }

    #[test]
    fn should_build_room_and_broadcast_topics() {
        assert_eq!(topic_for("sonos/set", SpeechKind::Speak, "Kitchen"), "sonos/set/Kitchen/speak");
        assert_eq!(topic_for("sonos/set", SpeechKind::Clip, "Kitchen"), "sonos/set/Kitchen/notify");
        assert_eq!(topic_for("sonos/set", SpeechKind::Speak, ALL_ROOMS), "sonos/set/speak");
        assert_eq!(topic_for("sonos/set", SpeechKind::Clip, ALL_ROOMS), "sonos/set/notify");
    }

    #[test]
    fn should_build_speak_payload() {
        let payload = build_payload(SpeechKind::Speak, &fields("Hej"));
        assert_eq!(payload["text"], "Hej");
        assert_eq!(payload["endpoint"], "http://tts:5601/api/generate");
        assert_eq!(payload["lang"], "sv-SE");
        assert_eq!(payload["name"], "Elin");
        assert_eq!(payload["volume"], 40);
        assert_eq!(payload["delayMs"], 500);
        assert_eq!(payload["onlyWhenPlaying"], false);
        assert!(payload.get("timeout").is_none());
    }

    #[test]
    fn should_build_clip_payload_with_default_timeout() {
        let payload = build_payload(SpeechKind::Clip, &fields("sting.mp3"));
        assert_eq!(payload["trackUri"], "http://tts:5601/cache/sounds/sting.mp3");
        assert_eq!(payload["timeout"], 15);
        assert!(payload.get("text").is_none());
    }

    #[test]
    fn should_apply_timeout_override_only_within_range() {
        let mut f = fields("sting.mp3");
        f.timeout_secs = Some(30);
        assert_eq!(build_payload(SpeechKind::Clip, &f)["timeout"], 30);
        f.timeout_secs = Some(300);
        assert_eq!(build_payload(SpeechKind::Clip, &f)["timeout"], 15);
    }

    #[test]
    fn should_prepare_announcement_with_room_profile() {
        let mut settings = SpeechSettings::default();
        settings.rooms.insert(
            "Badrummet".to_string(),
            VoiceOptions {
                language: Some("en-GB".to_string()),
                ..VoiceOptions::default()
            },
        );
        let mut request = SpeechRequest::new("Fan started", Priority::High);
        request.room = Some("Badrummet".to_string());

        let announcement = prepare(&request, &settings, 12).unwrap();
        assert_eq!(announcement.topic, "sonos/set/Badrummet/speak");
        assert_eq!(announcement.payload["lang"], "en-GB");
        assert_eq!(announcement.payload["volume"], 60);
    }

    #[test]
    fn should_not_prepare_during_quiet_hours() {
        let request = SpeechRequest::new("Good night", Priority::Low);
        assert!(prepare(&request, &SpeechSettings::default(), 23).is_none());
    }
}
