use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Default PCM rate of the speech model when the response mime does not say.
pub const DEFAULT_SPEECH_SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum AspectRatio {
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "16:9")]
    Wide,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "4:3")]
    Classic,
    #[serde(rename = "3:4")]
    ClassicPortrait,
}

impl AspectRatio {
    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Wide => "16:9",
            AspectRatio::Tall => "9:16",
            AspectRatio::Classic => "4:3",
            AspectRatio::ClassicPortrait => "3:4",
        }
    }
}

impl Display for AspectRatio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd720,
    #[serde(rename = "1080p")]
    Hd1080,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Hd720 => "720p",
            Resolution::Hd1080 => "1080p",
        }
    }
}

impl Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VoiceOption {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// The prebuilt voice catalog offered by the speech model.
pub const VOICES: [VoiceOption; 5] = [
    VoiceOption {
        id: "Kore",
        name: "Kore",
        description: "Deep & Professional",
    },
    VoiceOption {
        id: "Puck",
        name: "Puck",
        description: "Energetic & Youthful",
    },
    VoiceOption {
        id: "Charon",
        name: "Charon",
        description: "Calm & Wise",
    },
    VoiceOption {
        id: "Fenrir",
        name: "Fenrir",
        description: "Strong & Narrative",
    },
    VoiceOption {
        id: "Zephyr",
        name: "Zephyr",
        description: "Friendly & Bright",
    },
];

pub fn is_known_voice(voice_id: &str) -> bool {
    VOICES.iter().any(|voice| voice.id == voice_id)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRequest {
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub resolution: Resolution,
}

/// Raw decoded speech samples as returned by the generation API: signed
/// 16-bit little-endian PCM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub pcm: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl SpeechAudio {
    /// Wraps the PCM samples in a RIFF/WAVE container for download.
    pub fn to_wav(&self) -> Vec<u8> {
        const BITS_PER_SAMPLE: u16 = 16;

        let data_len = self.pcm.len() as u32;
        let block_align = self.channels * (BITS_PER_SAMPLE / 8);
        let byte_rate = self.sample_rate * u32::from(block_align);

        let mut out = Vec::with_capacity(44 + self.pcm.len());
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out.extend_from_slice(b"fmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        // PCM format tag.
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.sample_rate.to_le_bytes());
        out.extend_from_slice(&byte_rate.to_le_bytes());
        out.extend_from_slice(&block_align.to_le_bytes());
        out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        out.extend_from_slice(&self.pcm);
        out
    }
}

/// One inline image payload from the generation API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// An in-flight video render job on the remote API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoOperation {
    pub name: String,
    pub done: bool,
    pub result_uri: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wav_header_describes_the_pcm_payload() {
        let audio = SpeechAudio {
            pcm: vec![0u8; 480],
            sample_rate: 24_000,
            channels: 1,
        };

        let wav = audio.to_wav();

        assert_eq!(wav.len(), 44 + 480);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // chunk size = 36 + data length
        assert_eq!(u32::from_le_bytes(wav[4..8].try_into().unwrap()), 36 + 480);
        // mono, 24 kHz, 16-bit
        assert_eq!(u16::from_le_bytes(wav[22..24].try_into().unwrap()), 1);
        assert_eq!(
            u32::from_le_bytes(wav[24..28].try_into().unwrap()),
            24_000
        );
        assert_eq!(
            u32::from_le_bytes(wav[28..32].try_into().unwrap()),
            24_000 * 2
        );
        assert_eq!(u16::from_le_bytes(wav[34..36].try_into().unwrap()), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32::from_le_bytes(wav[40..44].try_into().unwrap()), 480);
    }

    #[test]
    fn aspect_ratios_and_resolutions_serialize_as_api_strings() {
        assert_eq!(
            serde_json::to_string(&AspectRatio::Wide).unwrap(),
            "\"16:9\""
        );
        assert_eq!(
            serde_json::from_str::<AspectRatio>("\"9:16\"").unwrap(),
            AspectRatio::Tall
        );
        assert_eq!(
            serde_json::to_string(&Resolution::Hd1080).unwrap(),
            "\"1080p\""
        );
    }

    #[test]
    fn voice_catalog_lookup() {
        assert!(is_known_voice("Kore"));
        assert!(is_known_voice("Zephyr"));
        assert!(!is_known_voice("NotAVoice"));
    }
}
