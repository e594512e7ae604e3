//! Static voice catalog for the Edge read-aloud service.
//!
//! The catalog is the fixed set of free Chinese neural voices the service
//! exposes: Mandarin (zh-CN), Cantonese (zh-HK) and Taiwanese Mandarin
//! (zh-TW), male and female.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VoiceGender {
    Male,
    Female,
}

/// One catalog entry: display label plus the opaque provider voice id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceEntry {
    pub name: &'static str,
    pub id: &'static str,
    pub language: &'static str,
    pub gender: VoiceGender,
}

static VOICES: [VoiceEntry; 13] = [
    VoiceEntry { name: "晓晓 (female)", id: "zh-CN-XiaoxiaoNeural", language: "zh-CN", gender: VoiceGender::Female },
    VoiceEntry { name: "云希 (male)", id: "zh-CN-YunxiNeural", language: "zh-CN", gender: VoiceGender::Male },
    VoiceEntry { name: "云扬 (male)", id: "zh-CN-YunyangNeural", language: "zh-CN", gender: VoiceGender::Male },
    VoiceEntry { name: "云健 (male)", id: "zh-CN-YunjianNeural", language: "zh-CN", gender: VoiceGender::Male },
    VoiceEntry { name: "晓忆 (female)", id: "zh-CN-XiaoyiNeural", language: "zh-CN", gender: VoiceGender::Female },
    VoiceEntry { name: "云霞 (female)", id: "zh-CN-YunxiaNeural", language: "zh-CN", gender: VoiceGender::Female },
    VoiceEntry { name: "晓北 (female)", id: "zh-CN-XiaobeiNeural", language: "zh-CN", gender: VoiceGender::Female },
    VoiceEntry { name: "晓曼 (female, HK)", id: "zh-HK-HiuMaanNeural", language: "zh-HK", gender: VoiceGender::Female },
    VoiceEntry { name: "云龙 (male, HK)", id: "zh-HK-WanLungNeural", language: "zh-HK", gender: VoiceGender::Male },
    VoiceEntry { name: "晓佳 (female, HK)", id: "zh-HK-HiuGaaiNeural", language: "zh-HK", gender: VoiceGender::Female },
    VoiceEntry { name: "晓晨 (female, TW)", id: "zh-TW-HsiaoChenNeural", language: "zh-TW", gender: VoiceGender::Female },
    VoiceEntry { name: "云哲 (male, TW)", id: "zh-TW-YunJheNeural", language: "zh-TW", gender: VoiceGender::Male },
    VoiceEntry { name: "晓宇 (female, TW)", id: "zh-TW-HsiaoYuNeural", language: "zh-TW", gender: VoiceGender::Female },
];

/// All catalog voices, in display order.
pub fn all() -> &'static [VoiceEntry] {
    &VOICES
}

/// Look up a voice by provider id.
pub fn by_id(id: &str) -> Option<&'static VoiceEntry> {
    VOICES.iter().find(|v| v.id == id)
}

/// Look up a voice by the numeric key scheme of the one-shot script.
/// Unknown keys fall back to 云健 (zh-CN-YunjianNeural).
pub fn by_key(key: &str) -> &'static VoiceEntry {
    let id = match key {
        "1" => "zh-CN-XiaoxiaoNeural",
        "2" => "zh-CN-YunxiNeural",
        "3" => "zh-CN-YunyangNeural",
        "4" => "zh-CN-YunjianNeural",
        "5" => "zh-CN-XiaoyiNeural",
        "19" => "zh-CN-YunxiaNeural",
        "29" => "zh-CN-XiaobeiNeural",
        "37" => "zh-HK-HiuMaanNeural",
        "38" => "zh-HK-WanLungNeural",
        "39" => "zh-HK-HiuGaaiNeural",
        "40" => "zh-TW-HsiaoChenNeural",
        "41" => "zh-TW-YunJheNeural",
        "42" => "zh-TW-HsiaoYuNeural",
        _ => "zh-CN-YunjianNeural",
    };
    by_id(id).expect("catalog id")
}

/// The catalog default (first entry).
pub fn default_voice() -> &'static VoiceEntry {
    &VOICES[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_thirteen_voices() {
        assert_eq!(all().len(), 13);
    }

    #[test]
    fn catalog_spans_three_regions() {
        for lang in ["zh-CN", "zh-HK", "zh-TW"] {
            assert!(all().iter().any(|v| v.language == lang));
        }
    }

    #[test]
    fn lookup_by_id() {
        let voice = by_id("zh-HK-WanLungNeural").unwrap();
        assert_eq!(voice.gender, VoiceGender::Male);
        assert_eq!(voice.language, "zh-HK");
        assert!(by_id("zh-CN-NoSuchNeural").is_none());
    }

    #[test]
    fn numeric_key_lookup_with_fallback() {
        assert_eq!(by_key("5").id, "zh-CN-XiaoyiNeural");
        assert_eq!(by_key("40").id, "zh-TW-HsiaoChenNeural");
        // Unknown keys map to the documented default.
        assert_eq!(by_key("6").id, "zh-CN-YunjianNeural");
        assert_eq!(by_key("").id, "zh-CN-YunjianNeural");
    }

    #[test]
    fn default_voice_is_first_entry() {
        assert_eq!(default_voice().id, "zh-CN-XiaoxiaoNeural");
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in all().iter().enumerate() {
            for b in all().iter().skip(i + 1) {
                assert_ne!(a.id, b.id);
            }
        }
    }
}
