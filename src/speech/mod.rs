pub mod azure;
pub mod store;

pub use azure::{
    AzureEndpoints,
    AzureSpeech,
    RetryPolicy,
};
pub use store::AudioStore;

use rand::seq::IndexedRandom;

use crate::core::utils::escape_xml;

/// Turns a sentence into an audio file and returns the file name.
/// Failures are reported as `None`; callers treat audio as optional.
pub trait SpeechSynthesizer {
    fn synthesize(&mut self, text: &str, language: &str) -> Option<String>;
}

/// A regional variant of a language and the neural voices available for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceFamily {
    pub locale: &'static str,
    pub voices: &'static [&'static str],
}

const GERMAN: &[VoiceFamily] = &[
    VoiceFamily { locale: "de-DE", voices: &["de-DE-ConradNeural", "de-DE-KatjaNeural"] },
    VoiceFamily { locale: "de-AT", voices: &["de-AT-JonasNeural", "de-AT-IngridNeural"] },
    VoiceFamily { locale: "de-CH", voices: &["de-CH-LeniNeural", "de-CH-JanNeural"] },
];

const SPANISH: &[VoiceFamily] = &[
    VoiceFamily { locale: "es-ES", voices: &["es-ES-AlvaroNeural", "es-ES-ElviraNeural"] },
    VoiceFamily { locale: "es-MX", voices: &["es-MX-JorgeNeural", "es-MX-DaliaNeural"] },
];

const ENGLISH: &[VoiceFamily] = &[
    VoiceFamily { locale: "en-US", voices: &["en-US-GuyNeural", "en-US-JennyNeural"] },
    VoiceFamily { locale: "en-GB", voices: &["en-GB-RyanNeural", "en-GB-SoniaNeural"] },
];

pub fn voice_families(language: &str) -> &'static [VoiceFamily] {
    match language {
        "de" => GERMAN,
        "es" => SPANISH,
        "en" => ENGLISH,
        _ => &[],
    }
}

/// Picks a random regional variant, then a random voice inside it.
pub fn choose_voice(language: &str) -> Option<(&'static str, &'static str)> {
    let mut rng = rand::rng();
    let family = voice_families(language).choose(&mut rng)?;
    let voice = family.voices.choose(&mut rng)?;
    Some((family.locale, *voice))
}

pub fn build_ssml(locale: &str, voice: &str, text: &str) -> String {
    format!(
        concat!(
            r#"<speak version="1.0" xml:lang="{locale}">"#,
            r#"<voice xml:lang="{locale}" name="{voice}">"#,
            r#"<prosody rate="0%" pitch="0%">{text}</prosody>"#,
            "</voice></speak>"
        ),
        locale = escape_xml(locale),
        voice = escape_xml(voice),
        text = escape_xml(text),
    )
}
