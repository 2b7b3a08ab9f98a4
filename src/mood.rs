use serde::{Deserialize, Serialize};

pub type RgbColor = (u8, u8, u8);

pub const NEUTRAL_MOOD: &str = "neutral";

/// Fixed mood vocabulary used for marker styling. `Unknown` carries the palette default.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Neutral,
    Tired,
    Stressed,
    Sad,
    Angry,
    Excited,
    Unknown,
}

impl Mood {
    pub fn from_label(label: &str) -> Mood {
        match label.trim().to_lowercase().as_str() {
            "happy" => Mood::Happy,
            "calm" => Mood::Calm,
            "neutral" => Mood::Neutral,
            "tired" => Mood::Tired,
            "stressed" | "anxious" => Mood::Stressed,
            "sad" => Mood::Sad,
            "angry" => Mood::Angry,
            "excited" => Mood::Excited,
            _ => Mood::Unknown,
        }
    }

    pub fn color(&self) -> RgbColor {
        match self {
            Mood::Happy => (255, 214, 0),
            Mood::Calm => (77, 182, 172),
            Mood::Neutral => (158, 158, 158),
            Mood::Tired => (121, 134, 203),
            Mood::Stressed => (255, 112, 67),
            Mood::Sad => (66, 165, 245),
            Mood::Angry => (229, 57, 53),
            Mood::Excited => (236, 64, 122),
            Mood::Unknown => (189, 189, 189),
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Mood::Happy => "😊",
            Mood::Calm => "😌",
            Mood::Neutral => "😐",
            Mood::Tired => "😴",
            Mood::Stressed => "😰",
            Mood::Sad => "😢",
            Mood::Angry => "😠",
            Mood::Excited => "🤩",
            Mood::Unknown => "🙂",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_parse_case_insensitively() {
        assert_eq!(Mood::from_label("Happy"), Mood::Happy);
        assert_eq!(Mood::from_label(" SAD "), Mood::Sad);
    }

    #[test]
    fn anxious_shares_stressed_styling() {
        let anxious = Mood::from_label("anxious");
        assert_eq!(anxious, Mood::Stressed);
        assert_eq!(anxious.color(), Mood::Stressed.color());
    }

    #[test]
    fn unrecognized_label_uses_default() {
        let mood = Mood::from_label("melancholic");
        assert_eq!(mood, Mood::Unknown);
        assert_eq!(mood.emoji(), "🙂");
    }
}
