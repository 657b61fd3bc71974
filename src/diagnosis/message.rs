use crate::diagnosis::annotator::Annotation;
use crate::diagnosis::diagnosis::Diagnosis;
use itertools::Itertools;
use std::fmt;
use std::str::FromStr;

/// Languages the result can be announced in.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Language {
    #[default]
    English,
    Tamil,
    Hindi,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Tamil => "ta",
            Language::Hindi => "hi",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "en" | "english" => Ok(Language::English),
            "ta" | "tamil" => Ok(Language::Tamil),
            "hi" | "hindi" => Ok(Language::Hindi),
            other => Err(format!(
                "Unsupported language '{}', expected one of en, ta, hi.",
                other
            )),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn headline(diagnosis: Diagnosis, focused: bool, language: Language) -> &'static str {
    match (language, focused, diagnosis) {
        (Language::English, false, Diagnosis::CavityDetected) => "Cavity Detected",
        (Language::English, false, Diagnosis::NoCavityFound) => "No Cavity Detected",
        (Language::English, true, Diagnosis::CavityDetected) => "Cavity found in selected area",
        (Language::English, true, Diagnosis::NoCavityFound) => {
            "No cavity detected near your selection"
        }
        (Language::Tamil, false, Diagnosis::CavityDetected) => "பல் சொத்தை கண்டறியப்பட்டது",
        (Language::Tamil, false, Diagnosis::NoCavityFound) => "பல் சொத்தை இல்லை",
        (Language::Tamil, true, Diagnosis::CavityDetected) => {
            "தேர்ந்தெடுத்த பகுதியில் பல் சொத்தை கண்டறியப்பட்டது"
        }
        (Language::Tamil, true, Diagnosis::NoCavityFound) => {
            "தேர்ந்தெடுத்த பகுதிக்கு அருகில் பல் சொத்தை இல்லை"
        }
        (Language::Hindi, false, Diagnosis::CavityDetected) => "कैविटी पाई गई",
        (Language::Hindi, false, Diagnosis::NoCavityFound) => "कोई कैविटी नहीं मिली",
        (Language::Hindi, true, Diagnosis::CavityDetected) => "चयनित क्षेत्र में कैविटी पाई गई",
        (Language::Hindi, true, Diagnosis::NoCavityFound) => "आपके चयन के पास कोई कैविटी नहीं मिली",
    }
}

fn announcement_prefix(language: Language) -> &'static str {
    match language {
        Language::English => "Diagnosis is",
        Language::Tamil => "நோயறிதல்",
        Language::Hindi => "निदान है",
    }
}

/// The human-readable result handed to the display, speech and mail collaborators.
#[derive(Clone, Debug, PartialEq)]
pub struct DiagnosisMessage {
    pub language: Language,
    pub headline: String,
    pub announcement: String,
    /// One `label (confidence)` line per qualifying detection.
    pub findings: Vec<String>,
}

impl DiagnosisMessage {
    pub fn new(annotation: &Annotation, language: Language) -> Self {
        let headline = headline(annotation.diagnosis, annotation.is_focused(), language);
        DiagnosisMessage {
            language,
            headline: headline.to_string(),
            announcement: format!("{}: {}", announcement_prefix(language), headline),
            findings: annotation.qualifying.iter().map(|d| d.label()).collect(),
        }
    }

    pub fn findings_text(&self) -> String {
        self.findings.iter().join(", ")
    }
}

impl fmt::Display for DiagnosisMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.findings.is_empty() {
            write!(f, "{}", self.headline)
        } else {
            write!(f, "{} [{}]", self.headline, self.findings_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::detection::Detection;
    use crate::annotations::focus_region::FocusRegion;
    use crate::annotations::point::Point;

    fn annotation(diagnosis: Diagnosis, focused: bool) -> Annotation {
        let qualifying = match diagnosis {
            Diagnosis::CavityDetected => {
                vec![Detection::from_center(5.0, 5.0, 2.0, 2.0, "Cavity", 0.876).unwrap()]
            }
            Diagnosis::NoCavityFound => vec![],
        };
        Annotation {
            diagnosis,
            qualifying,
            focus: focused.then(|| FocusRegion::new(Point::new(0.0, 0.0))),
        }
    }

    #[test]
    fn whole_image_wording() {
        let msg = DiagnosisMessage::new(&annotation(Diagnosis::CavityDetected, false), Language::English);
        assert_eq!(msg.headline, "Cavity Detected");
        assert_eq!(msg.announcement, "Diagnosis is: Cavity Detected");
        assert_eq!(msg.findings, vec!["Cavity (0.88)".to_string()]);
        assert_eq!(msg.to_string(), "Cavity Detected [Cavity (0.88)]");

        let msg = DiagnosisMessage::new(&annotation(Diagnosis::NoCavityFound, false), Language::English);
        assert_eq!(msg.headline, "No Cavity Detected");
        assert_eq!(msg.to_string(), "No Cavity Detected");
    }

    #[test]
    fn focus_mode_wording() {
        let msg = DiagnosisMessage::new(&annotation(Diagnosis::CavityDetected, true), Language::English);
        assert_eq!(msg.headline, "Cavity found in selected area");
        let msg = DiagnosisMessage::new(&annotation(Diagnosis::NoCavityFound, true), Language::English);
        assert_eq!(msg.headline, "No cavity detected near your selection");
    }

    #[test]
    fn localized_announcements_differ() {
        let ann = annotation(Diagnosis::NoCavityFound, false);
        let en = DiagnosisMessage::new(&ann, Language::English);
        let ta = DiagnosisMessage::new(&ann, Language::Tamil);
        let hi = DiagnosisMessage::new(&ann, Language::Hindi);
        assert_ne!(en.headline, ta.headline);
        assert_ne!(en.headline, hi.headline);
        assert!(hi.announcement.ends_with(&hi.headline));
        assert_eq!(ta.language.code(), "ta");
    }

    #[test]
    fn parses_language_codes() {
        assert_eq!("en".parse::<Language>(), Ok(Language::English));
        assert_eq!(" TA ".parse::<Language>(), Ok(Language::Tamil));
        assert_eq!("hindi".parse::<Language>(), Ok(Language::Hindi));
        assert!("fr".parse::<Language>().is_err());
    }
}
