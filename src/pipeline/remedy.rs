//! Static disease knowledge base: symptoms, remedies, prevention and
//! localized display names.
//!
//! Unrecognized disease labels degrade to the `Healthy` entry instead of
//! failing — the caller always gets an actionable, if generic, answer.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Default and fallback language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Languages the translation table covers.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "te", "hi"];

/// Remedy key every unknown disease label resolves to.
const FALLBACK_DISEASE: &str = "Healthy";

/// Guidance for one disease class. Lists keep their curated order.
#[derive(Debug)]
pub struct RemedyEntry {
    pub symptoms: &'static [&'static str],
    pub remedies: &'static [&'static str],
    pub prevention: &'static [&'static str],
}

static DISEASE_REMEDIES: LazyLock<HashMap<&'static str, RemedyEntry>> = LazyLock::new(|| {
    let mut table = HashMap::new();
    table.insert(
        "Early_Blight",
        RemedyEntry {
            symptoms: &[
                "Brown spots on lower leaves",
                "Concentric rings on spots",
                "Yellow halo around spots",
            ],
            remedies: &[
                "Remove infected leaves",
                "Apply copper fungicide spray",
                "Improve air circulation",
                "Water at soil level to keep leaves dry",
                "Avoid overhead watering",
            ],
            prevention: &[
                "Space plants properly",
                "Use disease-resistant varieties",
                "Practice crop rotation",
                "Mulch soil to prevent spores from splashing",
                "Remove plant debris",
            ],
        },
    );
    table.insert(
        "Late_Blight",
        RemedyEntry {
            symptoms: &[
                "Water-soaked spots on leaves and stems",
                "White mold on leaf undersides",
                "Soft rot on fruits",
            ],
            remedies: &[
                "Remove infected plant parts immediately",
                "Apply mancozeb or chlorothalonil fungicide",
                "Improve air circulation",
                "Reduce moisture on plants",
                "Avoid overhead irrigation",
            ],
            prevention: &[
                "Plant resistant varieties",
                "Use disease-free seed potatoes",
                "Practice crop rotation",
                "Monitor weather for high humidity",
                "Remove volunteer potato plants",
            ],
        },
    );
    table.insert(
        "Powdery_Mildew",
        RemedyEntry {
            symptoms: &[
                "White powdery coating on leaves",
                "Yellowing of affected leaves",
                "Leaf curling",
            ],
            remedies: &[
                "Apply sulfur dust or spray",
                "Use potassium bicarbonate fungicide",
                "Increase air circulation",
                "Remove heavily infected leaves",
                "Avoid high nitrogen fertilizer",
            ],
            prevention: &[
                "Plant in well-ventilated areas",
                "Choose resistant varieties",
                "Maintain proper spacing",
                "Avoid overhead watering",
                "Clean up plant debris",
            ],
        },
    );
    table.insert(
        "Leaf_Rust",
        RemedyEntry {
            symptoms: &[
                "Orange-brown pustules on leaf undersides",
                "Yellow spots on upper leaf surface",
                "Severe leaf drop",
            ],
            remedies: &[
                "Apply fungicide containing sulfur or copper",
                "Remove infected leaves",
                "Improve plant spacing for air flow",
                "Avoid overhead irrigation",
                "Apply mancozeb fungicide",
            ],
            prevention: &[
                "Use resistant varieties",
                "Practice crop rotation",
                "Remove alternate hosts",
                "Maintain sanitation",
                "Monitor plants regularly",
            ],
        },
    );
    table.insert(
        "Septoria_Leaf_Spot",
        RemedyEntry {
            symptoms: &[
                "Small circular spots with dark borders",
                "Gray center with black dots",
                "Spot coalescence",
            ],
            remedies: &[
                "Remove infected leaves",
                "Apply chlorothalonil fungicide",
                "Space plants properly",
                "Avoid splashing soil onto leaves",
                "Water at soil level",
            ],
            prevention: &[
                "Use disease-resistant varieties",
                "Practice crop rotation",
                "Remove plant debris",
                "Avoid overhead watering",
                "Improve air circulation",
            ],
        },
    );
    table.insert(
        FALLBACK_DISEASE,
        RemedyEntry {
            symptoms: &["No disease signs present"],
            remedies: &[
                "Continue regular maintenance",
                "Monitor plant health",
                "Practice preventive care",
            ],
            prevention: &[
                "Maintain proper watering",
                "Ensure adequate spacing",
                "Provide proper nutrition",
                "Monitor for early disease signs",
            ],
        },
    );
    table
});

static TRANSLATIONS: LazyLock<HashMap<&'static str, HashMap<&'static str, &'static str>>> =
    LazyLock::new(|| {
        let mut en = HashMap::new();
        en.insert("Early_Blight", "Early Blight");
        en.insert("Late_Blight", "Late Blight");
        en.insert("Powdery_Mildew", "Powdery Mildew");
        en.insert("Leaf_Rust", "Leaf Rust");
        en.insert("Septoria_Leaf_Spot", "Septoria Leaf Spot");
        en.insert("Healthy", "Healthy");

        // Telugu
        let mut te = HashMap::new();
        te.insert("Early_Blight", "తొలి ఫాతు");
        te.insert("Late_Blight", "చివరి ఫాతు");
        te.insert("Powdery_Mildew", "పౌడర్ మిల్డ్యూ");
        te.insert("Leaf_Rust", "ఆకు తుప్పు");
        te.insert("Septoria_Leaf_Spot", "సెప్టోరియా ఆకు చుక్క");
        te.insert("Healthy", "ఆరోగ్యం");

        // Hindi
        let mut hi = HashMap::new();
        hi.insert("Early_Blight", "प्रारंभिक झुलसा");
        hi.insert("Late_Blight", "देर से झुलसा");
        hi.insert("Powdery_Mildew", "पाउडर फफूंदी");
        hi.insert("Leaf_Rust", "पत्ती की जंग");
        hi.insert("Septoria_Leaf_Spot", "सेप्टोरिया पत्ती धब्बा");
        hi.insert("Healthy", "स्वस्थ");

        let mut table = HashMap::new();
        table.insert("en", en);
        table.insert("te", te);
        table.insert("hi", hi);
        table
    });

/// Guidance for a disease label. Unknown labels get the `Healthy` entry.
///
/// Matching tolerates case differences so labels from differently-cased
/// model exports still resolve.
pub fn lookup(disease: &str) -> &'static RemedyEntry {
    resolve_key(disease)
        .and_then(|key| DISEASE_REMEDIES.get(key))
        .or_else(|| DISEASE_REMEDIES.get(FALLBACK_DISEASE))
        .expect("remedy table always contains the fallback entry")
}

/// The remedies list alone, owned — this is what the detect response carries.
pub fn remedies_list(disease: &str) -> Vec<String> {
    lookup(disease)
        .remedies
        .iter()
        .map(|r| (*r).to_string())
        .collect()
}

/// Coerce a requested language to a supported one.
pub fn validate_language(language: &str) -> &'static str {
    SUPPORTED_LANGUAGES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(language))
        .copied()
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Localized display name for a disease label.
///
/// Unsupported languages fall back to English; a known language with an
/// unknown disease returns the raw label unchanged.
pub fn translate(disease: &str, language: &str) -> String {
    let table = TRANSLATIONS
        .get(validate_language(language))
        .expect("translation table covers every supported language");

    resolve_key(disease)
        .and_then(|key| table.get(key))
        .map(|name| (*name).to_string())
        .unwrap_or_else(|| disease.to_string())
}

/// All disease labels the knowledge base covers.
pub fn known_diseases() -> impl Iterator<Item = &'static str> {
    DISEASE_REMEDIES.keys().copied()
}

/// Canonical table key for a raw label, if one matches.
fn resolve_key(disease: &str) -> Option<&'static str> {
    DISEASE_REMEDIES
        .keys()
        .find(|key| key.eq_ignore_ascii_case(disease))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_disease_has_remedies() {
        for disease in known_diseases() {
            let entry = lookup(disease);
            assert!(!entry.symptoms.is_empty(), "{disease} has no symptoms");
            assert!(!entry.remedies.is_empty(), "{disease} has no remedies");
            assert!(!entry.prevention.is_empty(), "{disease} has no prevention");
        }
    }

    #[test]
    fn unknown_disease_degrades_to_healthy() {
        let unknown = lookup("Mystery_Wilt");
        let healthy = lookup("Healthy");
        assert_eq!(unknown.remedies, healthy.remedies);
        assert_eq!(remedies_list("Mystery_Wilt"), remedies_list("Healthy"));
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let lower = lookup("early_blight");
        let canonical = lookup("Early_Blight");
        assert_eq!(lower.remedies, canonical.remedies);
        assert_ne!(lower.remedies, lookup("Healthy").remedies);
    }

    #[test]
    fn translate_covers_all_languages_and_diseases() {
        for lang in SUPPORTED_LANGUAGES {
            for disease in known_diseases() {
                let name = translate(disease, lang);
                assert!(!name.is_empty(), "{lang}/{disease} translated to empty");
            }
        }
    }

    #[test]
    fn unsupported_language_behaves_as_english() {
        assert_eq!(validate_language("fr"), "en");
        assert_eq!(translate("Early_Blight", "fr"), translate("Early_Blight", "en"));
        assert_eq!(translate("Early_Blight", "en"), "Early Blight");
    }

    #[test]
    fn unknown_disease_in_known_language_returns_raw_label() {
        assert_eq!(translate("Mystery_Wilt", "te"), "Mystery_Wilt");
    }

    #[test]
    fn telugu_and_hindi_differ_from_english() {
        assert_ne!(translate("Leaf_Rust", "te"), translate("Leaf_Rust", "en"));
        assert_ne!(translate("Leaf_Rust", "hi"), translate("Leaf_Rust", "en"));
    }
}
