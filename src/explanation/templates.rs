//! Sentence templates for the deterministic base explanation
//!
//! One template set per supported language, with `{crop}` and `{ph}`
//! placeholders. Unknown languages fall back to English upstream in
//! `Language::from_code`.

use crate::llm::Language;

/// Localized sentence templates for one language
#[derive(Debug, Clone, Copy)]
pub struct SentenceTemplates {
    /// Sentence 1: soil suitability, takes `{ph}` and `{crop}`.
    pub soil: &'static str,
    /// Sentence 2: historical/model basis, takes `{crop}`.
    pub basis: &'static str,
    /// Addendum when the model was highly confident (> 0.8).
    pub high_confidence: &'static str,
    /// Addendum when the model was moderately confident (>= 0.5).
    pub moderate_confidence: &'static str,
    /// Addendum when low confidence routed to the agronomic rule.
    pub low_confidence_fallback: &'static str,
    /// Addendum when a classifier failure routed to the agronomic rule.
    pub error_fallback: &'static str,
}

const EN: SentenceTemplates = SentenceTemplates {
    soil: "Soil pH {ph} is suitable for {crop}.",
    basis: "Based on similar soil conditions in historical data, {crop} is recommended.",
    high_confidence: "The model is highly confident in this recommendation.",
    moderate_confidence: "The model is moderately confident in this recommendation.",
    low_confidence_fallback: "Model confidence was low, so a standard agronomic rule was applied.",
    error_fallback: "This recommendation was made using a standard agronomic rule.",
};

const HI: SentenceTemplates = SentenceTemplates {
    soil: "मिट्टी का pH {ph} {crop} के लिए उपयुक्त है।",
    basis: "ऐतिहासिक डेटा के आधार पर {crop} की सिफारिश की जाती है।",
    high_confidence: "मॉडल को इस सिफारिश पर उच्च विश्वास है।",
    moderate_confidence: "मॉडल को इस सिफारिश पर मध्यम विश्वास है।",
    low_confidence_fallback: "मॉडल का विश्वास कम था, इसलिए मानक कृषि नियम लागू किया गया।",
    error_fallback: "यह सिफारिश मानक कृषि नियम के आधार पर की गई है।",
};

const MR: SentenceTemplates = SentenceTemplates {
    soil: "जमिनीचा पीएच {ph} {crop} साठी योग्य आहे.",
    basis: "ऐतिहासिक डेटावर आधारित, {crop} शिफारस केली जाते.",
    high_confidence: "मॉडेलला या शिफारशीवर उच्च विश्वास आहे.",
    moderate_confidence: "मॉडेलला या शिफारशीवर मध्यम विश्वास आहे.",
    low_confidence_fallback: "मॉडेलचा विश्वास कमी होता, म्हणून प्रमाणित कृषी नियम वापरला गेला.",
    error_fallback: "ही शिफारस प्रमाणित कृषी नियमाच्या आधारे केली आहे.",
};

const GU: SentenceTemplates = SentenceTemplates {
    soil: "જમીનનો pH {ph} {crop} માટે યોગ્ય છે.",
    basis: "ઇતિહાસિક ડેટાના આધાર પર {crop} ભલામણ કરવામાં આવે છે.",
    high_confidence: "મોડેલને આ ભલામણ પર ઉચ્ચ વિશ્વાસ છે.",
    moderate_confidence: "મોડેલને આ ભલામણ પર મધ્યમ વિશ્વાસ છે.",
    low_confidence_fallback: "મોડેલનો વિશ્વાસ ઓછો હતો, તેથી પ્રમાણભૂત કૃષિ નિયમ લાગુ કરવામાં આવ્યો.",
    error_fallback: "આ ભલામણ પ્રમાણભૂત કૃષિ નિયમના આધારે કરવામાં આવી છે.",
};

/// Template set for a language.
pub fn lookup_templates(lang: Language) -> &'static SentenceTemplates {
    match lang {
        Language::En => &EN,
        Language::Hi => &HI,
        Language::Mr => &MR,
        Language::Gu => &GU,
    }
}

/// Substitute `{crop}` and `{ph}` placeholders in one template.
pub fn render(template: &str, crop: &str, soil_ph: Option<f64>) -> String {
    let ph_text = match soil_ph {
        Some(ph) => format!("{ph}"),
        None => "-".to_string(),
    };
    template.replace("{crop}", crop).replace("{ph}", &ph_text)
}
