use anyhow::{Result, anyhow};
use isolang::Language;
use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Language utilities for ISO language code handling
///
/// This module validates and normalizes ISO 639-1 (2-letter) and ISO 639-2
/// (3-letter) codes, and maps them onto the codes the DeepL API expects.
/// Language code type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

/// ISO 639-2/B codes that differ from their 639-2/T form
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Languages DeepL accepts for glossaries, as DeepL base codes
static GLOSSARY_LANGUAGES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "AR", "BG", "CS", "DA", "DE", "EL", "EN", "ES", "ET", "FI", "FR", "HU", "ID", "IT", "JA",
        "KO", "LT", "LV", "NB", "NL", "PL", "PT", "RO", "RU", "SK", "SL", "SV", "TR", "UK", "ZH",
    ]
    .into_iter()
    .collect()
});

fn bibliographic_to_terminologic(code: &str) -> Option<&'static str> {
    BIBLIOGRAPHIC_CODES
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    match normalized_code.len() {
        2 if Language::from_639_1(&normalized_code).is_some() => Ok(LanguageCodeType::Part1),
        3 if Language::from_639_3(&normalized_code).is_some() => Ok(LanguageCodeType::Part2T),
        3 if bibliographic_to_terminologic(&normalized_code).is_some() => Ok(LanguageCodeType::Part2B),
        _ => Err(anyhow!("Invalid language code: {}", code)),
    }
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = bibliographic_to_terminologic(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Normalize a language code to ISO 639-1 (2-letter) format if possible
/// Falls back to ISO 639-2/T if no ISO 639-1 code exists
pub fn normalize_to_part1_or_part2t(code: &str) -> Result<String> {
    let part2t = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&part2t)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", part2t))?;

    Ok(lang.to_639_1().map(str::to_string).unwrap_or(part2t))
}

/// Check if two language codes match (represent the same language)
pub fn language_codes_match(code1: &str, code2: &str) -> bool {
    match (normalize_to_part2t(code1), normalize_to_part2t(code2)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

// ============================================================================
// DeepL code mapping
// ============================================================================

/// Base DeepL code: uppercase ISO 639-1, with Norwegian folded into `NB`
fn deepl_base_code(code: &str) -> Result<String> {
    let part1 = normalize_to_part1_or_part2t(code)?;
    if part1.len() != 2 {
        return Err(anyhow!("Language has no DeepL code: {}", code));
    }

    let base = match part1.as_str() {
        "no" | "nn" => "nb".to_string(),
        other => other.to_string(),
    };
    Ok(base.to_uppercase())
}

/// DeepL source language code; sources never carry a regional variant
pub fn to_deepl_source_code(code: &str) -> Result<String> {
    deepl_base_code(code)
}

/// DeepL target language code, with the regional variant DeepL requires
pub fn to_deepl_target_code(code: &str) -> Result<String> {
    let base = deepl_base_code(code)?;
    Ok(match base.as_str() {
        "EN" => "EN-US".to_string(),
        "PT" => "PT-BR".to_string(),
        "ZH" => "ZH-HANS".to_string(),
        _ => base,
    })
}

/// Code for a glossary language pair; glossaries take base languages only
pub fn to_deepl_glossary_code(code: &str) -> Result<String> {
    let head = code.trim().split(['-', '_']).next().unwrap_or_default();
    deepl_base_code(head)
}

/// Whether DeepL accepts glossaries from `source` to `target`
pub fn supports_glossary(source: &str, target: &str) -> bool {
    let (Ok(src), Ok(tgt)) = (to_deepl_glossary_code(source), to_deepl_glossary_code(target)) else {
        return false;
    };

    src != tgt && GLOSSARY_LANGUAGES.contains(src.as_str()) && GLOSSARY_LANGUAGES.contains(tgt.as_str())
}
