/*!
 * Tests for language utility functions
 */

use termguard::language_utils::{
    get_language_name, language_codes_match, normalize_to_part1_or_part2t, supports_glossary,
    to_deepl_glossary_code, to_deepl_source_code, to_deepl_target_code, validate_language_code,
    LanguageCodeType,
};

/// Test validation of language codes
#[test]
fn test_validateLanguageCode_withValidCodes_shouldReturnCorrectType() {
    assert_eq!(validate_language_code("en").unwrap(), LanguageCodeType::Part1);
    assert_eq!(validate_language_code(" ENG ").unwrap(), LanguageCodeType::Part2T);
    assert_eq!(validate_language_code("fre").unwrap(), LanguageCodeType::Part2B);

    assert!(validate_language_code("qqq").is_err());
    assert!(validate_language_code("123").is_err());
    assert!(validate_language_code("e").is_err());
}

#[test]
fn test_normalizeToPart1OrPart2t_shouldPreferTwoLetterCodes() {
    assert_eq!(normalize_to_part1_or_part2t("eng").unwrap(), "en");
    assert_eq!(normalize_to_part1_or_part2t("fre").unwrap(), "fr");
    assert_eq!(normalize_to_part1_or_part2t("DE").unwrap(), "de");
    assert!(language_codes_match("fr", "fre"));
    assert_eq!(get_language_name("deu").unwrap(), "German");
}

/// Source codes never carry a region, target codes get DeepL's defaults
#[test]
fn test_deeplCodes_shouldDifferBetweenSourceAndTarget() {
    assert_eq!(to_deepl_source_code("eng").unwrap(), "EN");
    assert_eq!(to_deepl_target_code("eng").unwrap(), "EN-US");
    assert_eq!(to_deepl_source_code("pt").unwrap(), "PT");
    assert_eq!(to_deepl_target_code("pt").unwrap(), "PT-BR");
    assert_eq!(to_deepl_target_code("fr").unwrap(), "FR");
}

#[test]
fn test_toDeeplGlossaryCode_withRegionalCode_shouldUseBaseLanguage() {
    assert_eq!(to_deepl_glossary_code("EN-GB").unwrap(), "EN");
    assert_eq!(to_deepl_glossary_code("zh-hans").unwrap(), "ZH");
    assert!(to_deepl_glossary_code("").is_err());
}

#[test]
fn test_supportsGlossary_shouldCheckBothSides() {
    assert!(supports_glossary("de", "fr"));
    assert!(supports_glossary("ja", "en"));
    assert!(!supports_glossary("de", "de"));
    assert!(!supports_glossary("sw", "en"));
}
