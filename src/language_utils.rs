/*!
 * ISO 639 helpers for locale codes.
 *
 * Locales such as `en-US` are only inspected through their base language
 * component; the country part is ignored here.
 */

use isolang::Language;

/// ISO 639-2/B codes that differ from their ISO 639-2/T counterpart
const BIBLIOGRAPHIC_CODES: &[(&str, &str)] = &[
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("dut", "nld"),
    ("fre", "fra"),
    ("geo", "kat"),
    ("ger", "deu"),
    ("gre", "ell"),
    ("ice", "isl"),
    ("mac", "mkd"),
    ("may", "msa"),
    ("per", "fas"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

/// Base language component of a locale, e.g. `pt` for `pt-BR`
pub fn base_language<'a>(locale: &'a str, separator: &str) -> &'a str {
    if separator.is_empty() {
        return locale;
    }
    locale.split(separator).next().unwrap_or(locale)
}

fn lookup(code: &str) -> Option<Language> {
    let normalized = code.trim().to_lowercase();
    match normalized.len() {
        2 => Language::from_639_1(&normalized),
        3 => {
            let part2t = BIBLIOGRAPHIC_CODES
                .iter()
                .find(|(b, _)| *b == normalized)
                .map(|(_, t)| *t)
                .unwrap_or(&normalized);
            Language::from_639_3(part2t)
        }
        _ => None,
    }
}

/// Whether the base language of `locale` is a known ISO 639 code
pub fn is_iso_language(locale: &str, separator: &str) -> bool {
    lookup(base_language(locale, separator)).is_some()
}

/// English name of the base language of `locale`
pub fn language_name(locale: &str, separator: &str) -> Option<String> {
    lookup(base_language(locale, separator)).map(|lang| lang.to_name().to_string())
}
