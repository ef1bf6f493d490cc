//! Evasion JavaScript injected before any page script runs.
//! Based on puppeteer-extra-plugin-stealth techniques.

const STEALTH_SCRIPTS: &[&str] = &[
    // Remove webdriver property
    r#"
    Object.defineProperty(navigator, 'webdriver', {
        get: () => undefined,
        configurable: true
    });
    "#,
    // Fix chrome object
    r#"
    window.chrome = window.chrome || { runtime: {}, loadTimes: function() {}, csi: function() {}, app: {} };
    "#,
    // Fix plugins
    r#"
    Object.defineProperty(navigator, 'plugins', {
        get: () => [
            { name: 'Chrome PDF Plugin', filename: 'internal-pdf-viewer', description: 'Portable Document Format' },
            { name: 'Chrome PDF Viewer', filename: 'mhjfbmdgcfjbbpaeojofohoefgiehjai', description: '' }
        ],
        configurable: true
    });
    "#,
    // Remove automation-related properties
    r#"
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Array;
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Promise;
    delete window.cdc_adoQpoasnfa76pfcZLmcfl_Symbol;
    "#,
];

/// Build the combined evasion script for a session locale.
///
/// `navigator.languages` is pinned to the locale so it agrees with the
/// Accept-Language header sent by the same session.
pub fn stealth_script(locale: &str) -> String {
    let mut languages = vec![locale.to_string()];
    if let Some((lang, _)) = locale.split_once('-') {
        languages.push(lang.to_string());
    }
    let languages = serde_json::to_string(&languages).unwrap_or_else(|_| "['en']".to_string());

    let mut script = STEALTH_SCRIPTS.join("\n");
    script.push_str(&format!(
        "\nObject.defineProperty(navigator, 'languages', {{ get: () => {languages}, configurable: true }});\n"
    ));
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_languages_follow_locale() {
        let script = stealth_script("en-IN");
        assert!(script.contains(r#"["en-IN","en"]"#));
        assert!(script.contains("webdriver"));
    }
}
