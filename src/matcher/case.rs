//! Case classification of matched text and reconstruction of replacements.
//!
//! Only cased characters (those with an upper/lower distinction) count.
//! Text from scripts without case, such as Arabic or Persian, has no cased
//! characters and always gets the replacement as authored.

/// Case pattern of a matched span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseShape {
    /// Every cased character is uppercase ("MRI")
    Upper,
    /// First cased character uppercase, the rest lowercase ("Mri")
    Title,
    /// Lowercase, mixed, or no cased characters at all
    AsAuthored,
}

fn is_cased(c: char) -> bool {
    c.is_uppercase() || c.is_lowercase()
}

/// Classify the case pattern of `matched`.
pub fn classify(matched: &str) -> CaseShape {
    let mut cased = matched.chars().filter(|&c| is_cased(c));

    let Some(first) = cased.next() else {
        return CaseShape::AsAuthored;
    };
    if !first.is_uppercase() {
        return CaseShape::AsAuthored;
    }

    let rest: Vec<char> = cased.collect();
    if rest.iter().all(|c| c.is_uppercase()) {
        CaseShape::Upper
    } else if rest.iter().all(|c| c.is_lowercase()) {
        CaseShape::Title
    } else {
        CaseShape::AsAuthored
    }
}

/// Shape `replacement` after the case pattern of `matched`.
///
/// - `Upper`: the whole replacement is uppercased.
/// - `Title`: a replacement that only recases the match ("Mri" for "MRI")
///   takes the match's shape; any other replacement gets its first character
///   uppercased and keeps the rest as authored.
/// - `AsAuthored`: the replacement is returned unchanged.
pub fn reconstruct(matched: &str, replacement: &str) -> String {
    match classify(matched) {
        CaseShape::Upper => replacement.to_uppercase(),
        CaseShape::Title if is_recasing(matched, replacement) => {
            capitalize_first(&replacement.to_lowercase())
        }
        CaseShape::Title => capitalize_first(replacement),
        CaseShape::AsAuthored => replacement.to_string(),
    }
}

fn is_recasing(matched: &str, replacement: &str) -> bool {
    matched.to_lowercase() == replacement.trim().to_lowercase()
}

fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    let mut out = String::with_capacity(text.len());
    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===================
    // Classification Tests
    // ===================

    #[test]
    fn test_classify_upper() {
        assert_eq!(classify("MRI"), CaseShape::Upper);
        assert_eq!(classify("MRI SCAN"), CaseShape::Upper);
        assert_eq!(classify("5-HT"), CaseShape::Upper);
        assert_eq!(classify("A"), CaseShape::Upper);
    }

    #[test]
    fn test_classify_title() {
        assert_eq!(classify("Mri"), CaseShape::Title);
        assert_eq!(classify("Mri scan"), CaseShape::Title);
        assert_eq!(classify("T-cell"), CaseShape::Title);
    }

    #[test]
    fn test_classify_lower_and_mixed() {
        assert_eq!(classify("mri"), CaseShape::AsAuthored);
        assert_eq!(classify("mRI"), CaseShape::AsAuthored);
        assert_eq!(classify("MrI"), CaseShape::AsAuthored);
        assert_eq!(classify("Mri Scan"), CaseShape::AsAuthored);
    }

    #[test]
    fn test_classify_uncased_scripts() {
        assert_eq!(classify("سی تی اسکن"), CaseShape::AsAuthored);
        assert_eq!(classify("123"), CaseShape::AsAuthored);
        assert_eq!(classify(""), CaseShape::AsAuthored);
    }

    #[test]
    fn test_classify_non_latin_cased_scripts() {
        assert_eq!(classify("ЭКГ"), CaseShape::Upper);
        assert_eq!(classify("Экг"), CaseShape::Title);
        assert_eq!(classify("Σήμα"), CaseShape::Title);
    }

    // ===================
    // Reconstruction Tests
    // ===================

    #[test]
    fn test_reconstruct_upper() {
        assert_eq!(reconstruct("BP", "blood pressure"), "BLOOD PRESSURE");
    }

    #[test]
    fn test_reconstruct_title_capitalizes_first_character_only() {
        assert_eq!(reconstruct("Bp", "blood pressure"), "Blood pressure");
        assert_eq!(
            reconstruct("Mri", "magnetic resonance Imaging"),
            "Magnetic resonance Imaging"
        );
    }

    #[test]
    fn test_reconstruct_title_keeps_authored_casing() {
        assert_eq!(reconstruct("Serotonin", "5-HT receptor"), "5-HT receptor");
        assert_eq!(reconstruct("Ecg", "electroCardiogram"), "ElectroCardiogram");
        assert_eq!(reconstruct("Ct", "CT scan"), "CT scan");
    }

    #[test]
    fn test_reconstruct_title_of_recased_key_copies_match_shape() {
        assert_eq!(reconstruct("Mri", "MRI"), "Mri");
        assert_eq!(reconstruct("Mri scan", "MRI Scan"), "Mri scan");
        assert_eq!(reconstruct("Ecg", "eCG"), "Ecg");
    }

    #[test]
    fn test_reconstruct_as_authored() {
        assert_eq!(reconstruct("mri", "MRI"), "MRI");
        assert_eq!(reconstruct("mRi", "Magnetic Resonance"), "Magnetic Resonance");
        assert_eq!(reconstruct("سی تی", "CT"), "CT");
    }

    #[test]
    fn test_reconstruct_expanding_uppercase() {
        // 'ß' uppercases to two characters
        assert_eq!(reconstruct("STRASSE", "straße"), "STRASSE");
    }

    #[test]
    fn test_reconstruct_title_with_leading_space_in_replacement() {
        assert_eq!(reconstruct("Ct", " computed tomography"), " computed tomography");
    }
}
