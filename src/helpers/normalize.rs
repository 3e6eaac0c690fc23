//! Cleanup passes applied to recovered cell text.

use std::sync::LazyLock;

use regex::Regex;

/// Upper-case accented letters kept by [`normalize`] alongside word characters.
pub const ACCENTED_LETTERS: &str = "ÁÀÃÂÉÈÊÍÌÓÒÕÔÚÙÇ";

static SEPARATORS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\n;:]").expect("valid separator regex"));

static DISALLOWED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"[^\w\s{ACCENTED_LETTERS}\-]")).expect("valid character class regex")
});

static MULTI_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid whitespace regex"));

static DAY_ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?:\s+(?:SEGUNDA|TER[ÇC]A|QUARTA|QUINTA|SEXTA)[\s-]*FEIRA|\s+(?:S[ÁA]BADO|DOMINGO|FERIADO|FALTA|FOLGA|F[ÉE]RIAS|ATESTADO|DSR))+\s*$",
    )
    .expect("valid day annotation regex")
});

static BOILERPLATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)\s*(?:estado de mato grosso|rela[çc][ãa]o de registro|institui[çc][ãa]o|p[áa]gina\s*\d+|emiss[ãa]o\b).*$",
    )
    .expect("valid boilerplate regex")
});

const NULL_LIKE: [&str; 3] = ["nan", "none", "null"];

/// Normalizes a free-text field such as an employee name.
///
/// Line breaks, `;` and `:` become spaces, anything that is not a word
/// character, whitespace, an accented capital or `-` becomes a space, then
/// whitespace runs collapse and the ends are trimmed. Applying it twice gives
/// the same result as applying it once.
pub fn normalize(text: &str) -> String {
    let text = SEPARATORS_RE.replace_all(text, " ");
    let text = DISALLOWED_RE.replace_all(&text, " ");
    MULTI_SPACE_RE.replace_all(&text, " ").trim().to_string()
}

/// Removes weekday/holiday/absence labels that trail a name when the day-type
/// column bleeds into the name column. Weekdays only count with their
/// `-FEIRA` suffix, since `QUINTA` or `SEXTA` alone can be a surname.
pub fn strip_day_annotation(name: &str) -> String {
    DAY_ANNOTATION_RE.replace(name, "").trim().to_string()
}

/// Cuts letterhead, pagination and issue-date text that leaked into a cell.
pub fn strip_boilerplate(value: &str) -> String {
    BOILERPLATE_RE.replace(value, "").trim().to_string()
}

/// Maps whitespace-only and null-like placeholders (`nan`, `None`, `null`)
/// to the empty string. Other values are returned unchanged.
pub fn clear_blank(value: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() || NULL_LIKE.iter().any(|n| trimmed.eq_ignore_ascii_case(n)) {
        String::new()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn separators_and_symbols_become_spaces() {
        assert_eq!(normalize("SILVA;JOÃO:\nPEREIRA"), "SILVA JOÃO PEREIRA");
        assert_eq!(normalize("  *MARIA*  (ANA)  "), "MARIA ANA");
        assert_eq!(normalize("ANA-CLARA  D'ÁVILA"), "ANA-CLARA D ÁVILA");
    }

    #[test]
    fn keeps_accented_and_lowercase_letters() {
        assert_eq!(normalize("João Conceição"), "João Conceição");
        assert_eq!(normalize("ÂNGELA ÍRIS ÕTTO"), "ÂNGELA ÍRIS ÕTTO");
    }

    #[test]
    fn empty_and_noise_only_inputs_collapse_to_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("  ;:\n  "), "");
        assert_eq!(normalize("!!!"), "");
    }

    #[test]
    fn day_annotations_are_stripped_from_names() {
        assert_eq!(strip_day_annotation("JOAO SILVA SABADO"), "JOAO SILVA");
        assert_eq!(strip_day_annotation("JOAO SILVA Domingo"), "JOAO SILVA");
        assert_eq!(strip_day_annotation("ANA LIMA SEGUNDA-FEIRA"), "ANA LIMA");
        assert_eq!(strip_day_annotation("ANA LIMA FERIADO FALTA"), "ANA LIMA");
        assert_eq!(strip_day_annotation("ANA LIMA"), "ANA LIMA");
        assert_eq!(strip_day_annotation("DOMINGOS ALVES"), "DOMINGOS ALVES");
    }

    #[test]
    fn weekday_surnames_survive_without_feira() {
        assert_eq!(strip_day_annotation("MARIA QUINTA"), "MARIA QUINTA");
        assert_eq!(strip_day_annotation("JOSE SEXTA"), "JOSE SEXTA");
        assert_eq!(strip_day_annotation("MARIA QUINTA QUINTA-FEIRA"), "MARIA QUINTA");
        assert_eq!(strip_day_annotation("JOSE SEXTA SEXTA FEIRA"), "JOSE SEXTA");
    }

    #[test]
    fn boilerplate_tail_is_removed() {
        assert_eq!(
            strip_boilerplate("08:00:00 ESTADO DE MATO GROSSO SECRETARIA"),
            "08:00:00"
        );
        assert_eq!(strip_boilerplate("01/03/2024 Página 1 de 3"), "01/03/2024");
        assert_eq!(strip_boilerplate("Emissão: 05/04/2024"), "");
        assert_eq!(strip_boilerplate("MARIA SOUZA"), "MARIA SOUZA");
    }

    #[test]
    fn null_like_placeholders_are_cleared() {
        assert_eq!(clear_blank("   "), "");
        assert_eq!(clear_blank("nan"), "");
        assert_eq!(clear_blank("None"), "");
        assert_eq!(clear_blank("NULL"), "");
        assert_eq!(clear_blank("Fernanda"), "Fernanda");
        assert_eq!(clear_blank("08:00:00"), "08:00:00");
    }

    fn permitted(c: char) -> bool {
        c.is_alphanumeric() || c == '_' || c == '-' || c.is_whitespace() || ACCENTED_LETTERS.contains(c)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn normalize_is_idempotent(input in "[a-zA-ZÁÃÇÉÕçãéõ0-9 _.,;:!?()/@#*'\"\\-\t\n]{0,48}") {
            let once = normalize(&input);
            prop_assert_eq!(normalize(&once), once.clone());
        }

        #[test]
        fn normalize_leaves_only_permitted_characters(input in "[a-zA-ZÁÃÇÉÕçãéõ0-9 _.,;:!?()/@#*'\"\\-\t\n]{0,48}") {
            let out = normalize(&input);
            prop_assert!(out.chars().all(permitted), "unexpected character in {:?}", out);
            prop_assert!(!out.contains("  "));
            prop_assert_eq!(out.trim(), out.as_str());
        }
    }
}
