use serde::Serialize;

/// Outcome of looking for the applicant's full name in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonMatch {
    pub full_name: String,
    pub matched: bool,
    pub comment: String,
}

/// Exact substring check; the expected name must appear verbatim.
pub fn verify_person(text: &str, expected_name: &str) -> PersonMatch {
    if expected_name.is_empty() {
        return PersonMatch {
            full_name: String::new(),
            matched: false,
            comment: "Ожидаемое имя не указано".to_string(),
        };
    }

    if text.contains(expected_name) {
        PersonMatch {
            full_name: expected_name.to_string(),
            matched: true,
            comment: "Имя найдено в тексте".to_string(),
        }
    } else {
        PersonMatch {
            full_name: String::new(),
            matched: false,
            comment: "Имя не найдено в тексте".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_exact_name() {
        let found = verify_person("Выдан Иванову Ивану Ивановичу. Иванов Иван Иванович", "Иванов Иван Иванович");
        assert!(found.matched);
        assert_eq!(found.full_name, "Иванов Иван Иванович");
        assert_eq!(found.comment, "Имя найдено в тексте");
    }

    #[test]
    fn inflected_or_absent_name_does_not_match() {
        let missing = verify_person("Выдан Иванову Ивану Ивановичу", "Иванов Иван Иванович");
        assert!(!missing.matched);
        assert!(missing.full_name.is_empty());
        assert_eq!(missing.comment, "Имя не найдено в тексте");
    }

    #[test]
    fn empty_expectation_never_matches() {
        let result = verify_person("любой текст", "");
        assert!(!result.matched);
        assert_eq!(result.comment, "Ожидаемое имя не указано");
    }
}
