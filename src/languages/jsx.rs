use crate::languages::{LanguageCommon, LanguageName};

pub fn language() -> LanguageCommon {
    LanguageCommon {
        name: LanguageName::Jsx,
        file_extensions: &["jsx"],
        language: tree_sitter_javascript::LANGUAGE.into(),
    }
}
