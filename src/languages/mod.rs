pub mod jsx;
pub mod tsx;
pub mod utils;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, path::Path};
use strum::{Display, EnumString, IntoStaticStr, VariantNames};
use tree_sitter::{Language, Parser, Tree};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
    VariantNames,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LanguageName {
    Jsx,
    Tsx,
}

/// Registry of the component-template languages the tagger understands
pub struct LanguageRegistry {
    languages: HashMap<LanguageName, LanguageCommon>,
    extensions: HashMap<&'static str, LanguageName>,
}

#[derive(fieldwork::Fieldwork)]
#[fieldwork(get)]
pub struct LanguageCommon {
    #[fieldwork(get(copy))]
    name: LanguageName,
    #[fieldwork(get(copy))]
    file_extensions: &'static [&'static str],
    #[fieldwork(rename = tree_sitter_language)]
    language: Language,
}

impl LanguageCommon {
    pub fn tree_sitter_parser(&self) -> Result<Parser> {
        let mut parser = Parser::new();
        parser.set_language(self.tree_sitter_language())?;
        Ok(parser)
    }

    pub fn parse(&self, source: &str) -> Result<Tree> {
        self.tree_sitter_parser()?
            .parse(source, None)
            .ok_or_else(|| anyhow!("tree-sitter returned no tree for {}", self.name))
    }
}

impl LanguageRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            languages: HashMap::new(),
            extensions: HashMap::new(),
        };

        registry.register_language(jsx::language());
        registry.register_language(tsx::language());

        registry
    }

    pub fn register_language(&mut self, language: LanguageCommon) {
        let name = language.name();
        for &extension in language.file_extensions() {
            self.extensions.insert(extension, name);
        }
        self.languages.insert(name, language);
    }

    pub fn get_language(&self, name: LanguageName) -> Option<&LanguageCommon> {
        self.languages.get(&name)
    }

    pub fn detect_language_from_path(&self, file_path: &Path) -> Option<LanguageName> {
        let extension = file_path.extension()?.to_str()?;
        self.extensions.get(extension).copied()
    }

    pub fn language_for_path(&self, file_path: &Path) -> Option<&LanguageCommon> {
        self.detect_language_from_path(file_path)
            .and_then(|name| self.get_language(name))
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_component_template_extensions() {
        let registry = LanguageRegistry::new();
        assert_eq!(
            registry.detect_language_from_path(Path::new("src/App.tsx")),
            Some(LanguageName::Tsx)
        );
        assert_eq!(
            registry.detect_language_from_path(Path::new("src/Hero.jsx")),
            Some(LanguageName::Jsx)
        );
        assert_eq!(
            registry.detect_language_from_path(Path::new("src/lib/utils.ts")),
            None
        );
        assert_eq!(registry.detect_language_from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn parses_jsx_inside_typescript() {
        let registry = LanguageRegistry::new();
        let tsx = registry.get_language(LanguageName::Tsx).unwrap();
        let tree = tsx
            .parse("const App = (props: Props) => <p>Hello</p>;\n")
            .unwrap();
        assert!(!tree.root_node().has_error());
    }
}
