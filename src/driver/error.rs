//! Driver errors.

use webconf_registry::RegistryError;
use webconf_tree::Directive;

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("{path}:{line}: unknown option '{name}'")]
    UnknownOption {
        name: String,
        path: String,
        line: u64,
    },

    #[error("{path}:{line}: '{name}' may only be set in the http block, found in {context}")]
    MisplacedDirective {
        name: String,
        context: &'static str,
        path: String,
        line: u64,
    },

    #[error("{path}:{line}: {source}")]
    InvalidDirective {
        path: String,
        line: u64,
        #[source]
        source: RegistryError,
    },
}

impl DriverError {
    pub(crate) fn unknown(directive: &Directive) -> Self {
        Self::UnknownOption {
            name: directive.name.clone(),
            path: directive.source_path().to_string(),
            line: directive.source_line(),
        }
    }

    pub(crate) fn misplaced(directive: &Directive, context: &'static str) -> Self {
        Self::MisplacedDirective {
            name: directive.name.clone(),
            context,
            path: directive.source_path().to_string(),
            line: directive.source_line(),
        }
    }

    pub(crate) fn invalid(directive: &Directive, source: RegistryError) -> Self {
        Self::InvalidDirective {
            path: directive.source_path().to_string(),
            line: directive.source_line(),
            source,
        }
    }
}
