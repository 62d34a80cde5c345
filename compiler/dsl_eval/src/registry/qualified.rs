//! Script identifiers and `script::function` names.

use std::fmt;

use dsl_ir::Name;

/// Identifier a script was loaded under.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct ScriptId(Name);

impl ScriptId {
    pub fn new(id: impl AsRef<str>) -> Self {
        ScriptId(Name::new(id))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<&str> for ScriptId {
    fn from(id: &str) -> Self {
        ScriptId::new(id)
    }
}

impl From<String> for ScriptId {
    fn from(id: String) -> Self {
        ScriptId::new(id)
    }
}

impl From<&ScriptId> for ScriptId {
    fn from(id: &ScriptId) -> Self {
        id.clone()
    }
}

impl fmt::Display for ScriptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A function name, optionally scoped to a script.
///
/// Parsed from `"script::function"` (script function first, then API
/// function) or `"function"` (API function only).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct QualifiedName {
    pub script: Option<ScriptId>,
    pub function: Name,
}

impl QualifiedName {
    /// Host (API) function name.
    pub fn api(function: impl AsRef<str>) -> Self {
        QualifiedName {
            script: None,
            function: Name::new(function),
        }
    }

    /// Function scoped to `script`.
    pub fn scoped(script: impl Into<ScriptId>, function: impl AsRef<str>) -> Self {
        QualifiedName {
            script: Some(script.into()),
            function: Name::new(function),
        }
    }

    /// Parse `"script::function"` or `"function"`.
    pub fn parse(text: &str) -> Self {
        match text.split_once("::") {
            Some((script, function)) => Self::scoped(script, function),
            None => Self::api(text),
        }
    }
}

impl From<&str> for QualifiedName {
    fn from(text: &str) -> Self {
        Self::parse(text)
    }
}

impl From<&QualifiedName> for QualifiedName {
    fn from(name: &QualifiedName) -> Self {
        name.clone()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.script {
            Some(script) => write!(f, "{script}::{}", self.function),
            None => write!(f, "{}", self.function),
        }
    }
}
