//! Component display names

/// Display name of the tree root
pub const ROOT_COMPONENT_NAME: &str = "<Root>";

/// Display name of a component with neither a name nor a source file
pub const ANONYMOUS_COMPONENT_NAME: &str = "<Anonymous>";

/// What the host knows about a component's identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentName {
    /// Declared name or registration tag
    pub name: Option<String>,

    /// Source file the component was compiled from
    pub file: Option<String>,
}

impl ComponentName {
    /// Component with a declared name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            file: None,
        }
    }

    /// Component known only by its source file
    pub fn from_file(file: impl Into<String>) -> Self {
        Self {
            name: None,
            file: Some(file.into()),
        }
    }

    /// Component with no identity
    pub fn anonymous() -> Self {
        Self::default()
    }
}

impl From<&str> for ComponentName {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for ComponentName {
    fn from(name: String) -> Self {
        Self::named(name)
    }
}

/// Derive the display name used for filtering and span names.
///
/// The root is always [`ROOT_COMPONENT_NAME`]. A declared name wins over
/// the file stem of a `.vue` source file; either is classified
/// (`user-list` becomes `UserList`).
pub fn format_component_name(component: &ComponentName, is_root: bool) -> String {
    if is_root {
        return ROOT_COMPONENT_NAME.to_string();
    }

    let name = component
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .or_else(|| component.file.as_deref().and_then(file_stem));

    match name {
        Some(name) => classify(name),
        None => ANONYMOUS_COMPONENT_NAME.to_string(),
    }
}

/// `src/components/UserList.vue` -> `UserList`
fn file_stem(file: &str) -> Option<&str> {
    let base = file.rsplit(|c: char| c == '/' || c == '\\').next()?;
    base.strip_suffix(".vue").filter(|stem| !stem.is_empty())
}

/// Upper-case the first character and every character after `-` or `_`,
/// dropping the separators.
fn classify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = true;

    for c in name.chars() {
        if c == '-' || c == '_' {
            upper_next = true;
            continue;
        }
        if upper_next && c.is_alphanumeric() {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        upper_next = false;
    }

    out
}
